use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use super::ValueWrite;
use crate::class::{ClassDescriptor, ClassRegistry};
use crate::introspect::{Direction, Introspector, MetadataSource, NoMetadata, ObjectDefinition};
use crate::locate::{DispatchTag, ValueReader, ValueWriter};
use crate::types::ResolvedType;

// -----------------------------------------------------------------------------
// DefinitionContext

/// Lets a [`Modifier`] run the introspector of the blueprint asking it.
#[derive(Clone, Copy)]
pub struct DefinitionContext<'a> {
    introspector: Introspector<'a>,
}

impl<'a> DefinitionContext<'a> {
    #[inline]
    pub(crate) fn new(introspector: Introspector<'a>) -> Self {
        Self { introspector }
    }

    #[inline]
    pub fn introspector(&self) -> &Introspector<'a> {
        &self.introspector
    }

    #[inline]
    pub fn registry(&self) -> &'a ClassRegistry {
        self.introspector.registry()
    }

    /// Introspects `class` reading metadata from `metadata`.
    #[inline]
    pub fn introspect(
        &self,
        class: &Arc<ClassDescriptor>,
        direction: Direction,
        metadata: &dyn MetadataSource,
    ) -> ObjectDefinition {
        self.introspector.introspect(class, direction, metadata)
    }

    /// The definition the blueprint would build without any modifier.
    #[inline]
    pub fn default_definition(
        &self,
        class: &Arc<ClassDescriptor>,
        direction: Direction,
    ) -> ObjectDefinition {
        self.introspector.introspect(class, direction, &NoMetadata)
    }
}

// -----------------------------------------------------------------------------
// Modifier

/// Adjusts what the engine builds by itself.
///
/// Definition hooks and [`override_standard_writer`] replace; the first
/// modifier returning `Some` wins. The wrap hooks run for every modifier,
/// each one receiving what the previous one returned. Handlers supplied by a
/// [`Provider`](super::Provider) are never passed through the wrap hooks.
///
/// [`override_standard_writer`]: Modifier::override_standard_writer
pub trait Modifier: Send + Sync + 'static {
    fn definition_for_read(
        &self,
        cx: &DefinitionContext<'_>,
        class: &Arc<ClassDescriptor>,
    ) -> Option<ObjectDefinition> {
        let _ = (cx, class);
        None
    }

    fn definition_for_write(
        &self,
        cx: &DefinitionContext<'_>,
        class: &Arc<ClassDescriptor>,
    ) -> Option<ObjectDefinition> {
        let _ = (cx, class);
        None
    }

    fn modify_reader(&self, ty: &ResolvedType, reader: ValueReader) -> ValueReader {
        let _ = ty;
        reader
    }

    fn modify_writer(&self, ty: &ResolvedType, writer: ValueWriter) -> ValueWriter {
        let _ = ty;
        writer
    }

    /// Replaces the writer of a built-in scalar tag.
    ///
    /// Only asked for tags where [`DispatchTag::is_standard`] holds.
    fn override_standard_writer(
        &self,
        tag: DispatchTag,
        ty: &ResolvedType,
    ) -> Option<Arc<dyn ValueWrite>> {
        let _ = (tag, ty);
        None
    }
}

// -----------------------------------------------------------------------------
// ModifierChain

/// An ordered list of modifiers.
#[derive(Clone, Default)]
pub struct ModifierChain {
    entries: Vec<Arc<dyn Modifier>>,
}

impl ModifierChain {
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a modifier in front of the others.
    #[inline]
    pub fn insert(&mut self, modifier: Arc<dyn Modifier>) {
        self.entries.insert(0, modifier);
    }

    /// Adds a modifier after the others.
    #[inline]
    pub fn append(&mut self, modifier: Arc<dyn Modifier>) {
        self.entries.push(modifier);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Modifier for ModifierChain {
    fn definition_for_read(
        &self,
        cx: &DefinitionContext<'_>,
        class: &Arc<ClassDescriptor>,
    ) -> Option<ObjectDefinition> {
        self.entries
            .iter()
            .find_map(|m| m.definition_for_read(cx, class))
    }

    fn definition_for_write(
        &self,
        cx: &DefinitionContext<'_>,
        class: &Arc<ClassDescriptor>,
    ) -> Option<ObjectDefinition> {
        self.entries
            .iter()
            .find_map(|m| m.definition_for_write(cx, class))
    }

    fn modify_reader(&self, ty: &ResolvedType, reader: ValueReader) -> ValueReader {
        self.entries
            .iter()
            .fold(reader, |reader, m| m.modify_reader(ty, reader))
    }

    fn modify_writer(&self, ty: &ResolvedType, writer: ValueWriter) -> ValueWriter {
        self.entries
            .iter()
            .fold(writer, |writer, m| m.modify_writer(ty, writer))
    }

    fn override_standard_writer(
        &self,
        tag: DispatchTag,
        ty: &ResolvedType,
    ) -> Option<Arc<dyn ValueWrite>> {
        self.entries
            .iter()
            .find_map(|m| m.override_standard_writer(tag, ty))
    }
}

impl fmt::Debug for ModifierChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifierChain")
            .field("len", &self.entries.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use std::sync::Mutex;

    use super::{Modifier, ModifierChain};
    use crate::class::ClassRegistry;
    use crate::locate::{DispatchTag, ValueWriter};
    use crate::types::{ResolvedType, TypeResolver};

    /// Records the writer it was handed and replaces it with `Any`.
    struct Step(&'static str, Arc<Mutex<Vec<(&'static str, bool)>>>);

    impl Modifier for Step {
        fn modify_writer(&self, _ty: &ResolvedType, writer: ValueWriter) -> ValueWriter {
            let was_any = matches!(writer, ValueWriter::Any);
            self.1.lock().unwrap().push((self.0, was_any));
            ValueWriter::Any
        }
    }

    #[test]
    fn wrap_hooks_are_cumulative() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = ModifierChain::new();
        chain.append(Arc::new(Step("second", log.clone())));
        chain.insert(Arc::new(Step("first", log.clone())));

        let ty = TypeResolver::new(Arc::new(ClassRegistry::new()))
            .resolve_class("i32")
            .unwrap();
        let out = chain.modify_writer(&ty, ValueWriter::Standard(DispatchTag::I32));

        assert!(matches!(out, ValueWriter::Any));
        assert_eq!(*log.lock().unwrap(), [("first", false), ("second", true)]);
    }

    #[test]
    fn empty_chain_passes_through() {
        let chain = ModifierChain::new();
        let ty = TypeResolver::new(Arc::new(ClassRegistry::new()))
            .resolve_class("bool")
            .unwrap();
        let out = chain.modify_writer(&ty, ValueWriter::Standard(DispatchTag::Boolean));
        assert!(matches!(out, ValueWriter::Standard(DispatchTag::Boolean)));
        assert!(chain.override_standard_writer(DispatchTag::Boolean, &ty).is_none());
    }
}
