use alloc::format;
use alloc::string::ToString;
use alloc::sync::Arc;
use core::any::TypeId;
use core::cell::RefCell;

use super::{DispatchTag, ValueReader, ValueWriter, classify_type};
use crate::blueprint::Blueprint;
use crate::class::ClassDescriptor;
use crate::error::BindError;
use crate::ext::{Modifier, Provider};
use crate::introspect::{Direction, ObjectDefinition};
use crate::types::ResolvedType;
use crate::value::ObjectRef;

/// Finds the handlers of types for one [`Session`](crate::blueprint::Session).
///
/// Classification results and handlers are cached by the blueprint. On top
/// of that the locator remembers the last type it classified and the class
/// of the last object it saw, which makes runs of same-typed elements cheap.
/// It is not `Sync`.
pub struct HandlerLocator {
    blueprint: Blueprint,
    last_tag: RefCell<Option<(ResolvedType, DispatchTag)>>,
    last_object: RefCell<Option<(TypeId, ResolvedType)>>,
}

impl HandlerLocator {
    pub(crate) fn new(blueprint: Blueprint) -> Self {
        Self {
            blueprint,
            last_tag: RefCell::new(None),
            last_object: RefCell::new(None),
        }
    }

    #[inline]
    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    /// Classifies `ty`.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownClass`] for unregistered classes and
    /// [`BindError::AbstractType`] for interfaces and abstract classes that
    /// are neither containers nor text.
    ///
    /// Tags name built-in handling only, so providers are not consulted. An
    /// interface served by a provider still fails here, while
    /// [`reader_for`](Self::reader_for) and [`writer_for`](Self::writer_for)
    /// return its custom handlers.
    pub fn classify(&self, ty: &ResolvedType) -> Result<DispatchTag, BindError> {
        if let Some((last, tag)) = &*self.last_tag.borrow()
            && last == ty
        {
            return Ok(*tag);
        }
        let caches = self.blueprint.caches();
        let tag = match caches.tags.get(ty) {
            Some(tag) => tag,
            None => {
                let tag = classify_type(self.blueprint.registry(), ty)?;
                caches.tags.insert(ty.resolved(), tag);
                tag
            }
        };
        *self.last_tag.borrow_mut() = Some((ty.clone(), tag));
        Ok(tag)
    }

    /// The resolved class of a host object, found through its [`TypeId`].
    pub fn object_type(
        &self,
        obj: &ObjectRef<'_>,
        declared: Option<&ResolvedType>,
    ) -> Result<ResolvedType, BindError> {
        let type_id = obj.object_type_id();
        if let Some((last, ty)) = &*self.last_object.borrow()
            && *last == type_id
        {
            return Ok(match declared {
                Some(declared) if declared.class_name() == ty.class_name() => declared.resolved(),
                _ => ty.clone(),
            });
        }
        let Some(desc) = self.blueprint.registry().get_by_type_id(type_id) else {
            let name = match declared {
                Some(ty) => ty.to_string(),
                None => format!("{type_id:?}"),
            };
            return Err(BindError::UnregisteredType(name));
        };
        // Keep the bindings a declaration supplies for the same class.
        let ty = match declared {
            Some(ty) if ty.class_name() == desc.name() => ty.resolved(),
            _ => self.blueprint.resolver().resolve_class(desc.name())?,
        };
        *self.last_object.borrow_mut() = Some((type_id, ty.clone()));
        Ok(ty)
    }

    // -------------------------------------------------------------------------
    // Readers

    /// The reader for values of type `ty`.
    pub fn reader_for(&self, ty: &ResolvedType) -> Result<ValueReader, BindError> {
        let ty = ty.resolved();
        let caches = self.blueprint.caches();
        if let Some(reader) = caches.readers.get(&ty) {
            return Ok(reader);
        }
        let reader = self.build_reader(&ty)?;
        caches.readers.insert(ty, reader.clone());
        Ok(reader)
    }

    fn build_reader(&self, ty: &ResolvedType) -> Result<ValueReader, BindError> {
        let pipeline = self.blueprint.pipeline();
        if let Some(custom) = pipeline.providers().find_reader(ty) {
            log::trace!("custom reader for `{ty}`");
            return Ok(ValueReader::Custom(custom));
        }

        let tag = self.classify(ty)?;
        let reader = match tag {
            DispatchTag::Collection | DispatchTag::OrderedList => {
                let element = self.parameter(ty, "Collection", 0);
                if let Some(custom) = pipeline.providers().find_collection_reader(ty, &element) {
                    log::trace!("custom collection reader for `{ty}`");
                    return Ok(ValueReader::Custom(custom));
                }
                ValueReader::Collection { element }
            }
            DispatchTag::Map => {
                let key = self.parameter(ty, "Map", 0);
                let value = self.parameter(ty, "Map", 1);
                if let Some(custom) = pipeline.providers().find_map_reader(ty, &key, &value) {
                    log::trace!("custom map reader for `{ty}`");
                    return Ok(ValueReader::Custom(custom));
                }
                ValueReader::Map { key, value }
            }
            tag if tag.is_array() => ValueReader::Array {
                tag,
                element: ty
                    .element()
                    .map(ResolvedType::resolved)
                    .unwrap_or_else(|| self.blueprint.resolver().object()),
            },
            DispatchTag::Enumeration => {
                ValueReader::Enum(self.definition(ty, Direction::Read)?)
            }
            DispatchTag::Object => ValueReader::Object(self.definition(ty, Direction::Read)?),
            DispatchTag::TextSequence => {
                if self.class_of(ty)?.is_abstract() {
                    ValueReader::Scalar(DispatchTag::Text)
                } else {
                    ValueReader::Object(self.definition(ty, Direction::Read)?)
                }
            }
            DispatchTag::TreeNode => ValueReader::Tree,
            DispatchTag::Unknown => ValueReader::Any,
            tag => ValueReader::Scalar(tag),
        };
        log::trace!("built {reader:?} for `{ty}`");
        Ok(pipeline.modifiers().modify_reader(ty, reader))
    }

    // -------------------------------------------------------------------------
    // Writers

    /// The writer for values of type `ty`.
    pub fn writer_for(&self, ty: &ResolvedType) -> Result<ValueWriter, BindError> {
        let ty = ty.resolved();
        let caches = self.blueprint.caches();
        if let Some(writer) = caches.writers.get(&ty) {
            return Ok(writer);
        }
        let writer = self.build_writer(&ty)?;
        caches.writers.insert(ty, writer.clone());
        Ok(writer)
    }

    /// The built-in writer for `ty`, ignoring providers and modifiers.
    ///
    /// Used for the values custom writers return.
    pub fn builtin_writer(&self, ty: &ResolvedType) -> Result<ValueWriter, BindError> {
        let tag = self.classify(ty)?;
        self.standard_writer(ty, tag)
    }

    fn build_writer(&self, ty: &ResolvedType) -> Result<ValueWriter, BindError> {
        let pipeline = self.blueprint.pipeline();
        if let Some(custom) = pipeline.providers().find_writer(ty) {
            log::trace!("custom writer for `{ty}`");
            return Ok(ValueWriter::Custom(custom));
        }

        let tag = self.classify(ty)?;
        let overridden = if tag.is_standard() {
            pipeline.modifiers().override_standard_writer(tag, ty)
        } else {
            None
        };
        let writer = match overridden {
            Some(custom) => ValueWriter::Custom(custom),
            None => self.standard_writer(ty, tag)?,
        };
        log::trace!("built {writer:?} for `{ty}`");
        Ok(pipeline.modifiers().modify_writer(ty, writer))
    }

    fn standard_writer(&self, ty: &ResolvedType, tag: DispatchTag) -> Result<ValueWriter, BindError> {
        Ok(match tag {
            DispatchTag::ObjectArray | DispatchTag::Collection | DispatchTag::OrderedList => {
                ValueWriter::Sequence
            }
            DispatchTag::Map => ValueWriter::Map,
            DispatchTag::Enumeration => ValueWriter::Enum(self.definition(ty, Direction::Write)?),
            DispatchTag::Object => ValueWriter::Object(self.definition(ty, Direction::Write)?),
            DispatchTag::TextSequence => {
                if self.class_of(ty)?.is_abstract() {
                    ValueWriter::Standard(DispatchTag::Text)
                } else {
                    ValueWriter::Object(self.definition(ty, Direction::Write)?)
                }
            }
            DispatchTag::TreeNode => ValueWriter::Tree,
            DispatchTag::Unknown => ValueWriter::Any,
            tag => ValueWriter::Standard(tag),
        })
    }

    // -------------------------------------------------------------------------
    // Helpers

    fn class_of(&self, ty: &ResolvedType) -> Result<&Arc<ClassDescriptor>, BindError> {
        self.blueprint
            .registry()
            .get(ty.class_name())
            .ok_or_else(|| BindError::UnknownClass(ty.class_name().to_string().into()))
    }

    fn definition(
        &self,
        ty: &ResolvedType,
        direction: Direction,
    ) -> Result<Arc<ObjectDefinition>, BindError> {
        let class = self.class_of(ty)?;
        Ok(self.blueprint.definition(class, direction))
    }

    /// The `index`th type argument `ty` supplies to its ancestor `class`.
    fn parameter(&self, ty: &ResolvedType, class: &str, index: usize) -> ResolvedType {
        ty.type_parameters_for(class)
            .and_then(|bindings| bindings.get(index).map(ResolvedType::resolved))
            .unwrap_or_else(|| self.blueprint.resolver().object())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::blueprint::Blueprint;
    use crate::class::{ClassDescriptor, ClassRegistry};
    use crate::error::BindError;
    use crate::ext::{
        ExtensionContext, ReadContext, SimpleProvider, ValueRead, ValueWrite, WriteContext,
    };
    use crate::locate::{ValueReader, ValueWriter};
    use crate::types::{DeclaredType, ResolvedType};
    use crate::value::Value;

    struct Opaque;

    impl ValueRead for Opaque {
        fn read<'de>(
            &self,
            _cx: &ReadContext<'_>,
            _ty: &ResolvedType,
            _de: &mut dyn erased_serde::Deserializer<'de>,
        ) -> Result<Value<'static>, BindError> {
            Ok(Value::Null)
        }
    }

    impl ValueWrite for Opaque {
        fn write<'v>(
            &self,
            _cx: &WriteContext<'_>,
            _ty: &ResolvedType,
            value: Value<'v>,
        ) -> Result<Value<'v>, BindError> {
            Ok(value)
        }
    }

    #[test]
    fn provided_interfaces_have_handlers_but_no_tag() {
        let mut registry = ClassRegistry::new();
        registry.register(ClassDescriptor::interface("Shape").build());
        let base = Blueprint::new(registry);
        let provided = base.with_extension(|cx: &mut ExtensionContext<'_>| {
            cx.insert_provider(
                SimpleProvider::new()
                    .with_reader("Shape", Opaque)
                    .with_writer("Shape", Opaque),
            );
        });
        let shape = provided.resolve(&DeclaredType::class("Shape")).unwrap();

        let session = provided.session();
        assert!(matches!(session.reader_for(&shape).unwrap(), ValueReader::Custom(_)));
        assert!(matches!(session.writer_for(&shape).unwrap(), ValueWriter::Custom(_)));
        assert!(matches!(
            session.classify(&shape),
            Err(BindError::AbstractType(name)) if name == "Shape"
        ));

        let session = base.session();
        assert!(matches!(session.reader_for(&shape), Err(BindError::AbstractType(_))));
    }
}
