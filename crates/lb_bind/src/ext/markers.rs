use alloc::sync::Arc;

use super::{DefinitionContext, Extension, ExtensionContext, Modifier};
use crate::class::ClassDescriptor;
use crate::introspect::{Direction, MarkerOverrides, ObjectDefinition};

/// Makes the introspector honor markers.
///
/// Without it, the [`Ignore`], [`Rename`], [`Include`], [`Alias`],
/// [`IgnoreProperties`] and [`PropertyOrder`] markers attached to classes and
/// members are inert. Overrides given with [`with_overrides`] are laid over
/// the declared markers, which lets a blueprint re-annotate classes it does
/// not own.
///
/// [`Ignore`]: crate::class::Ignore
/// [`Rename`]: crate::class::Rename
/// [`Include`]: crate::class::Include
/// [`Alias`]: crate::class::Alias
/// [`IgnoreProperties`]: crate::class::IgnoreProperties
/// [`PropertyOrder`]: crate::class::PropertyOrder
/// [`with_overrides`]: MarkerExtension::with_overrides
#[derive(Debug, Clone, Default)]
pub struct MarkerExtension {
    overrides: Arc<MarkerOverrides>,
}

impl MarkerExtension {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_overrides(overrides: MarkerOverrides) -> Self {
        Self {
            overrides: Arc::new(overrides),
        }
    }
}

impl Extension for MarkerExtension {
    fn register(&self, cx: &mut ExtensionContext<'_>) {
        cx.insert_modifier(MarkerModifier {
            overrides: self.overrides.clone(),
        });
    }
}

struct MarkerModifier {
    overrides: Arc<MarkerOverrides>,
}

impl Modifier for MarkerModifier {
    fn definition_for_read(
        &self,
        cx: &DefinitionContext<'_>,
        class: &Arc<ClassDescriptor>,
    ) -> Option<ObjectDefinition> {
        Some(cx.introspect(class, Direction::Read, &*self.overrides))
    }

    fn definition_for_write(
        &self,
        cx: &DefinitionContext<'_>,
        class: &Arc<ClassDescriptor>,
    ) -> Option<ObjectDefinition> {
        Some(cx.introspect(class, Direction::Write, &*self.overrides))
    }
}
