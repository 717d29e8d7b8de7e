use alloc::sync::Arc;
use core::fmt;

use super::{Modifier, ModifierChain, Provider, ProviderChain, TreeCodec, ValueTreeCodec};

// -----------------------------------------------------------------------------
// Pipeline

/// The providers, modifiers and tree codec of one blueprint.
///
/// Frozen once the blueprint is built.
#[derive(Clone)]
pub struct Pipeline {
    providers: ProviderChain,
    modifiers: ModifierChain,
    tree_codec: Arc<dyn TreeCodec>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            providers: ProviderChain::new(),
            modifiers: ModifierChain::new(),
            tree_codec: Arc::new(ValueTreeCodec),
        }
    }
}

impl Pipeline {
    #[inline]
    pub fn providers(&self) -> &ProviderChain {
        &self.providers
    }

    #[inline]
    pub fn modifiers(&self) -> &ModifierChain {
        &self.modifiers
    }

    #[inline]
    pub fn tree_codec(&self) -> &Arc<dyn TreeCodec> {
        &self.tree_codec
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("providers", &self.providers)
            .field("modifiers", &self.modifiers)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ExtensionContext

/// The build-time handle an [`Extension`] registers through.
pub struct ExtensionContext<'a> {
    pipeline: &'a mut Pipeline,
}

impl<'a> ExtensionContext<'a> {
    #[inline]
    pub(crate) fn new(pipeline: &'a mut Pipeline) -> Self {
        Self { pipeline }
    }

    /// Adds a provider asked before all others.
    pub fn insert_provider(&mut self, provider: impl Provider) -> &mut Self {
        self.pipeline.providers.insert(Arc::new(provider));
        self
    }

    /// Adds a provider asked after all others.
    pub fn append_provider(&mut self, provider: impl Provider) -> &mut Self {
        self.pipeline.providers.append(Arc::new(provider));
        self
    }

    pub fn insert_modifier(&mut self, modifier: impl Modifier) -> &mut Self {
        self.pipeline.modifiers.insert(Arc::new(modifier));
        self
    }

    pub fn append_modifier(&mut self, modifier: impl Modifier) -> &mut Self {
        self.pipeline.modifiers.append(Arc::new(modifier));
        self
    }

    pub fn set_tree_codec(&mut self, codec: impl TreeCodec) -> &mut Self {
        self.pipeline.tree_codec = Arc::new(codec);
        self
    }
}

// -----------------------------------------------------------------------------
// Extension

/// A bundle of customizations applied to a blueprint.
///
/// # Examples
///
/// ```
/// use lb_bind::blueprint::Blueprint;
/// use lb_bind::ext::{Extension, ExtensionContext, SimpleProvider};
///
/// struct Nothing;
///
/// impl Extension for Nothing {
///     fn register(&self, cx: &mut ExtensionContext<'_>) {
///         cx.append_provider(SimpleProvider::new());
///     }
/// }
///
/// let blueprint = Blueprint::default().with_extension(Nothing);
/// assert_eq!(blueprint.pipeline().providers().len(), 1);
/// ```
pub trait Extension {
    fn register(&self, cx: &mut ExtensionContext<'_>);
}

impl<F: Fn(&mut ExtensionContext<'_>)> Extension for F {
    #[inline]
    fn register(&self, cx: &mut ExtensionContext<'_>) {
        self(cx)
    }
}
