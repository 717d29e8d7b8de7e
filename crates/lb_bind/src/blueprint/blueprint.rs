use alloc::string::ToString;
use alloc::sync::Arc;
use core::fmt;

use serde_core::{Deserializer, Serialize, Serializer};

use super::cache::Caches;
use super::{Features, Session};
use crate::class::{ClassDescriptor, ClassRegistry};
use crate::error::BindError;
use crate::ext::{DefinitionContext, Extension, ExtensionContext, Modifier, Pipeline};
use crate::introspect::{
    Direction, IntrospectConfig, Introspector, NoMetadata, ObjectDefinition, VisibilityConfig,
};
use crate::locate::DispatchTag;
use crate::serde::Rendered;
use crate::types::{DEFAULT_CACHE_CAPACITY, DeclaredType, ResolvedType, TypeBindings, TypeResolver, Typed};
use crate::value::{FromValue, ToValue, Value};

// -----------------------------------------------------------------------------
// Blueprint

struct BlueprintInner {
    resolver: Arc<TypeResolver>,
    features: Features,
    visibility: VisibilityConfig,
    pipeline: Pipeline,
    capacity: usize,
    caches: Caches,
}

/// A finalized configuration.
///
/// A blueprint never changes. The `with*` methods return a new blueprint
/// with its own caches, leaving `self` as it was. Blueprints derived from
/// each other share the [`TypeResolver`] and its cache. Cloning is cheap.
///
/// # Examples
///
/// ```
/// use lb_bind::blueprint::{Blueprint, Features};
/// use lb_bind::class::{ClassDescriptor, ClassRegistry};
/// use lb_bind::impl_object_value;
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
/// impl_object_value!(Point);
///
/// let mut registry = ClassRegistry::new();
/// registry.register(
///     ClassDescriptor::builder::<Point>("Point")
///         .constructor(Point::default)
///         .field("x", |p| &p.x, |p| &mut p.x)
///         .field("y", |p| &p.y, |p| &mut p.y)
///         .build(),
/// );
/// let blueprint = Blueprint::new(registry);
///
/// let mut out = Vec::new();
/// blueprint
///     .write(&Point { x: 1, y: 2 }, &mut serde_json::Serializer::new(&mut out))
///     .unwrap();
/// assert_eq!(out, br#"{"x":1,"y":2}"#);
///
/// let strict = blueprint.with(Features::FAIL_ON_UNKNOWN_PROPERTY);
/// let mut de = serde_json::Deserializer::from_str(r#"{"x":5,"z":0}"#);
/// assert!(strict.read::<Point, _>(&mut de).is_err());
///
/// let mut de = serde_json::Deserializer::from_str(r#"{"x":5,"z":0}"#);
/// let point: Point = blueprint.read(&mut de).unwrap();
/// assert_eq!((point.x, point.y), (5, 0));
/// ```
#[derive(Clone)]
pub struct Blueprint(Arc<BlueprintInner>);

impl Default for Blueprint {
    /// The built-in classes plus every class submitted with
    /// [`submit_class!`](crate::submit_class).
    fn default() -> Self {
        let mut registry = ClassRegistry::new();
        registry.auto_register();
        Self::new(registry)
    }
}

impl Blueprint {
    /// A blueprint with default settings and no extensions.
    #[inline]
    pub fn new(registry: ClassRegistry) -> Self {
        Self::builder(registry).build()
    }

    #[inline]
    pub fn builder(registry: ClassRegistry) -> BlueprintBuilder {
        BlueprintBuilder::new(Arc::new(TypeResolver::new(Arc::new(registry))))
    }

    // -------------------------------------------------------------------------
    // Settings

    #[inline]
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        self.0.resolver.registry()
    }

    #[inline]
    pub fn resolver(&self) -> &Arc<TypeResolver> {
        &self.0.resolver
    }

    #[inline]
    pub fn features(&self) -> Features {
        self.0.features
    }

    #[inline]
    pub fn visibility(&self) -> VisibilityConfig {
        self.0.visibility
    }

    #[inline]
    pub fn pipeline(&self) -> &Pipeline {
        &self.0.pipeline
    }

    /// The introspector configured by this blueprint.
    pub fn introspector(&self) -> Introspector<'_> {
        let features = self.0.features;
        Introspector::new(
            self.registry(),
            IntrospectConfig {
                visibility: self.0.visibility,
                use_fields: features.contains(Features::USE_FIELDS),
                use_is_getters: features.contains(Features::USE_IS_GETTERS),
                include_static: features.contains(Features::INCLUDE_STATIC_MEMBERS),
                case_insensitive: features.contains(Features::CASE_INSENSITIVE_PROPERTIES),
            },
        )
    }

    #[inline]
    pub(crate) fn caches(&self) -> &Caches {
        &self.0.caches
    }

    // -------------------------------------------------------------------------
    // Mutant factories

    /// Turns `features` on.
    pub fn with(&self, features: Features) -> Self {
        if self.0.features.contains(features) {
            return self.clone();
        }
        self.derive(self.0.features | features, self.0.visibility, self.0.pipeline.clone())
    }

    /// Turns `features` off.
    pub fn without(&self, features: Features) -> Self {
        if !self.0.features.intersects(features) {
            return self.clone();
        }
        self.derive(self.0.features - features, self.0.visibility, self.0.pipeline.clone())
    }

    pub fn with_visibility(&self, visibility: VisibilityConfig) -> Self {
        if self.0.visibility == visibility {
            return self.clone();
        }
        self.derive(self.0.features, visibility, self.0.pipeline.clone())
    }

    /// A blueprint with `extension` registered on top of the current pipeline.
    pub fn with_extension(&self, extension: impl Extension) -> Self {
        let mut pipeline = self.0.pipeline.clone();
        extension.register(&mut ExtensionContext::new(&mut pipeline));
        self.derive(self.0.features, self.0.visibility, pipeline)
    }

    fn derive(&self, features: Features, visibility: VisibilityConfig, pipeline: Pipeline) -> Self {
        Self(Arc::new(BlueprintInner {
            resolver: self.0.resolver.clone(),
            features,
            visibility,
            pipeline,
            capacity: self.0.capacity,
            caches: Caches::new(self.0.capacity),
        }))
    }

    // -------------------------------------------------------------------------
    // Lookup

    /// Starts a per-call session.
    #[inline]
    pub fn session(&self) -> Session {
        Session::new(self.clone())
    }

    /// Resolves a declared type without bindings.
    #[inline]
    pub fn resolve(&self, declared: &DeclaredType) -> Result<ResolvedType, BindError> {
        self.0.resolver.resolve(&TypeBindings::empty(), declared)
    }

    #[inline]
    pub fn resolve_type<T: Typed>(&self) -> Result<ResolvedType, BindError> {
        self.0.resolver.resolve_typed::<T>()
    }

    /// The definition of the class named `class`.
    pub fn definition_for(
        &self,
        class: &str,
        direction: Direction,
    ) -> Result<Arc<ObjectDefinition>, BindError> {
        let desc = self
            .registry()
            .get(class)
            .ok_or_else(|| BindError::UnknownClass(class.to_string().into()))?;
        Ok(self.definition(desc, direction))
    }

    /// The definition of `class`, built at most once per direction.
    ///
    /// Modifiers are asked first, the introspector builds the rest.
    pub(crate) fn definition(
        &self,
        class: &Arc<ClassDescriptor>,
        direction: Direction,
    ) -> Arc<ObjectDefinition> {
        let key = (class.name_cow().clone(), direction);
        if let Some(def) = self.0.caches.definitions.get(&key) {
            return def;
        }
        let introspector = self.introspector();
        let cx = DefinitionContext::new(introspector);
        let modifiers = self.0.pipeline.modifiers();
        let custom = match direction {
            Direction::Read => modifiers.definition_for_read(&cx, class),
            Direction::Write => modifiers.definition_for_write(&cx, class),
        };
        let def = Arc::new(
            custom.unwrap_or_else(|| introspector.introspect(class, direction, &NoMetadata)),
        );
        log::trace!(
            "{direction:?} definition of `{}` has {} properties",
            class.name(),
            def.len()
        );
        self.0.caches.definitions.insert(key, def.clone());
        def
    }

    #[inline]
    pub fn classify(&self, ty: &ResolvedType) -> Result<DispatchTag, BindError> {
        self.session().classify(ty)
    }

    // -------------------------------------------------------------------------
    // Reading and writing

    /// Reads a `T`.
    pub fn read<'de, T, D>(&self, deserializer: D) -> Result<T, BindError>
    where
        T: Typed + FromValue,
        D: Deserializer<'de>,
    {
        let ty = self.resolve_type::<T>()?;
        let value = self.read_value(&ty, deserializer)?;
        Ok(T::from_value(value)?)
    }

    /// Reads a value of type `ty`; objects come back owned.
    #[inline]
    pub fn read_value<'de, D: Deserializer<'de>>(
        &self,
        ty: &ResolvedType,
        deserializer: D,
    ) -> Result<Value<'static>, BindError> {
        self.session().read_value(ty, deserializer)
    }

    /// Writes `value`.
    pub fn write<T, S>(&self, value: &T, serializer: S) -> Result<S::Ok, BindError>
    where
        T: ToValue + ?Sized,
        S: Serializer,
    {
        self.to_serialize(value.to_value())?
            .serialize(serializer)
            .map_err(|e| BindError::Format(e.to_string()))
    }

    /// Renders `value` into plain data ready to be serialized.
    #[inline]
    pub fn to_serialize<'v>(&self, value: Value<'v>) -> Result<Rendered<'v>, BindError> {
        self.session().render(value, None).map(Rendered::new)
    }
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("features", &self.0.features)
            .field("visibility", &self.0.visibility)
            .field("pipeline", &self.0.pipeline)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// BlueprintBuilder

/// Builds a [`Blueprint`].
pub struct BlueprintBuilder {
    resolver: Arc<TypeResolver>,
    features: Features,
    visibility: VisibilityConfig,
    pipeline: Pipeline,
    capacity: usize,
}

impl BlueprintBuilder {
    fn new(resolver: Arc<TypeResolver>) -> Self {
        Self {
            resolver,
            features: Features::default(),
            visibility: VisibilityConfig::default(),
            pipeline: Pipeline::default(),
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// Replaces the features.
    #[inline]
    pub fn features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    #[inline]
    pub fn visibility(mut self, visibility: VisibilityConfig) -> Self {
        self.visibility = visibility;
        self
    }

    /// Registers an extension; later extensions see what earlier ones added.
    pub fn extension(mut self, extension: impl Extension) -> Self {
        extension.register(&mut ExtensionContext::new(&mut self.pipeline));
        self
    }

    /// Bounds each of the blueprint's caches.
    #[inline]
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn build(self) -> Blueprint {
        Blueprint(Arc::new(BlueprintInner {
            resolver: self.resolver,
            features: self.features,
            visibility: self.visibility,
            pipeline: self.pipeline,
            capacity: self.capacity,
            caches: Caches::new(self.capacity),
        }))
    }
}
