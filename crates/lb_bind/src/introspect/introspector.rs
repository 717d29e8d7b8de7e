use alloc::borrow::Cow;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use super::{
    Accessor, AccessorFlags, AccessorKind, Direction, ExplicitName, MetadataSource,
    ObjectDefinition, Property, VisibilityConfig, accessor_name,
};
use crate::class::{
    ClassDescriptor, ClassRegistry, Getter, Member, MethodInfo, MethodKind, Modifiers,
    ProjectedGetter, ProjectedSetter, Setter, Upcast, Visibility,
};
use crate::types::DeclaredType;

// -----------------------------------------------------------------------------
// IntrospectConfig

/// The settings an [`Introspector`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntrospectConfig {
    pub visibility: VisibilityConfig,
    /// Fields can become properties without explicit metadata.
    pub use_fields: bool,
    /// `bool` getters named `isName` can become properties without explicit
    /// metadata.
    pub use_is_getters: bool,
    /// Class-scoped members are candidates too.
    pub include_static: bool,
    pub case_insensitive: bool,
}

impl Default for IntrospectConfig {
    fn default() -> Self {
        Self {
            visibility: VisibilityConfig::default(),
            use_fields: true,
            use_is_getters: true,
            include_static: false,
            case_insensitive: false,
        }
    }
}

// -----------------------------------------------------------------------------
// Candidates

type Handles = (DeclaredType, Option<Arc<dyn Getter>>, Option<Arc<dyn Setter>>);

/// A member that may contribute to a property.
struct Candidate<'c> {
    kind: AccessorKind,
    implicit: Cow<'c, str>,
    class: &'c ClassDescriptor,
    member: Member<'c>,
    visibility: Visibility,
    modifiers: Modifiers,
    handles: Handles,
    view: Option<&'c Arc<dyn Upcast>>,
}

fn method_handles(method: &MethodInfo) -> Option<Handles> {
    match method.kind() {
        MethodKind::Getter { returns, access } => Some((returns.clone(), Some(access.clone()), None)),
        MethodKind::Setter { param, access } => Some((param.clone(), None, Some(access.clone()))),
        MethodKind::Other { .. } => None,
    }
}

/// Accessors sharing one implicit name.
struct Group {
    implicit: String,
    rename: Option<Cow<'static, str>>,
    accessors: Vec<Accessor>,
    aliases: Vec<Cow<'static, str>>,
}

fn place(property: &mut Property, accessor: Accessor) {
    let [field, getter, setter] = property.slots_mut();
    match accessor.kind() {
        AccessorKind::Field => {
            if field.is_none() {
                *field = Some(accessor);
            }
        }
        AccessorKind::Getter => {
            if getter.as_ref().is_none_or(|g| g.kind() == AccessorKind::IsGetter) {
                *getter = Some(accessor);
            }
        }
        AccessorKind::IsGetter => {
            if getter.is_none() {
                *getter = Some(accessor);
            }
        }
        AccessorKind::Setter => {
            if setter.is_none() {
                *setter = Some(accessor);
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Introspector

/// Builds [`ObjectDefinition`]s.
///
/// For each class in the ancestor chain, base first, fields and accessor
/// methods become candidates. A subclass member replaces an inherited one of
/// the same name and accessor kind. Candidates are then resolved in this
/// order:
///
/// 1. ignore metadata flags the accessor; a property whose accessors are all
///    ignored, or whose name the class ignores, is dropped and its name
///    recorded as ignorable;
/// 2. a rename renames the whole property and makes the accessor visible;
/// 3. an include makes the accessor visible under its implicit name;
/// 4. otherwise the [`VisibilityConfig`] threshold of the accessor kind
///    decides;
/// 5. transient fields are dropped unless renamed or included;
/// 6. class-scoped members are only candidates with
///    [`IntrospectConfig::include_static`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use lb_bind::class::{ClassDescriptor, ClassRegistry, Ignore};
/// use lb_bind::introspect::{
///     DeclaredMarkers, Direction, IntrospectConfig, Introspector, NoMetadata,
/// };
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let class = Arc::new(
///     ClassDescriptor::builder::<Point>("Point")
///         .field("x", |p| &p.x, |p| &mut p.x)
///         .marker(Ignore)
///         .field("y", |p| &p.y, |p| &mut p.y)
///         .build(),
/// );
/// let registry = ClassRegistry::new();
/// let introspector = Introspector::new(&registry, IntrospectConfig::default());
///
/// let def = introspector.introspect(&class, Direction::Write, &DeclaredMarkers);
/// assert_eq!(def.names().collect::<Vec<_>>(), ["y"]);
///
/// let def = introspector.introspect(&class, Direction::Write, &NoMetadata);
/// assert_eq!(def.names().collect::<Vec<_>>(), ["x", "y"]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Introspector<'a> {
    registry: &'a ClassRegistry,
    config: IntrospectConfig,
}

impl<'a> Introspector<'a> {
    #[inline]
    pub fn new(registry: &'a ClassRegistry, config: IntrospectConfig) -> Self {
        Self { registry, config }
    }

    #[inline]
    pub fn config(&self) -> &IntrospectConfig {
        &self.config
    }

    #[inline]
    pub fn registry(&self) -> &'a ClassRegistry {
        self.registry
    }

    /// Builds the definition of `class` for `direction`.
    pub fn introspect(
        &self,
        class: &Arc<ClassDescriptor>,
        direction: Direction,
        metadata: &dyn MetadataSource,
    ) -> ObjectDefinition {
        let def = if class.is_enum() {
            self.enumeration(class, direction, metadata)
        } else {
            self.object(class, direction, metadata)
        };
        if self.config.case_insensitive {
            def.case_insensitive()
        } else {
            def
        }
    }

    fn object(
        &self,
        class: &Arc<ClassDescriptor>,
        direction: Direction,
        metadata: &dyn MetadataSource,
    ) -> ObjectDefinition {
        let lineage = self.registry.lineage(class);
        let candidates = self.candidates(&lineage);

        let mut groups: Vec<Group> = Vec::new();
        for candidate in &candidates {
            let Some(accessor) = self.accessor(candidate, metadata) else {
                continue;
            };
            let position = match groups.iter().position(|g| g.implicit == candidate.implicit) {
                Some(position) => position,
                None => {
                    groups.push(Group {
                        implicit: candidate.implicit.clone().into_owned(),
                        rename: None,
                        accessors: Vec::new(),
                        aliases: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[position];
            if group.rename.is_none()
                && !accessor.flags().contains(AccessorFlags::IGNORED)
                && let Some(ExplicitName::Rename(name)) =
                    metadata.explicit_name(candidate.class, candidate.member)
                && !name.is_empty()
            {
                group.rename = Some(name);
            }
            group.aliases.extend(metadata.aliases(candidate.class, candidate.member));
            group.accessors.push(accessor);
        }

        let mut merged: Vec<Property> = Vec::new();
        for group in groups {
            let name = group.rename.unwrap_or(Cow::Owned(group.implicit));
            let position = match merged.iter().position(|p| p.name() == name) {
                Some(position) => position,
                None => {
                    merged.push(Property::new(name));
                    merged.len() - 1
                }
            };
            let property = &mut merged[position];
            for accessor in group.accessors {
                place(property, accessor);
            }
            property.aliases_mut().extend(group.aliases);
        }

        let ignored_names: Vec<Cow<'static, str>> = lineage
            .iter()
            .flat_map(|(desc, _)| metadata.ignored_names(desc))
            .collect();
        let mut ignorable = ignored_names.clone();
        let mut properties = Vec::with_capacity(merged.len());
        for mut property in merged {
            let all_ignored = property
                .slots_mut()
                .into_iter()
                .flatten()
                .all(|a| a.flags().contains(AccessorFlags::IGNORED));
            if all_ignored || ignored_names.iter().any(|n| n == property.name()) {
                log::debug!("`{}.{}` is ignored", class.name(), property.name());
                ignorable.push(property.name_cow().clone());
                continue;
            }
            for slot in property.slots_mut() {
                if slot.as_ref().is_some_and(|a| {
                    a.flags().contains(AccessorFlags::IGNORED)
                        || !a.flags().contains(AccessorFlags::VISIBLE)
                }) {
                    *slot = None;
                }
            }
            if property.accessor(direction).is_none() {
                log::trace!(
                    "`{}.{}` has no accessor for {:?}",
                    class.name(),
                    property.name(),
                    direction,
                );
                continue;
            }
            properties.push(property);
        }

        let def = ObjectDefinition::new(class.clone(), direction, properties).with_ignorable(ignorable);
        match lineage.iter().rev().find_map(|(desc, _)| metadata.property_order(desc)) {
            Some(order) => def.reordered(&order),
            None => def,
        }
    }

    fn candidates<'c>(
        &self,
        lineage: &'c [(Arc<ClassDescriptor>, Option<Arc<dyn Upcast>>)],
    ) -> Vec<Candidate<'c>> {
        let mut out: Vec<Candidate<'c>> = Vec::new();
        let mut push = |candidate: Candidate<'c>| {
            match out
                .iter_mut()
                .find(|c| c.kind == candidate.kind && c.implicit == candidate.implicit)
            {
                Some(inherited) => *inherited = candidate,
                None => out.push(candidate),
            }
        };

        for (desc, view) in lineage {
            for field in desc.fields() {
                if field.constant().is_some() || !self.admits(field.modifiers()) {
                    continue;
                }
                push(Candidate {
                    kind: AccessorKind::Field,
                    implicit: Cow::Borrowed(field.name()),
                    class: desc,
                    member: Member::Field(field.as_ref()),
                    visibility: field.visibility(),
                    modifiers: field.modifiers(),
                    handles: (
                        field.declared_type().clone(),
                        field.getter().cloned(),
                        field.setter().cloned(),
                    ),
                    view: view.as_ref(),
                });
            }
            for method in desc.methods() {
                if !self.admits(method.modifiers()) {
                    continue;
                }
                let Some((kind, implicit)) = accessor_name(method.name(), method.kind()) else {
                    continue;
                };
                let Some(handles) = method_handles(method) else {
                    continue;
                };
                push(Candidate {
                    kind,
                    implicit,
                    class: desc,
                    member: Member::Method(method.as_ref()),
                    visibility: method.visibility(),
                    modifiers: method.modifiers(),
                    handles,
                    view: view.as_ref(),
                });
            }
        }
        out
    }

    #[inline]
    fn admits(&self, modifiers: Modifiers) -> bool {
        self.config.include_static || !modifiers.contains(Modifiers::STATIC)
    }

    fn implicitly_visible(&self, kind: AccessorKind, visibility: Visibility) -> bool {
        let enabled = match kind {
            AccessorKind::Field => self.config.use_fields,
            AccessorKind::IsGetter => self.config.use_is_getters,
            AccessorKind::Getter | AccessorKind::Setter => true,
        };
        enabled && self.config.visibility.threshold(kind).allows(visibility)
    }

    /// The accessor for `candidate`, or `None` for a dropped transient field.
    fn accessor(&self, candidate: &Candidate<'_>, metadata: &dyn MetadataSource) -> Option<Accessor> {
        let mut flags = match metadata.explicit_name(candidate.class, candidate.member) {
            Some(ExplicitName::Rename(name)) if !name.is_empty() => {
                AccessorFlags::EXPLICIT | AccessorFlags::NAME_EXPLICIT | AccessorFlags::VISIBLE
            }
            Some(_) => AccessorFlags::EXPLICIT | AccessorFlags::VISIBLE,
            None if self.implicitly_visible(candidate.kind, candidate.visibility) => {
                AccessorFlags::VISIBLE
            }
            None => AccessorFlags::empty(),
        };
        if metadata.is_ignored(candidate.class, candidate.member) {
            flags |= AccessorFlags::IGNORED;
        }
        if candidate.modifiers.contains(Modifiers::TRANSIENT)
            && !flags.contains(AccessorFlags::EXPLICIT)
        {
            return None;
        }

        let (declared, getter, setter) = candidate.handles.clone();
        let (getter, setter) = match candidate.view {
            Some(view) => (
                getter.map(|inner| -> Arc<dyn Getter> {
                    Arc::new(ProjectedGetter {
                        view: view.clone(),
                        inner,
                    })
                }),
                setter.map(|inner| -> Arc<dyn Setter> {
                    Arc::new(ProjectedSetter {
                        view: view.clone(),
                        inner,
                    })
                }),
            ),
            None => (getter, setter),
        };

        let mut accessor = Accessor::new(
            candidate.kind,
            candidate.class.name_cow().clone(),
            String::from(candidate.member.name()),
            declared,
        )
        .with_flags(flags);
        if let Some(getter) = getter {
            accessor = accessor.with_getter(getter);
        }
        if let Some(setter) = setter {
            accessor = accessor.with_setter(setter);
        }
        Some(accessor)
    }

    fn enumeration(
        &self,
        class: &Arc<ClassDescriptor>,
        direction: Direction,
        metadata: &dyn MetadataSource,
    ) -> ObjectDefinition {
        let mut properties = Vec::new();
        let mut ignorable = Vec::new();
        for field in class.fields() {
            let Some(ordinal) = field.constant() else {
                continue;
            };
            let member = Member::Field(field.as_ref());
            let name = match metadata.explicit_name(class, member) {
                Some(ExplicitName::Rename(name)) if !name.is_empty() => name,
                _ => Cow::Owned(String::from(field.name())),
            };
            if metadata.is_ignored(class, member) {
                ignorable.push(name);
                continue;
            }
            let mut property = Property::enum_constant(name, ordinal);
            for alias in metadata.aliases(class, member) {
                property = property.with_alias(alias);
            }
            properties.push(property);
        }
        ObjectDefinition::new(class.clone(), direction, properties).with_ignorable(ignorable)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use core::any::Any;

    use super::{IntrospectConfig, Introspector};
    use crate::class::{
        Alias, ClassDescriptor, ClassRegistry, Ignore, IgnoreProperties, Include, PropertyOrder,
        Rename,
    };
    use crate::introspect::{
        AccessorFlags, AccessorKind, DeclaredMarkers, Direction, MarkerOverrides, NoMetadata,
        ObjectDefinition, VisibilityConfig, VisibilityThreshold,
    };
    use crate::types::DeclaredType;
    use crate::value::Value;

    fn names(def: &ObjectDefinition) -> Vec<&str> {
        def.names().collect()
    }

    #[derive(Default)]
    struct Point {
        x: i32,
        y: i32,
    }

    fn point() -> Arc<ClassDescriptor> {
        Arc::new(
            ClassDescriptor::builder::<Point>("Point")
                .constructor(Point::default)
                .field("x", |p| &p.x, |p| &mut p.x)
                .marker(Ignore)
                .field("y", |p| &p.y, |p| &mut p.y)
                .build(),
        )
    }

    #[test]
    fn ignored_field_is_dropped_only_with_metadata() {
        let registry = ClassRegistry::new();
        let introspector = Introspector::new(&registry, IntrospectConfig::default());
        let class = point();

        let def = introspector.introspect(&class, Direction::Write, &DeclaredMarkers);
        assert_eq!(names(&def), ["y"]);
        assert!(def.is_ignorable("x"));

        let value = Point { x: 1, y: 2 };
        let y = def.find("y").unwrap().get(&value as &dyn Any).unwrap();
        assert_eq!(y, Value::I32(2));

        let def = introspector.introspect(&class, Direction::Read, &NoMetadata);
        assert_eq!(names(&def), ["x", "y"]);
        assert!(def.constructors().has_default());
    }

    #[test]
    fn rename_applies_only_with_metadata() {
        struct Holder {
            a: i32,
        }
        let class = Arc::new(
            ClassDescriptor::builder::<Holder>("Holder")
                .field("a", |h| &h.a, |h| &mut h.a)
                .marker(Rename::to("b"))
                .build(),
        );
        let registry = ClassRegistry::new();
        let introspector = Introspector::new(&registry, IntrospectConfig::default());

        let def = introspector.introspect(&class, Direction::Write, &DeclaredMarkers);
        assert_eq!(names(&def), ["b"]);
        let flags = def.find("b").unwrap().field().unwrap().flags();
        assert!(flags.contains(AccessorFlags::EXPLICIT | AccessorFlags::NAME_EXPLICIT));

        let def = introspector.introspect(&class, Direction::Write, &NoMetadata);
        assert_eq!(names(&def), ["a"]);
    }

    struct Account {
        name: String,
        url: String,
        active: bool,
    }

    fn account() -> Arc<ClassDescriptor> {
        Arc::new(
            ClassDescriptor::builder::<Account>("Account")
                .getter("getName", |a: &Account| a.name.clone())
                .setter("setName", |a: &mut Account, name: String| a.name = name)
                .getter("getURL", |a: &Account| a.url.clone())
                .getter("isActive", |a: &Account| a.active)
                .method("reset", 0)
                .build(),
        )
    }

    #[test]
    fn accessors_merge_by_canonical_name() {
        let registry = ClassRegistry::new();
        let introspector = Introspector::new(&registry, IntrospectConfig::default());
        let class = account();

        let def = introspector.introspect(&class, Direction::Write, &NoMetadata);
        assert_eq!(names(&def), ["name", "URL", "active"]);
        let name = def.find("name").unwrap();
        assert_eq!(name.getter().unwrap().kind(), AccessorKind::Getter);
        assert_eq!(name.setter().unwrap().kind(), AccessorKind::Setter);

        let def = introspector.introspect(&class, Direction::Read, &NoMetadata);
        assert_eq!(names(&def), ["name"]);

        let mut value = Account {
            name: String::new(),
            url: String::new(),
            active: false,
        };
        def.find("name")
            .unwrap()
            .set(&mut value as &mut dyn Any, Value::text("ada"))
            .unwrap();
        assert_eq!(value.name, "ada");
    }

    #[test]
    fn is_getters_can_be_disabled() {
        let registry = ClassRegistry::new();
        let config = IntrospectConfig {
            use_is_getters: false,
            ..IntrospectConfig::default()
        };
        let def = Introspector::new(&registry, config).introspect(&account(), Direction::Write, &NoMetadata);
        assert_eq!(names(&def), ["name", "URL"]);
    }

    struct Secretive {
        hidden: i32,
        shown: i32,
        cache: i32,
    }

    fn secretive() -> Arc<ClassDescriptor> {
        Arc::new(
            ClassDescriptor::builder::<Secretive>("Secretive")
                .field("hidden", |s| &s.hidden, |s| &mut s.hidden)
                .private()
                .field("shown", |s| &s.shown, |s| &mut s.shown)
                .private()
                .marker(Include)
                .field("cache", |s| &s.cache, |s| &mut s.cache)
                .transient()
                .static_field("VERSION", || 3u32)
                .build(),
        )
    }

    #[test]
    fn visibility_thresholds() {
        let registry = ClassRegistry::new();
        let class = secretive();

        let def = Introspector::new(&registry, IntrospectConfig::default())
            .introspect(&class, Direction::Write, &DeclaredMarkers);
        assert_eq!(names(&def), ["shown"]);

        let config = IntrospectConfig {
            visibility: VisibilityConfig::default().with_fields(VisibilityThreshold::Any),
            ..IntrospectConfig::default()
        };
        let def = Introspector::new(&registry, config).introspect(&class, Direction::Write, &NoMetadata);
        assert_eq!(names(&def), ["hidden", "shown"]);

        let config = IntrospectConfig {
            visibility: VisibilityConfig::all(VisibilityThreshold::None),
            ..IntrospectConfig::default()
        };
        let def = Introspector::new(&registry, config).introspect(&class, Direction::Write, &DeclaredMarkers);
        assert_eq!(names(&def), ["shown"]);
    }

    #[test]
    fn transient_and_static_members() {
        let registry = ClassRegistry::new();
        let class = secretive();
        let overrides = MarkerOverrides::new().member("Secretive", "cache", Include);

        let def = Introspector::new(&registry, IntrospectConfig::default())
            .introspect(&class, Direction::Write, &overrides);
        assert_eq!(names(&def), ["shown", "cache"]);

        let config = IntrospectConfig {
            include_static: true,
            ..IntrospectConfig::default()
        };
        let def = Introspector::new(&registry, config).introspect(&class, Direction::Write, &NoMetadata);
        assert_eq!(names(&def), ["VERSION"]);
        // Static fields have nothing to write into.
        let def = Introspector::new(&registry, config).introspect(&class, Direction::Read, &NoMetadata);
        assert!(def.is_empty());
    }

    #[derive(Default)]
    struct Base {
        id: u32,
        secret: i32,
    }

    #[derive(Default)]
    struct Derived {
        base: Base,
        name: String,
        secret: i32,
    }

    fn hierarchy() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::builder::<Base>("Base")
                .field("id", |b| &b.id, |b| &mut b.id)
                .field("secret", |b| &b.secret, |b| &mut b.secret)
                .marker(Ignore)
                .build(),
        );
        registry.register(
            ClassDescriptor::builder::<Derived>("Derived")
                .extends_with(DeclaredType::class("Base"), |d| &d.base, |d| &mut d.base)
                .field("name", |d| &d.name, |d| &mut d.name)
                .field("secret", |d| &d.secret, |d| &mut d.secret)
                .build(),
        );
        registry
    }

    #[test]
    fn inherited_properties_come_first_and_are_projected() {
        let registry = hierarchy();
        let introspector = Introspector::new(&registry, IntrospectConfig::default());
        let base = registry.get("Base").unwrap().clone();
        let derived = registry.get("Derived").unwrap().clone();

        let def = introspector.introspect(&base, Direction::Write, &DeclaredMarkers);
        assert_eq!(names(&def), ["id"]);

        // The redeclared field replaces the ignored inherited one.
        let def = introspector.introspect(&derived, Direction::Write, &DeclaredMarkers);
        assert_eq!(names(&def), ["id", "secret", "name"]);
        assert_eq!(def.find("secret").unwrap().declaring_class(Direction::Write), Some("Derived"));

        let mut value = Derived::default();
        value.base.id = 7;
        value.secret = 3;
        let id = def.find("id").unwrap().get(&value as &dyn Any).unwrap();
        assert_eq!(id, Value::U32(7));
        let secret = def.find("secret").unwrap().get(&value as &dyn Any).unwrap();
        assert_eq!(secret, Value::I32(3));

        let read = introspector.introspect(&derived, Direction::Read, &DeclaredMarkers);
        read.find("id")
            .unwrap()
            .set(&mut value as &mut dyn Any, Value::U32(9))
            .unwrap();
        assert_eq!(value.base.id, 9);
    }

    struct Record {
        a: i32,
        b: i32,
        c: i32,
        d: i32,
    }

    fn record(markers: impl FnOnce(crate::class::ClassBuilder<Record>) -> crate::class::ClassBuilder<Record>) -> Arc<ClassDescriptor> {
        let builder = ClassDescriptor::builder::<Record>("Record")
            .field("d", |r| &r.d, |r| &mut r.d)
            .field("b", |r| &r.b, |r| &mut r.b)
            .field("c", |r| &r.c, |r| &mut r.c)
            .field("a", |r| &r.a, |r| &mut r.a);
        Arc::new(markers(builder).build())
    }

    #[test]
    fn ordering() {
        let registry = ClassRegistry::new();
        let introspector = Introspector::new(&registry, IntrospectConfig::default());

        let def = introspector.introspect(&record(|b| b), Direction::Write, &DeclaredMarkers);
        assert_eq!(names(&def), ["d", "b", "c", "a"]);

        let class = record(|b| b.class_marker(PropertyOrder::of(["c"])));
        let def = introspector.introspect(&class, Direction::Write, &DeclaredMarkers);
        assert_eq!(names(&def), ["c", "a", "b", "d"]);

        let class = record(|b| b.class_marker(IgnoreProperties::of(["b", "d"])));
        let def = introspector.introspect(&class, Direction::Read, &DeclaredMarkers);
        assert_eq!(names(&def), ["c", "a"]);
        assert!(def.is_ignorable("d"));
    }

    #[test]
    fn partially_ignored_property_keeps_other_accessors() {
        struct Mixed {
            x: i32,
        }
        let class = Arc::new(
            ClassDescriptor::builder::<Mixed>("Mixed")
                .field("x", |m| &m.x, |m| &mut m.x)
                .marker(Ignore)
                .getter("getX", |m: &Mixed| m.x * 10)
                .build(),
        );
        let registry = ClassRegistry::new();
        let introspector = Introspector::new(&registry, IntrospectConfig::default());

        let def = introspector.introspect(&class, Direction::Write, &DeclaredMarkers);
        let x = def.find("x").unwrap();
        assert!(x.field().is_none());
        assert_eq!(x.get(&Mixed { x: 2 } as &dyn Any).unwrap(), Value::I32(20));

        let def = introspector.introspect(&class, Direction::Read, &DeclaredMarkers);
        assert!(def.is_empty());
        assert!(!def.is_ignorable("x"));
    }

    #[test]
    fn aliases_are_accepted_when_reading() {
        struct Named {
            name: String,
        }
        let class = Arc::new(
            ClassDescriptor::builder::<Named>("Named")
                .field("name", |n| &n.name, |n| &mut n.name)
                .marker(Alias::of(["title", "label"]))
                .build(),
        );
        let registry = ClassRegistry::new();
        let introspector = Introspector::new(&registry, IntrospectConfig::default());
        let def = introspector.introspect(&class, Direction::Read, &DeclaredMarkers);
        assert_eq!(def.find("label").unwrap().name(), "name");
        assert!(def.is_known_property("title"));
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Color {
        Red,
        Green,
        Blue,
    }

    #[test]
    fn enumeration_constants() {
        let class = Arc::new(
            ClassDescriptor::enumeration::<Color>(
                "Color",
                |c| *c as usize,
                |i| [Color::Red, Color::Green, Color::Blue].get(i).copied(),
            )
            .constant("Red")
            .constant("Green")
            .marker(Rename::to("verde"))
            .constant("Blue")
            .marker(Ignore)
            .build(),
        );
        let registry = ClassRegistry::new();
        let introspector = Introspector::new(&registry, IntrospectConfig::default());

        let def = introspector.introspect(&class, Direction::Read, &DeclaredMarkers);
        assert_eq!(names(&def), ["Red", "verde"]);
        assert_eq!(def.constant(1).unwrap().name(), "verde");
        assert!(def.is_ignorable("Blue"));

        let def = introspector.introspect(&class, Direction::Read, &NoMetadata);
        assert_eq!(names(&def), ["Red", "Green", "Blue"]);
    }
}
