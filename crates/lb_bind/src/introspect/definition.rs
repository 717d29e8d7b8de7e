use alloc::borrow::Cow;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use bitflags::bitflags;
use lb_utils::hash::{HashMap, HashSet};

use crate::class::{ClassDescriptor, Constructors, Getter, Setter};
use crate::error::AccessError;
use crate::types::DeclaredType;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Direction

/// Which way values flow through a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From the data format into objects: setters and fields.
    Read,
    /// From objects into the data format: getters and fields.
    Write,
}

// -----------------------------------------------------------------------------
// Accessor

/// The role a member plays in a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    Field,
    Getter,
    /// A `bool` getter named `isName`.
    IsGetter,
    Setter,
}

bitflags! {
    /// How an accessor came to be part of its property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessorFlags: u8 {
        /// Named or included by explicit metadata.
        const EXPLICIT = 1;
        /// Renamed by explicit metadata.
        const NAME_EXPLICIT = 1 << 1;
        /// Excluded by explicit metadata.
        const IGNORED = 1 << 2;
        const VISIBLE = 1 << 3;
    }
}

/// One member contributing to a [`Property`].
///
/// Inherited accessors already project the object onto the declaring class,
/// so [`Accessor::get`] and [`Accessor::set`] take the introspected object.
#[derive(Clone)]
pub struct Accessor {
    kind: AccessorKind,
    member: Cow<'static, str>,
    class: Cow<'static, str>,
    declared: DeclaredType,
    flags: AccessorFlags,
    getter: Option<Arc<dyn Getter>>,
    setter: Option<Arc<dyn Setter>>,
}

impl Accessor {
    /// An accessor of `kind` for the member `member` declared by `class`.
    pub fn new(
        kind: AccessorKind,
        class: impl Into<Cow<'static, str>>,
        member: impl Into<Cow<'static, str>>,
        declared: DeclaredType,
    ) -> Self {
        Self {
            kind,
            member: member.into(),
            class: class.into(),
            declared,
            flags: AccessorFlags::VISIBLE,
            getter: None,
            setter: None,
        }
    }

    #[inline]
    pub fn with_getter(mut self, getter: Arc<dyn Getter>) -> Self {
        self.getter = Some(getter);
        self
    }

    #[inline]
    pub fn with_setter(mut self, setter: Arc<dyn Setter>) -> Self {
        self.setter = Some(setter);
        self
    }

    #[inline]
    pub fn with_flags(mut self, flags: AccessorFlags) -> Self {
        self.flags = flags;
        self
    }

    #[inline]
    pub fn kind(&self) -> AccessorKind {
        self.kind
    }

    /// The member name as declared.
    #[inline]
    pub fn member(&self) -> &str {
        &self.member
    }

    #[inline]
    pub fn declaring_class(&self) -> &str {
        &self.class
    }

    #[inline]
    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared
    }

    #[inline]
    pub fn flags(&self) -> AccessorFlags {
        self.flags
    }

    #[inline]
    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    pub fn get<'a>(&self, target: &'a dyn Any) -> Result<Value<'a>, AccessError> {
        match &self.getter {
            Some(getter) => getter.get(target),
            None => Err(AccessError::NoAccessor("read")),
        }
    }

    pub fn set(&self, target: &mut dyn Any, value: Value<'static>) -> Result<(), AccessError> {
        match &self.setter {
            Some(setter) => setter.set(target, value),
            None => Err(AccessError::NoAccessor("write")),
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("kind", &self.kind)
            .field("member", &self.member)
            .field("class", &self.class)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Property

/// A named property merged from up to one field, one getter and one setter.
///
/// Enumeration definitions hold one property per constant instead, with no
/// accessors.
#[derive(Debug, Clone)]
pub struct Property {
    name: Cow<'static, str>,
    field: Option<Accessor>,
    getter: Option<Accessor>,
    setter: Option<Accessor>,
    aliases: Vec<Cow<'static, str>>,
    ordinal: Option<usize>,
}

impl Property {
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            field: None,
            getter: None,
            setter: None,
            aliases: Vec::new(),
            ordinal: None,
        }
    }

    /// The property naming an enumeration constant.
    #[inline]
    pub fn enum_constant(name: impl Into<Cow<'static, str>>, ordinal: usize) -> Self {
        Self {
            ordinal: Some(ordinal),
            ..Self::new(name)
        }
    }

    #[inline]
    pub fn with_field(mut self, field: Accessor) -> Self {
        self.field = Some(field);
        self
    }

    #[inline]
    pub fn with_getter(mut self, getter: Accessor) -> Self {
        self.getter = Some(getter);
        self
    }

    #[inline]
    pub fn with_setter(mut self, setter: Accessor) -> Self {
        self.setter = Some(setter);
        self
    }

    #[inline]
    pub fn with_alias(mut self, alias: impl Into<Cow<'static, str>>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    #[inline]
    pub fn renamed(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn name_cow(&self) -> &Cow<'static, str> {
        &self.name
    }

    #[inline]
    pub fn field(&self) -> Option<&Accessor> {
        self.field.as_ref()
    }

    #[inline]
    pub fn getter(&self) -> Option<&Accessor> {
        self.getter.as_ref()
    }

    #[inline]
    pub fn setter(&self) -> Option<&Accessor> {
        self.setter.as_ref()
    }

    #[inline]
    pub fn aliases(&self) -> &[Cow<'static, str>] {
        &self.aliases
    }

    /// The ordinal of the enumeration constant this property names.
    #[inline]
    pub fn ordinal(&self) -> Option<usize> {
        self.ordinal
    }

    pub(crate) fn slots_mut(&mut self) -> [&mut Option<Accessor>; 3] {
        [&mut self.field, &mut self.getter, &mut self.setter]
    }

    pub(crate) fn aliases_mut(&mut self) -> &mut Vec<Cow<'static, str>> {
        &mut self.aliases
    }

    /// The accessor used for `direction`: a getter or readable field when
    /// writing, a setter or writable field when reading.
    pub fn accessor(&self, direction: Direction) -> Option<&Accessor> {
        match direction {
            Direction::Write => self
                .getter
                .as_ref()
                .filter(|a| a.is_readable())
                .or(self.field.as_ref().filter(|a| a.is_readable())),
            Direction::Read => self
                .setter
                .as_ref()
                .filter(|a| a.is_writable())
                .or(self.field.as_ref().filter(|a| a.is_writable())),
        }
    }

    /// The declared type of the value flowing in `direction`.
    #[inline]
    pub fn declared_type(&self, direction: Direction) -> Option<&DeclaredType> {
        self.accessor(direction).map(Accessor::declared_type)
    }

    #[inline]
    pub fn declaring_class(&self, direction: Direction) -> Option<&str> {
        self.accessor(direction).map(Accessor::declaring_class)
    }

    /// Reads the property from `target`.
    pub fn get<'a>(&self, target: &'a dyn Any) -> Result<Value<'a>, AccessError> {
        self.accessor(Direction::Write)
            .ok_or(AccessError::NoAccessor("read"))?
            .get(target)
    }

    /// Writes `value` into `target`.
    pub fn set(&self, target: &mut dyn Any, value: Value<'static>) -> Result<(), AccessError> {
        self.accessor(Direction::Read)
            .ok_or(AccessError::NoAccessor("write"))?
            .set(target, value)
    }
}

// -----------------------------------------------------------------------------
// ObjectDefinition

/// The ordered properties used to read or write one class.
///
/// Property names are unique. For [`Direction::Read`] the definition also
/// carries the constructors used for scalar inputs, the names accepted as
/// aliases and the names skipped without error.
#[derive(Clone)]
pub struct ObjectDefinition {
    class: Arc<ClassDescriptor>,
    direction: Direction,
    properties: Vec<Property>,
    index: HashMap<Cow<'static, str>, usize>,
    folded: Option<HashMap<String, usize>>,
    ignorable: HashSet<Cow<'static, str>>,
    constructors: Constructors,
}

impl ObjectDefinition {
    /// Builds a definition from `properties`.
    ///
    /// A later property with the name of an earlier one replaces it. The
    /// read direction picks up the constructors of `class`.
    pub fn new(class: Arc<ClassDescriptor>, direction: Direction, properties: Vec<Property>) -> Self {
        let mut unique: Vec<Property> = Vec::with_capacity(properties.len());
        for property in properties {
            match unique.iter_mut().find(|p| p.name == property.name) {
                Some(slot) => *slot = property,
                None => unique.push(property),
            }
        }
        let constructors = match direction {
            Direction::Read => class.constructors().clone(),
            Direction::Write => Constructors::none(),
        };
        let mut def = Self {
            class,
            direction,
            properties: unique,
            index: HashMap::default(),
            folded: None,
            ignorable: HashSet::default(),
            constructors,
        };
        def.reindex();
        def
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (position, property) in self.properties.iter().enumerate() {
            self.index.insert(property.name.clone(), position);
        }
        if self.direction == Direction::Read {
            for (position, property) in self.properties.iter().enumerate() {
                for alias in &property.aliases {
                    self.index.entry(alias.clone()).or_insert(position);
                }
            }
        }
        // Names before aliases, in declaration order.
        if let Some(folded) = &mut self.folded {
            folded.clear();
            for (position, property) in self.properties.iter().enumerate() {
                folded.entry(property.name.to_lowercase()).or_insert(position);
            }
            if self.direction == Direction::Read {
                for (position, property) in self.properties.iter().enumerate() {
                    for alias in &property.aliases {
                        folded.entry(alias.to_lowercase()).or_insert(position);
                    }
                }
            }
        }
    }

    /// Also matches names case-insensitively in [`ObjectDefinition::find`].
    pub fn case_insensitive(mut self) -> Self {
        if self.folded.is_none() {
            self.folded = Some(HashMap::default());
            self.reindex();
        }
        self
    }

    /// Adds names to skip silently when reading.
    pub fn with_ignorable<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        self.ignorable.extend(names.into_iter().map(Into::into));
        self
    }

    /// Removes the property called `name`.
    pub fn without_property(mut self, name: &str) -> Self {
        self.properties.retain(|p| p.name != name);
        self.reindex();
        self
    }

    /// Moves the listed names first, in list order, followed by the other
    /// properties sorted by name.
    pub fn reordered<S: AsRef<str>>(mut self, order: &[S]) -> Self {
        let mut rest = core::mem::take(&mut self.properties);
        let mut sorted = Vec::with_capacity(rest.len());
        for name in order {
            if let Some(position) = rest.iter().position(|p| p.name == name.as_ref()) {
                sorted.push(rest.remove(position));
            }
        }
        rest.sort_by(|a, b| a.name.cmp(&b.name));
        sorted.append(&mut rest);
        self.properties = sorted;
        self.reindex();
        self
    }

    /// Replaces the constructors used for scalar inputs.
    #[inline]
    pub fn with_constructors(mut self, constructors: Constructors) -> Self {
        self.constructors = constructors;
        self
    }

    #[inline]
    pub fn class(&self) -> &Arc<ClassDescriptor> {
        &self.class
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Property names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(Property::name)
    }

    /// Finds a property by name or alias.
    pub fn find(&self, name: &str) -> Option<&Property> {
        let position = match self.index.get(name) {
            Some(position) => *position,
            None => *self.folded.as_ref()?.get(name.to_lowercase().as_str())?,
        };
        self.properties.get(position)
    }

    /// Whether `name` names a property or an alias of one.
    #[inline]
    pub fn is_known_property(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Whether `name` was explicitly excluded and is skipped when reading.
    #[inline]
    pub fn is_ignorable(&self, name: &str) -> bool {
        self.ignorable.contains(name)
    }

    /// The property naming the enumeration constant `ordinal`.
    pub fn constant(&self, ordinal: usize) -> Option<&Property> {
        self.properties.iter().find(|p| p.ordinal == Some(ordinal))
    }

    #[inline]
    pub fn constructors(&self) -> &Constructors {
        &self.constructors
    }
}

impl fmt::Debug for ObjectDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDefinition")
            .field("class", &self.class.name())
            .field("direction", &self.direction)
            .field("properties", &self.names().collect::<Vec<_>>())
            .field("ignorable", &self.ignorable)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{Direction, ObjectDefinition, Property};
    use crate::class::ClassDescriptor;

    fn definition(direction: Direction) -> ObjectDefinition {
        let class = Arc::new(ClassDescriptor::declare("Thing").build());
        ObjectDefinition::new(
            class,
            direction,
            vec![
                Property::new("zeta"),
                Property::new("alpha").with_alias("first"),
                Property::new("Mid"),
                Property::new("alpha").with_alias("one"),
            ],
        )
    }

    #[test]
    fn names_are_unique_and_aliases_indexed_for_read() {
        let def = definition(Direction::Read);
        assert_eq!(def.names().collect::<Vec<_>>(), ["zeta", "alpha", "Mid"]);
        assert_eq!(def.find("one").unwrap().name(), "alpha");
        assert!(def.find("first").is_none());

        let write = definition(Direction::Write);
        assert!(write.find("one").is_none());
    }

    #[test]
    fn reorder_lists_first_then_sorts() {
        let def = definition(Direction::Write).reordered(&["zeta"]);
        assert_eq!(def.names().collect::<Vec<_>>(), ["zeta", "Mid", "alpha"]);
        assert_eq!(def.find("alpha").unwrap().name(), "alpha");
    }

    #[test]
    fn case_insensitive_lookup() {
        let def = definition(Direction::Read);
        assert!(def.find("ZETA").is_none());
        let def = def.case_insensitive();
        assert_eq!(def.find("ZETA").unwrap().name(), "zeta");
        assert_eq!(def.find("mid").unwrap().name(), "Mid");
        assert_eq!(def.find("ONE").unwrap().name(), "alpha");
    }

    #[test]
    fn folded_collisions_keep_the_first_declared() {
        let class = Arc::new(ClassDescriptor::declare("Thing").build());
        for names in [["Url", "url", "URL"], ["url", "URL", "Url"], ["URL", "Url", "url"]] {
            let properties = names.iter().map(|name| Property::new(*name)).collect();
            let def = ObjectDefinition::new(class.clone(), Direction::Read, properties)
                .case_insensitive();
            assert_eq!(def.find("uRl").unwrap().name(), names[0]);
            // Exact matches still find their own property.
            assert_eq!(def.find(names[2]).unwrap().name(), names[2]);
        }
    }

    #[test]
    fn ignorable_names_are_not_properties() {
        let def = definition(Direction::Read)
            .with_ignorable(["secret"])
            .without_property("zeta");
        assert!(def.is_ignorable("secret"));
        assert!(!def.is_known_property("secret"));
        assert!(!def.is_known_property("zeta"));
        assert_eq!(def.len(), 2);
    }
}
