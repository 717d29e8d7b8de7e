use alloc::string::ToString;

use crate::class::{ClassRegistry, ClassShape};
use crate::error::BindError;
use crate::types::ResolvedType;

// -----------------------------------------------------------------------------
// DispatchTag

/// How values of a type are read and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchTag {
    Text,
    CharArray,
    ByteArray,
    ShortArray,
    IntArray,
    LongArray,
    FloatArray,
    DoubleArray,
    BooleanArray,
    ObjectArray,
    /// A host class implementing `TextSequence`.
    TextSequence,
    Collection,
    OrderedList,
    Map,
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Boolean,
    Char,
    Date,
    /// Classes written through their textual form, such as paths and addresses.
    Identifier,
    Enumeration,
    TreeNode,
    /// Needs introspection.
    Object,
    /// Anything goes: `Object` and `()`.
    Unknown,
}

impl DispatchTag {
    /// The tag of a class matched by exact name, if any.
    pub fn exact(class: &str) -> Option<Self> {
        Some(match class {
            "String" | "Box<str>" | "Arc<str>" | "Cow<str>" => Self::Text,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "i128" => Self::I128,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "bool" => Self::Boolean,
            "char" => Self::Char,
            "SystemTime" => Self::Date,
            "PathBuf" | "IpAddr" | "SocketAddr" => Self::Identifier,
            "Object" | "()" => Self::Unknown,
            _ => return None,
        })
    }

    /// The tag of an array with elements of class `element`.
    pub fn array_of(element: &str) -> Self {
        match element {
            "u8" | "i8" => Self::ByteArray,
            "i16" | "u16" => Self::ShortArray,
            "i32" | "u32" => Self::IntArray,
            "i64" | "u64" | "i128" => Self::LongArray,
            "f32" => Self::FloatArray,
            "f64" => Self::DoubleArray,
            "bool" => Self::BooleanArray,
            "char" => Self::CharArray,
            _ => Self::ObjectArray,
        }
    }

    #[inline]
    pub fn is_array(self) -> bool {
        matches!(
            self,
            Self::CharArray
                | Self::ByteArray
                | Self::ShortArray
                | Self::IntArray
                | Self::LongArray
                | Self::FloatArray
                | Self::DoubleArray
                | Self::BooleanArray
                | Self::ObjectArray
        )
    }

    /// Tags with a fixed built-in writer that a modifier may override.
    #[inline]
    pub fn is_standard(self) -> bool {
        !matches!(
            self,
            Self::ObjectArray
                | Self::TextSequence
                | Self::Collection
                | Self::OrderedList
                | Self::Map
                | Self::Enumeration
                | Self::TreeNode
                | Self::Object
                | Self::Unknown
        )
    }
}

// -----------------------------------------------------------------------------
// Classification

/// Supertypes checked in order once exact matches fail.
const SUPERTYPES: [(&str, DispatchTag); 5] = [
    ("TreeNode", DispatchTag::TreeNode),
    ("TextSequence", DispatchTag::TextSequence),
    ("Map", DispatchTag::Map),
    ("List", DispatchTag::OrderedList),
    ("Collection", DispatchTag::Collection),
];

/// Classifies `ty` without any caching.
///
/// Exact built-in classes come first, then arrays, enumerations, the
/// container and text supertypes, and finally plain classes. Interfaces and
/// abstract classes matching none of these cannot be handled.
pub fn classify_type(registry: &ClassRegistry, ty: &ResolvedType) -> Result<DispatchTag, BindError> {
    let ty = ty.resolved();
    if let Some(tag) = DispatchTag::exact(ty.class_name()) {
        return Ok(tag);
    }
    if let Some(element) = ty.element() {
        return Ok(DispatchTag::array_of(element.class_name()));
    }
    let desc = registry
        .get(ty.class_name())
        .ok_or_else(|| BindError::UnknownClass(ty.class_name().to_string().into()))?;
    if desc.is_enum() {
        return Ok(DispatchTag::Enumeration);
    }
    if let Some(&(_, tag)) = SUPERTYPES
        .iter()
        .find(|(class, _)| ty.find_supertype(class).is_some())
    {
        return Ok(tag);
    }
    match desc.shape() {
        ClassShape::Interface | ClassShape::Abstract => {
            Err(BindError::AbstractType(ty.class_name().to_string()))
        }
        _ => Ok(DispatchTag::Object),
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use super::{DispatchTag, classify_type};
    use crate::class::{ClassDescriptor, ClassRegistry};
    use crate::error::BindError;
    use crate::types::{DeclaredType, TypeBindings, TypeResolver};

    #[derive(Default)]
    struct Names;
    #[derive(Default)]
    struct Point;

    #[derive(Clone, Copy)]
    enum Color {
        Red,
    }

    fn setup() -> TypeResolver {
        let mut registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::builder::<Names>("Names")
                .constructor(Names::default)
                .extends(DeclaredType::generic("Vec", [DeclaredType::class("String")]))
                .build(),
        );
        registry.register(
            ClassDescriptor::builder::<Point>("Point")
                .constructor(Point::default)
                .build(),
        );
        registry.register(ClassDescriptor::interface("Shape").build());
        registry.register(
            ClassDescriptor::enumeration::<Color>("Color", |_| 0, |_| Some(Color::Red))
                .constant("Red")
                .build(),
        );
        TypeResolver::new(Arc::new(registry))
    }

    fn tag(resolver: &TypeResolver, declared: DeclaredType) -> Result<DispatchTag, BindError> {
        let ty = resolver.resolve(&TypeBindings::empty(), &declared)?;
        classify_type(resolver.registry(), &ty)
    }

    #[test]
    fn priority_order() {
        let r = setup();
        let class = DeclaredType::class;
        assert_eq!(tag(&r, class("String")).unwrap(), DispatchTag::Text);
        assert_eq!(tag(&r, class("u64")).unwrap(), DispatchTag::U64);
        assert_eq!(tag(&r, class("SystemTime")).unwrap(), DispatchTag::Date);
        assert_eq!(tag(&r, class("IpAddr")).unwrap(), DispatchTag::Identifier);
        assert_eq!(tag(&r, class("Object")).unwrap(), DispatchTag::Unknown);
        assert_eq!(tag(&r, class("Value")).unwrap(), DispatchTag::TreeNode);
        assert_eq!(tag(&r, class("Color")).unwrap(), DispatchTag::Enumeration);
        assert_eq!(tag(&r, class("Point")).unwrap(), DispatchTag::Object);

        let list = DeclaredType::generic("Vec", [class("i32")]);
        assert_eq!(tag(&r, list).unwrap(), DispatchTag::OrderedList);
        let set = DeclaredType::generic("HashSet", [class("i32")]);
        assert_eq!(tag(&r, set).unwrap(), DispatchTag::Collection);
        assert_eq!(
            tag(&r, DeclaredType::generic("BTreeMap", [class("String"), class("i32")])).unwrap(),
            DispatchTag::Map
        );
        // A subclass of a list is still a list.
        assert_eq!(tag(&r, class("Names")).unwrap(), DispatchTag::OrderedList);
    }

    #[test]
    fn arrays_by_element() {
        let r = setup();
        let array = |name| DeclaredType::array(DeclaredType::class(name));
        assert_eq!(tag(&r, array("u8")).unwrap(), DispatchTag::ByteArray);
        assert_eq!(tag(&r, array("char")).unwrap(), DispatchTag::CharArray);
        assert_eq!(tag(&r, array("f64")).unwrap(), DispatchTag::DoubleArray);
        assert_eq!(tag(&r, array("Point")).unwrap(), DispatchTag::ObjectArray);
        assert_eq!(tag(&r, array("String")).unwrap(), DispatchTag::ObjectArray);
    }

    #[test]
    fn abstract_types_fail() {
        let r = setup();
        let err = tag(&r, DeclaredType::class("Shape")).unwrap_err();
        assert!(matches!(err, BindError::AbstractType(name) if name == "Shape"));
    }

    #[test]
    fn standard_tags() {
        assert!(DispatchTag::Text.is_standard());
        assert!(DispatchTag::ByteArray.is_standard());
        assert!(!DispatchTag::ObjectArray.is_standard());
        assert!(!DispatchTag::Object.is_standard());
        assert!(DispatchTag::CharArray.is_array());
        assert!(!DispatchTag::Collection.is_array());
    }
}
