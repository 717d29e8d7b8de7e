//! Running handlers against serde.
//!
//! ## Menu
//!
//! - [`ReadSeed`]: a [`DeserializeSeed`](serde_core::de::DeserializeSeed)
//!   reading one value of a resolved type with the handler the session
//!   finds for it.
//! - [`Rendered`]: plain data produced by the writers, ready to be passed
//!   to any serializer.
//!
//! Reading pulls tokens through a visitor per handler kind. Writing happens
//! in two steps: the writers first render host values into plain
//! [`Value`](crate::value::Value) data, which [`Rendered`] then serializes.
//! Byte arrays are written as base64 text to human-readable formats and as
//! raw bytes otherwise.

// -----------------------------------------------------------------------------
// Modules

mod de;
mod ser;

// -----------------------------------------------------------------------------
// Exports

pub use de::ReadSeed;
pub use ser::Rendered;

pub(crate) use de::{read_erased, read_natural};
pub(crate) use ser::{render, render_with};

// -----------------------------------------------------------------------------
// Property types

use crate::blueprint::Session;
use crate::error::BindError;
use crate::introspect::{Direction, Property};
use crate::types::{ResolvedType, TypeBindings};

/// The type of `property` as seen from an object of type `owner`.
///
/// Type variables of the declaring class are bound by the arguments `owner`
/// supplies to it, so `Box<T>.value` read as a `Box<String>` is a `String`.
pub(crate) fn property_type(
    session: &Session,
    owner: &ResolvedType,
    property: &Property,
    direction: Direction,
) -> Result<ResolvedType, BindError> {
    let resolver = session.blueprint().resolver();
    let Some(declared) = property.declared_type(direction) else {
        return Ok(resolver.object());
    };
    let bindings = match property.declaring_class(direction) {
        Some(class) if class != owner.class_name() => owner
            .type_parameters_for(class)
            .unwrap_or_else(TypeBindings::empty),
        _ => owner.bindings().clone(),
    };
    resolver.resolve(&bindings, declared)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};

    use crate::blueprint::{Blueprint, Features};
    use crate::class::{ClassDescriptor, ClassRegistry, Ignore, Rename};
    use crate::error::{AccessError, BindError, SourceShape};
    use crate::ext::{
        ExtensionContext, MarkerExtension, Modifier, Provider, ReadContext, SimpleProvider, ValueRead,
        ValueWrite, WriteContext,
    };
    use crate::introspect::MarkerOverrides;
    use crate::locate::{DispatchTag, ValueReader};
    use crate::types::{DeclaredType, ResolvedType};
    use crate::value::{FromValue, ToValue, Value, take_object};

    // -------------------------------------------------------------------------
    // Fixtures

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }
    crate::impl_object_value!(Point);

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Color {
        Red,
        Green,
        Blue,
    }
    crate::impl_object_value!(Color);

    const COLORS: [Color; 3] = [Color::Red, Color::Green, Color::Blue];

    #[derive(Default)]
    struct Note {
        text: Option<String>,
        color: Option<Color>,
    }
    crate::impl_object_value!(Note);

    #[derive(Debug, PartialEq)]
    struct Celsius(i64);
    crate::impl_object_value!(Celsius);

    #[derive(Default)]
    struct Blob {
        data: Box<[u8]>,
    }
    crate::impl_object_value!(Blob);

    #[derive(Debug, Default)]
    struct Account {
        age: i32,
    }
    crate::impl_object_value!(Account);

    impl Account {
        fn get_age(&self) -> i32 {
            self.age
        }

        fn set_age(&mut self, age: i32) -> Result<(), crate::error::BoxedError> {
            if age < 0 {
                return Err("age cannot be negative".into());
            }
            self.age = age;
            Ok(())
        }
    }

    /// Holds elements of its type parameter `T`.
    #[derive(Default)]
    struct Bag {
        items: Vec<Value<'static>>,
    }
    crate::impl_object_value!(Bag);

    struct Stranger;
    crate::impl_object_value!(Stranger);

    fn registry() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::builder::<Point>("Point")
                .constructor(Point::default)
                .field("x", |p| &p.x, |p| &mut p.x)
                .field("y", |p| &p.y, |p| &mut p.y)
                .build(),
        );
        registry.register(
            ClassDescriptor::enumeration::<Color>(
                "Color",
                |c| *c as usize,
                |i| COLORS.get(i).copied(),
            )
            .constant("Red")
            .constant("Green")
            .constant("Blue")
            .build(),
        );
        registry.register(
            ClassDescriptor::builder::<Note>("Note")
                .constructor(Note::default)
                .field("text", |n| &n.text, |n| &mut n.text)
                .field("color", |n| &n.color, |n| &mut n.color)
                .build(),
        );
        registry.register(
            ClassDescriptor::builder::<Celsius>("Celsius")
                .text_constructor(|s| Celsius(s.trim_end_matches('C').parse().unwrap_or_default()))
                .int_constructor(Celsius)
                .build(),
        );
        registry.register(
            ClassDescriptor::builder::<Blob>("Blob")
                .constructor(Blob::default)
                .field("data", |b| &b.data, |b| &mut b.data)
                .build(),
        );
        registry.register(
            ClassDescriptor::builder::<Account>("Account")
                .constructor(Account::default)
                .field("age", |a| &a.age, |a| &mut a.age)
                .private()
                .getter("getAge", Account::get_age)
                .try_setter("setAge", Account::set_age)
                .build(),
        );
        registry.register(
            ClassDescriptor::builder::<Bag>("Bag")
                .type_param("T")
                .constructor(Bag::default)
                .field("items", |b| &b.items, |b| &mut b.items)
                .typed(DeclaredType::generic("Vec", [DeclaredType::var("T")]))
                .build(),
        );
        registry
    }

    fn blueprint() -> Blueprint {
        Blueprint::new(registry())
    }

    fn to_json<T: ToValue + ?Sized>(blueprint: &Blueprint, value: &T) -> Result<String, BindError> {
        let mut out = Vec::new();
        blueprint.write(value, &mut serde_json::Serializer::new(&mut out))?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn from_json<T>(blueprint: &Blueprint, json: &str) -> Result<T, BindError>
    where
        T: crate::types::Typed + FromValue,
    {
        let mut de = serde_json::Deserializer::from_str(json);
        blueprint.read(&mut de)
    }

    fn with_provider(blueprint: &Blueprint, provider: impl Provider + Clone) -> Blueprint {
        blueprint.with_extension(move |cx: &mut ExtensionContext<'_>| {
            cx.insert_provider(provider.clone());
        })
    }

    // -------------------------------------------------------------------------
    // Objects

    #[test]
    fn objects_round_trip() {
        let blueprint = blueprint();
        let json = to_json(&blueprint, &Point { x: 1, y: 2 }).unwrap();
        assert_eq!(json, r#"{"x":1,"y":2}"#);

        let point: Point = from_json(&blueprint, r#"{"y":4,"x":3}"#).unwrap();
        assert_eq!(point, Point { x: 3, y: 4 });
    }

    #[test]
    fn nested_objects_in_containers() {
        let blueprint = blueprint();
        let points = vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }];
        let json = to_json(&blueprint, &points).unwrap();
        assert_eq!(json, r#"[{"x":1,"y":2},{"x":3,"y":4}]"#);

        let read: Vec<Point> = from_json(&blueprint, &json).unwrap();
        assert_eq!(read, points);
    }

    #[test]
    fn unknown_properties_follow_the_feature() {
        let blueprint = blueprint();
        let point: Point = from_json(&blueprint, r#"{"x":1,"z":{"deep":[1]}}"#).unwrap();
        assert_eq!(point, Point { x: 1, y: 0 });

        let strict = blueprint.with(Features::FAIL_ON_UNKNOWN_PROPERTY);
        let err = from_json::<Vec<Point>>(&strict, r#"[{"x":1,"z":0}]"#).unwrap_err();
        assert!(matches!(
            err,
            BindError::UnknownProperty { class, property } if class == "Point" && property == "z"
        ));
    }

    #[test]
    fn case_insensitive_names() {
        let blueprint = blueprint();
        let point: Point = from_json(&blueprint, r#"{"X":7}"#).unwrap();
        assert_eq!(point.x, 0);

        let relaxed = blueprint.with(Features::CASE_INSENSITIVE_PROPERTIES);
        let point: Point = from_json(&relaxed, r#"{"X":7}"#).unwrap();
        assert_eq!(point.x, 7);
    }

    #[test]
    fn null_properties_follow_the_feature() {
        let blueprint = blueprint();
        assert_eq!(to_json(&blueprint, &Note::default()).unwrap(), "{}");

        let verbose = blueprint.with(Features::WRITE_NULL_PROPERTIES);
        assert_eq!(
            to_json(&verbose, &Note::default()).unwrap(),
            r#"{"text":null,"color":null}"#
        );
    }

    #[test]
    fn accessor_failures_name_the_property() {
        let blueprint = blueprint();
        let account: Account = from_json(&blueprint, r#"{"age":30}"#).unwrap();
        assert_eq!(account.age, 30);
        assert_eq!(to_json(&blueprint, &account).unwrap(), r#"{"age":30}"#);

        let err = from_json::<Account>(&blueprint, r#"{"age":-1}"#).unwrap_err();
        let BindError::Access { class, property, cause } = err else {
            panic!("expected an access error");
        };
        assert_eq!((class.as_str(), property.as_str()), ("Account", "age"));
        assert!(matches!(cause, AccessError::Failed(_)));
    }

    #[test]
    fn scalar_constructors() {
        let blueprint = blueprint();
        assert_eq!(from_json::<Celsius>(&blueprint, r#""21C""#).unwrap(), Celsius(21));
        assert_eq!(from_json::<Celsius>(&blueprint, "-4").unwrap(), Celsius(-4));

        let err = from_json::<Celsius>(&blueprint, "{}").unwrap_err();
        assert!(matches!(
            err,
            BindError::NoConstructor { shape: SourceShape::Map, .. }
        ));
        let err = from_json::<Point>(&blueprint, "12").unwrap_err();
        assert!(matches!(
            err,
            BindError::NoConstructor { shape: SourceShape::Integer, .. }
        ));
    }

    #[test]
    fn unregistered_objects_fail() {
        let err = to_json(&blueprint(), &Stranger).unwrap_err();
        assert!(matches!(err, BindError::UnregisteredType(_)));
    }

    #[test]
    fn generic_properties_use_owner_bindings() {
        let blueprint = blueprint();
        let ty = blueprint
            .resolve(&DeclaredType::generic("Bag", [DeclaredType::class("Point")]))
            .unwrap();
        let mut de = serde_json::Deserializer::from_str(r#"{"items":[{"x":1,"y":2}]}"#);
        let value = blueprint.read_value(&ty, &mut de).unwrap();
        let bag = take_object::<Bag>(value, "Bag").unwrap();

        assert_eq!(bag.items.len(), 1);
        let point = bag.items[0].as_object().and_then(|o| o.downcast_ref::<Point>());
        assert_eq!(point, Some(&Point { x: 1, y: 2 }));

        assert_eq!(
            to_json(&blueprint, &bag).unwrap(),
            r#"{"items":[{"x":1,"y":2}]}"#
        );
    }

    // -------------------------------------------------------------------------
    // Scalars, enumerations and trees

    #[test]
    fn enumerations_by_name_and_index() {
        let blueprint = blueprint();
        assert_eq!(to_json(&blueprint, &Color::Green).unwrap(), r#""Green""#);
        let indexed = blueprint.with(Features::WRITE_ENUMS_USING_INDEX);
        assert_eq!(to_json(&indexed, &Color::Green).unwrap(), "1");

        assert_eq!(from_json::<Color>(&blueprint, r#""Blue""#).unwrap(), Color::Blue);
        assert_eq!(from_json::<Color>(&blueprint, "0").unwrap(), Color::Red);

        let err = from_json::<Color>(&blueprint, r#""Purple""#).unwrap_err();
        assert!(matches!(
            err,
            BindError::UnknownConstant { constant, .. } if constant == "Purple"
        ));
        assert!(from_json::<Color>(&blueprint, "3").is_err());
    }

    #[test]
    fn byte_arrays_as_base64() {
        let blueprint = blueprint();
        let blob = Blob {
            data: Box::new([1, 2]),
        };
        assert_eq!(to_json(&blueprint, &blob).unwrap(), r#"{"data":"AQI="}"#);

        let read: Blob = from_json(&blueprint, r#"{"data":"AQI="}"#).unwrap();
        assert_eq!(&*read.data, &[1, 2]);
        let read: Blob = from_json(&blueprint, r#"{"data":[3,4]}"#).unwrap();
        assert_eq!(&*read.data, &[3, 4]);
    }

    #[test]
    fn maps_with_typed_keys() {
        let blueprint = blueprint();
        let map: BTreeMap<i32, String> = from_json(&blueprint, r#"{"2":"b","1":"a"}"#).unwrap();
        assert_eq!(map.get(&1).map(String::as_str), Some("a"));
        assert_eq!(to_json(&blueprint, &map).unwrap(), r#"{"1":"a","2":"b"}"#);
    }

    #[test]
    fn dates_as_epoch_millis() {
        use core::time::Duration;
        use std::time::{SystemTime, UNIX_EPOCH};

        let blueprint = blueprint();
        let time = UNIX_EPOCH + Duration::from_millis(1500);
        assert_eq!(to_json(&blueprint, &time).unwrap(), "1500");
        assert_eq!(from_json::<SystemTime>(&blueprint, "1500").unwrap(), time);
    }

    #[test]
    fn tree_nodes_round_trip() {
        let blueprint = blueprint();
        let json = r#"{"a":[1,null,"x"]}"#;
        let tree: Value<'static> = from_json(&blueprint, json).unwrap();
        assert_eq!(
            tree,
            Value::Map(vec![(
                Value::text("a"),
                Value::Seq(vec![Value::U64(1), Value::Null, Value::text("x")]),
            )])
        );
        assert_eq!(to_json(&blueprint, &tree).unwrap(), json);
    }

    // -------------------------------------------------------------------------
    // Extensions

    /// Writes points as `"x,y"` text and reads them back.
    #[derive(Clone)]
    struct PointText;

    impl ValueWrite for PointText {
        fn write<'v>(
            &self,
            _cx: &WriteContext<'_>,
            _ty: &ResolvedType,
            value: Value<'v>,
        ) -> Result<Value<'v>, BindError> {
            let point = value
                .as_object()
                .and_then(|o| o.downcast_ref::<Point>())
                .ok_or_else(|| BindError::handler("Point", "not a point"))?;
            Ok(Value::text(format!("{},{}", point.x, point.y)))
        }
    }

    impl ValueRead for PointText {
        fn read<'de>(
            &self,
            _cx: &ReadContext<'_>,
            _ty: &ResolvedType,
            de: &mut dyn erased_serde::Deserializer<'de>,
        ) -> Result<Value<'static>, BindError> {
            let text: String =
                erased_serde::deserialize(de).map_err(|e| BindError::handler("Point", e))?;
            let (x, y) = text
                .split_once(',')
                .ok_or_else(|| BindError::handler("Point", "expected `x,y`"))?;
            let parse = |s: &str| s.parse::<i32>().map_err(|e| BindError::handler("Point", e));
            Ok(Value::owned(Point {
                x: parse(x)?,
                y: parse(y)?,
            }))
        }
    }

    /// Returns its input untouched.
    struct Identity;

    impl ValueWrite for Identity {
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
    fn provider_handlers_take_precedence() {
        let base = blueprint();
        let custom = with_provider(
            &base,
            SimpleProvider::new()
                .with_writer("Point", PointText)
                .with_reader("Point", PointText),
        );

        let points = vec![Point { x: 1, y: 2 }];
        assert_eq!(to_json(&custom, &points).unwrap(), r#"["1,2"]"#);
        let read: Vec<Point> = from_json(&custom, r#"["5,6"]"#).unwrap();
        assert_eq!(read, vec![Point { x: 5, y: 6 }]);

        // The blueprint the extension was added to is unchanged.
        assert_eq!(to_json(&base, &points).unwrap(), r#"[{"x":1,"y":2}]"#);
    }

    #[test]
    fn custom_writer_output_is_written_builtin() {
        let custom = with_provider(&blueprint(), SimpleProvider::new().with_writer("Point", Identity));
        assert_eq!(
            to_json(&custom, &Point { x: 1, y: 2 }).unwrap(),
            r#"{"x":1,"y":2}"#
        );
    }

    #[test]
    fn custom_reader_errors_are_kept() {
        let custom = with_provider(&blueprint(), SimpleProvider::new().with_reader("Point", PointText));
        let err = from_json::<Vec<Point>>(&custom, r#"["oops"]"#).unwrap_err();
        assert!(matches!(err, BindError::Handler { class, .. } if class == "Point"));
    }

    /// Reads collections of text from one comma-separated string.
    #[derive(Clone)]
    struct CommaLists;

    struct CommaReader;

    impl ValueRead for CommaReader {
        fn read<'de>(
            &self,
            _cx: &ReadContext<'_>,
            _ty: &ResolvedType,
            de: &mut dyn erased_serde::Deserializer<'de>,
        ) -> Result<Value<'static>, BindError> {
            let text: String =
                erased_serde::deserialize(de).map_err(|e| BindError::handler("Vec", e))?;
            Ok(Value::Seq(text.split(',').map(|s| Value::text(s.to_owned())).collect()))
        }
    }

    impl Provider for CommaLists {
        fn find_collection_reader(
            &self,
            _ty: &ResolvedType,
            element: &ResolvedType,
        ) -> Option<Arc<dyn ValueRead>> {
            (element.class_name() == "String").then(|| Arc::new(CommaReader) as Arc<dyn ValueRead>)
        }
    }

    #[test]
    fn collection_readers_see_the_element_type() {
        let custom = with_provider(&blueprint(), CommaLists);
        let names: Vec<String> = from_json(&custom, r#""a,b""#).unwrap();
        assert_eq!(names, ["a", "b"]);

        // Other element types keep the built-in reader.
        let numbers: Vec<i32> = from_json(&custom, "[1,2]").unwrap();
        assert_eq!(numbers, [1, 2]);
    }

    /// Upper-cases every text it writes and counts the readers it sees.
    #[derive(Clone, Default)]
    struct Loud {
        readers: Arc<AtomicUsize>,
    }

    struct Upper;

    impl ValueWrite for Upper {
        fn write<'v>(
            &self,
            _cx: &WriteContext<'_>,
            _ty: &ResolvedType,
            value: Value<'v>,
        ) -> Result<Value<'v>, BindError> {
            Ok(match value.as_text() {
                Some(text) => Value::text(text.to_uppercase()),
                None => value,
            })
        }
    }

    impl Modifier for Loud {
        fn modify_reader(&self, _ty: &ResolvedType, reader: ValueReader) -> ValueReader {
            self.readers.fetch_add(1, Ordering::Relaxed);
            reader
        }

        fn override_standard_writer(
            &self,
            tag: DispatchTag,
            _ty: &ResolvedType,
        ) -> Option<Arc<dyn ValueWrite>> {
            (tag == DispatchTag::Text).then(|| Arc::new(Upper) as Arc<dyn ValueWrite>)
        }
    }

    #[test]
    fn modifiers_override_and_wrap() {
        let loud = Loud::default();
        let modifier = loud.clone();
        let custom = blueprint().with_extension(move |cx: &mut ExtensionContext<'_>| {
            cx.insert_modifier(modifier.clone());
        });

        let words = vec!["hi".to_string()];
        assert_eq!(to_json(&custom, &words).unwrap(), r#"["HI"]"#);

        let _: Vec<Point> = from_json(&custom, r#"[{"x":1}]"#).unwrap();
        let built = loud.readers.load(Ordering::Relaxed);
        assert!(built > 0);
        // Readers are cached by the blueprint.
        let _: Vec<Point> = from_json(&custom, r#"[{"x":2}]"#).unwrap();
        assert_eq!(loud.readers.load(Ordering::Relaxed), built);
    }

    #[test]
    fn marker_overrides_apply_per_blueprint() {
        let base = blueprint();
        let ignoring = base.with_extension(MarkerExtension::with_overrides(
            MarkerOverrides::new().member("Point", "x", Ignore),
        ));
        let renaming = base.with_extension(MarkerExtension::with_overrides(
            MarkerOverrides::new().member("Point", "x", Rename::to("b")),
        ));
        let point = Point { x: 1, y: 2 };

        assert_eq!(to_json(&ignoring, &point).unwrap(), r#"{"y":2}"#);
        let read: Point = from_json(&ignoring, r#"{"x":1,"y":2}"#).unwrap();
        assert_eq!(read, Point { x: 0, y: 2 });

        assert_eq!(to_json(&renaming, &point).unwrap(), r#"{"b":1,"y":2}"#);
        let read: Point = from_json(&renaming, r#"{"b":5}"#).unwrap();
        assert_eq!(read.x, 5);

        assert_eq!(to_json(&base, &point).unwrap(), r#"{"x":1,"y":2}"#);
        let read: Point = from_json(&base, r#"{"x":1,"y":2}"#).unwrap();
        assert_eq!(read, point);
    }

    // -------------------------------------------------------------------------
    // Caching

    #[test]
    fn locator_remembers_the_last_type() {
        let blueprint = blueprint();
        let session = blueprint.session();
        let point = blueprint.resolve_type::<Point>().unwrap();
        let color = blueprint.resolve_type::<Color>().unwrap();
        let tags = &blueprint.caches().tags;

        assert_eq!(session.classify(&point).unwrap(), DispatchTag::Object);
        assert_eq!(tags.len(), 1);
        tags.clear();

        // Answered by the session without touching the shared cache.
        assert_eq!(session.classify(&point).unwrap(), DispatchTag::Object);
        assert_eq!(tags.len(), 0);

        assert_eq!(session.classify(&color).unwrap(), DispatchTag::Enumeration);
        assert_eq!(session.classify(&point).unwrap(), DispatchTag::Object);
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn derived_blueprints_have_their_own_caches() {
        let base = blueprint();
        let point = base.resolve_type::<Point>().unwrap();
        base.session().reader_for(&point).unwrap();
        assert_eq!(base.caches().readers.len(), 1);

        let strict = base.with(Features::FAIL_ON_UNKNOWN_PROPERTY);
        assert_eq!(strict.caches().readers.len(), 0);
        assert!(Arc::ptr_eq(base.resolver(), strict.resolver()));

        // Nothing changes, nothing is derived.
        let same = strict.with(Features::FAIL_ON_UNKNOWN_PROPERTY);
        strict.session().reader_for(&point).unwrap();
        assert_eq!(same.caches().readers.len(), 1);
    }
}
