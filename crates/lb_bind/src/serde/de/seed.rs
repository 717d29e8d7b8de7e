use core::fmt::{self, Formatter};

use serde_core::de::{DeserializeSeed, Deserializer, Error, Visitor};

use super::array_visitor::ArrayVisitor;
use super::collection_visitor::CollectionVisitor;
use super::enum_visitor::EnumVisitor;
use super::map_visitor::MapVisitor;
use super::natural::NaturalVisitor;
use super::object_visitor::ObjectVisitor;
use crate::blueprint::Session;
use crate::error::BindError;
use crate::ext::ReadContext;
use crate::locate::{DispatchTag, ValueReader};
use crate::types::ResolvedType;
use crate::value::{Value, date_from_value, identifier_from_text};

/// Reads one value of type `ty`.
///
/// The reader comes from the session, so providers and modifiers apply.
/// Objects are produced as owned [`Value::Object`]s. Errors raised by the
/// handlers travel through the deserializer as messages and are restored by
/// [`Session::read_value`].
///
/// # Examples
///
/// ```
/// use lb_bind::blueprint::Blueprint;
/// use lb_bind::serde::ReadSeed;
/// use lb_bind::value::Value;
/// use serde_core::de::DeserializeSeed;
///
/// let blueprint = Blueprint::default();
/// let session = blueprint.session();
/// let ty = blueprint.resolve_type::<Vec<i32>>().unwrap();
///
/// let mut de = serde_json::Deserializer::from_str("[1, 2]");
/// let value = ReadSeed::new(&session, ty).deserialize(&mut de).unwrap();
/// assert_eq!(value, Value::Seq(vec![Value::U64(1), Value::U64(2)]));
/// ```
pub struct ReadSeed<'s> {
    session: &'s Session,
    ty: ResolvedType,
}

impl<'s> ReadSeed<'s> {
    #[inline]
    pub fn new(session: &'s Session, ty: ResolvedType) -> Self {
        Self { session, ty }
    }
}

impl<'de> DeserializeSeed<'de> for ReadSeed<'_> {
    type Value = Value<'static>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        let reader = self
            .session
            .reader_for(&self.ty)
            .map_err(|e| self.session.fail::<D::Error>(e))?;
        read_with(self.session, &reader, &self.ty, deserializer)
    }
}

/// Runs `reader` on an erased deserializer, for custom handlers.
pub(crate) fn read_erased<'de>(
    session: &Session,
    reader: &ValueReader,
    ty: &ResolvedType,
    de: &mut dyn erased_serde::Deserializer<'de>,
) -> Result<Value<'static>, BindError> {
    read_with(session, reader, ty, de).map_err(|e| session.recover(e))
}

pub(super) fn read_with<'de, D: Deserializer<'de>>(
    session: &Session,
    reader: &ValueReader,
    ty: &ResolvedType,
    deserializer: D,
) -> Result<Value<'static>, D::Error> {
    match reader {
        ValueReader::Custom(custom) => {
            let mut erased = <dyn erased_serde::Deserializer>::erase(deserializer);
            custom
                .read(&ReadContext::new(session), ty, &mut erased)
                .map_err(|e| session.fail(e))
        }
        ValueReader::Scalar(tag) => deserializer.deserialize_any(ScalarVisitor {
            session,
            tag: *tag,
            ty,
        }),
        ValueReader::Array { tag, element } => deserializer.deserialize_any(ArrayVisitor {
            session,
            tag: *tag,
            element,
        }),
        ValueReader::Collection { element } => {
            deserializer.deserialize_any(CollectionVisitor { session, element })
        }
        ValueReader::Map { key, value } => {
            deserializer.deserialize_any(MapVisitor { session, key, value })
        }
        ValueReader::Object(def) => deserializer.deserialize_any(ObjectVisitor {
            session,
            def,
            ty,
        }),
        ValueReader::Enum(def) => deserializer.deserialize_any(EnumVisitor { session, def }),
        ValueReader::Tree => {
            let mut erased = <dyn erased_serde::Deserializer>::erase(deserializer);
            session
                .blueprint()
                .pipeline()
                .tree_codec()
                .read(&mut erased)
                .map_err(|e| session.fail(e))
        }
        ValueReader::Any => deserializer.deserialize_any(NaturalVisitor),
    }
}

// -----------------------------------------------------------------------------
// Scalars

/// Reads a scalar, converting dates and identifiers into their objects.
///
/// Other scalars are kept as read; the caller's [`FromValue`] does the
/// numeric and textual conversions.
///
/// [`FromValue`]: crate::value::FromValue
struct ScalarVisitor<'a> {
    session: &'a Session,
    tag: DispatchTag,
    ty: &'a ResolvedType,
}

impl ScalarVisitor<'_> {
    fn finish<E: Error>(&self, value: Value<'static>) -> Result<Value<'static>, E> {
        let converted = match self.tag {
            _ if value.is_null() => return Ok(value),
            DispatchTag::Date => date_from_value(value),
            DispatchTag::Identifier => identifier_from_text(self.ty.class_name(), value),
            _ => return Ok(value),
        };
        converted.map_err(|e| self.session.fail(BindError::from(e)))
    }
}

macro_rules! forward_scalar {
    ($($method:ident($ty:ty)),* $(,)?) => {$(
        fn $method<E: Error>(self, v: $ty) -> Result<Self::Value, E> {
            let value = NaturalVisitor.$method::<E>(v)?;
            self.finish(value)
        }
    )*};
}

impl<'de> Visitor<'de> for ScalarVisitor<'_> {
    type Value = Value<'static>;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "a value of type `{}`", self.ty)
    }

    forward_scalar! {
        visit_bool(bool),
        visit_i8(i8),
        visit_i16(i16),
        visit_i32(i32),
        visit_i64(i64),
        visit_i128(i128),
        visit_u8(u8),
        visit_u16(u16),
        visit_u32(u32),
        visit_u64(u64),
        visit_u128(u128),
        visit_f32(f32),
        visit_f64(f64),
        visit_char(char),
        visit_str(&str),
        visit_bytes(&[u8]),
    }

    fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
        Ok(Value::Null)
    }

    fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}
