use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Formatter};

use serde_core::de::{DeserializeSeed, Deserializer, Error, MapAccess, SeqAccess, Visitor};

use crate::value::Value;

/// Reads any self-describing input into plain [`Value`] data.
pub(crate) fn read_natural(
    de: &mut dyn erased_serde::Deserializer<'_>,
) -> Result<Value<'static>, erased_serde::Error> {
    NaturalSeed.deserialize(de)
}

/// Reads one value of whatever shape the input has.
#[derive(Clone, Copy)]
pub(super) struct NaturalSeed;

impl<'de> DeserializeSeed<'de> for NaturalSeed {
    type Value = Value<'static>;

    #[inline]
    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(NaturalVisitor)
    }
}

pub(super) struct NaturalVisitor;

macro_rules! visit_scalar {
    ($($method:ident($ty:ty) => $variant:ident),* $(,)?) => {$(
        #[inline]
        fn $method<E: Error>(self, v: $ty) -> Result<Self::Value, E> {
            Ok(Value::$variant(v))
        }
    )*};
}

impl<'de> Visitor<'de> for NaturalVisitor {
    type Value = Value<'static>;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("any value")
    }

    visit_scalar! {
        visit_bool(bool) => Bool,
        visit_i8(i8) => I8,
        visit_i16(i16) => I16,
        visit_i32(i32) => I32,
        visit_i64(i64) => I64,
        visit_i128(i128) => I128,
        visit_u8(u8) => U8,
        visit_u16(u16) => U16,
        visit_u32(u32) => U32,
        visit_u64(u64) => U64,
        visit_f32(f32) => F32,
        visit_f64(f64) => F64,
        visit_char(char) => Char,
    }

    fn visit_u128<E: Error>(self, v: u128) -> Result<Self::Value, E> {
        if let Ok(v) = u64::try_from(v) {
            return Ok(Value::U64(v));
        }
        i128::try_from(v)
            .map(Value::I128)
            .map_err(|_| E::custom(format_args!("{v} is out of range for i128")))
    }

    #[inline]
    fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Value::Text(Cow::Owned(v.into())))
    }

    #[inline]
    fn visit_string<E: Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Value::Text(Cow::Owned(v)))
    }

    #[inline]
    fn visit_bytes<E: Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        Ok(Value::Bytes(Cow::Owned(v.into())))
    }

    #[inline]
    fn visit_byte_buf<E: Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
        Ok(Value::Bytes(Cow::Owned(v)))
    }

    #[inline]
    fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
        Ok(Value::Null)
    }

    #[inline]
    fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some(item) = seq.next_element_seed(NaturalSeed)? {
            items.push(item);
        }
        Ok(Value::Seq(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or_default());
        while let Some(entry) = map.next_entry_seed(NaturalSeed, NaturalSeed)? {
            entries.push(entry);
        }
        Ok(Value::Map(entries))
    }
}
