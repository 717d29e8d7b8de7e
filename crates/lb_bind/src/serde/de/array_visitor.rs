use alloc::borrow::Cow;
use alloc::vec::Vec;
use core::fmt::{self, Formatter};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_core::de::{Deserializer, Error, SeqAccess, Unexpected, Visitor};

use super::collection_visitor::read_elements;
use crate::blueprint::Session;
use crate::locate::DispatchTag;
use crate::types::ResolvedType;
use crate::value::Value;

/// A [`Visitor`] for arrays.
///
/// Besides sequences, byte arrays accept base64 text and raw bytes, and
/// char arrays accept text.
pub(super) struct ArrayVisitor<'a> {
    pub session: &'a Session,
    pub tag: DispatchTag,
    pub element: &'a ResolvedType,
}

impl<'de> Visitor<'de> for ArrayVisitor<'_> {
    type Value = Value<'static>;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        match self.tag {
            DispatchTag::ByteArray => formatter.write_str("a sequence of bytes or base64 text"),
            DispatchTag::CharArray => formatter.write_str("a sequence of chars or text"),
            _ => write!(formatter, "a sequence of `{}`", self.element),
        }
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        read_elements(self.session, self.element, seq).map(Value::Seq)
    }

    fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
        match self.tag {
            DispatchTag::ByteArray => STANDARD
                .decode(v)
                .map(|bytes| Value::Bytes(Cow::Owned(bytes)))
                .map_err(|e| E::custom(format_args!("invalid base64 text: {e}"))),
            DispatchTag::CharArray => Ok(Value::Seq(v.chars().map(Value::Char).collect())),
            _ => Err(E::invalid_type(Unexpected::Str(v), &self)),
        }
    }

    fn visit_bytes<E: Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        self.visit_byte_buf(v.into())
    }

    fn visit_byte_buf<E: Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
        match self.tag {
            DispatchTag::ByteArray => Ok(Value::Bytes(Cow::Owned(v))),
            _ => Err(E::invalid_type(Unexpected::Bytes(&v), &self)),
        }
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
