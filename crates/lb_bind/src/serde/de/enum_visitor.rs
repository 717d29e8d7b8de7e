use alloc::string::ToString;
use core::fmt::{self, Formatter};

use serde_core::de::{Deserializer, Error, Visitor};

use crate::blueprint::Session;
use crate::error::BindError;
use crate::introspect::ObjectDefinition;
use crate::value::{ObjectRef, Value};

/// A [`Visitor`] for enumerations, read by constant name or by ordinal.
pub(super) struct EnumVisitor<'a> {
    pub session: &'a Session,
    pub def: &'a ObjectDefinition,
}

impl EnumVisitor<'_> {
    fn unknown<E: Error>(&self, constant: impl ToString) -> E {
        self.session.fail(BindError::UnknownConstant {
            class: self.def.class().name().to_string(),
            constant: constant.to_string(),
        })
    }

    fn constant<E: Error>(&self, ordinal: usize) -> Result<Value<'static>, E> {
        self.def
            .class()
            .enum_access()
            .and_then(|access| access.constant(ordinal))
            .map(|obj| Value::Object(ObjectRef::Owned(obj)))
            .ok_or_else(|| self.unknown(ordinal))
    }
}

impl<'de> Visitor<'de> for EnumVisitor<'_> {
    type Value = Value<'static>;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "a constant of `{}`", self.def.class().name())
    }

    fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
        match self.def.find(v).and_then(|p| p.ordinal()) {
            Some(ordinal) => self.constant(ordinal),
            None => Err(self.unknown(v)),
        }
    }

    fn visit_u64<E: Error>(self, v: u64) -> Result<Self::Value, E> {
        // Ignored constants are not in the definition and cannot be read.
        match usize::try_from(v).ok().filter(|o| self.def.constant(*o).is_some()) {
            Some(ordinal) => self.constant(ordinal),
            None => Err(self.unknown(v)),
        }
    }

    fn visit_i64<E: Error>(self, v: i64) -> Result<Self::Value, E> {
        match u64::try_from(v) {
            Ok(v) => self.visit_u64(v),
            Err(_) => Err(self.unknown(v)),
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
