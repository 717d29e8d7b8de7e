use alloc::string::{String, ToString};
use core::fmt::{self, Formatter};

use serde_core::de::{Deserializer, Error, IgnoredAny, MapAccess, Visitor};

use super::ReadSeed;
use crate::blueprint::{Features, Session};
use crate::error::{BindError, SourceShape, ValueError};
use crate::introspect::{Direction, ObjectDefinition};
use crate::serde::property_type;
use crate::types::ResolvedType;
use crate::value::{ObjectRef, Value};

/// A [`Visitor`] for bean-like objects.
///
/// A map is read property by property into an instance made by the default
/// constructor. Text and integers go to the single-argument constructors.
pub(super) struct ObjectVisitor<'a> {
    pub session: &'a Session,
    pub def: &'a ObjectDefinition,
    pub ty: &'a ResolvedType,
}

impl ObjectVisitor<'_> {
    fn no_constructor<E: Error>(&self, shape: SourceShape) -> E {
        self.session.fail(BindError::NoConstructor {
            class: self.def.class().name().to_string(),
            shape,
        })
    }
}

impl<'de> Visitor<'de> for ObjectVisitor<'_> {
    type Value = Value<'static>;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "an object of class `{}`", self.def.class().name())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let session = self.session;
        let class = self.def.class().name();
        let Some(mut target) = self.def.constructors().construct() else {
            return Err(self.no_constructor(SourceShape::Map));
        };
        let strict = session
            .blueprint()
            .features()
            .contains(Features::FAIL_ON_UNKNOWN_PROPERTY);

        while let Some(key) = map.next_key::<String>()? {
            let Some(property) = self.def.find(&key) else {
                if strict && !self.def.is_ignorable(&key) {
                    return Err(session.fail(BindError::UnknownProperty {
                        class: class.to_string(),
                        property: key,
                    }));
                }
                map.next_value::<IgnoredAny>()?;
                continue;
            };
            let ty = property_type(session, self.ty, property, Direction::Read)
                .map_err(|e| session.fail::<A::Error>(e))?;
            let value = map.next_value_seed(ReadSeed::new(session, ty))?;
            property
                .set(&mut *target, value)
                .map_err(|e| session.fail::<A::Error>(BindError::access(class, property.name(), e)))?;
        }

        Ok(Value::Object(ObjectRef::Owned(target)))
    }

    fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
        match self.def.constructors().construct_from_text(v) {
            Some(obj) => Ok(Value::Object(ObjectRef::Owned(obj))),
            None => Err(self.no_constructor(SourceShape::Text)),
        }
    }

    fn visit_i64<E: Error>(self, v: i64) -> Result<Self::Value, E> {
        match self.def.constructors().construct_from_int(v) {
            Some(obj) => Ok(Value::Object(ObjectRef::Owned(obj))),
            None => Err(self.no_constructor(SourceShape::Integer)),
        }
    }

    fn visit_u64<E: Error>(self, v: u64) -> Result<Self::Value, E> {
        match i64::try_from(v) {
            Ok(v) => self.visit_i64(v),
            Err(_) => Err(self.session.fail(BindError::Value(ValueError::OutOfRange {
                value: v.to_string(),
                target: "i64",
            }))),
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
