use alloc::vec::Vec;
use core::fmt::{self, Formatter};

use serde_core::de::{Deserializer, Error, MapAccess, Visitor};

use super::ReadSeed;
use crate::blueprint::Session;
use crate::types::ResolvedType;
use crate::value::Value;

/// A [`Visitor`] for maps, reading keys and values by their own types.
pub(super) struct MapVisitor<'a> {
    pub session: &'a Session,
    pub key: &'a ResolvedType,
    pub value: &'a ResolvedType,
}

impl<'de> Visitor<'de> for MapVisitor<'_> {
    type Value = Value<'static>;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "a map from `{}` to `{}`", self.key, self.value)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or_default());
        while let Some(key) = map.next_key_seed(ReadSeed::new(self.session, self.key.clone()))? {
            let value = map.next_value_seed(ReadSeed::new(self.session, self.value.clone()))?;
            entries.push((key, value));
        }
        Ok(Value::Map(entries))
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
