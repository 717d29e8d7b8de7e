use alloc::vec::Vec;
use core::fmt::{self, Formatter};

use serde_core::de::{Deserializer, Error, SeqAccess, Visitor};

use super::ReadSeed;
use crate::blueprint::Session;
use crate::types::ResolvedType;
use crate::value::Value;

/// Reads the elements of a sequence, each with the handler of `element`.
pub(super) fn read_elements<'de, A: SeqAccess<'de>>(
    session: &Session,
    element: &ResolvedType,
    mut seq: A,
) -> Result<Vec<Value<'static>>, A::Error> {
    let mut items = Vec::with_capacity(seq.size_hint().unwrap_or_default());
    while let Some(item) = seq.next_element_seed(ReadSeed::new(session, element.clone()))? {
        items.push(item);
    }
    Ok(items)
}

/// A [`Visitor`] for collections and ordered lists.
pub(super) struct CollectionVisitor<'a> {
    pub session: &'a Session,
    pub element: &'a ResolvedType,
}

impl<'de> Visitor<'de> for CollectionVisitor<'_> {
    type Value = Value<'static>;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "a sequence of `{}`", self.element)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        read_elements(self.session, self.element, seq).map(Value::Seq)
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
