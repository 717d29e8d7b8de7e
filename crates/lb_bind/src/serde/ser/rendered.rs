use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_core::ser::{Error, SerializeMap, SerializeSeq};
use serde_core::{Serialize, Serializer};

use crate::value::Value;

/// Plain data ready to be serialized.
///
/// Made by [`Blueprint::to_serialize`](crate::blueprint::Blueprint::to_serialize),
/// which has already replaced every host object with the data its writer
/// produced.
///
/// # Examples
///
/// ```
/// use lb_bind::blueprint::Blueprint;
/// use lb_bind::value::ToValue;
///
/// let blueprint = Blueprint::default();
/// let names = vec!["a".to_string(), "b".to_string()];
/// let rendered = blueprint.to_serialize(names.to_value()).unwrap();
/// assert_eq!(serde_json::to_string(&rendered).unwrap(), r#"["a","b"]"#);
/// ```
#[derive(Debug)]
pub struct Rendered<'v>(Value<'v>);

impl<'v> Rendered<'v> {
    #[inline]
    pub(crate) fn new(value: Value<'v>) -> Self {
        Self(value)
    }

    #[inline]
    pub fn as_value(&self) -> &Value<'v> {
        &self.0
    }

    #[inline]
    pub fn into_value(self) -> Value<'v> {
        self.0
    }
}

impl Serialize for Rendered<'_> {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DataSerializer(&self.0).serialize(serializer)
    }
}

/// Serializes one level of rendered data.
struct DataSerializer<'a, 'v>(&'a Value<'v>);

impl Serialize for DataSerializer<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Char(v) => serializer.serialize_char(*v),
            Value::I8(v) => serializer.serialize_i8(*v),
            Value::I16(v) => serializer.serialize_i16(*v),
            Value::I32(v) => serializer.serialize_i32(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::I128(v) => serializer.serialize_i128(*v),
            Value::U8(v) => serializer.serialize_u8(*v),
            Value::U16(v) => serializer.serialize_u16(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::F32(v) => serializer.serialize_f32(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::Text(v) => serializer.serialize_str(v),
            Value::Bytes(v) => {
                if serializer.is_human_readable() {
                    serializer.serialize_str(&STANDARD.encode(v))
                } else {
                    serializer.serialize_bytes(v)
                }
            }
            Value::Seq(items) => {
                let mut state = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    state.serialize_element(&DataSerializer(item))?;
                }
                state.end()
            }
            Value::Map(entries) => {
                let mut state = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    state.serialize_entry(&DataSerializer(key), &DataSerializer(value))?;
                }
                state.end()
            }
            Value::Object(obj) => Err(S::Error::custom(format_args!(
                "object {obj:?} was not rendered"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::borrow::Cow;

    use super::*;

    #[test]
    fn bytes_follow_the_format() {
        let rendered = Rendered::new(Value::Bytes(Cow::Borrowed(b"hi")));
        assert_eq!(serde_json::to_string(&rendered).unwrap(), r#""aGk=""#);
    }

    #[test]
    fn objects_are_refused() {
        let rendered = Rendered::new(Value::owned(7_u8));
        assert!(serde_json::to_string(&rendered).is_err());
    }

    #[test]
    fn map_keys_keep_their_kind() {
        let rendered = Rendered::new(Value::Map(vec![(Value::I32(1), Value::text("one"))]));
        assert_eq!(serde_json::to_string(&rendered).unwrap(), r#"{"1":"one"}"#);
    }
}
