use alloc::string::ToString;

use crate::error::BindError;
use crate::value::{ObjectRef, Value};

/// Reads and writes values of tree-node classes.
///
/// `read` returns the node as an owned object. `write` turns a node into the
/// data to emit in its place.
pub trait TreeCodec: Send + Sync + 'static {
    fn read(&self, de: &mut dyn erased_serde::Deserializer<'_>) -> Result<Value<'static>, BindError>;

    fn write<'v>(&self, node: Value<'v>) -> Result<Value<'v>, BindError>;
}

/// The default codec, using [`Value`] itself as the tree node.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueTreeCodec;

impl TreeCodec for ValueTreeCodec {
    fn read(&self, de: &mut dyn erased_serde::Deserializer<'_>) -> Result<Value<'static>, BindError> {
        crate::serde::read_natural(de)
            .map(Value::owned)
            .map_err(|e| BindError::Format(e.to_string()))
    }

    fn write<'v>(&self, node: Value<'v>) -> Result<Value<'v>, BindError> {
        match node {
            Value::Object(ObjectRef::Borrowed(obj)) => obj
                .downcast_ref::<Value<'static>>()
                .map(Value::reborrow)
                .ok_or_else(|| BindError::handler("Value", "not a tree node")),
            Value::Object(ObjectRef::Owned(obj)) => obj
                .downcast::<Value<'static>>()
                .map(|node| *node)
                .map_err(|_| BindError::handler("Value", "not a tree node")),
            data => Ok(data),
        }
    }
}
