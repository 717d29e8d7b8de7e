use alloc::string::ToString;
use core::cell::RefCell;
use core::fmt::Display;

use serde_core::de::DeserializeSeed;
use serde_core::Deserializer;

use super::Blueprint;
use crate::error::BindError;
use crate::locate::{DispatchTag, HandlerLocator, ValueReader, ValueWriter};
use crate::serde::ReadSeed;
use crate::types::ResolvedType;
use crate::value::Value;

/// The state of one read or write call.
///
/// Holds the [`HandlerLocator`] with its memo, and the error that aborted
/// the call while it travels through the token layer as a plain message.
/// A session is cheap to create and must not be shared between threads.
pub struct Session {
    locator: HandlerLocator,
    error: RefCell<Option<BindError>>,
}

impl Session {
    pub(crate) fn new(blueprint: Blueprint) -> Self {
        Self {
            locator: HandlerLocator::new(blueprint),
            error: RefCell::new(None),
        }
    }

    #[inline]
    pub fn blueprint(&self) -> &Blueprint {
        self.locator.blueprint()
    }

    #[inline]
    pub fn locator(&self) -> &HandlerLocator {
        &self.locator
    }

    #[inline]
    pub fn classify(&self, ty: &ResolvedType) -> Result<DispatchTag, BindError> {
        self.locator.classify(ty)
    }

    #[inline]
    pub fn reader_for(&self, ty: &ResolvedType) -> Result<ValueReader, BindError> {
        self.locator.reader_for(ty)
    }

    #[inline]
    pub fn writer_for(&self, ty: &ResolvedType) -> Result<ValueWriter, BindError> {
        self.locator.writer_for(ty)
    }

    /// Reads a value of type `ty`.
    pub fn read_value<'de, D: Deserializer<'de>>(
        &self,
        ty: &ResolvedType,
        deserializer: D,
    ) -> Result<Value<'static>, BindError> {
        self.error.take();
        ReadSeed::new(self, ty.clone())
            .deserialize(deserializer)
            .map_err(|e| self.recover(e))
    }

    /// Renders `value` into plain data.
    ///
    /// `declared` is the type the value was declared with, if known. Objects
    /// are always rendered by their own class.
    #[inline]
    pub fn render<'v>(
        &self,
        value: Value<'v>,
        declared: Option<&ResolvedType>,
    ) -> Result<Value<'v>, BindError> {
        crate::serde::render(self, value, declared)
    }

    #[inline]
    pub fn render_with<'v>(
        &self,
        writer: &ValueWriter,
        ty: &ResolvedType,
        value: Value<'v>,
    ) -> Result<Value<'v>, BindError> {
        crate::serde::render_with(self, writer, ty, value)
    }

    // -------------------------------------------------------------------------
    // Error slot

    /// Parks `err` and returns a token-layer error carrying its message.
    pub(crate) fn fail<E: serde_core::de::Error>(&self, err: BindError) -> E {
        let out = E::custom(&err);
        *self.error.borrow_mut() = Some(err);
        out
    }

    /// Takes the parked error back, or wraps a token-layer error.
    pub(crate) fn recover(&self, err: impl Display) -> BindError {
        self.error
            .take()
            .unwrap_or_else(|| BindError::Format(err.to_string()))
    }
}
