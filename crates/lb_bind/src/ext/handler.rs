use crate::blueprint::{Blueprint, Session};
use crate::error::BindError;
use crate::locate::{ValueReader, ValueWriter};
use crate::types::{DeclaredType, ResolvedType, TypeBindings};
use crate::value::Value;

// -----------------------------------------------------------------------------
// Custom handlers

/// A custom reader.
///
/// Pulls one value of type `ty` from the deserializer. Objects are returned
/// as owned [`Value::Object`]s.
///
/// # Examples
///
/// ```
/// use lb_bind::error::BindError;
/// use lb_bind::ext::{ReadContext, ValueRead};
/// use lb_bind::types::ResolvedType;
/// use lb_bind::value::Value;
///
/// /// Reads any text upper-cased.
/// struct Shout;
///
/// impl ValueRead for Shout {
///     fn read<'de>(
///         &self,
///         _cx: &ReadContext<'_>,
///         _ty: &ResolvedType,
///         de: &mut dyn erased_serde::Deserializer<'de>,
///     ) -> Result<Value<'static>, BindError> {
///         let text: String = erased_serde::deserialize(de)
///             .map_err(|e| BindError::handler("String", e))?;
///         Ok(Value::text(text.to_uppercase()))
///     }
/// }
/// ```
pub trait ValueRead: Send + Sync + 'static {
    fn read<'de>(
        &self,
        cx: &ReadContext<'_>,
        ty: &ResolvedType,
        de: &mut dyn erased_serde::Deserializer<'de>,
    ) -> Result<Value<'static>, BindError>;
}

/// A custom writer.
///
/// Converts a value into the value to emit in its place. The returned value
/// is written with built-in handling at its own level, so returning an
/// object of the same class does not call this writer again.
pub trait ValueWrite: Send + Sync + 'static {
    fn write<'v>(
        &self,
        cx: &WriteContext<'_>,
        ty: &ResolvedType,
        value: Value<'v>,
    ) -> Result<Value<'v>, BindError>;
}

// -----------------------------------------------------------------------------
// ReadContext

/// What a [`ValueRead`] can call back into while reading.
#[derive(Clone, Copy)]
pub struct ReadContext<'a> {
    session: &'a Session,
}

impl<'a> ReadContext<'a> {
    #[inline]
    pub(crate) fn new(session: &'a Session) -> Self {
        Self { session }
    }

    #[inline]
    pub fn blueprint(&self) -> &'a Blueprint {
        self.session.blueprint()
    }

    /// Resolves a declared type without bindings.
    #[inline]
    pub fn resolve(&self, declared: &DeclaredType) -> Result<ResolvedType, BindError> {
        self.blueprint().resolver().resolve(&TypeBindings::empty(), declared)
    }

    /// Reads a nested value of type `ty` with whatever handler it has.
    pub fn read<'de>(
        &self,
        ty: &ResolvedType,
        de: &mut dyn erased_serde::Deserializer<'de>,
    ) -> Result<Value<'static>, BindError> {
        let reader = self.session.reader_for(ty)?;
        self.read_with(&reader, ty, de)
    }

    /// Reads with a given handler, typically the one a wrapper replaced.
    #[inline]
    pub fn read_with<'de>(
        &self,
        reader: &ValueReader,
        ty: &ResolvedType,
        de: &mut dyn erased_serde::Deserializer<'de>,
    ) -> Result<Value<'static>, BindError> {
        crate::serde::read_erased(self.session, reader, ty, de)
    }
}

// -----------------------------------------------------------------------------
// WriteContext

/// What a [`ValueWrite`] can call back into while writing.
#[derive(Clone, Copy)]
pub struct WriteContext<'a> {
    session: &'a Session,
}

impl<'a> WriteContext<'a> {
    #[inline]
    pub(crate) fn new(session: &'a Session) -> Self {
        Self { session }
    }

    #[inline]
    pub fn blueprint(&self) -> &'a Blueprint {
        self.session.blueprint()
    }

    /// Renders a nested value with whatever handler its type has.
    #[inline]
    pub fn render<'v>(
        &self,
        value: Value<'v>,
        declared: Option<&ResolvedType>,
    ) -> Result<Value<'v>, BindError> {
        self.session.render(value, declared)
    }

    /// Renders with a given handler, typically the one a wrapper replaced.
    #[inline]
    pub fn render_with<'v>(
        &self,
        writer: &ValueWriter,
        ty: &ResolvedType,
        value: Value<'v>,
    ) -> Result<Value<'v>, BindError> {
        self.session.render_with(writer, ty, value)
    }
}
