//! The dynamic value model exchanged with member accessors.
//!
//! ## Menu
//!
//! - [`Value`]: a borrowed or owned dynamic value.
//! - [`ObjectRef`]: a host object held inside a [`Value`].
//! - [`ToValue`], [`IntoValue`], [`FromValue`]: conversions from and to Rust types.
//! - [`impl_object_value!`](crate::impl_object_value): opts a host type into the conversions.

// -----------------------------------------------------------------------------
// Modules

mod builtin;
mod convert;
mod impls;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use convert::{FromValue, IntoValue, ToValue, take_object};
pub use value::{ObjectRef, Value};

pub(crate) use builtin::{date_from_value, date_to_value, identifier_from_text, identifier_to_text};
