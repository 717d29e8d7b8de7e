#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Alloc

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod blueprint;
pub mod class;
pub mod error;
pub mod ext;
pub mod introspect;
pub mod locate;
pub mod serde;
pub mod types;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports {
    #[cfg(feature = "auto_register")]
    pub use inventory;
}

pub use blueprint::{Blueprint, Features};
pub use error::BindError;
pub use value::{FromValue, IntoValue, ToValue, Value};
