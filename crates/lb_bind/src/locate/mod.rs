//! Handler lookup.
//!
//! ## Menu
//!
//! - [`DispatchTag`]: the closed set of handling strategies.
//! - [`classify_type`]: classifies a resolved type without caching.
//! - [`HandlerLocator`]: classification and handler lookup for one session.
//! - [`ValueReader`], [`ValueWriter`]: the handlers themselves.
//!
//! Lookup order for a type: the providers of the pipeline, then the
//! built-in handler of its [`DispatchTag`]. Built-in handlers for objects
//! and enumerations come from the modifiers' definition hooks or from the
//! introspector. Finally the modifiers' wrap hooks see every built-in
//! handler.

// -----------------------------------------------------------------------------
// Modules

mod handler;
mod locator;
mod tag;

// -----------------------------------------------------------------------------
// Exports

pub use handler::{ValueReader, ValueWriter};
pub use locator::HandlerLocator;
pub use tag::{DispatchTag, classify_type};
