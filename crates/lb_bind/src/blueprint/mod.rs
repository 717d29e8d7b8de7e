//! Configuration.
//!
//! ## Menu
//!
//! - [`Blueprint`]: an immutable configuration with its own caches.
//! - [`BlueprintBuilder`]: builds a [`Blueprint`].
//! - [`Features`]: on/off switches.
//! - [`Session`]: per-call state derived from a blueprint.
//!
//! Customizing a blueprint never affects it: [`Blueprint::with`],
//! [`Blueprint::without`], [`Blueprint::with_visibility`] and
//! [`Blueprint::with_extension`] all return a new one.

// -----------------------------------------------------------------------------
// Modules

mod blueprint;
mod cache;
mod features;
mod session;

// -----------------------------------------------------------------------------
// Exports

pub use blueprint::{Blueprint, BlueprintBuilder};
pub use features::Features;
pub use session::Session;
