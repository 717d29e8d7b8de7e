//! Extension points.
//!
//! Host code customizes a [`Blueprint`](crate::blueprint::Blueprint) by
//! registering [`Extension`]s. An extension receives an [`ExtensionContext`]
//! while the blueprint is being built and adds [`Provider`]s and
//! [`Modifier`]s to the [`Pipeline`], or replaces its [`TreeCodec`].
//!
//! ## Menu
//!
//! - [`ValueRead`], [`ValueWrite`]: custom handlers.
//! - [`Provider`], [`ProviderChain`]: supply handlers for whole types.
//! - [`Modifier`], [`ModifierChain`]: adjust definitions and built-in handlers.
//! - [`TreeCodec`], [`ValueTreeCodec`]: reads and writes tree-node values.
//! - [`SimpleProvider`]: handlers keyed by class name.
//! - [`MarkerExtension`]: honors class and member markers.
//!
//! ## Precedence
//!
//! Providers are asked front to back and the first answer wins. `insert_*`
//! puts an entry at the front, `append_*` at the back. Modifier wrap hooks
//! all run, front to back, each one seeing the result of the previous one.

// -----------------------------------------------------------------------------
// Modules

mod context;
mod handler;
mod markers;
mod modifier;
mod provider;
mod simple;
mod tree;

// -----------------------------------------------------------------------------
// Exports

pub use context::{Extension, ExtensionContext, Pipeline};
pub use handler::{ReadContext, ValueRead, ValueWrite, WriteContext};
pub use markers::MarkerExtension;
pub use modifier::{DefinitionContext, Modifier, ModifierChain};
pub use provider::{Provider, ProviderChain};
pub use simple::SimpleProvider;
pub use tree::{TreeCodec, ValueTreeCodec};
