//! Property introspection.
//!
//! The [`Introspector`] walks a class and its ancestors, base first, and
//! merges fields, getters and setters into an [`ObjectDefinition`]: an
//! ordered list of named [`Property`] values for one [`Direction`].
//!
//! Explicit metadata (ignore, rename, include, aliases, ordering) is only
//! read through a [`MetadataSource`]. [`NoMetadata`] ignores all of it,
//! [`DeclaredMarkers`] reads the [`Markers`](crate::class::Markers) attached
//! to the descriptors, and [`MarkerOverrides`] layers an override table over
//! them.
//!
//! ## Menu
//!
//! - [`Introspector`], [`IntrospectConfig`]: builds definitions.
//! - [`ObjectDefinition`], [`Property`], [`Accessor`]: the result.
//! - [`VisibilityConfig`], [`VisibilityThreshold`]: implicit visibility rules.
//! - [`MetadataSource`]: explicit metadata.
//! - [`decapitalize`], [`accessor_name`]: canonical property names.

// -----------------------------------------------------------------------------
// Modules

mod definition;
mod introspector;
mod metadata;
mod naming;
mod visibility;

// -----------------------------------------------------------------------------
// Exports

pub use definition::{Accessor, AccessorFlags, AccessorKind, Direction, ObjectDefinition, Property};
pub use introspector::{IntrospectConfig, Introspector};
pub use metadata::{DeclaredMarkers, ExplicitName, MarkerOverrides, MetadataSource, NoMetadata};
pub use naming::{accessor_name, decapitalize};
pub use visibility::{VisibilityConfig, VisibilityThreshold};
