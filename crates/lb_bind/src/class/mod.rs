//! Explicit class descriptions.
//!
//! Rust has no runtime reflection, so every class the engine binds is
//! described up front with a [`ClassBuilder`]: its shape, declared type
//! parameters, supertypes, fields, methods and constructors. Member access
//! goes through [`Getter`] and [`Setter`] trait objects built from plain
//! function pointers.
//!
//! ## Menu
//!
//! - [`ClassDescriptor`]: the description of one class.
//! - [`ClassBuilder`]: builds a [`ClassDescriptor`].
//! - [`FieldInfo`], [`MethodInfo`], [`Member`]: class members.
//! - [`Markers`]: typed metadata attached to classes and members.
//! - [`ClassRegistry`]: all known classes, seeded with the built-in ones.
//!
//! ## auto_register
//!
//! With the `auto_register` feature, descriptors submitted through
//! [`submit_class!`](crate::submit_class) are collected by
//! [`ClassRegistry::auto_register`].

// -----------------------------------------------------------------------------
// Modules

mod access;
mod builder;
mod descriptor;
mod markers;
mod member;
mod registry;

// -----------------------------------------------------------------------------
// Exports

pub use access::{Getter, Setter, Upcast};
pub use builder::ClassBuilder;
pub use descriptor::{ClassDescriptor, ClassShape, Constructors, EnumAccess};
pub use markers::{Alias, IgnoreProperties, Ignore, Include, Markers, PropertyOrder, Rename};
pub use member::{FieldInfo, Member, MethodInfo, MethodKind, Modifiers, Visibility};
pub use registry::{ClassRegistry, ClassSubmission};

pub(crate) use access::{ChainedUpcast, ProjectedGetter, ProjectedSetter};
