//! Generic type resolution.
//!
//! ## Menu
//!
//! - [`DeclaredType`]: a type reference as written in a class declaration.
//! - [`Typed`]: maps a Rust type to its [`DeclaredType`].
//! - [`ResolvedType`]: the canonical, immutable type graph node.
//! - [`TypeBindings`]: the type arguments bound to one class's parameters.
//! - [`TypeResolver`]: turns declared types into resolved ones, with a shared cache.
//!
//! Self-referential declarations such as `Tree<T> extends Branch<Tree<T>>`
//! resolve to a graph where the inner reference is a [`TypeKind::Recursive`]
//! placeholder. The placeholder is patched once the outer node is built and
//! then compares equal to it. The link is weak: when the outer node has been
//! freed, the placeholder rebuilds an equal one from the registry.

// -----------------------------------------------------------------------------
// Modules

mod bindings;
mod declared;
mod resolved;
mod resolver;

// -----------------------------------------------------------------------------
// Exports

pub use bindings::TypeBindings;
pub use declared::{DeclaredType, TypeVariable, Typed};
pub use resolved::{ResolvedType, TypeKind};
pub use resolver::{DEFAULT_CACHE_CAPACITY, TypeResolver};
