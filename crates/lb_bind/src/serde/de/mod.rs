// -----------------------------------------------------------------------------
// Modules

mod natural;
mod seed;

mod array_visitor;
mod collection_visitor;
mod enum_visitor;
mod map_visitor;
mod object_visitor;

// -----------------------------------------------------------------------------
// Exports

pub use seed::ReadSeed;

pub(crate) use natural::read_natural;
pub(crate) use seed::read_erased;
