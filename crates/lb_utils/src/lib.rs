#![doc = include_str!("../README.md")]
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod bounded_map;
mod typeid_map;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use bounded_map::BoundedMap;
pub use typeid_map::TypeIdMap;
