// -----------------------------------------------------------------------------
// Modules

mod render;
mod rendered;

// -----------------------------------------------------------------------------
// Exports

pub use rendered::Rendered;

pub(crate) use render::{render, render_with};
