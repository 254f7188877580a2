//! # gs-engine
//!
//! The GridScape surface-scan engine: validates the grid configuration
//! against the parameter state, walks the full cross-product of all grid
//! axes in lexicographic order, brackets every objective evaluation with the
//! state's dirtiness lifecycle, and streams one row per grid point to the
//! attached reporting sinks.

mod companion;
mod engine;

pub use companion::CompanionSetter;
pub use engine::Engine;
