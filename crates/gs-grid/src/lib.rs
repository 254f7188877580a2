//! # gs-grid
//!
//! Grid axes and Cartesian enumeration for GridScape.
//!
//! Provides the [`GridAxis`] capability trait with real, integer, and boolean
//! variants, the ordered [`GridSpace`] collection with binding validation,
//! and the mixed-radix [`Odometer`] that walks the full cross-product in
//! lexicographic order while reporting which axes changed at each step.

mod axis;
mod odometer;
mod space;

pub use axis::{build_axis, BooleanAxis, GridAxis, IntegerAxis, RealAxis};
pub use odometer::{Odometer, Step};
pub use space::GridSpace;
