//! Animated water surface.
//!
//! A flat grid is generated once; every frame a traveling sine wave displaces
//! each face corner vertically and the face normal is recomputed from the
//! displaced corners. Offsets are per face corner, so neighbouring faces never
//! share a value and the surface shades faceted.

mod field;
mod grid;

pub use field::{EXTENT, SIDE_LENGTH, SPATIAL_SCALE, WaterField, WaterFrame};
pub use grid::{WaterError, generate_plane};
