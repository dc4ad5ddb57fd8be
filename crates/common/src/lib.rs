//! Shared types for the seascape workspace: resource handles, colors and the
//! seedable random sampler used by the simulations.

pub mod sampling;
pub mod types;

pub use sampling::Sampler;
pub use types::{Color, MeshHandle, ShaderHandle};

/// Full turn in radians.
pub const TAU: f32 = std::f32::consts::TAU;
