//! Scene kernel: frame clock, scene angles and the transforms derived from them.
//!
//! # Invariants
//! - Scene state only changes through `SceneState::advance`.
//! - Every transform is a pure function of the current state.
//! - Simulation time wraps at `SceneConfig::max_time`; phase is derived, never stored.

pub mod camera;
pub mod clock;
pub mod scene;

pub use camera::OrbitCamera;
pub use clock::FrameClock;
pub use scene::{SceneConfig, SceneState, rotate_about};
