//! Particle system: a pool of short-lived particles advanced once per frame.
//!
//! # Invariants
//! - Each frame runs cull, advect, render, spawn, in that order.
//! - Position integrates with the pre-decay velocity.
//! - Spawn count is `floor(spawn_rate * dt)`, independent of the random seed,
//!   and never exceeds [`MAX_SPAWN_PER_FRAME`].
//! - Newly spawned particles are first drawn on the following frame.

mod config;
mod system;

pub use config::{ConfigError, ParticleSystemConfig};
pub use system::{MAX_SPAWN_PER_FRAME, Particle, ParticleSystem};
