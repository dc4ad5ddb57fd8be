//! wgpu render backend for the seascape scene.
//!
//! Collects the draws of a frame through [`seascape_render::FrameRenderer`]
//! and submits them in one render pass: the water surface first, then every
//! registered mesh as a single instanced draw.
//!
//! # Invariants
//! - The renderer only reads the draws it is given; simulations own their data.
//! - Vertex attributes are bound by name through the program layouts; a name
//!   the program lacks is skipped.
//! - GPU buffers grow on demand and are released on drop.

mod gpu;
mod shaders;

pub use gpu::WgpuRenderer;
