//! Rendering adapter: renderer-agnostic draw interface.
//!
//! # Invariants
//! - Simulations issue draws through `FrameRenderer`; they never see a GPU type.
//! - A missing shader binding is skipped, never an error.
//!
//! `DrawRecorder` implements the interface without a GPU. It backs the CLI
//! and the tests; the wgpu backend lives in `seascape-render-wgpu`.

mod program;
mod recorder;
mod renderer;

pub use program::{ProgramLayout, ShaderProgram};
pub use recorder::{DrawRecorder, SurfaceRecord};
pub use renderer::{FrameRenderer, FrameView, MeshDraw, SurfaceDraw};
