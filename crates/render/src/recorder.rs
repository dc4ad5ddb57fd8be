use glam::Mat4;
use seascape_common::{MeshHandle, ShaderHandle};
use std::fmt;

use crate::program::{ProgramLayout, ShaderProgram};
use crate::renderer::{FrameRenderer, FrameView, MeshDraw, SurfaceDraw};

/// Summary of a surface draw kept by the recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceRecord {
    pub shader: ShaderHandle,
    pub model: Mat4,
    pub corner_count: usize,
    /// Attributes the program accepted, in binding order.
    pub bound: Vec<&'static str>,
    /// Mean vertical offset over all corners.
    pub mean_offset: f32,
}

/// Headless renderer that records the draws of the latest frame.
///
/// Useful for CLI output, logging, and testing simulations against the
/// draw interface.
#[derive(Debug, Default)]
pub struct DrawRecorder {
    frames: u64,
    total_mesh_draws: u64,
    view: FrameView,
    mesh_draws: Vec<MeshDraw>,
    surfaces: Vec<SurfaceRecord>,
}

impl DrawRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames started so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Mesh draws across all frames.
    pub fn total_mesh_draws(&self) -> u64 {
        self.total_mesh_draws
    }

    pub fn view(&self) -> &FrameView {
        &self.view
    }

    pub fn mesh_draws(&self) -> &[MeshDraw] {
        &self.mesh_draws
    }

    pub fn surfaces(&self) -> &[SurfaceRecord] {
        &self.surfaces
    }

    /// Draws of one mesh in the latest frame.
    pub fn draws_of(&self, mesh: MeshHandle) -> impl Iterator<Item = &MeshDraw> {
        self.mesh_draws.iter().filter(move |d| d.mesh == mesh)
    }

    /// Clear the latest frame without starting a new one.
    pub fn clear(&mut self) {
        self.mesh_draws.clear();
        self.surfaces.clear();
    }
}

impl FrameRenderer for DrawRecorder {
    fn begin_frame(&mut self, view: FrameView) {
        self.frames += 1;
        self.view = view;
        self.clear();
    }

    fn draw_mesh(&mut self, draw: MeshDraw) {
        self.total_mesh_draws += 1;
        self.mesh_draws.push(draw);
    }

    fn draw_surface(&mut self, draw: SurfaceDraw<'_>) {
        if !draw.is_consistent() {
            tracing::warn!(
                "surface draw with mismatched attributes: {} positions",
                draw.corner_count()
            );
        }
        let bound = match ProgramLayout::for_handle(draw.shader) {
            Some(layout) => ["vertex", "colors", "normals", "offset"]
                .into_iter()
                .filter(|name| layout.attribute_location(name).is_some())
                .collect(),
            None => {
                tracing::debug!("surface drawn with unknown shader {:?}", draw.shader);
                Vec::new()
            }
        };
        let mean_offset = if draw.offsets.is_empty() {
            0.0
        } else {
            draw.offsets.iter().map(|o| o.y).sum::<f32>() / draw.offsets.len() as f32
        };
        self.surfaces.push(SurfaceRecord {
            shader: draw.shader,
            model: draw.model,
            corner_count: draw.corner_count(),
            bound,
            mean_offset,
        });
    }
}

impl fmt::Display for DrawRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Frame {} ===", self.frames)?;
        writeln!(f, "Mesh draws: {}", self.mesh_draws.len())?;
        let mut per_mesh: Vec<(MeshHandle, usize)> = Vec::new();
        for draw in &self.mesh_draws {
            match per_mesh.iter_mut().find(|(m, _)| *m == draw.mesh) {
                Some((_, n)) => *n += 1,
                None => per_mesh.push((draw.mesh, 1)),
            }
        }
        for (mesh, count) in per_mesh {
            writeln!(f, "  mesh {:>3}: {count}", mesh.0)?;
        }
        for s in &self.surfaces {
            writeln!(
                f,
                "Surface: {} corners, bound [{}], mean offset {:.3}",
                s.corner_count,
                s.bound.join(", "),
                s.mean_offset
            )?;
        }
        Ok(())
    }
}
