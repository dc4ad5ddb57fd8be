use glam::{Mat4, Vec4};
use seascape_common::{MeshHandle, ShaderHandle};

/// Projection and view matrices shared by every draw in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    pub projection: Mat4,
    pub view: Mat4,
}

impl Default for FrameView {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        }
    }
}

impl FrameView {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// One draw of a registered mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshDraw {
    pub shader: ShaderHandle,
    pub mesh: MeshHandle,
    pub model: Mat4,
}

/// One non-indexed draw of a surface with per-corner attributes.
///
/// All slices hold one entry per submitted vertex.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceDraw<'a> {
    pub shader: ShaderHandle,
    pub model: Mat4,
    pub positions: &'a [Vec4],
    pub colors: &'a [Vec4],
    pub offsets: &'a [Vec4],
    pub normals: &'a [Vec4],
}

impl SurfaceDraw<'_> {
    pub fn corner_count(&self) -> usize {
        self.positions.len()
    }

    /// True when every attribute slice matches the position count.
    pub fn is_consistent(&self) -> bool {
        let n = self.positions.len();
        self.colors.len() == n && self.offsets.len() == n && self.normals.len() == n
    }
}

/// Renderer-agnostic draw interface. All backends implement this trait.
///
/// Draws issued between two `begin_frame` calls belong to one frame. The
/// renderer only reads what it is given.
pub trait FrameRenderer {
    /// Start a frame with the given camera.
    fn begin_frame(&mut self, view: FrameView);

    /// Draw a registered mesh with a model transform.
    fn draw_mesh(&mut self, draw: MeshDraw);

    /// Draw a surface from per-corner attribute arrays.
    fn draw_surface(&mut self, draw: SurfaceDraw<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_view_default_is_identity() {
        let view = FrameView::default();
        assert_eq!(view.view_projection(), Mat4::IDENTITY);
    }

    #[test]
    fn surface_consistency() {
        let positions = [Vec4::W; 3];
        let colors = [Vec4::ONE; 3];
        let offsets = [Vec4::ZERO; 3];
        let normals = [Vec4::Y; 2];
        let draw = SurfaceDraw {
            shader: ShaderHandle::WATER,
            model: Mat4::IDENTITY,
            positions: &positions,
            colors: &colors,
            offsets: &offsets,
            normals: &normals,
        };
        assert_eq!(draw.corner_count(), 3);
        assert!(!draw.is_consistent());
    }
}
