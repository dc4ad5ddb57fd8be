use glam::{Mat4, Vec3, Vec4};
use seascape_assets::Mesh;
use seascape_common::{Color, ShaderHandle};
use seascape_render::{FrameRenderer, SurfaceDraw};

use crate::grid::{WaterError, generate_plane};

/// Divisor applied to grid coordinates before the sine.
pub const SPATIAL_SCALE: f32 = 10.0;
/// Vertices per side of the scene's water grid.
pub const SIDE_LENGTH: u32 = 100;
/// Half-width of the scene's water grid on X and Z.
pub const EXTENT: f32 = 32.0;

/// Per-corner arrays of one computed frame, ready for a single draw.
#[derive(Debug, Clone, Copy)]
pub struct WaterFrame<'a> {
    pub positions: &'a [Vec4],
    pub colors: &'a [Vec4],
    pub offsets: &'a [Vec4],
    pub normals: &'a [Vec4],
}

impl<'a> WaterFrame<'a> {
    pub fn corner_count(&self) -> usize {
        self.positions.len()
    }

    /// Surface draw of this frame with the water program.
    pub fn surface(&self, model: Mat4) -> SurfaceDraw<'a> {
        SurfaceDraw {
            shader: ShaderHandle::WATER,
            model,
            positions: self.positions,
            colors: self.colors,
            offsets: self.offsets,
            normals: self.normals,
        }
    }
}

/// Static grid plus the scratch buffers rewritten by every frame.
///
/// The field keeps no state between frames: the output of
/// [`compute_frame`](Self::compute_frame) depends only on the phase.
#[derive(Debug, Clone)]
pub struct WaterField {
    grid: Mesh,
    side_length: u32,
    positions: Vec<Vec4>,
    colors: Vec<Vec4>,
    offsets: Vec<Vec4>,
    normals: Vec<Vec4>,
}

impl WaterField {
    /// Field over a `side_length x side_length` grid spanning `[min, max]`.
    pub fn new(side_length: u32, min: f32, max: f32) -> Result<Self, WaterError> {
        let grid = generate_plane(side_length, min, max)?;
        let positions = grid.draw_positions();
        let corners = positions.len();
        tracing::info!(side_length, corners, "water field ready");
        Ok(Self {
            grid,
            side_length,
            positions,
            colors: vec![Color::WATER.to_vec4(); corners],
            offsets: vec![Vec4::ZERO; corners],
            normals: vec![Vec4::Y; corners],
        })
    }

    /// The scene's water: 100 vertices per side over [-32, 32].
    pub fn standard() -> Result<Self, WaterError> {
        Self::new(SIDE_LENGTH, -EXTENT, EXTENT)
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.colors.fill(color.to_vec4());
        self
    }

    pub fn grid(&self) -> &Mesh {
        &self.grid
    }

    pub fn side_length(&self) -> u32 {
        self.side_length
    }

    pub fn corner_count(&self) -> usize {
        self.positions.len()
    }

    /// Vertical offset of grid vertex `index` at `phase`.
    pub fn offset_at(&self, index: u32, phase: f32) -> f32 {
        let grid_x = (index % self.side_length) as f32;
        let grid_y = (index / self.side_length) as f32;
        ((grid_x + grid_y) / SPATIAL_SCALE + phase).sin()
    }

    /// Recompute offsets and faceted normals for `phase`.
    pub fn compute_frame(&mut self, phase: f32) -> WaterFrame<'_> {
        for (f, face) in self.grid.faces.iter().enumerate() {
            let base = f * 3;
            let mut displaced = [Vec3::ZERO; 3];
            for (corner, &index) in face.iter().enumerate() {
                let offset = self.offset_at(index, phase);
                self.offsets[base + corner] = Vec4::new(0.0, offset, 0.0, 0.0);
                displaced[corner] = self.positions[base + corner].truncate() + Vec3::Y * offset;
            }
            let [p0, p1, p2] = displaced;
            let normal = (p0 - p2)
                .cross(p1 - p2)
                .try_normalize()
                .unwrap_or(Vec3::Y)
                .extend(0.0);
            self.normals[base..base + 3].fill(normal);
        }
        WaterFrame {
            positions: &self.positions,
            colors: &self.colors,
            offsets: &self.offsets,
            normals: &self.normals,
        }
    }

    /// Compute the frame for `phase` and submit it as one surface draw.
    pub fn draw<R: FrameRenderer + ?Sized>(&mut self, phase: f32, model: Mat4, renderer: &mut R) {
        let surface = self.compute_frame(phase).surface(model);
        renderer.draw_surface(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seascape_common::TAU;
    use seascape_render::{DrawRecorder, FrameView};

    fn offsets(field: &mut WaterField, phase: f32) -> Vec<f32> {
        field.compute_frame(phase).offsets.iter().map(|o| o.y).collect()
    }

    #[test]
    fn small_field_matches_hand_computed_corners() {
        let mut field = WaterField::new(2, -1.0, 1.0).unwrap();
        let frame = field.compute_frame(0.0);
        let got: Vec<f32> = frame.offsets.iter().map(|o| o.y).collect();
        let s1 = 0.1f32.sin();
        let s2 = 0.2f32.sin();
        let want = [0.0, s1, s1, s1, s2, s1];
        for (g, w) in got.iter().zip(want) {
            assert!((g - w).abs() < 1e-6, "{got:?}");
        }

        // First face: corners 0, 1, 2 of the grid.
        let p0 = Vec3::new(-1.0, 0.0, -1.0);
        let p1 = Vec3::new(-1.0, s1, 1.0);
        let p2 = Vec3::new(1.0, s1, -1.0);
        let expected = (p0 - p2).cross(p1 - p2).normalize();
        for n in &frame.normals[0..3] {
            assert!((n.truncate() - expected).length() < 1e-5);
            assert_eq!(n.w, 0.0);
        }
    }

    #[test]
    fn offsets_repeat_every_full_turn() {
        let mut field = WaterField::new(20, -5.0, 5.0).unwrap();
        for phase in [0.0, 1.3, 4.0] {
            let a = offsets(&mut field, phase);
            let b = offsets(&mut field, phase + TAU);
            for (x, y) in a.iter().zip(&b) {
                assert!((x - y).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn normals_are_unit_and_face_up() {
        let mut field = WaterField::standard().unwrap();
        for phase in [0.0, 0.7, 2.5] {
            let frame = field.compute_frame(phase);
            for n in frame.normals {
                assert!((n.truncate().length() - 1.0).abs() < 1e-4);
                assert!(n.y > 0.9);
            }
        }
    }

    #[test]
    fn attributes_are_per_corner_and_shared_within_face() {
        let mut field = WaterField::new(6, -3.0, 3.0).unwrap();
        let corners = field.grid().corner_count();
        let frame = field.compute_frame(0.4);
        assert_eq!(frame.corner_count(), corners);
        assert_eq!(frame.colors.len(), corners);
        assert_eq!(frame.offsets.len(), corners);
        assert_eq!(frame.normals.len(), corners);
        for chunk in frame.normals.chunks(3) {
            assert_eq!(chunk[0], chunk[1]);
            assert_eq!(chunk[1], chunk[2]);
        }
        assert!(frame.colors.iter().all(|&c| c == Color::WATER.to_vec4()));
    }

    #[test]
    fn offsets_follow_grid_coordinates() {
        let field = WaterField::new(10, -1.0, 1.0).unwrap();
        // Index 23 is column 3, row 2.
        assert!((field.offset_at(23, 0.5) - (0.5f32 + 0.5).sin()).abs() < 1e-6);
    }

    #[test]
    fn draw_submits_one_water_surface() {
        let mut field = WaterField::new(4, -1.0, 1.0)
            .unwrap()
            .with_color(Color::rgba(0.1, 0.2, 0.3, 1.0));
        let mut recorder = DrawRecorder::new();
        recorder.begin_frame(FrameView::default());
        let model = Mat4::from_translation(Vec3::new(0.0, 0.25, 0.0));
        field.draw(0.0, model, &mut recorder);

        let surfaces = recorder.surfaces();
        assert_eq!(surfaces.len(), 1);
        assert_eq!(surfaces[0].shader, ShaderHandle::WATER);
        assert_eq!(surfaces[0].model, model);
        assert_eq!(surfaces[0].corner_count, 54);
        assert_eq!(surfaces[0].bound, ["vertex", "colors", "normals", "offset"]);
    }
}
