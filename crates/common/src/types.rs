use glam::Vec4;
use serde::{Deserialize, Serialize};

/// A handle referencing a renderable mesh registered with a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u32);

/// A handle referencing a shader program owned by a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShaderHandle(pub u32);

impl ShaderHandle {
    /// Flat vertex colors, no lighting.
    pub const COLORED: Self = Self(0);
    /// Diffuse lighting with the mesh base color.
    pub const LAMBERT: Self = Self(1);
    /// Diffuse lighting with the mesh texture color.
    pub const LAMBERT_TEXTURED: Self = Self(2);
    /// Displaced water surface with per-corner attributes.
    pub const WATER: Self = Self(3);
}

/// Linear RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    pub const SKY: Self = Self::rgba(0.0, 0.4, 0.8, 1.0);
    pub const WATER: Self = Self::rgba(0.0, 0.3, 1.0, 1.0);
    pub const SMOKE: Self = Self::rgba(0.55, 0.55, 0.58, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_vec4(self) -> Vec4 {
        Vec4::from_array(self.to_array())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 4]> for Color {
    fn from(c: [f32; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_handles_are_distinct() {
        let all = [
            ShaderHandle::COLORED,
            ShaderHandle::LAMBERT,
            ShaderHandle::LAMBERT_TEXTURED,
            ShaderHandle::WATER,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn color_round_trips_through_array() {
        let c = Color::from([0.1, 0.2, 0.3, 0.4]);
        assert_eq!(c.to_array(), [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(c.to_vec4(), Vec4::new(0.1, 0.2, 0.3, 0.4));
    }

    #[test]
    fn default_color_is_white() {
        assert_eq!(Color::default(), Color::WHITE);
    }
}
