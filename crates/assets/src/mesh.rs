use glam::{Vec2, Vec3, Vec4};
use seascape_common::Color;
use std::path::PathBuf;

use crate::{AssetError, Texture};

/// Surface description attached to a mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: Color,
    pub diffuse_texture: Option<PathBuf>,
    pub roughness_texture: Option<PathBuf>,
}

/// Decoded maps of a textured material.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialTextures {
    pub diffuse: Texture,
    /// Falls back to a fully rough texel when the material has no usable map.
    pub roughness: Texture,
}

impl Material {
    /// Decode the material's maps. `None` when there is no diffuse map or it
    /// fails to load; the mesh is then drawn with its base color.
    pub fn load_textures(&self) -> Option<MaterialTextures> {
        let path = self.diffuse_texture.as_ref()?;
        let diffuse = match Texture::load(path) {
            Ok(texture) => texture,
            Err(err) => {
                tracing::warn!("material {}: texture {}: {err}", self.name, path.display());
                return None;
            }
        };
        let roughness = match &self.roughness_texture {
            Some(path) => Texture::load(path).unwrap_or_else(|err| {
                tracing::warn!("material {}: roughness {}: {err}", self.name, path.display());
                Texture::solid(Color::WHITE)
            }),
            None => Texture::solid(Color::WHITE),
        };
        Some(MaterialTextures { diffuse, roughness })
    }
}

/// Indexed triangle mesh.
///
/// Positions carry `w = 1`, normals `w = 0`. Faces index into the vertex
/// arrays. Normals and texture coordinates, when present, have one entry per
/// position.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<Vec4>,
    pub normals: Vec<Vec4>,
    pub tex_coords: Vec<Vec2>,
    pub faces: Vec<[u32; 3]>,
    pub material: Material,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of vertices a non-indexed draw of this mesh submits.
    pub fn corner_count(&self) -> usize {
        self.faces.len() * 3
    }

    pub fn has_tex_coords(&self) -> bool {
        !self.tex_coords.is_empty()
    }

    /// Check that every face index is in range for every vertex array.
    pub fn validate(&self) -> Result<(), AssetError> {
        let count = self.positions.len();
        for face in &self.faces {
            for &index in face {
                if index as usize >= count {
                    return Err(AssetError::FaceIndex {
                        mesh: self.name.clone(),
                        index,
                        count,
                    });
                }
            }
        }
        if !self.normals.is_empty() && self.normals.len() != count {
            return Err(AssetError::AttributeCount {
                mesh: self.name.clone(),
                attribute: "normals",
                len: self.normals.len(),
                count,
            });
        }
        if self.has_tex_coords() && self.tex_coords.len() != count {
            return Err(AssetError::AttributeCount {
                mesh: self.name.clone(),
                attribute: "texture coordinates",
                len: self.tex_coords.len(),
                count,
            });
        }
        Ok(())
    }

    /// Positions duplicated per face corner.
    pub fn draw_positions(&self) -> Vec<Vec4> {
        self.expand(&self.positions)
    }

    /// Normals duplicated per face corner. Empty when the mesh has none.
    pub fn draw_normals(&self) -> Vec<Vec4> {
        if self.normals.is_empty() {
            return Vec::new();
        }
        self.expand(&self.normals)
    }

    /// Texture coordinates duplicated per face corner. Empty when the mesh has none.
    pub fn draw_tex_coords(&self) -> Vec<Vec2> {
        if !self.has_tex_coords() {
            return Vec::new();
        }
        self.expand(&self.tex_coords)
    }

    /// Per-corner normals of each flat face, for meshes without normals.
    pub fn flat_normals(&self) -> Vec<Vec4> {
        let mut out = Vec::with_capacity(self.corner_count());
        for face in &self.faces {
            let [a, b, c] = face.map(|i| self.positions[i as usize].truncate());
            let normal = (b - a).cross(c - a).try_normalize().unwrap_or(Vec3::Y);
            out.extend([normal.extend(0.0); 3]);
        }
        out
    }

    fn expand<T: Copy>(&self, values: &[T]) -> Vec<T> {
        let mut out = Vec::with_capacity(self.corner_count());
        for face in &self.faces {
            out.extend(face.iter().map(|&i| values[i as usize]));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        Mesh {
            name: "tri".into(),
            positions: vec![
                Vec4::new(0.0, 0.0, 0.0, 1.0),
                Vec4::new(1.0, 0.0, 0.0, 1.0),
                Vec4::new(0.0, 1.0, 0.0, 1.0),
            ],
            normals: vec![Vec4::Z; 3],
            tex_coords: Vec::new(),
            faces: vec![[0, 1, 2], [2, 1, 0]],
            material: Material::default(),
        }
    }

    #[test]
    fn expansion_follows_faces() {
        let mesh = triangle();
        let expanded = mesh.draw_positions();
        assert_eq!(expanded.len(), 6);
        assert_eq!(expanded[0], mesh.positions[0]);
        assert_eq!(expanded[3], mesh.positions[2]);
        assert_eq!(mesh.draw_normals().len(), 6);
    }

    #[test]
    fn no_tex_coords_expand_to_nothing() {
        assert!(triangle().draw_tex_coords().is_empty());
    }

    #[test]
    fn flat_normals_follow_winding() {
        let normals = triangle().flat_normals();
        assert_eq!(normals.len(), 6);
        assert_eq!(normals[0], Vec4::Z);
        assert_eq!(normals[3], -Vec4::Z);
    }

    #[test]
    fn textures_load_with_roughness_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hull.png");
        image::RgbaImage::from_pixel(2, 1, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let material = Material {
            name: "hull".into(),
            base_color: Color::rgba(0.2, 0.2, 0.2, 1.0),
            diffuse_texture: Some(path.clone()),
            roughness_texture: Some(dir.path().join("gone.png")),
        };
        let textures = material.load_textures().unwrap();
        assert_eq!((textures.diffuse.width, textures.diffuse.height), (2, 1));
        assert_eq!(textures.roughness, Texture::solid(Color::WHITE));

        let rough = Material {
            roughness_texture: Some(path),
            ..material.clone()
        };
        assert_eq!(rough.load_textures().unwrap().roughness.width, 2);

        let missing = Material {
            diffuse_texture: Some(dir.path().join("gone.png")),
            ..material.clone()
        };
        assert!(missing.load_textures().is_none());
        assert!(Material::default().load_textures().is_none());
    }

    #[test]
    fn validate_rejects_out_of_range_face() {
        let mut mesh = triangle();
        assert!(mesh.validate().is_ok());
        mesh.faces.push([0, 1, 7]);
        assert!(matches!(
            mesh.validate(),
            Err(AssetError::FaceIndex { index: 7, .. })
        ));
    }
}
