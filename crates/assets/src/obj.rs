//! Wavefront OBJ scene loading.
//!
//! Supports `v`/`vt`/`vn`/`f` geometry, `o`/`g` object names, `usemtl`
//! material switches and `mtllib` libraries (`Kd`, `map_Kd`, `map_Ns`).
//! Polygons are fan-triangulated, texture V is flipped to top-left origin,
//! and corners without a normal get a smoothed face normal.

use glam::{Vec2, Vec3, Vec4};
use seascape_common::Color;
use std::collections::HashMap;
use std::path::Path;

use crate::AssetError;
use crate::mesh::{Material, Mesh};

/// Meshes loaded from one scene file, in file order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
}

impl Scene {
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|m| m.name == name)
    }

    pub fn total_faces(&self) -> usize {
        self.meshes.iter().map(Mesh::face_count).sum()
    }
}

/// Load an OBJ file. Material libraries are resolved next to it.
pub fn load_scene(path: impl AsRef<Path>) -> Result<Scene, AssetError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let scene = parse_obj(&source, base_dir)?;
    tracing::info!(
        "loaded scene {}: {} meshes, {} faces",
        path.display(),
        scene.meshes.len(),
        scene.total_faces()
    );
    Ok(scene)
}

/// Parse OBJ source text. `base_dir` resolves `mtllib` and texture paths.
pub fn parse_obj(source: &str, base_dir: &Path) -> Result<Scene, AssetError> {
    let mut builder = ObjBuilder::new(base_dir);
    for (i, raw) in source.lines().enumerate() {
        builder.line(i + 1, raw)?;
    }
    Ok(builder.finish())
}

/// Unique combination of position, texture and normal indices.
type CornerKey = (usize, Option<usize>, Option<usize>);

struct PendingMesh {
    mesh: Mesh,
    corners: HashMap<CornerKey, u32>,
    missing_normal: Vec<bool>,
    any_tex_coords: bool,
}

impl PendingMesh {
    fn new(name: &str, material: Material) -> Self {
        Self {
            mesh: Mesh {
                name: name.into(),
                material,
                ..Mesh::default()
            },
            corners: HashMap::new(),
            missing_normal: Vec::new(),
            any_tex_coords: false,
        }
    }

    fn finish(mut self) -> Mesh {
        if !self.any_tex_coords {
            self.mesh.tex_coords.clear();
        }
        if self.missing_normal.iter().any(|&m| m) {
            for face in &self.mesh.faces {
                let [a, b, c] = face.map(|i| self.mesh.positions[i as usize].truncate());
                let n = (b - a).cross(c - a);
                for &i in face {
                    if self.missing_normal[i as usize] {
                        self.mesh.normals[i as usize] += n.extend(0.0);
                    }
                }
            }
            for (normal, missing) in self.mesh.normals.iter_mut().zip(&self.missing_normal) {
                if *missing {
                    let n = normal.truncate().try_normalize().unwrap_or(Vec3::Y);
                    *normal = n.extend(0.0);
                }
            }
        }
        self.mesh
    }
}

struct ObjBuilder<'a> {
    base_dir: &'a Path,
    positions: Vec<Vec4>,
    tex_coords: Vec<Vec2>,
    normals: Vec<Vec4>,
    materials: HashMap<String, Material>,
    meshes: Vec<Mesh>,
    current: PendingMesh,
}

impl<'a> ObjBuilder<'a> {
    fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            positions: Vec::new(),
            tex_coords: Vec::new(),
            normals: Vec::new(),
            materials: HashMap::new(),
            meshes: Vec::new(),
            current: PendingMesh::new("default", Material::default()),
        }
    }

    fn line(&mut self, line: usize, raw: &str) -> Result<(), AssetError> {
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            return Ok(());
        }
        let mut tokens = raw.split_whitespace();
        let Some(keyword) = tokens.next() else {
            return Ok(());
        };
        let rest: Vec<&str> = tokens.collect();

        match keyword {
            "v" => {
                let [x, y, z] = floats(&rest, line)?;
                self.positions.push(Vec4::new(x, y, z, 1.0));
            }
            "vt" => {
                let [u, v] = floats(&rest, line)?;
                self.tex_coords.push(Vec2::new(u, 1.0 - v));
            }
            "vn" => {
                let [x, y, z] = floats(&rest, line)?;
                self.normals.push(Vec4::new(x, y, z, 0.0));
            }
            "f" => self.face(&rest, line)?,
            "o" | "g" => {
                let name = if rest.is_empty() {
                    "default".to_string()
                } else {
                    rest.join(" ")
                };
                let material = self.current.mesh.material.clone();
                self.start_mesh(&name, material);
            }
            "usemtl" => {
                let name = rest.join(" ");
                let material = self.materials.get(&name).cloned().unwrap_or_else(|| {
                    tracing::warn!("line {line}: unknown material {name:?}");
                    Material {
                        name: name.clone(),
                        ..Material::default()
                    }
                });
                let mesh_name = self.current.mesh.name.clone();
                if self.current.mesh.faces.is_empty() {
                    self.current.mesh.material = material;
                } else {
                    self.start_mesh(&mesh_name, material);
                }
            }
            "mtllib" => {
                for file in rest {
                    let path = self.base_dir.join(file);
                    match std::fs::read_to_string(&path) {
                        Ok(source) => self.materials.extend(parse_mtl(&source, self.base_dir)),
                        Err(e) => {
                            tracing::warn!("material library {} unavailable: {e}", path.display())
                        }
                    }
                }
            }
            other => tracing::trace!("line {line}: ignoring {other:?}"),
        }
        Ok(())
    }

    fn start_mesh(&mut self, name: &str, material: Material) {
        let finished = std::mem::replace(&mut self.current, PendingMesh::new(name, material));
        if !finished.mesh.faces.is_empty() {
            self.meshes.push(finished.finish());
        }
    }

    fn face(&mut self, corners: &[&str], line: usize) -> Result<(), AssetError> {
        if corners.len() < 3 {
            return Err(AssetError::Parse {
                line,
                message: format!("face needs at least 3 corners, got {}", corners.len()),
            });
        }
        let mut indices = Vec::with_capacity(corners.len());
        for corner in corners {
            let key = self.corner_key(corner, line)?;
            indices.push(self.vertex(key));
        }
        for i in 1..indices.len() - 1 {
            self.current
                .mesh
                .faces
                .push([indices[0], indices[i], indices[i + 1]]);
        }
        Ok(())
    }

    fn corner_key(&self, corner: &str, line: usize) -> Result<CornerKey, AssetError> {
        let mut parts = corner.split('/');
        let position = match parts.next() {
            Some(p) if !p.is_empty() => resolve(p, self.positions.len(), line)?,
            _ => {
                return Err(AssetError::Parse {
                    line,
                    message: format!("corner {corner:?} has no position index"),
                });
            }
        };
        let tex = match parts.next() {
            Some(t) if !t.is_empty() => Some(resolve(t, self.tex_coords.len(), line)?),
            _ => None,
        };
        let normal = match parts.next() {
            Some(n) if !n.is_empty() => Some(resolve(n, self.normals.len(), line)?),
            _ => None,
        };
        Ok((position, tex, normal))
    }

    fn vertex(&mut self, key: CornerKey) -> u32 {
        if let Some(&index) = self.current.corners.get(&key) {
            return index;
        }
        let (position, tex, normal) = key;
        let pending = &mut self.current;
        let index = pending.mesh.positions.len() as u32;
        pending.mesh.positions.push(self.positions[position]);
        pending
            .mesh
            .tex_coords
            .push(tex.map(|t| self.tex_coords[t]).unwrap_or(Vec2::ZERO));
        pending.any_tex_coords |= tex.is_some();
        pending
            .mesh
            .normals
            .push(normal.map(|n| self.normals[n]).unwrap_or(Vec4::ZERO));
        pending.missing_normal.push(normal.is_none());
        pending.corners.insert(key, index);
        index
    }

    fn finish(mut self) -> Scene {
        self.start_mesh("default", Material::default());
        Scene {
            meshes: self.meshes,
        }
    }
}

/// Resolve a 1-based (or negative, relative) OBJ index into a 0-based one.
fn resolve(token: &str, len: usize, line: usize) -> Result<usize, AssetError> {
    let raw: i64 = token.parse().map_err(|_| AssetError::Parse {
        line,
        message: format!("invalid index {token:?}"),
    })?;
    let resolved = if raw > 0 {
        raw - 1
    } else {
        len as i64 + raw
    };
    if raw == 0 || resolved < 0 || resolved >= len as i64 {
        return Err(AssetError::Parse {
            line,
            message: format!("index {raw} out of range (have {len})"),
        });
    }
    Ok(resolved as usize)
}

fn floats<const N: usize>(tokens: &[&str], line: usize) -> Result<[f32; N], AssetError> {
    if tokens.len() < N {
        return Err(AssetError::Parse {
            line,
            message: format!("expected {N} numbers, got {}", tokens.len()),
        });
    }
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(tokens) {
        *slot = token.parse().map_err(|_| AssetError::Parse {
            line,
            message: format!("invalid number {token:?}"),
        })?;
    }
    Ok(out)
}

/// Parse a material library. Malformed lines are skipped.
fn parse_mtl(source: &str, base_dir: &Path) -> HashMap<String, Material> {
    let mut materials = HashMap::new();
    let mut current: Option<Material> = None;

    for raw in source.lines() {
        let raw = raw.trim();
        let mut tokens = raw.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        let rest: Vec<&str> = tokens.collect();
        match keyword {
            "newmtl" => {
                if let Some(done) = current.take() {
                    materials.insert(done.name.clone(), done);
                }
                current = Some(Material {
                    name: rest.join(" "),
                    ..Material::default()
                });
            }
            "Kd" => {
                if let (Some(m), Ok([r, g, b])) = (current.as_mut(), floats(&rest, 0)) {
                    m.base_color = Color::rgba(r, g, b, 1.0);
                }
            }
            "map_Kd" => {
                if let (Some(m), Some(file)) = (current.as_mut(), rest.last()) {
                    m.diffuse_texture = Some(base_dir.join(file));
                }
            }
            "map_Ns" => {
                if let (Some(m), Some(file)) = (current.as_mut(), rest.last()) {
                    m.roughness_texture = Some(base_dir.join(file));
                }
            }
            _ => {}
        }
    }
    if let Some(done) = current {
        materials.insert(done.name.clone(), done);
    }
    materials
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const QUAD: &str = "\
# a unit quad
o deck
v 0 0 0
v 1 0 0
v 1 0 1
v 0 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 1 0
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quad_is_fan_triangulated() {
        let scene = parse_obj(QUAD, Path::new(".")).unwrap();
        assert_eq!(scene.meshes.len(), 1);
        let deck = scene.mesh("deck").unwrap();
        assert_eq!(deck.vertex_count(), 4);
        assert_eq!(deck.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert!(deck.validate().is_ok());
    }

    #[test]
    fn texture_v_is_flipped() {
        let scene = parse_obj(QUAD, Path::new(".")).unwrap();
        let deck = &scene.meshes[0];
        assert_eq!(deck.tex_coords[0], Vec2::new(0.0, 1.0));
        assert_eq!(deck.tex_coords[2], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn objects_become_separate_meshes() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
o hull
f 1 2 3
o kolo
f 3 2 1
";
        let scene = parse_obj(src, Path::new(".")).unwrap();
        let names: Vec<&str> = scene.meshes.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["hull", "kolo"]);
        assert_eq!(scene.total_faces(), 2);
    }

    #[test]
    fn missing_normals_are_generated() {
        let src = "\
v 0 0 0
v 0 0 1
v 1 0 0
f 1 2 3
";
        let scene = parse_obj(src, Path::new(".")).unwrap();
        let mesh = &scene.meshes[0];
        assert!(!mesh.has_tex_coords());
        for n in &mesh.normals {
            assert!((n.truncate() - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn negative_indices_are_relative() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
f -3 -2 -1
";
        let scene = parse_obj(src, Path::new(".")).unwrap();
        assert_eq!(scene.meshes[0].faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let src = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
        let err = parse_obj(src, Path::new(".")).unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 3, .. }));
    }

    #[test]
    fn bad_number_is_an_error() {
        let err = parse_obj("v 0 zero 0\n", Path::new(".")).unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 1, .. }));
    }

    #[test]
    fn empty_source_is_empty_scene() {
        assert!(parse_obj("# nothing\n", Path::new(".")).unwrap().is_empty());
    }

    #[test]
    fn materials_from_library() {
        let dir = tempfile::tempdir().unwrap();
        let mut mtl = std::fs::File::create(dir.path().join("ship.mtl")).unwrap();
        writeln!(mtl, "newmtl wood\nKd 0.5 0.25 0.1\nmap_Kd wood.png\nmap_Ns wood_rough.png").unwrap();
        let obj_path = dir.path().join("ship.obj");
        std::fs::write(
            &obj_path,
            "mtllib ship.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\no hull\nusemtl wood\nf 1 2 3\n",
        )
        .unwrap();

        let scene = load_scene(&obj_path).unwrap();
        let hull = scene.mesh("hull").unwrap();
        assert_eq!(hull.material.name, "wood");
        assert_eq!(hull.material.base_color, Color::rgba(0.5, 0.25, 0.1, 1.0));
        assert_eq!(
            hull.material.diffuse_texture.as_deref(),
            Some(dir.path().join("wood.png").as_path())
        );
        assert!(hull.material.roughness_texture.is_some());
    }

    #[test]
    fn missing_material_library_degrades() {
        let src = "mtllib nowhere.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl paint\nf 1 2 3\n";
        let scene = parse_obj(src, Path::new("/nonexistent")).unwrap();
        assert_eq!(scene.meshes[0].material.name, "paint");
    }

    #[test]
    fn missing_scene_file_is_io_error() {
        assert!(matches!(
            load_scene("/nonexistent/statek.obj"),
            Err(AssetError::Io(_))
        ));
    }
}
