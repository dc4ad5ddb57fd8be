//! Built-in meshes that need no file on disk.

use glam::{Vec2, Vec4};

use crate::mesh::{Material, Mesh};

/// Axis-aligned cube centered at the origin, four vertices per side so each
/// side keeps its own flat normal.
pub fn cube(name: &str, half_extent: f32) -> Mesh {
    let p = half_extent;
    #[rustfmt::skip]
    let sides: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0],  [[-p, -p,  p], [ p, -p,  p], [ p,  p,  p], [-p,  p,  p]]),
        ([0.0, 0.0, -1.0], [[ p, -p, -p], [-p, -p, -p], [-p,  p, -p], [ p,  p, -p]]),
        ([1.0, 0.0, 0.0],  [[ p, -p,  p], [ p, -p, -p], [ p,  p, -p], [ p,  p,  p]]),
        ([-1.0, 0.0, 0.0], [[-p, -p, -p], [-p, -p,  p], [-p,  p,  p], [-p,  p, -p]]),
        ([0.0, 1.0, 0.0],  [[-p,  p,  p], [ p,  p,  p], [ p,  p, -p], [-p,  p, -p]]),
        ([0.0, -1.0, 0.0], [[-p, -p, -p], [ p, -p, -p], [ p, -p,  p], [-p, -p,  p]]),
    ];
    let corner_uvs = [
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 0.0),
    ];

    let mut mesh = Mesh {
        name: name.into(),
        material: Material {
            name: name.into(),
            ..Material::default()
        },
        ..Mesh::default()
    };
    for (normal, corners) in sides {
        let base = mesh.positions.len() as u32;
        for (corner, uv) in corners.iter().zip(corner_uvs) {
            mesh.positions
                .push(Vec4::new(corner[0], corner[1], corner[2], 1.0));
            mesh.normals
                .push(Vec4::new(normal[0], normal[1], normal[2], 0.0));
            mesh.tex_coords.push(uv);
        }
        mesh.faces.push([base, base + 1, base + 2]);
        mesh.faces.push([base + 2, base + 3, base]);
    }
    mesh
}
