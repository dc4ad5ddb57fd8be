use glam::{Vec2, Vec4};
use seascape_assets::Mesh;

/// Errors from building the water grid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WaterError {
    #[error("grid needs at least 2 vertices per side, got {n}")]
    GridTooSmall { n: u32 },
    #[error("grid of {n}x{n} vertices exceeds the index range")]
    GridTooLarge { n: u32 },
    #[error("grid range [{min}, {max}] is empty or not finite")]
    InvalidRange { min: f32, max: f32 },
}

const FLAT_NORMAL: Vec4 = Vec4::new(0.0, 1.0, 0.0, 0.0);
const PLACEHOLDER_TEX_COORD: Vec2 = Vec2::splat(0.5);

/// Build an `n x n` vertex grid on the XZ plane spanning `[min, max]` on both axes.
///
/// Vertex `x * n + z` sits at column `x` along X and row `z` along Z. Each
/// cell with corner index `i` becomes the triangles `(i, i+1, i+n)` and
/// `(i+1, i+n+1, i+n)`, both facing +Y.
pub fn generate_plane(n: u32, min: f32, max: f32) -> Result<Mesh, WaterError> {
    if n < 2 {
        return Err(WaterError::GridTooSmall { n });
    }
    if !(min.is_finite() && max.is_finite() && min < max) {
        return Err(WaterError::InvalidRange { min, max });
    }
    let vertex_count = n
        .checked_mul(n)
        .ok_or(WaterError::GridTooLarge { n })? as usize;

    let step = (max - min) / (n - 1) as f32;
    let mut positions = Vec::with_capacity(vertex_count);
    for x in 0..n {
        for z in 0..n {
            positions.push(Vec4::new(
                min + x as f32 * step,
                0.0,
                min + z as f32 * step,
                1.0,
            ));
        }
    }

    let cells = (n - 1) as usize;
    let mut faces = Vec::with_capacity(cells * cells * 2);
    for x in 0..n - 1 {
        for z in 0..n - 1 {
            let i = x * n + z;
            faces.push([i, i + 1, i + n]);
            faces.push([i + 1, i + n + 1, i + n]);
        }
    }

    tracing::debug!(n, min, max, faces = faces.len(), "generated water grid");
    Ok(Mesh {
        name: "water".into(),
        normals: vec![FLAT_NORMAL; vertex_count],
        tex_coords: vec![PLACEHOLDER_TEX_COORD; vertex_count],
        positions,
        faces,
        material: Default::default(),
    })
}
