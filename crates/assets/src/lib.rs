//! Asset loading: CPU-side meshes, OBJ scenes, textures and primitives.
//!
//! Loaders return `AssetError` on failure; callers decide whether to degrade.
//! The renderer consumes meshes by handle once they are uploaded.

mod error;
pub mod mesh;
pub mod obj;
pub mod primitives;
pub mod texture;

pub use error::AssetError;
pub use mesh::{Material, MaterialTextures, Mesh};
pub use obj::{Scene, load_scene, parse_obj};
pub use texture::Texture;
