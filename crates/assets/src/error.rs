/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("mesh {mesh:?}: face references vertex {index} but only {count} exist")]
    FaceIndex {
        mesh: String,
        index: u32,
        count: usize,
    },
    #[error("mesh {mesh:?}: {attribute} has {len} entries for {count} positions")]
    AttributeCount {
        mesh: String,
        attribute: &'static str,
        len: usize,
        count: usize,
    },
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("texture data size mismatch: expected {expected} bytes, got {actual}")]
    TextureSize { expected: usize, actual: usize },
}
