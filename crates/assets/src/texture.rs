use seascape_common::Color;
use std::path::Path;

use crate::AssetError;

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Texture {
    /// Decode an image file (PNG or JPEG) into RGBA8.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let img = image::open(path)?.into_rgba8();
        let (width, height) = img.dimensions();
        tracing::debug!("decoded texture {} ({width}x{height})", path.display());
        Self::from_rgba(width, height, img.into_raw())
    }

    /// Wrap raw RGBA8 pixels, checking the buffer matches the dimensions.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(AssetError::TextureSize {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Single-pixel texture of the given color.
    pub fn solid(color: Color) -> Self {
        let rgba = color
            .to_array()
            .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
            .to_vec();
        Self {
            width: 1,
            height: 1,
            rgba,
        }
    }

    /// Mean color over all pixels.
    pub fn average_color(&self) -> Color {
        let pixels = self.rgba.len() / 4;
        if pixels == 0 {
            return Color::WHITE;
        }
        let mut sum = [0u64; 4];
        for px in self.rgba.chunks_exact(4) {
            for (s, &c) in sum.iter_mut().zip(px) {
                *s += c as u64;
            }
        }
        let n = pixels as f32 * 255.0;
        Color::from(sum.map(|s| s as f32 / n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba_checks_size() {
        assert!(Texture::from_rgba(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            Texture::from_rgba(2, 2, vec![0; 15]),
            Err(AssetError::TextureSize {
                expected: 16,
                actual: 15
            })
        ));
    }

    #[test]
    fn average_of_checkerboard() {
        #[rustfmt::skip]
        let data = vec![
            255, 255, 255, 255,  0, 0, 0, 255,
            0, 0, 0, 255,        255, 255, 255, 255,
        ];
        let tex = Texture::from_rgba(2, 2, data).unwrap();
        let avg = tex.average_color();
        assert!((avg.r - 0.5).abs() < 1e-6);
        assert_eq!(avg.a, 1.0);
    }

    #[test]
    fn solid_round_trips_color() {
        let tex = Texture::solid(Color::rgba(1.0, 0.0, 0.0, 1.0));
        assert_eq!(tex.rgba, vec![255, 0, 0, 255]);
        assert_eq!(tex.average_color(), Color::rgba(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Texture::load("/definitely/not/here.png").is_err());
    }

    #[test]
    fn load_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("water.png");
        let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([0, 77, 255, 255]));
        img.save(&path).unwrap();

        let tex = Texture::load(&path).unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(&tex.rgba[..4], &[0, 77, 255, 255]);
    }
}
