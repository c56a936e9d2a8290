//! PNG encoding and decoding of tile rasters.

use crate::{PipelineError, Result};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};

/// Decode PNG bytes into `(width, height, rgba)`.
pub fn decode_png(bytes: &[u8]) -> Result<(u32, u32, Vec<u8>)> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8();
    let (width, height) = img.dimensions();
    Ok((width, height, img.into_raw()))
}

/// Encode an RGBA buffer as PNG.
pub fn encode_png(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    if rgba.len() != width as usize * height as usize * 4 {
        return Err(PipelineError::RasterSize {
            width,
            height,
            actual: rgba.len(),
        });
    }
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(rgba, width, height, ExtendedColorType::Rgba8)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_preserves_pixels() {
        let rgba: Vec<u8> = (0..3 * 2 * 4).map(|i| (i * 10) as u8).collect();
        let png = encode_png(&rgba, 3, 2).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let (w, h, decoded) = decode_png(&png).unwrap();
        assert_eq!((w, h), (3, 2));
        assert_eq!(decoded, rgba);
    }

    #[test]
    fn test_size_mismatch() {
        let err = encode_png(&[0; 7], 1, 2).unwrap_err();
        assert!(matches!(err, PipelineError::RasterSize { actual: 7, .. }));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(decode_png(b"not a png"), Err(PipelineError::Image(_))));
    }
}
