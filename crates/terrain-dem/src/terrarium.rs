//! Terrarium elevation encoding.
//!
//! Terrarium tiles pack elevation into the three color channels of a PNG:
//!
//! ```text
//! elevation = R * 256 + G + B / 256 - 32768
//! ```
//!
//! The AWS `elevation-tiles-prod` bucket serves this format under
//! `terrarium/{z}/{x}/{y}.png`.

use crate::{DemError, ElevationGrid, Result};

/// Offset added before packing so that negative elevations fit in unsigned channels.
const TERRARIUM_OFFSET: f64 = 32768.0;

/// Decode one pixel's channels into meters.
#[inline]
pub fn decode_pixel(r: u8, g: u8, b: u8) -> f32 {
    (r as f64 * 256.0 + g as f64 + b as f64 / 256.0 - TERRARIUM_OFFSET) as f32
}

/// Pack an elevation in meters into Terrarium channels.
///
/// Values outside the representable range (-32768 m to just under 32768 m)
/// saturate. The fractional part is quantized to 1/256 m.
pub fn encode_elevation(elevation: f64) -> [u8; 3] {
    let shifted = ((elevation + TERRARIUM_OFFSET) * 256.0)
        .round()
        .clamp(0.0, (1u32 << 24) as f64 - 1.0) as u32;
    [(shifted >> 16) as u8, (shifted >> 8) as u8, shifted as u8]
}

/// Decode an RGBA buffer into an elevation grid. The alpha channel is ignored.
pub fn decode_rgba(rgba: &[u8], width: u32, height: u32, cell_size: f64) -> Result<ElevationGrid> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(DemError::BufferSize {
            width,
            height,
            expected,
            actual: rgba.len(),
        });
    }

    let data = rgba
        .chunks_exact(4)
        .map(|px| decode_pixel(px[0], px[1], px[2]))
        .collect();
    ElevationGrid::new(data, width, height, cell_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_known_fixtures() {
        assert_eq!(decode_pixel(128, 0, 0), 0.0);
        assert_eq!(decode_pixel(131, 232, 0), 1000.0);
        assert_eq!(decode_pixel(139, 184, 0), 3000.0);
        assert_eq!(decode_pixel(0, 0, 0), -32768.0);
    }

    #[test]
    fn test_roundtrip_within_quantization() {
        for e in [-410.7, -1.0, 0.0, 0.5, 212.33, 1000.0, 2962.125, 4807.9, 8848.86] {
            let [r, g, b] = encode_elevation(e);
            assert_abs_diff_eq!(decode_pixel(r, g, b) as f64, e, epsilon = 1.0 / 256.0);
        }
    }

    #[test]
    fn test_decode_rgba_ignores_alpha() {
        let rgba = [128, 0, 0, 255, 131, 232, 0, 0, 139, 184, 0, 17, 128, 1, 128, 255];
        let grid = decode_rgba(&rgba, 2, 2, 30.0).unwrap();
        assert_eq!(grid.data(), &[0.0, 1000.0, 3000.0, 1.5]);
        assert_eq!(grid.cell_size(), 30.0);
    }

    #[test]
    fn test_decode_rgba_rejects_short_buffer() {
        assert!(decode_rgba(&[0u8; 15], 2, 2, 1.0).is_err());
    }
}
