//! Semantic color palettes for slope and aspect, blended with hillshade.
//!
//! Every function here is pure: the same derivative and hillshade values
//! always produce the same RGBA bytes.

use crate::derivative::DerivativeGrid;
use serde::{Deserialize, Serialize};

/// An RGB triple.
pub type Rgb = [u8; 3];

/// Default weight of the hillshade relief in the final color.
pub const DEFAULT_BLEND_FACTOR: f32 = 0.35;

/// Band edges and colors for a slope palette, scanned low to high.
/// A value belongs to the first band whose upper bound it is strictly below.
struct SlopeBand {
    upper: f32,
    color: Rgb,
}

pub const SLOPE_GREEN: Rgb = [46, 160, 67];
pub const SLOPE_YELLOW: Rgb = [250, 215, 30];
pub const SLOPE_ORANGE: Rgb = [245, 140, 30];
pub const SLOPE_RED: Rgb = [215, 40, 40];
pub const SLOPE_DARK_RED: Rgb = [110, 10, 20];

static SKI_TOURING_BANDS: [SlopeBand; 5] = [
    // Safe
    SlopeBand { upper: 27.0, color: SLOPE_GREEN },
    // Critical avalanche angle
    SlopeBand { upper: 30.0, color: SLOPE_YELLOW },
    // Steep, high risk
    SlopeBand { upper: 35.0, color: SLOPE_ORANGE },
    // Extreme
    SlopeBand { upper: 45.0, color: SLOPE_RED },
    // Cliff or rock
    SlopeBand { upper: f32::INFINITY, color: SLOPE_DARK_RED },
];

static CLIMBING_BANDS: [SlopeBand; 4] = [
    // Walk
    SlopeBand { upper: 20.0, color: [40, 90, 220] },
    // Scramble
    SlopeBand { upper: 35.0, color: [40, 180, 60] },
    // Moderate
    SlopeBand { upper: 50.0, color: [250, 215, 30] },
    // Hard or exposed
    SlopeBand { upper: f32::INFINITY, color: [215, 40, 40] },
];

/// Which slope palette to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeScheme {
    /// Avalanche risk bands for ski touring.
    #[default]
    SkiTouring,
    /// Difficulty bands for scrambling and climbing.
    Climbing,
}

impl SlopeScheme {
    fn bands(&self) -> &'static [SlopeBand] {
        match self {
            SlopeScheme::SkiTouring => &SKI_TOURING_BANDS,
            SlopeScheme::Climbing => &CLIMBING_BANDS,
        }
    }
}

/// Unblended palette color for a slope in degrees.
pub fn slope_base_color(slope_deg: f32, scheme: SlopeScheme) -> Rgb {
    let bands = scheme.bands();
    bands
        .iter()
        .find(|band| slope_deg < band.upper)
        .unwrap_or(&bands[bands.len() - 1])
        .color
}

pub const ASPECT_FLAT: Rgb = [160, 160, 160];

/// Octant colors starting at north and going clockwise.
/// Cold for shade-facing slopes, warm for sun-facing ones.
pub const ASPECT_OCTANTS: [Rgb; 8] = [
    [35, 60, 150],   // N: deep blue
    [70, 110, 160],  // NE: steel blue
    [150, 170, 190], // E: light blue-gray
    [225, 205, 165], // SE: warm beige
    [240, 170, 60],  // S: warm amber
    [215, 170, 95],  // SW: golden tan
    [185, 165, 135], // W: cool tan
    [100, 115, 135], // NW: muted slate
];

/// Octant index (0 = N, clockwise) for an aspect in `[0, 360)`.
///
/// Each octant spans `[center - 22.5, center + 22.5)`; north wraps across 0.
pub fn aspect_octant(aspect_deg: f32) -> usize {
    (((aspect_deg + 22.5) / 45.0).floor() as i64).rem_euclid(8) as usize
}

/// Unblended palette color for an aspect in degrees; negative values are flat.
pub fn aspect_base_color(aspect_deg: f32) -> Rgb {
    if aspect_deg < 0.0 {
        ASPECT_FLAT
    } else {
        ASPECT_OCTANTS[aspect_octant(aspect_deg)]
    }
}

/// Darken `base` by hillshade: `channel * (1 - f + f * hillshade / 255)`.
pub fn blend(base: Rgb, hillshade: f32, blend_factor: f32) -> [u8; 4] {
    let shade = (hillshade / 255.0).clamp(0.0, 1.0);
    let scale = 1.0 - blend_factor + blend_factor * shade;
    let channel = |c: u8| (c as f32 * scale).round().clamp(0.0, 255.0) as u8;
    [channel(base[0]), channel(base[1]), channel(base[2]), 255]
}

/// Slope palette color shaded by hillshade.
pub fn colorize_slope(slope_deg: f32, hillshade: f32, scheme: SlopeScheme, blend_factor: f32) -> [u8; 4] {
    blend(slope_base_color(slope_deg, scheme), hillshade, blend_factor)
}

/// Aspect palette color shaded by hillshade.
pub fn colorize_aspect(aspect_deg: f32, hillshade: f32, blend_factor: f32) -> [u8; 4] {
    blend(aspect_base_color(aspect_deg), hillshade, blend_factor)
}

/// Opaque RGBA raster produced by the colorizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTile {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl ColorTile {
    /// Width and height in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// RGBA bytes in row-major order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Take ownership of the RGBA bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// RGBA value at `(row, col)`.
    pub fn pixel(&self, row: u32, col: u32) -> [u8; 4] {
        let i = ((row * self.width + col) * 4) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

/// Colorize a derivative grid pixel by pixel with its matching hillshade.
///
/// Panics if the two grids differ in shape.
pub fn colorize_grid<F>(values: &DerivativeGrid, hillshade: &DerivativeGrid, color: F) -> ColorTile
where
    F: Fn(f32, f32) -> [u8; 4],
{
    assert_eq!(values.dimensions(), hillshade.dimensions());
    let (width, height) = values.dimensions();
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for (&v, &hs) in values.data().iter().zip(hillshade.data()) {
        data.extend_from_slice(&color(v, hs));
    }
    ColorTile {
        data,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slope_banding_is_half_open() {
        let ski = SlopeScheme::SkiTouring;
        assert_eq!(slope_base_color(0.0, ski), SLOPE_GREEN);
        assert_eq!(slope_base_color(26.999, ski), SLOPE_GREEN);
        assert_eq!(slope_base_color(27.0, ski), SLOPE_YELLOW);
        assert_eq!(slope_base_color(29.99, ski), SLOPE_YELLOW);
        assert_eq!(slope_base_color(30.0, ski), SLOPE_ORANGE);
        assert_eq!(slope_base_color(35.0, ski), SLOPE_RED);
        assert_eq!(slope_base_color(45.0, ski), SLOPE_DARK_RED);
        assert_eq!(slope_base_color(90.0, ski), SLOPE_DARK_RED);
    }

    #[test]
    fn test_climbing_scheme() {
        let climb = SlopeScheme::Climbing;
        assert_eq!(slope_base_color(10.0, climb), [40, 90, 220]);
        assert_eq!(slope_base_color(20.0, climb), [40, 180, 60]);
        assert_eq!(slope_base_color(60.0, climb), [215, 40, 40]);
    }

    #[test]
    fn test_aspect_octants_wrap() {
        assert_eq!(aspect_octant(0.0), 0);
        assert_eq!(aspect_octant(22.49), 0);
        assert_eq!(aspect_octant(22.5), 1);
        assert_eq!(aspect_octant(90.0), 2);
        assert_eq!(aspect_octant(180.0), 4);
        assert_eq!(aspect_octant(337.49), 7);
        assert_eq!(aspect_octant(337.5), 0);
        assert_eq!(aspect_octant(359.99), 0);
        assert_eq!(aspect_base_color(-1.0), ASPECT_FLAT);
        assert_eq!(aspect_base_color(200.0), ASPECT_OCTANTS[4]);
    }

    #[test]
    fn test_blend() {
        // Full light keeps the base color
        assert_eq!(blend([200, 100, 50], 255.0, 0.35), [200, 100, 50, 255]);
        // Darkness removes the blend share
        assert_eq!(blend([200, 100, 50], 0.0, 0.35), [130, 65, 33, 255]);
        // No blending ignores hillshade
        assert_eq!(blend([200, 100, 50], 0.0, 0.0), [200, 100, 50, 255]);
        // Out-of-range hillshade is clamped
        assert_eq!(blend([200, 100, 50], 400.0, 0.35), [200, 100, 50, 255]);
    }

    #[test]
    fn test_colorize_is_deterministic() {
        for (v, hs) in [(12.5, 180.0), (31.0, 12.0), (55.0, 255.0)] {
            let a = colorize_slope(v, hs, SlopeScheme::SkiTouring, DEFAULT_BLEND_FACTOR);
            let b = colorize_slope(v, hs, SlopeScheme::SkiTouring, DEFAULT_BLEND_FACTOR);
            assert_eq!(a, b);
            assert_eq!(a[3], 255);
        }
        assert_eq!(colorize_aspect(181.0, 90.0, 0.35), colorize_aspect(181.0, 90.0, 0.35));
    }

    #[test]
    fn test_colorize_grid_is_opaque() {
        let values = DerivativeGrid::filled(4, 2, 31.0);
        let hs = DerivativeGrid::filled(4, 2, 255.0);
        let tile = colorize_grid(&values, &hs, |v, h| colorize_slope(v, h, SlopeScheme::SkiTouring, 0.35));
        assert_eq!(tile.as_bytes().len(), 4 * 2 * 4);
        assert!(tile.as_bytes().chunks(4).all(|px| px[3] == 255));
        assert_eq!(tile.pixel(1, 3), [245, 140, 30, 255]);
    }
}
