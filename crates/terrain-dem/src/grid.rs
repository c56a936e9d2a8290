//! Regular elevation grids.

use crate::{DemError, Result, TileCoord};

/// Equatorial circumference of the WGS84 ellipsoid in meters.
pub const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;

/// Default edge length of a raster tile in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Ground meters covered by one pixel at `lat_deg` and `zoom`.
///
/// `metersPerPixel = C * cos(lat) / (tileSize * 2^zoom)`
pub fn meters_per_pixel(lat_deg: f64, zoom: u8, tile_size: u32) -> f64 {
    EARTH_CIRCUMFERENCE_M * lat_deg.to_radians().cos() / (tile_size as f64 * (1u64 << zoom) as f64)
}

/// Cell size for a tile, measured at its vertical-center latitude.
pub fn tile_cell_size(coord: &TileCoord, tile_size: u32) -> f64 {
    meters_per_pixel(coord.center_lat(), coord.z, tile_size)
}

/// Elevation samples for one raster in row-major order (north to south, west to east).
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    data: Vec<f32>,
    width: u32,
    height: u32,
    /// Ground meters per pixel.
    cell_size: f64,
}

impl ElevationGrid {
    /// Create a grid, checking that `data` holds exactly `width * height` samples.
    pub fn new(data: Vec<f32>, width: u32, height: u32, cell_size: f64) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(DemError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            cell_size,
        })
    }

    /// Build a grid by evaluating `f(row, col)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, cell_size: f64, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> f32,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self {
            data,
            width,
            height,
            cell_size,
        }
    }

    /// Get the dimensions of this grid in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Ground meters per pixel.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Elevation at `(row, col)`. Panics if out of range.
    #[inline]
    pub fn get(&self, row: u32, col: u32) -> f32 {
        self.data[(row * self.width + col) as usize]
    }

    /// Raw samples in row-major order.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Minimum and maximum elevation, or `None` for an empty grid.
    pub fn elevation_range(&self) -> Option<(f32, f32)> {
        self.data.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}
