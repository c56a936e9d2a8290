//! Slippy-map tile coordinates and bounding boxes.
//!
//! Uses the OpenStreetMap Slippy Map tile naming convention:
//! - `z` is the zoom level
//! - `x` is the column (0 to 2^z - 1, from west to east)
//! - `y` is the row (0 to 2^z - 1, from north to south)

use crate::{DemError, Result, MAX_ZOOM, MIN_ZOOM};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::f64::consts::PI;
use std::fmt;

/// Web Mercator latitude limit (arctan(sinh(π))).
const MAX_MERCATOR_LAT: f64 = 85.0511;

/// OSM-style tile coordinates (z, x, y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level.
    pub z: u8,
    /// X coordinate (column, 0 at 180°W, increases eastward).
    pub x: u32,
    /// Y coordinate (row, 0 at ~85.05°N, increases southward).
    pub y: u32,
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

impl TileCoord {
    /// Create a new tile coordinate, validating the indices against the zoom level.
    pub fn new(z: u8, x: u32, y: u32) -> Result<Self> {
        check_zoom(z)?;
        let max_coord = 1u32 << z;
        if x >= max_coord || y >= max_coord {
            return Err(DemError::TileOutOfRange { z, x, y });
        }
        Ok(Self { z, x, y })
    }

    /// Convert latitude/longitude to tile coordinates.
    ///
    /// Uses the OpenStreetMap Slippy Map tiling formula:
    /// - x = floor((lon + 180) / 360 * 2^z)
    /// - y = floor((1 - ln(tan(lat) + sec(lat)) / π) / 2 * 2^z)
    pub fn from_lat_lon(lat: f64, lon: f64, z: u8) -> Result<Self> {
        check_zoom(z)?;

        let lat_clamped = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
        let n = (1u32 << z) as f64;

        let x = ((lon + 180.0) / 360.0 * n).floor().max(0.0) as u32;

        let lat_rad = lat_clamped.to_radians();
        let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n)
            .floor()
            .max(0.0) as u32;

        // Clamp to valid range (handles edge cases at exactly ±180°)
        let max_coord = (1u32 << z) - 1;
        Ok(Self {
            z,
            x: x.min(max_coord),
            y: y.min(max_coord),
        })
    }

    /// Number of tiles along one axis at this zoom.
    pub fn axis_len(&self) -> u32 {
        1u32 << self.z
    }

    /// Latitude of the northern edge of this tile in degrees.
    pub fn north_lat(&self) -> f64 {
        row_edge_lat(self.y, self.z)
    }

    /// Latitude of the southern edge of this tile in degrees.
    pub fn south_lat(&self) -> f64 {
        row_edge_lat(self.y + 1, self.z)
    }

    /// Latitude halfway between the northern and southern edges.
    pub fn center_lat(&self) -> f64 {
        (self.north_lat() + self.south_lat()) / 2.0
    }

    /// Get the bounding box for this tile.
    pub fn bounds(&self) -> BoundingBox {
        let n = self.axis_len() as f64;
        BoundingBox {
            min_lat: self.south_lat(),
            max_lat: self.north_lat(),
            min_lon: self.x as f64 / n * 360.0 - 180.0,
            max_lon: (self.x + 1) as f64 / n * 360.0 - 180.0,
        }
    }

    /// The tile offset by `(dx, dy)` at the same zoom.
    ///
    /// Columns wrap around the antimeridian; rows past the poles have no tile.
    pub fn neighbor(&self, dx: i32, dy: i32) -> Option<Self> {
        let n = self.axis_len() as i64;
        let y = self.y as i64 + dy as i64;
        if y < 0 || y >= n {
            return None;
        }
        let x = (self.x as i64 + dx as i64).rem_euclid(n);
        Some(Self {
            z: self.z,
            x: x as u32,
            y: y as u32,
        })
    }

    /// This tile plus its (up to) eight neighbors.
    pub fn padded(self) -> impl Iterator<Item = TileCoord> {
        (-1..=1).flat_map(move |dy| (-1..=1).filter_map(move |dx| self.neighbor(dx, dy)))
    }
}

/// Latitude in degrees of the northern edge of tile row `y` (inverse of the Slippy Map formula).
fn row_edge_lat(y: u32, z: u8) -> f64 {
    let n = (1u64 << z) as f64;
    (PI * (1.0 - 2.0 * y as f64 / n)).sinh().atan().to_degrees()
}

fn check_zoom(z: u8) -> Result<()> {
    if !(MIN_ZOOM..=MAX_ZOOM).contains(&z) {
        return Err(DemError::InvalidZoomLevel(z));
    }
    Ok(())
}

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum latitude (south edge).
    pub min_lat: f64,
    /// Minimum longitude (west edge).
    pub min_lon: f64,
    /// Maximum latitude (north edge).
    pub max_lat: f64,
    /// Maximum longitude (east edge).
    pub max_lon: f64,
}

impl BoundingBox {
    /// Create a bounding box, rejecting inverted or non-finite corners.
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Result<Self> {
        let finite = [min_lat, min_lon, max_lat, max_lon].iter().all(|v| v.is_finite());
        if !finite || min_lat > max_lat || min_lon > max_lon {
            return Err(DemError::InvalidBoundingBox {
                min_lat,
                min_lon,
                max_lat,
                max_lon,
            });
        }
        Ok(Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        })
    }

    /// Check if a coordinate is within the bounds.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Tiles intersecting this box at `zoom`, ordered north to south then west to east.
    pub fn tiles(&self, zoom: u8) -> Result<Vec<TileCoord>> {
        let tl = TileCoord::from_lat_lon(self.max_lat, self.min_lon, zoom)?;
        let br = TileCoord::from_lat_lon(self.min_lat, self.max_lon, zoom)?;
        if br.x < tl.x || br.y < tl.y {
            return Ok(Vec::new());
        }

        let mut tiles = Vec::with_capacity(((br.x - tl.x + 1) * (br.y - tl.y + 1)) as usize);
        for y in tl.y..=br.y {
            for x in tl.x..=br.x {
                tiles.push(TileCoord { z: zoom, x, y });
            }
        }
        Ok(tiles)
    }
}

/// Expand a tile set by one tile in every direction, deduplicated.
///
/// The original tiles come first in their input order, followed by the
/// padding tiles in discovery order.
pub fn pad_tiles(tiles: &[TileCoord]) -> Vec<TileCoord> {
    let mut seen: HashSet<TileCoord> = tiles.iter().copied().collect();
    let mut padded = tiles.to_vec();
    for tile in tiles {
        for neighbor in tile.padded() {
            if seen.insert(neighbor) {
                padded.push(neighbor);
            }
        }
    }
    padded
}
