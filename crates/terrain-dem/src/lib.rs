//! # terrain-dem
//!
//! Elevation model primitives for the terrain analysis pipeline.
//!
//! This crate provides:
//! - Slippy-map tile coordinates and bounding-box enumeration
//! - Terrarium-encoded elevation decoding
//! - Regular elevation grids with their ground cell size
//!
//! ## Overview
//!
//! Elevation tiles are addressed with the OpenStreetMap Slippy Map
//! convention. Each 256x256 Terrarium PNG packs elevation into its RGB
//! channels; decoding one yields an [`ElevationGrid`] whose cell size is
//! derived from the tile's zoom and center latitude.
//!
//! ## Example
//!
//! ```
//! use terrain_dem::{terrarium, tile_cell_size, BoundingBox, TileCoord};
//!
//! let bbox = BoundingBox::new(46.00, 11.00, 46.05, 11.08)?;
//! let tiles = bbox.tiles(12)?;
//! assert!(!tiles.is_empty());
//!
//! let coord = TileCoord::new(12, 2174, 1453)?;
//! let cell_size = tile_cell_size(&coord, 256);
//!
//! // One sea-level pixel
//! let grid = terrarium::decode_rgba(&[128, 0, 0, 255], 1, 1, cell_size)?;
//! assert_eq!(grid.get(0, 0), 0.0);
//! # Ok::<(), terrain_dem::DemError>(())
//! ```

mod error;
mod grid;
pub mod terrarium;
mod tile;

pub use error::DemError;
pub use grid::{meters_per_pixel, tile_cell_size, ElevationGrid, DEFAULT_TILE_SIZE, EARTH_CIRCUMFERENCE_M};
pub use tile::{pad_tiles, BoundingBox, TileCoord};

/// Minimum valid zoom level.
pub const MIN_ZOOM: u8 = 1;

/// Maximum zoom level served by Terrarium elevation tiles.
pub const MAX_ZOOM: u8 = 15;

/// Default zoom level (about 26 m per pixel at mid latitudes).
pub const DEFAULT_ZOOM: u8 = 12;

/// Result type for DEM operations.
pub type Result<T> = std::result::Result<T, DemError>;
