//! Error types for the DEM crate.

use thiserror::Error;

/// Errors that can occur when working with elevation data and tile coordinates.
#[derive(Debug, Error)]
pub enum DemError {
    /// Invalid zoom level.
    #[error("Invalid zoom level {0} (must be 1-15)")]
    InvalidZoomLevel(u8),

    /// Tile index is outside the valid range for its zoom level.
    #[error("Tile x={x} y={y} out of range for zoom {z}")]
    TileOutOfRange {
        /// Zoom level.
        z: u8,
        /// X tile coordinate.
        x: u32,
        /// Y tile coordinate.
        y: u32,
    },

    /// Bounding box corners are inverted or not finite.
    #[error("Invalid bounding box ({min_lat}, {min_lon}) - ({max_lat}, {max_lon})")]
    InvalidBoundingBox {
        /// Southern edge.
        min_lat: f64,
        /// Western edge.
        min_lon: f64,
        /// Northern edge.
        max_lat: f64,
        /// Eastern edge.
        max_lon: f64,
    },

    /// A pixel buffer does not match the declared dimensions.
    #[error("Buffer of {actual} values does not match {width}x{height} (expected {expected})")]
    BufferSize {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Expected buffer length.
        expected: usize,
        /// Actual buffer length.
        actual: usize,
    },
}
