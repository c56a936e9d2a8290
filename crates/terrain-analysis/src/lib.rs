//! # terrain-analysis
//!
//! Terrain derivatives and their colorized renderings.
//!
//! ## Features
//!
//! - **Derivative Engine**: slope, aspect and hillshade from an
//!   [`ElevationGrid`](terrain_dem::ElevationGrid) using Horn's 3x3 method
//! - **Colorizer**: ski-touring risk bands for slope, insolation octants for
//!   aspect, each blended with hillshade relief
//! - **Layers**: [`TerrainLayer`] pairs each derivative with its palette
//!
//! ## Example
//!
//! ```
//! use terrain_analysis::{AnalysisParams, TerrainLayer};
//! use terrain_dem::ElevationGrid;
//!
//! let ramp = ElevationGrid::from_fn(16, 16, 25.0, |row, _| row as f32 * 15.0);
//! let tile = TerrainLayer::Slope.render(&ramp, &AnalysisParams::default());
//! assert_eq!(tile.as_bytes().len(), 16 * 16 * 4);
//! ```

pub mod colorize;
pub mod derivative;
mod layer;
mod params;

pub use colorize::{ColorTile, SlopeScheme};
pub use derivative::{DerivativeGrid, Edge, Gradient, FLAT_ASPECT, HILLSHADE_BORDER};
pub use layer::{ParseLayerError, TerrainLayer};
pub use params::{
    AnalysisParams, DEFAULT_FLAT_THRESHOLD_DEG, DEFAULT_LIGHT_ALTITUDE_DEG, DEFAULT_LIGHT_AZIMUTH_DEG,
};
