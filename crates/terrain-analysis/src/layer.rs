//! Output layers and their derive/colorize pairing.

use crate::colorize::{colorize_aspect, colorize_grid, colorize_slope, ColorTile};
use crate::derivative::{self, DerivativeGrid, ASPECT_BORDER, SLOPE_BORDER};
use crate::AnalysisParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use terrain_dem::ElevationGrid;
use thiserror::Error;

/// A colorized terrain product that can be computed and cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainLayer {
    /// Slope steepness bands.
    Slope,
    /// Compass orientation of the slope.
    Aspect,
}

/// Error for layer names that are not recognized.
#[derive(Debug, Error)]
#[error("Unknown terrain layer '{0}' (expected 'slope' or 'aspect')")]
pub struct ParseLayerError(pub String);

impl TerrainLayer {
    /// Every layer, in a stable order.
    pub const ALL: [TerrainLayer; 2] = [TerrainLayer::Slope, TerrainLayer::Aspect];

    /// Name used in cache paths and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            TerrainLayer::Slope => "slope",
            TerrainLayer::Aspect => "aspect",
        }
    }

    /// Value this layer assigns to pixels without a full neighborhood.
    pub fn border_value(&self) -> f32 {
        match self {
            TerrainLayer::Slope => SLOPE_BORDER,
            TerrainLayer::Aspect => ASPECT_BORDER,
        }
    }

    /// Compute this layer's raw derivative.
    pub fn derive(&self, grid: &ElevationGrid, params: &AnalysisParams) -> DerivativeGrid {
        match self {
            TerrainLayer::Slope => derivative::slope(grid),
            TerrainLayer::Aspect => derivative::aspect(grid, params.flat_threshold_deg),
        }
    }

    /// Color one derivative value blended with its hillshade.
    pub fn colorize(&self, value: f32, hillshade: f32, params: &AnalysisParams) -> [u8; 4] {
        match self {
            TerrainLayer::Slope => colorize_slope(value, hillshade, params.slope_scheme, params.blend_factor),
            TerrainLayer::Aspect => colorize_aspect(value, hillshade, params.blend_factor),
        }
    }

    /// Color a whole derivative grid with its matching hillshade grid.
    pub fn colorize_grid(
        &self,
        values: &DerivativeGrid,
        hillshade: &DerivativeGrid,
        params: &AnalysisParams,
    ) -> ColorTile {
        colorize_grid(values, hillshade, |v, hs| self.colorize(v, hs, params))
    }

    /// Derive, shade and colorize an elevation grid in one step.
    pub fn render(&self, grid: &ElevationGrid, params: &AnalysisParams) -> ColorTile {
        let shade = derivative::hillshade(grid, params.light_azimuth_deg, params.light_altitude_deg);
        let values = self.derive(grid, params);
        self.colorize_grid(&values, &shade, params)
    }
}

impl fmt::Display for TerrainLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TerrainLayer {
    type Err = ParseLayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slope" => Ok(TerrainLayer::Slope),
            "aspect" => Ok(TerrainLayer::Aspect),
            _ => Err(ParseLayerError(s.to_string())),
        }
    }
}
