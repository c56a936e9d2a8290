//! Tunable analysis parameters.

use crate::colorize::{SlopeScheme, DEFAULT_BLEND_FACTOR};
use serde::{Deserialize, Serialize};

/// Slope below which a cell has no meaningful aspect, in degrees.
pub const DEFAULT_FLAT_THRESHOLD_DEG: f64 = 1.0;

/// Default light azimuth (from the northwest), in compass degrees.
pub const DEFAULT_LIGHT_AZIMUTH_DEG: f64 = 315.0;

/// Default light altitude above the horizon, in degrees.
pub const DEFAULT_LIGHT_ALTITUDE_DEG: f64 = 45.0;

/// Parameters for deriving and colorizing terrain layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// Slopes below this are reported as flat in the aspect layer.
    pub flat_threshold_deg: f64,

    /// Hillshade light direction in compass degrees.
    pub light_azimuth_deg: f64,

    /// Hillshade light elevation above the horizon in degrees.
    pub light_altitude_deg: f64,

    /// Weight of the hillshade relief in the final color, `[0, 1]`.
    pub blend_factor: f32,

    /// Palette used for the slope layer.
    pub slope_scheme: SlopeScheme,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        AnalysisParams {
            flat_threshold_deg: DEFAULT_FLAT_THRESHOLD_DEG,
            light_azimuth_deg: DEFAULT_LIGHT_AZIMUTH_DEG,
            light_altitude_deg: DEFAULT_LIGHT_ALTITUDE_DEG,
            blend_factor: DEFAULT_BLEND_FACTOR,
            slope_scheme: SlopeScheme::default(),
        }
    }
}

impl AnalysisParams {
    /// Set the flatness threshold for aspect.
    pub fn with_flat_threshold(mut self, degrees: f64) -> Self {
        self.flat_threshold_deg = degrees;
        self
    }

    /// Set the hillshade light position.
    pub fn with_light(mut self, azimuth_deg: f64, altitude_deg: f64) -> Self {
        self.light_azimuth_deg = azimuth_deg;
        self.light_altitude_deg = altitude_deg;
        self
    }

    /// Set the hillshade blend factor, clamped to `[0, 1]`.
    pub fn with_blend_factor(mut self, blend_factor: f32) -> Self {
        self.blend_factor = blend_factor.clamp(0.0, 1.0);
        self
    }

    /// Set the slope palette.
    pub fn with_slope_scheme(mut self, scheme: SlopeScheme) -> Self {
        self.slope_scheme = scheme;
        self
    }
}
