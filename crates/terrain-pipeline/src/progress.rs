//! Progress events and the final coverage report.

use serde::Serialize;
use terrain_analysis::TerrainLayer;
use terrain_dem::TileCoord;

/// Stage of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Fetching the padded source tiles.
    Downloading,
    /// Deriving, colorizing and caching target tiles.
    Computing,
    /// Every target tile was handled.
    Done,
    /// The request was rejected before any work started.
    Error,
}

/// One progress observation. `current` and `total` count target tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerrainProgress {
    /// Current stage.
    pub phase: Phase,
    /// Target tiles handled so far.
    pub current: usize,
    /// Target tiles in the request.
    pub total: usize,
    /// Layer being computed.
    pub layer: TerrainLayer,
    /// Rejection message, set only in [`Phase::Error`].
    pub error: Option<String>,
}

impl TerrainProgress {
    /// Download progress, scaled to target tiles.
    pub fn downloading(layer: TerrainLayer, current: usize, total: usize) -> Self {
        Self::new(Phase::Downloading, layer, current, total)
    }

    /// Compute progress.
    pub fn computing(layer: TerrainLayer, current: usize, total: usize) -> Self {
        Self::new(Phase::Computing, layer, current, total)
    }

    /// Terminal success event with `current == total`.
    pub fn done(layer: TerrainLayer, total: usize) -> Self {
        Self::new(Phase::Done, layer, total, total)
    }

    /// Terminal error event carrying `message`.
    pub fn failed(layer: TerrainLayer, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::new(Phase::Error, layer, 0, 0)
        }
    }

    fn new(phase: Phase, layer: TerrainLayer, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            layer,
            error: None,
        }
    }

    /// `current / total`, or 0 when there is nothing to do.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }

    /// Whether this is the [`Phase::Done`] event.
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Done
    }
}

/// Per-run outcome, returned when the pipeline task finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    /// Layer that was requested.
    pub layer: TerrainLayer,
    /// Zoom level that was requested.
    pub zoom: u8,
    /// Tiles covering the requested area.
    pub target_tiles: usize,
    /// Tiles computed and written this run.
    pub computed: usize,
    /// Target tiles skipped because they were already cached.
    pub skipped_cached: usize,
    /// Target tiles skipped because their own elevation was unavailable.
    pub skipped_missing: Vec<TileCoord>,
    /// Every source tile (targets and padding) that could not be fetched or decoded.
    pub unavailable_sources: Vec<TileCoord>,
    /// Target tiles whose encoding or cache write failed.
    pub write_failures: Vec<TileCoord>,
    /// The run stopped early on cancellation or a dropped progress receiver.
    pub cancelled: bool,
    /// Reason the run was rejected, if it was.
    pub error: Option<String>,
}

impl CoverageReport {
    pub(crate) fn new(layer: TerrainLayer, zoom: u8) -> Self {
        Self {
            layer,
            zoom,
            target_tiles: 0,
            computed: 0,
            skipped_cached: 0,
            skipped_missing: Vec::new(),
            unavailable_sources: Vec::new(),
            write_failures: Vec::new(),
            cancelled: false,
            error: None,
        }
    }

    /// Whether every target tile is now in the cache.
    pub fn is_complete(&self) -> bool {
        !self.cancelled
            && self.error.is_none()
            && self.computed + self.skipped_cached == self.target_tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction() {
        assert_eq!(TerrainProgress::computing(TerrainLayer::Slope, 1, 4).fraction(), 0.25);
        assert_eq!(TerrainProgress::done(TerrainLayer::Slope, 0).fraction(), 0.0);
        assert_eq!(TerrainProgress::done(TerrainLayer::Slope, 6).fraction(), 1.0);
    }

    #[test]
    fn test_is_complete() {
        assert!(TerrainProgress::done(TerrainLayer::Aspect, 3).is_complete());
        assert!(!TerrainProgress::downloading(TerrainLayer::Aspect, 3, 3).is_complete());
        let failed = TerrainProgress::failed(TerrainLayer::Aspect, "bad zoom");
        assert!(!failed.is_complete());
        assert_eq!(failed.error.as_deref(), Some("bad zoom"));
    }

    #[test]
    fn test_report_completeness() {
        let mut report = CoverageReport::new(TerrainLayer::Slope, 12);
        report.target_tiles = 4;
        report.computed = 3;
        assert!(!report.is_complete());
        report.skipped_cached = 1;
        assert!(report.is_complete());
        report.cancelled = true;
        assert!(!report.is_complete());
    }
}
