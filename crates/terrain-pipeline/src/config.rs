//! Pipeline configuration.

use crate::fetch::RetryPolicy;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use terrain_analysis::AnalysisParams;

/// Terrarium tiles on the AWS Open Data elevation bucket.
pub const DEFAULT_ELEVATION_URL: &str =
    "https://s3.amazonaws.com/elevation-tiles-prod/terrarium/{z}/{x}/{y}.png";

/// Configuration for [`TerrainPipeline`](crate::TerrainPipeline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory under which `terrain_analysis/{layer}/{z}/{x}/{y}.png` is written.
    pub cache_root: PathBuf,

    /// Source tile URL template with `{z}`, `{x}` and `{y}` placeholders.
    pub elevation_url: String,

    /// Maximum number of source tiles fetched at once.
    pub max_concurrent_fetches: usize,

    /// Time budget for a single fetch attempt (seconds).
    pub fetch_timeout_secs: u64,

    /// Retries after the first failed attempt.
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds); doubles on each further retry.
    pub retry_base_delay_ms: u64,

    /// Emit a computing progress event every this many tiles.
    pub progress_every: usize,

    /// Derivative and palette parameters.
    pub analysis: AnalysisParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            cache_root: PathBuf::from("terrain_cache"),
            elevation_url: DEFAULT_ELEVATION_URL.to_string(),
            max_concurrent_fetches: 8,
            fetch_timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            progress_every: 4,
            analysis: AnalysisParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Set the cache root directory.
    pub fn with_cache_root<P: Into<PathBuf>>(mut self, cache_root: P) -> Self {
        self.cache_root = cache_root.into();
        self
    }

    /// Set the retry budget and the first backoff delay.
    pub fn with_retries(mut self, max_retries: u32, base_delay_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_base_delay_ms = base_delay_ms;
        self
    }

    /// Set the fetch concurrency.
    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max;
        self
    }

    /// Set the analysis parameters.
    pub fn with_analysis(mut self, analysis: AnalysisParams) -> Self {
        self.analysis = analysis;
        self
    }

    /// Retry behavior derived from this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            attempt_timeout: Duration::from_secs(self.fetch_timeout_secs),
        }
    }
}
