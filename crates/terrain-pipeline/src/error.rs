//! Error types for the terrain pipeline.

use std::time::Duration;
use terrain_dem::DemError;
use thiserror::Error;

/// Errors that can occur while fetching, computing or caching tiles.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// I/O error reading or writing the cache.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PNG encoding or decoding error.
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid tile coordinates, bounding box or elevation buffer.
    #[error("DEM error: {0}")]
    Dem(#[from] DemError),

    /// Source tile could not be fetched.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(String),

    /// Configuration file could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Background task panicked or was aborted.
    #[error("Pipeline task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Encoded tile does not match the declared raster size.
    #[error("RGBA buffer of {actual} bytes does not fit a {width}x{height} image")]
    RasterSize {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Actual buffer length.
        actual: usize,
    },
}

/// Failure of a single source tile fetch attempt.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Connection or transport failure.
    #[error("Request failed: {0}")]
    Transport(String),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The attempt exceeded its time budget.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// Whether another attempt could succeed.
    ///
    /// A 404/410 means the tile does not exist upstream; everything else is
    /// treated as transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => !matches!(status, 404 | 410),
            FetchError::Transport(_) | FetchError::Timeout(_) => true,
        }
    }
}
