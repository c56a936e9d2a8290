//! # terrain-pipeline
//!
//! Fetches Terrarium elevation tiles, derives slope or aspect, and caches the
//! colorized result as PNG tiles on disk.
//!
//! ## Features
//!
//! - **Elevation sources**: [`ElevationSource`] trait with an HTTP
//!   implementation for the AWS Terrarium bucket
//! - **Retrying fetch**: per-attempt timeout and exponential backoff
//! - **Seam-free tiles**: each tile is computed with a one-pixel ring from
//!   its neighbors
//! - **Disk cache**: `{cache_root}/terrain_analysis/{layer}/{z}/{x}/{y}.png`
//! - **Progress stream**: [`TerrainProgress`] events and a final
//!   [`CoverageReport`]
//!
//! ## Example
//!
//! ```no_run
//! use terrain_analysis::TerrainLayer;
//! use terrain_dem::BoundingBox;
//! use terrain_pipeline::{PipelineConfig, TerrainPipeline};
//!
//! # async fn run() -> terrain_pipeline::Result<()> {
//! let pipeline = TerrainPipeline::from_config(PipelineConfig::default())?;
//! let bbox = BoundingBox::new(46.0, 7.5, 46.1, 7.7)?;
//! let mut handle = pipeline.compute_for_area(bbox, TerrainLayer::Slope, 12, true);
//! while let Some(progress) = handle.next_progress().await {
//!     println!("{:?} {}/{}", progress.phase, progress.current, progress.total);
//! }
//! let report = handle.join().await?;
//! println!("computed {} tiles", report.computed);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod codec;
mod config;
mod error;
pub mod fetch;
mod pipeline;
mod progress;
pub mod source;
pub mod stitch;

pub use cache::{is_cached, TileCacheStore};
pub use config::{PipelineConfig, DEFAULT_ELEVATION_URL};
pub use error::{FetchError, PipelineError};
pub use fetch::RetryPolicy;
pub use pipeline::{PipelineHandle, TerrainPipeline};
pub use progress::{CoverageReport, Phase, TerrainProgress};
pub use source::{ElevationSource, HttpElevationSource};

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
