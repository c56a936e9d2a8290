//! Errors surfaced by the `terrain` command.

use terrain_pipeline::PipelineError;
use thiserror::Error;

/// Failure of a `terrain` subcommand.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Configuration, cache or pipeline task failure.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The coverage report could not be written as JSON.
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    /// The pipeline refused the request (e.g. an unsupported zoom level).
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The run was interrupted before every tile was computed.
    #[error("Cancelled after computing {computed} of {total} tiles")]
    Cancelled { computed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, RunnerError>;
