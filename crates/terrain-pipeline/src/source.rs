//! Elevation tile sources.

use crate::config::DEFAULT_ELEVATION_URL;
use crate::error::FetchError;
use crate::{PipelineError, Result};
use std::future::Future;
use std::time::Duration;
use terrain_dem::TileCoord;
use tracing::{debug, trace};

/// Anything that can produce the encoded source image for a tile.
///
/// Implementations return the raw PNG bytes; decoding happens in the pipeline.
pub trait ElevationSource: Send + Sync {
    /// Fetch the encoded elevation image for `coord`.
    fn fetch(&self, coord: TileCoord) -> impl Future<Output = std::result::Result<Vec<u8>, FetchError>> + Send;
}

/// User-Agent sent with every tile request.
const USER_AGENT: &str = concat!("terrain-pipeline/", env!("CARGO_PKG_VERSION"));

/// Expand a `{z}/{x}/{y}` URL template.
pub fn tile_url(template: &str, coord: &TileCoord) -> String {
    template
        .replace("{z}", &coord.z.to_string())
        .replace("{x}", &coord.x.to_string())
        .replace("{y}", &coord.y.to_string())
}

/// Fetches Terrarium tiles over HTTP.
#[derive(Clone)]
pub struct HttpElevationSource {
    client: reqwest::Client,
    url_template: String,
}

impl std::fmt::Debug for HttpElevationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpElevationSource")
            .field("url_template", &self.url_template)
            .finish()
    }
}

impl HttpElevationSource {
    /// Create a source for the AWS Terrarium tiles.
    pub fn new() -> Result<Self> {
        Self::with_template(DEFAULT_ELEVATION_URL, Duration::from_secs(30))
    }

    /// Create a source with a custom URL template and client timeout.
    pub fn with_template(url_template: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| PipelineError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            url_template: url_template.to_string(),
        })
    }

    /// The `{z}/{x}/{y}` template requests are built from.
    pub fn url_template(&self) -> &str {
        &self.url_template
    }
}

impl ElevationSource for HttpElevationSource {
    async fn fetch(&self, coord: TileCoord) -> std::result::Result<Vec<u8>, FetchError> {
        let url = tile_url(&self.url_template, &coord);
        trace!(url = %url, "HTTP GET request starting");

        let response = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                debug!(
                    url = %url,
                    error = %e,
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(FetchError::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to read response: {}", e)))?;
        debug!(tile = %coord, bytes = bytes.len(), "Fetched elevation tile");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_url() {
        let coord = TileCoord::new(12, 2174, 1453).unwrap();
        assert_eq!(
            tile_url(DEFAULT_ELEVATION_URL, &coord),
            "https://s3.amazonaws.com/elevation-tiles-prod/terrarium/12/2174/1453.png"
        );
        assert_eq!(tile_url("http://localhost/{z}-{y}-{x}", &coord), "http://localhost/12-1453-2174");
    }

    #[test]
    fn test_http_source_construction() {
        let source = HttpElevationSource::new().unwrap();
        assert_eq!(source.url_template(), DEFAULT_ELEVATION_URL);
    }
}
