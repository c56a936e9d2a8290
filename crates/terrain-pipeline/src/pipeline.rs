//! Tile pipeline manager.
//!
//! A run takes a bounding box, a layer and a zoom level and moves through
//! three stages:
//!
//! 1. **Enumerate** the target tiles, drop the ones already cached and pad
//!    the rest by one tile on every side.
//! 2. **Download** the padded set in batches of `max_concurrent_fetches`,
//!    retrying transient failures. Missing tiles are recorded, not fatal.
//! 3. **Compute** each target from its [`Neighborhood`], encode it and write
//!    it to the [`TileCacheStore`].
//!
//! Progress is streamed on an unbounded channel and the run's
//! [`CoverageReport`] is returned from the background task.

use crate::cache::TileCacheStore;
use crate::codec::{decode_png, encode_png};
use crate::config::PipelineConfig;
use crate::fetch::{fetch_with_retry, RetryPolicy};
use crate::progress::{CoverageReport, TerrainProgress};
use crate::source::{ElevationSource, HttpElevationSource};
use crate::stitch::Neighborhood;
use crate::{PipelineError, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use terrain_analysis::{AnalysisParams, TerrainLayer};
use terrain_dem::{pad_tiles, terrarium, tile_cell_size, BoundingBox, ElevationGrid, TileCoord};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Computes and caches colorized terrain tiles for geographic areas.
#[derive(Debug)]
pub struct TerrainPipeline<S> {
    source: Arc<S>,
    cache: TileCacheStore,
    config: PipelineConfig,
}

impl TerrainPipeline<HttpElevationSource> {
    /// Pipeline fetching from `config.elevation_url` over HTTP.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        let source = HttpElevationSource::with_template(
            &config.elevation_url,
            Duration::from_secs(config.fetch_timeout_secs),
        )?;
        Ok(Self::new(source, config))
    }
}

impl<S> TerrainPipeline<S>
where
    S: ElevationSource + 'static,
{
    /// Pipeline reading elevation from `source`.
    pub fn new(source: S, config: PipelineConfig) -> Self {
        Self {
            source: Arc::new(source),
            cache: TileCacheStore::new(&config.cache_root),
            config,
        }
    }

    /// The elevation source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The output tile cache.
    pub fn cache(&self) -> &TileCacheStore {
        &self.cache
    }

    /// The configuration this pipeline was built from.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Start computing `layer` for every tile covering `bbox` at `zoom`.
    ///
    /// With `skip_cached`, tiles already on disk are neither fetched nor
    /// recomputed. The run happens on a spawned task, so this must be called
    /// from within a Tokio runtime.
    pub fn compute_for_area(
        &self,
        bbox: BoundingBox,
        layer: TerrainLayer,
        zoom: u8,
        skip_cached: bool,
    ) -> PipelineHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let run = AreaRun {
            source: Arc::clone(&self.source),
            cache: self.cache.clone(),
            policy: self.config.retry_policy(),
            batch_size: self.config.max_concurrent_fetches.max(1),
            progress_every: self.config.progress_every.max(1),
            params: self.config.analysis,
            layer,
            zoom,
            skip_cached,
            tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(run.execute(bbox));

        PipelineHandle {
            progress: rx,
            cancel,
            task,
        }
    }
}

/// Handle to a running computation.
///
/// Dropping the handle (and with it the progress receiver) stops the run at
/// its next checkpoint.
#[derive(Debug)]
pub struct PipelineHandle {
    progress: mpsc::UnboundedReceiver<TerrainProgress>,
    cancel: CancellationToken,
    task: JoinHandle<CoverageReport>,
}

impl PipelineHandle {
    /// Next progress event, or `None` once the run has finished.
    pub async fn next_progress(&mut self) -> Option<TerrainProgress> {
        self.progress.recv().await
    }

    /// Ask the run to stop. In-flight fetches complete; nothing new starts.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stop listening for progress. Like dropping the handle, this stops the
    /// run at its next checkpoint, but the report can still be joined.
    pub fn close_progress(&mut self) {
        self.progress.close();
    }

    /// Token that cancels this run, for use from other tasks.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the run to end and return its report, discarding unread progress.
    pub async fn join(self) -> Result<CoverageReport> {
        let PipelineHandle { progress, task, .. } = self;
        let report = task.await?;
        drop(progress);
        Ok(report)
    }

    /// Collect every remaining progress event and the final report.
    pub async fn finish(mut self) -> Result<(Vec<TerrainProgress>, CoverageReport)> {
        let mut events = Vec::new();
        while let Some(event) = self.progress.recv().await {
            events.push(event);
        }
        let report = self.task.await.map_err(PipelineError::from)?;
        Ok((events, report))
    }
}

/// State owned by one background run.
struct AreaRun<S> {
    source: Arc<S>,
    cache: TileCacheStore,
    policy: RetryPolicy,
    batch_size: usize,
    progress_every: usize,
    params: AnalysisParams,
    layer: TerrainLayer,
    zoom: u8,
    skip_cached: bool,
    tx: mpsc::UnboundedSender<TerrainProgress>,
    cancel: CancellationToken,
}

impl<S> AreaRun<S>
where
    S: ElevationSource + 'static,
{
    fn emit(&self, event: TerrainProgress) {
        // Fails only once the receiver is gone.
        let _ = self.tx.send(event);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }

    async fn execute(self, bbox: BoundingBox) -> CoverageReport {
        let started = Instant::now();
        let mut report = CoverageReport::new(self.layer, self.zoom);

        let targets = match bbox.tiles(self.zoom) {
            Ok(targets) => targets,
            Err(e) => {
                warn!(layer = %self.layer, zoom = self.zoom, error = %e, "Rejected terrain request");
                report.error = Some(e.to_string());
                self.emit(TerrainProgress::failed(self.layer, e.to_string()));
                return report;
            }
        };
        let total = targets.len();
        report.target_tiles = total;

        let pending: Vec<TileCoord> = if self.skip_cached {
            targets
                .into_iter()
                .filter(|coord| !self.cache.is_cached(self.layer, coord))
                .collect()
        } else {
            targets
        };
        report.skipped_cached = total - pending.len();

        info!(
            layer = %self.layer,
            zoom = self.zoom,
            targets = total,
            cached = report.skipped_cached,
            "Starting terrain analysis"
        );

        if pending.is_empty() {
            self.emit(TerrainProgress::done(self.layer, total));
            return report;
        }

        let Some(grids) = self.download(&pending, total, &mut report).await else {
            report.cancelled = true;
            info!(layer = %self.layer, "Terrain analysis cancelled during download");
            return report;
        };

        if !self.compute(&pending, &grids, total, &mut report).await {
            report.cancelled = true;
            info!(layer = %self.layer, computed = report.computed, "Terrain analysis cancelled");
            return report;
        }

        self.emit(TerrainProgress::done(self.layer, total));
        info!(
            layer = %self.layer,
            computed = report.computed,
            cached = report.skipped_cached,
            missing = report.skipped_missing.len(),
            write_failures = report.write_failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Terrain analysis complete"
        );
        report
    }

    /// Fetch and decode the padded tile set. `None` if cancelled.
    async fn download(
        &self,
        pending: &[TileCoord],
        total: usize,
        report: &mut CoverageReport,
    ) -> Option<HashMap<TileCoord, Arc<ElevationGrid>>> {
        let sources = pad_tiles(pending);
        let mut grids = HashMap::with_capacity(sources.len());
        let mut fetched = 0;

        debug!(sources = sources.len(), batch_size = self.batch_size, "Downloading elevation tiles");

        for batch in sources.chunks(self.batch_size) {
            if self.is_cancelled() {
                return None;
            }

            let mut downloads = JoinSet::new();
            let mut in_flight = HashMap::with_capacity(batch.len());
            for &coord in batch {
                let source = Arc::clone(&self.source);
                let policy = self.policy;
                let task = downloads.spawn(async move {
                    let result = load_elevation(source.as_ref(), coord, &policy).await;
                    (coord, result)
                });
                in_flight.insert(task.id(), coord);
            }

            while let Some(joined) = downloads.join_next().await {
                fetched += 1;
                match joined {
                    Ok((coord, Ok(grid))) => {
                        grids.insert(coord, Arc::new(grid));
                    }
                    Ok((coord, Err(e))) => {
                        warn!(tile = %coord, error = %e, "Elevation tile unavailable");
                        report.unavailable_sources.push(coord);
                    }
                    Err(e) => match in_flight.get(&e.id()) {
                        Some(&coord) => {
                            warn!(tile = %coord, error = %e, "Download task panicked");
                            report.unavailable_sources.push(coord);
                        }
                        None => warn!(error = %e, "Download task panicked"),
                    },
                }
            }

            self.emit(TerrainProgress::downloading(
                self.layer,
                fetched * total / sources.len(),
                total,
            ));
        }

        report.unavailable_sources.sort();
        Some(grids)
    }

    /// Compute and cache every pending target. `false` if cancelled.
    async fn compute(
        &self,
        pending: &[TileCoord],
        grids: &HashMap<TileCoord, Arc<ElevationGrid>>,
        total: usize,
        report: &mut CoverageReport,
    ) -> bool {
        let mut current = report.skipped_cached;

        for (i, &coord) in pending.iter().enumerate() {
            if self.is_cancelled() {
                return false;
            }

            match Neighborhood::gather(coord, grids) {
                None => {
                    warn!(tile = %coord, "Skipping tile without elevation data");
                    report.skipped_missing.push(coord);
                }
                Some(hood) => {
                    let cache = self.cache.clone();
                    let (layer, params) = (self.layer, self.params);
                    let rendered =
                        tokio::task::spawn_blocking(move || render_tile(&hood, layer, &params, &cache, coord))
                            .await;

                    match rendered {
                        Ok(Ok(path)) => {
                            debug!(tile = %coord, path = %path.display(), "Computed tile");
                            report.computed += 1;
                        }
                        Ok(Err(e)) => {
                            warn!(tile = %coord, error = %e, "Failed to store tile");
                            report.write_failures.push(coord);
                        }
                        Err(e) => {
                            warn!(tile = %coord, error = %e, "Render task panicked");
                            report.write_failures.push(coord);
                        }
                    }
                }
            }

            current += 1;
            if (i + 1) % self.progress_every == 0 || i + 1 == pending.len() {
                self.emit(TerrainProgress::computing(self.layer, current, total));
            }
        }
        true
    }
}

/// Fetch one source tile and decode it into elevations.
async fn load_elevation<S>(source: &S, coord: TileCoord, policy: &RetryPolicy) -> Result<ElevationGrid>
where
    S: ElevationSource,
{
    let bytes = fetch_with_retry(source, coord, policy).await?;
    tokio::task::spawn_blocking(move || decode_elevation(coord, &bytes)).await?
}

fn decode_elevation(coord: TileCoord, png: &[u8]) -> Result<ElevationGrid> {
    let (width, height, rgba) = decode_png(png)?;
    let cell_size = tile_cell_size(&coord, width);
    Ok(terrarium::decode_rgba(&rgba, width, height, cell_size)?)
}

fn render_tile(
    hood: &Neighborhood,
    layer: TerrainLayer,
    params: &AnalysisParams,
    cache: &TileCacheStore,
    coord: TileCoord,
) -> Result<PathBuf> {
    let tile = hood.render(layer, params);
    let (width, height) = tile.dimensions();
    let png = encode_png(tile.as_bytes(), width, height)?;
    cache.write_tile(layer, &coord, &png)
}
