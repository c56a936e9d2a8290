//! Subcommand implementations.

use crate::cli::{CacheAction, ComputeArgs, ConfigArgs};
use crate::error::{Result, RunnerError};
use terrain_analysis::TerrainLayer;
use terrain_pipeline::{
    CoverageReport, Phase, PipelineConfig, TerrainPipeline, TerrainProgress, TileCacheStore,
};
use tracing::{info, warn};

/// Build the pipeline configuration from the optional file and overrides.
pub fn load_config(args: &ConfigArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration");
            PipelineConfig::from_file(path)?
        }
        None => PipelineConfig::default(),
    };
    if let Some(root) = &args.cache_root {
        config = config.with_cache_root(root);
    }
    Ok(config)
}

/// Run a computation until it finishes or Ctrl-C is pressed.
pub async fn compute(args: ComputeArgs) -> Result<CoverageReport> {
    let config = load_config(&args.config)?;
    info!(cache_root = %config.cache_root.display(), "Using cache");

    let pipeline = TerrainPipeline::from_config(config)?;
    let mut handle = pipeline.compute_for_area(args.bbox, args.layer, args.zoom, !args.force);

    let token = handle.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight work");
            token.cancel();
        }
    });

    while let Some(progress) = handle.next_progress().await {
        if !args.json {
            print_progress(&progress);
        }
    }
    interrupt.abort();

    let report = handle.join().await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    if let Some(error) = &report.error {
        return Err(RunnerError::Rejected(error.clone()));
    }
    if report.cancelled {
        return Err(RunnerError::Cancelled {
            computed: report.computed,
            total: report.target_tiles,
        });
    }
    Ok(report)
}

/// Run a cache subcommand.
pub fn cache(action: CacheAction) -> Result<()> {
    match action {
        CacheAction::Size { layer, config } => {
            let store = TileCacheStore::new(load_config(&config)?.cache_root);
            let bytes = match layer {
                Some(layer) => store.layer_size(layer)?,
                None => store.size()?,
            };
            println!("{}: {}", scope(layer), format_size(bytes));
            println!("  Path: {}", store.root().display());
        }
        CacheAction::Clear { layer, config } => {
            let store = TileCacheStore::new(load_config(&config)?.cache_root);
            let freed = match layer {
                Some(layer) => {
                    let bytes = store.layer_size(layer)?;
                    store.clear_layer(layer)?;
                    bytes
                }
                None => {
                    let bytes = store.size()?;
                    store.clear()?;
                    bytes
                }
            };
            println!("Cleared {}, freed {}", scope(layer), format_size(freed));
        }
    }
    Ok(())
}

fn scope(layer: Option<TerrainLayer>) -> String {
    match layer {
        Some(layer) => format!("{} cache", layer),
        None => "terrain cache".to_string(),
    }
}

fn print_progress(progress: &TerrainProgress) {
    match progress.phase {
        Phase::Downloading | Phase::Computing => println!(
            "[{}] {:?} {}/{} ({:.0}%)",
            progress.layer,
            progress.phase,
            progress.current,
            progress.total,
            progress.fraction() * 100.0
        ),
        Phase::Done => println!("[{}] Done: {} tiles", progress.layer, progress.total),
        Phase::Error => println!(
            "[{}] Error: {}",
            progress.layer,
            progress.error.as_deref().unwrap_or("unknown")
        ),
    }
}

fn print_summary(report: &CoverageReport) {
    println!();
    println!("Layer:    {} (zoom {})", report.layer, report.zoom);
    println!("Tiles:    {}", report.target_tiles);
    println!("Computed: {}", report.computed);
    println!("Cached:   {}", report.skipped_cached);
    if !report.skipped_missing.is_empty() {
        println!("Missing elevation: {}", join_tiles(&report.skipped_missing));
    }
    if !report.write_failures.is_empty() {
        println!("Write failures: {}", join_tiles(&report.write_failures));
    }
}

fn join_tiles(tiles: &[terrain_dem::TileCoord]) -> String {
    tiles.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
