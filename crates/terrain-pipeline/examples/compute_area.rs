//! Example: Compute slope and aspect tiles around a point.
//!
//! Usage: cargo run --example compute_area -- <lat> <lon> [zoom] [cache_dir]

use std::env;
use std::time::Instant;
use terrain_analysis::TerrainLayer;
use terrain_dem::{BoundingBox, DEFAULT_ZOOM};
use terrain_pipeline::{PipelineConfig, TerrainPipeline};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <lat> <lon> [zoom] [cache_dir]", args[0]);
        eprintln!("Example: {} 46.55 7.98 12 ./terrain_cache", args[0]);
        std::process::exit(1);
    }

    let lat: f64 = args[1].parse().expect("Invalid latitude");
    let lon: f64 = args[2].parse().expect("Invalid longitude");
    let zoom: u8 = args.get(3).map(|z| z.parse().expect("Invalid zoom")).unwrap_or(DEFAULT_ZOOM);
    let cache_dir = args.get(4).map(|s| s.as_str()).unwrap_or("terrain_cache");

    let config = PipelineConfig::default().with_cache_root(cache_dir);
    let pipeline = TerrainPipeline::from_config(config).expect("Failed to create pipeline");
    let bbox = BoundingBox::new(lat - 0.01, lon - 0.01, lat + 0.01, lon + 0.01).expect("Invalid area");

    for layer in TerrainLayer::ALL {
        let start = Instant::now();
        let mut handle = pipeline.compute_for_area(bbox, layer, zoom, true);
        while let Some(progress) = handle.next_progress().await {
            println!("  {:?} {}/{}", progress.phase, progress.current, progress.total);
        }
        let report = handle.join().await.expect("Pipeline task failed");
        println!(
            "{}: {} computed, {} cached, {} missing in {:.2}s",
            layer,
            report.computed,
            report.skipped_cached,
            report.skipped_missing.len(),
            start.elapsed().as_secs_f64()
        );
    }

    println!("Tiles written under {}", pipeline.cache().root().display());
}
