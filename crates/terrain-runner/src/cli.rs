//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use terrain_analysis::TerrainLayer;
use terrain_dem::{BoundingBox, DEFAULT_ZOOM};

#[derive(Debug, Parser)]
#[command(name = "terrain")]
#[command(about = "Compute and cache colorized slope and aspect tiles", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute a layer for every tile covering a bounding box
    Compute(ComputeArgs),
    /// Inspect or clear the tile cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

/// Where the configuration and cache live.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Cache root directory (overrides the configuration file)
    #[arg(long)]
    pub cache_root: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ComputeArgs {
    /// Area as MINLAT,MINLON,MAXLAT,MAXLON in decimal degrees
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
    pub bbox: BoundingBox,

    /// Layer to compute (slope or aspect)
    #[arg(long)]
    pub layer: TerrainLayer,

    /// Zoom level (1-15)
    #[arg(long, default_value_t = DEFAULT_ZOOM)]
    pub zoom: u8,

    /// Recompute tiles that are already cached
    #[arg(long)]
    pub force: bool,

    /// Print the coverage report as JSON instead of progress lines
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show the size of the cache
    Size {
        /// Only this layer
        #[arg(long)]
        layer: Option<TerrainLayer>,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Delete cached tiles
    Clear {
        /// Only this layer
        #[arg(long)]
        layer: Option<TerrainLayer>,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Parse `MINLAT,MINLON,MAXLAT,MAXLON`.
pub fn parse_bbox(s: &str) -> Result<BoundingBox, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid number in bounding box: {}", e))?;

    let [min_lat, min_lon, max_lat, max_lon] = parts[..] else {
        return Err(format!("expected 4 comma-separated values, got {}", parts.len()));
    };
    BoundingBox::new(min_lat, min_lon, max_lat, max_lon).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        let bbox = parse_bbox("46.0, 7.5,46.1,7.7").unwrap();
        assert_eq!(bbox.min_lat, 46.0);
        assert_eq!(bbox.max_lon, 7.7);

        assert!(parse_bbox("46.0,7.5,46.1").is_err());
        assert!(parse_bbox("46.0,7.5,north,7.7").is_err());
        // Inverted latitude
        assert!(parse_bbox("46.1,7.5,46.0,7.7").is_err());
    }

    #[test]
    fn test_parse_compute() {
        let cli = Cli::try_parse_from([
            "terrain",
            "compute",
            "--bbox",
            "-33.9,18.3,-33.8,18.5",
            "--layer",
            "aspect",
            "--force",
            "--cache-root",
            "/tmp/t",
        ])
        .unwrap();
        let Command::Compute(args) = cli.command else {
            panic!("expected compute");
        };
        assert_eq!(args.layer, TerrainLayer::Aspect);
        assert_eq!(args.zoom, DEFAULT_ZOOM);
        assert!(args.force);
        assert!(!args.json);
        assert_eq!(args.bbox.min_lat, -33.9);
        assert_eq!(args.config.cache_root, Some(PathBuf::from("/tmp/t")));
    }

    #[test]
    fn test_parse_cache_actions() {
        let cli = Cli::try_parse_from(["terrain", "cache", "clear", "--layer", "slope"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Cache {
                action: CacheAction::Clear {
                    layer: Some(TerrainLayer::Slope),
                    ..
                }
            }
        ));
        assert!(Cli::try_parse_from(["terrain", "cache", "size", "--layer", "hillshade"]).is_err());
    }
}
