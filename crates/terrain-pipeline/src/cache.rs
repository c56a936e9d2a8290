//! On-disk store for computed analysis tiles.
//!
//! Tiles live at `{cache_root}/terrain_analysis/{layer}/{z}/{x}/{y}.png`.
//! A file's existence is the only record that a tile has been computed.

use crate::Result;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use terrain_analysis::TerrainLayer;
use terrain_dem::TileCoord;
use tracing::debug;

/// Directory under the cache root that holds every layer.
pub const CACHE_DIR_NAME: &str = "terrain_analysis";

/// File extension of cached tiles.
pub const TILE_EXTENSION: &str = "png";

/// Cache of colorized tiles, one directory tree per layer.
#[derive(Debug, Clone)]
pub struct TileCacheStore {
    root: PathBuf,
}

impl TileCacheStore {
    /// Store rooted at `cache_root/terrain_analysis`. Nothing is created until the first write.
    pub fn new<P: AsRef<Path>>(cache_root: P) -> Self {
        Self {
            root: cache_root.as_ref().join(CACHE_DIR_NAME),
        }
    }

    /// The `terrain_analysis` directory holding every layer.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one layer's tiles.
    pub fn layer_dir(&self, layer: TerrainLayer) -> PathBuf {
        self.root.join(layer.name())
    }

    /// Path of the cached tile, whether or not it exists.
    pub fn tile_path(&self, layer: TerrainLayer, coord: &TileCoord) -> PathBuf {
        self.layer_dir(layer)
            .join(coord.z.to_string())
            .join(coord.x.to_string())
            .join(format!("{}.{}", coord.y, TILE_EXTENSION))
    }

    /// Whether the tile exists on disk.
    pub fn is_cached(&self, layer: TerrainLayer, coord: &TileCoord) -> bool {
        self.tile_path(layer, coord).is_file()
    }

    /// Write an encoded tile, creating parent directories as needed.
    ///
    /// The bytes go to a temporary file in the target directory first, so a
    /// crash never leaves a truncated tile that later reads as cached.
    pub fn write_tile(&self, layer: TerrainLayer, coord: &TileCoord, png: &[u8]) -> Result<PathBuf> {
        let path = self.tile_path(layer, coord);
        let dir = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "tile path has no parent"))?;
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(png)?;
        tmp.persist(&path).map_err(|e| e.error)?;

        debug!(layer = %layer, tile = %coord, bytes = png.len(), "Cached tile");
        Ok(path)
    }

    /// Total bytes across every layer.
    pub fn size(&self) -> Result<u64> {
        dir_size(&self.root)
    }

    /// Total bytes for one layer.
    pub fn layer_size(&self, layer: TerrainLayer) -> Result<u64> {
        dir_size(&self.layer_dir(layer))
    }

    /// Remove every cached tile.
    pub fn clear(&self) -> Result<()> {
        remove_dir(&self.root)
    }

    /// Remove one layer's tiles.
    pub fn clear_layer(&self, layer: TerrainLayer) -> Result<()> {
        remove_dir(&self.layer_dir(layer))
    }
}

/// Whether `{cache_root}/terrain_analysis/{layer}/{z}/{x}/{y}.png` exists.
pub fn is_cached<P: AsRef<Path>>(cache_root: P, layer: TerrainLayer, z: u8, x: u32, y: u32) -> bool {
    TileCacheStore::new(cache_root).is_cached(layer, &TileCoord { z, x, y })
}

fn dir_size(path: &Path) -> Result<u64> {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut total = 0;
    for entry in entries {
        let entry = entry?;
        let meta = entry.metadata()?;
        if meta.is_dir() {
            total += dir_size(&entry.path())?;
        } else {
            total += meta.len();
        }
    }
    Ok(total)
}

fn remove_dir(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
