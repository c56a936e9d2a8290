//! Seam-free rendering of a tile using its neighbors' edge pixels.
//!
//! Horn's method needs a 3x3 window, so the outermost ring of a tile cannot
//! be computed from the tile alone. A [`Neighborhood`] pads the tile with a
//! one-pixel ring taken from the eight adjacent tiles, computes on the padded
//! surface and crops back. Sides whose neighbor is unavailable keep the
//! layer's border value, exactly as an isolated tile would.

use std::collections::HashMap;
use std::sync::Arc;
use terrain_analysis::derivative::{self, Edge, HILLSHADE_BORDER};
use terrain_analysis::{AnalysisParams, ColorTile, DerivativeGrid, TerrainLayer};
use terrain_dem::{ElevationGrid, TileCoord};

/// A target tile plus whichever of its eight neighbors are usable.
#[derive(Debug, Clone)]
pub struct Neighborhood {
    center: Arc<ElevationGrid>,
    /// Indexed by `(dy + 1) * 3 + (dx + 1)`; the center slot stays empty.
    neighbors: [Option<Arc<ElevationGrid>>; 9],
}

fn slot(dx: i32, dy: i32) -> usize {
    ((dy + 1) * 3 + (dx + 1)) as usize
}

impl Neighborhood {
    /// Collect the 3x3 block around `coord`. `None` if the center itself is missing.
    ///
    /// Neighbors with different dimensions than the center are ignored.
    pub fn gather(coord: TileCoord, grids: &HashMap<TileCoord, Arc<ElevationGrid>>) -> Option<Self> {
        let center = grids.get(&coord)?.clone();
        let mut neighbors: [Option<Arc<ElevationGrid>>; 9] = Default::default();
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                neighbors[slot(dx, dy)] = coord
                    .neighbor(dx, dy)
                    .and_then(|n| grids.get(&n))
                    .filter(|g| g.dimensions() == center.dimensions())
                    .cloned();
            }
        }
        Some(Self { center, neighbors })
    }

    /// A neighborhood with no usable neighbors.
    pub fn isolated(center: Arc<ElevationGrid>) -> Self {
        Self {
            center,
            neighbors: Default::default(),
        }
    }

    fn get(&self, dx: i32, dy: i32) -> Option<&ElevationGrid> {
        if dx == 0 && dy == 0 {
            Some(&self.center)
        } else {
            self.neighbors[slot(dx, dy)].as_deref()
        }
    }

    pub fn center(&self) -> &ElevationGrid {
        &self.center
    }

    /// Whether the neighbor at offset `(dx, dy)` contributes pixels.
    pub fn has_neighbor(&self, dx: i32, dy: i32) -> bool {
        (dx != 0 || dy != 0) && self.get(dx, dy).is_some()
    }

    /// The center grid surrounded by a one-pixel ring.
    ///
    /// Ring pixels come from the matching neighbor; where it is missing the
    /// nearest center pixel is repeated.
    pub fn padded_grid(&self) -> ElevationGrid {
        let center = &*self.center;
        let (width, height) = center.dimensions();
        let (w, h) = (width as i64, height as i64);

        ElevationGrid::from_fn(width + 2, height + 2, center.cell_size(), |prow, pcol| {
            let row = prow as i64 - 1;
            let col = pcol as i64 - 1;
            let dy = if row < 0 { -1 } else if row >= h { 1 } else { 0 };
            let dx = if col < 0 { -1 } else if col >= w { 1 } else { 0 };
            match self.get(dx as i32, dy as i32) {
                Some(grid) => grid.get((row - dy * h) as u32, (col - dx * w) as u32),
                None => center.get(row.clamp(0, h - 1) as u32, col.clamp(0, w - 1) as u32),
            }
        })
    }

    /// Crop a padded-surface derivative back to the center and reset the
    /// pixels that depended on a missing neighbor.
    fn crop_center(&self, padded: &DerivativeGrid, border: f32) -> DerivativeGrid {
        let (width, height) = self.center().dimensions();
        let mut out = padded.crop(1, 1, width, height);

        for (dx, dy, edge) in [
            (0, -1, Edge::North),
            (0, 1, Edge::South),
            (-1, 0, Edge::West),
            (1, 0, Edge::East),
        ] {
            if !self.has_neighbor(dx, dy) {
                out.fill_edge(edge, border);
            }
        }
        for (dx, dy) in [(-1, -1), (1, -1), (-1, 1), (1, 1)] {
            if !self.has_neighbor(dx, dy) {
                out.fill_corner(dy < 0, dx < 0, border);
            }
        }
        out
    }

    /// Derive, shade and colorize the center tile.
    pub fn render(&self, layer: TerrainLayer, params: &AnalysisParams) -> ColorTile {
        let padded = self.padded_grid();
        let shade = derivative::hillshade(&padded, params.light_azimuth_deg, params.light_altitude_deg);
        let values = layer.derive(&padded, params);

        let shade = self.crop_center(&shade, HILLSHADE_BORDER);
        let values = self.crop_center(&values, layer.border_value());
        layer.colorize_grid(&values, &shade, params)
    }
}
