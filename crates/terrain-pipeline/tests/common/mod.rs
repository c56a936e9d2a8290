//! Synthetic elevation source for pipeline tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Semaphore;
use terrain_analysis::derivative::Gradient;
use terrain_analysis::{AnalysisParams, TerrainLayer};
use terrain_dem::{terrarium, tile_cell_size, BoundingBox, TileCoord};
use terrain_pipeline::codec::encode_png;
use terrain_pipeline::{ElevationSource, FetchError};

/// Pixel size of synthetic tiles.
pub const SIZE: u32 = 16;

/// Serves an inclined plane that continues seamlessly across tiles.
///
/// Elevation rises by `east` meters per pixel eastward and by `south`
/// meters per pixel southward, measured from the north-west corner of
/// `origin`.
pub struct PlaneSource {
    origin: TileCoord,
    east: i64,
    south: i64,
    missing: HashSet<TileCoord>,
    flaky: Mutex<HashMap<TileCoord, u32>>,
    panics: HashSet<TileCoord>,
    gate: Option<(usize, Semaphore)>,
    calls: AtomicUsize,
}

impl PlaneSource {
    pub fn new(origin: TileCoord, east: i64, south: i64) -> Self {
        Self {
            origin,
            east,
            south,
            missing: HashSet::new(),
            flaky: Mutex::new(HashMap::new()),
            panics: HashSet::new(),
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer 404 for `coord`.
    pub fn with_missing(mut self, coord: TileCoord) -> Self {
        self.missing.insert(coord);
        self
    }

    /// Fail the first `failures` requests for `coord` with a 503.
    pub fn with_flaky(self, coord: TileCoord, failures: u32) -> Self {
        self.flaky.lock().unwrap().insert(coord, failures);
        self
    }

    /// Panic inside the fetch for `coord`.
    pub fn with_panic(mut self, coord: TileCoord) -> Self {
        self.panics.insert(coord);
        self
    }

    /// Answer the first `open` requests at once; later ones wait for [`Self::open_gate`].
    pub fn with_gate(mut self, open: usize) -> Self {
        self.gate = Some((open, Semaphore::new(0)));
        self
    }

    /// Let every waiting and future request through.
    pub fn open_gate(&self) {
        if let Some((_, gate)) = &self.gate {
            gate.add_permits(64);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn elevation(&self, coord: TileCoord, row: u32, col: u32) -> f64 {
        let e = (coord.x as i64 - self.origin.x as i64) * SIZE as i64 + col as i64;
        let s = (coord.y as i64 - self.origin.y as i64) * SIZE as i64 + row as i64;
        (1000 + self.east * e + self.south * s) as f64
    }

    fn png(&self, coord: TileCoord) -> Vec<u8> {
        let mut rgba = Vec::with_capacity((SIZE * SIZE * 4) as usize);
        for row in 0..SIZE {
            for col in 0..SIZE {
                let [r, g, b] = terrarium::encode_elevation(self.elevation(coord, row, col));
                rgba.extend_from_slice(&[r, g, b, 255]);
            }
        }
        encode_png(&rgba, SIZE, SIZE).unwrap()
    }

    /// Gradient of the plane in meters per meter at `coord`'s resolution.
    pub fn gradient(&self, coord: TileCoord) -> Gradient {
        let cell = tile_cell_size(&coord, SIZE);
        Gradient {
            dzdx: self.east as f64 / cell,
            dzdy: self.south as f64 / cell,
        }
    }

    /// Expected interior pixel of `layer` for `coord`.
    pub fn expected_pixel(&self, coord: TileCoord, layer: TerrainLayer, params: &AnalysisParams) -> [u8; 4] {
        let g = self.gradient(coord);
        let value = match layer {
            TerrainLayer::Slope => g.slope_degrees() as f32,
            TerrainLayer::Aspect => g.aspect(params.flat_threshold_deg),
        };
        let shade = g.hillshade(params.light_azimuth_deg, params.light_altitude_deg);
        layer.colorize(value, shade, params)
    }
}

impl ElevationSource for PlaneSource {
    async fn fetch(&self, coord: TileCoord) -> Result<Vec<u8>, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((open, gate)) = &self.gate {
            if call >= *open {
                drop(gate.acquire().await.unwrap());
            }
        }
        if self.panics.contains(&coord) {
            panic!("elevation source failed for {coord}");
        }
        if self.missing.contains(&coord) {
            return Err(FetchError::Status {
                status: 404,
                url: coord.to_string(),
            });
        }
        {
            let mut flaky = self.flaky.lock().unwrap();
            if let Some(remaining) = flaky.get_mut(&coord) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(FetchError::Status {
                        status: 503,
                        url: coord.to_string(),
                    });
                }
            }
        }
        Ok(self.png(coord))
    }
}

/// A bounding box strictly inside the 2x2 block whose north-west tile is `nw`.
pub fn two_by_two(nw: TileCoord) -> BoundingBox {
    let a = nw.bounds();
    let b = nw.neighbor(1, 1).unwrap().bounds();
    let eps = 1e-4;
    BoundingBox::new(b.min_lat + eps, a.min_lon + eps, a.max_lat - eps, b.max_lon - eps).unwrap()
}

/// Whether every channel of `a` is within 1 of `b`.
pub fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= 1)
}
