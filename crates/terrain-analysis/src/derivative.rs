//! Terrain derivatives using Horn's 3x3 method.
//!
//! For an interior pixel `e` with neighbors
//!
//! ```text
//! a b c
//! d e f
//! g h i
//! ```
//!
//! (row 0 is north) the gradients are
//!
//! ```text
//! dz/dx = ((c + 2f + i) - (a + 2d + g)) / (8 * cellSize)   eastward
//! dz/dy = ((g + 2h + i) - (a + 2b + c)) / (8 * cellSize)   southward
//! ```
//!
//! Pixels on the outermost row or column have no full neighborhood and take a
//! fixed border value instead of a computed one.

use terrain_dem::ElevationGrid;

/// Aspect sentinel for cells without a meaningful downhill direction.
pub const FLAT_ASPECT: f32 = -1.0;

/// Slope assigned to border pixels.
pub const SLOPE_BORDER: f32 = 0.0;

/// Aspect assigned to border pixels.
pub const ASPECT_BORDER: f32 = FLAT_ASPECT;

/// Mid-gray hillshade assigned to border pixels.
pub const HILLSHADE_BORDER: f32 = 180.0;

/// Surface gradient at one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    /// Rise per meter toward the east.
    pub dzdx: f64,
    /// Rise per meter toward the south.
    pub dzdy: f64,
}

impl Gradient {
    pub fn slope_radians(&self) -> f64 {
        self.dzdx.hypot(self.dzdy).atan()
    }

    /// Slope in degrees, `[0, 90]`.
    pub fn slope_degrees(&self) -> f64 {
        self.slope_radians().to_degrees()
    }

    /// Compass bearing of the downhill direction, `[0, 360)`, with 0 = north.
    ///
    /// Does not apply a flatness test; a zero gradient yields 0.
    pub fn downhill_bearing(&self) -> f64 {
        let bearing = (-self.dzdx).atan2(self.dzdy).to_degrees();
        let bearing = if bearing < 0.0 { bearing + 360.0 } else { bearing };
        if bearing >= 360.0 {
            0.0
        } else {
            bearing
        }
    }

    /// Aspect in degrees, or [`FLAT_ASPECT`] when the slope is below `flat_threshold_deg`.
    pub fn aspect(&self, flat_threshold_deg: f64) -> f32 {
        if self.slope_degrees() < flat_threshold_deg {
            return FLAT_ASPECT;
        }
        // Bearings just below 360 round up in f32.
        let bearing = self.downhill_bearing() as f32;
        if bearing >= 360.0 {
            0.0
        } else {
            bearing
        }
    }

    /// Illumination `[0, 255]` from a light at `azimuth_deg` / `altitude_deg`.
    pub fn hillshade(&self, azimuth_deg: f64, altitude_deg: f64) -> f32 {
        let slope = self.slope_radians();
        let aspect = self.downhill_bearing().to_radians();
        let altitude = altitude_deg.to_radians();
        let azimuth = azimuth_deg.to_radians();

        let intensity = altitude.sin() * slope.cos()
            + altitude.cos() * slope.sin() * (azimuth - aspect).cos();
        (intensity.clamp(0.0, 1.0) * 255.0) as f32
    }
}

/// Per-pixel derivative values with the same shape as their source grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeGrid {
    data: Vec<f32>,
    width: u32,
    height: u32,
}

impl DerivativeGrid {
    /// A grid filled with `value`.
    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            data: vec![value; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Width and height in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Value at `(row, col)`.
    #[inline]
    pub fn get(&self, row: u32, col: u32) -> f32 {
        self.data[(row * self.width + col) as usize]
    }

    /// Overwrite the value at `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: u32, col: u32, value: f32) {
        self.data[(row * self.width + col) as usize] = value;
    }

    /// Values in row-major order.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Copy out a `width` x `height` window starting at `(row0, col0)`.
    ///
    /// Panics if the window does not fit.
    pub fn crop(&self, row0: u32, col0: u32, width: u32, height: u32) -> Self {
        assert!(row0 + height <= self.height && col0 + width <= self.width);
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for row in row0..row0 + height {
            let start = (row * self.width + col0) as usize;
            data.extend_from_slice(&self.data[start..start + width as usize]);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Overwrite one outer edge with `value`.
    pub fn fill_edge(&mut self, edge: Edge, value: f32) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        match edge {
            Edge::North => (0..self.width).for_each(|c| self.set(0, c, value)),
            Edge::South => (0..self.width).for_each(|c| self.set(self.height - 1, c, value)),
            Edge::West => (0..self.height).for_each(|r| self.set(r, 0, value)),
            Edge::East => (0..self.height).for_each(|r| self.set(r, self.width - 1, value)),
        }
    }

    /// Overwrite one corner pixel with `value`.
    pub fn fill_corner(&mut self, north: bool, west: bool, value: f32) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let row = if north { 0 } else { self.height - 1 };
        let col = if west { 0 } else { self.width - 1 };
        self.set(row, col, value);
    }
}

/// One side of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Row 0.
    North,
    /// Last row.
    South,
    /// Column 0.
    West,
    /// Last column.
    East,
}

fn is_border(grid: &ElevationGrid, row: u32, col: u32) -> bool {
    let (width, height) = grid.dimensions();
    row == 0 || col == 0 || row + 1 >= height || col + 1 >= width
}

/// Horn gradient at `(row, col)`, or `None` for border pixels.
pub fn gradient(grid: &ElevationGrid, row: u32, col: u32) -> Option<Gradient> {
    if is_border(grid, row, col) {
        return None;
    }
    let z = |r: u32, c: u32| grid.get(r, c) as f64;
    let (a, b, c) = (z(row - 1, col - 1), z(row - 1, col), z(row - 1, col + 1));
    let (d, f) = (z(row, col - 1), z(row, col + 1));
    let (g, h, i) = (z(row + 1, col - 1), z(row + 1, col), z(row + 1, col + 1));

    let denom = 8.0 * grid.cell_size();
    Some(Gradient {
        dzdx: ((c + 2.0 * f + i) - (a + 2.0 * d + g)) / denom,
        dzdy: ((g + 2.0 * h + i) - (a + 2.0 * b + c)) / denom,
    })
}

/// Apply `map` to the gradient of every interior pixel; borders get `border`.
fn map_gradients<F>(grid: &ElevationGrid, border: f32, map: F) -> DerivativeGrid
where
    F: Fn(Gradient) -> f32,
{
    let (width, height) = grid.dimensions();
    let mut out = DerivativeGrid::filled(width, height, border);
    for row in 1..height.saturating_sub(1) {
        for col in 1..width.saturating_sub(1) {
            if let Some(g) = gradient(grid, row, col) {
                out.set(row, col, map(g));
            }
        }
    }
    out
}

/// Slope in degrees for every pixel.
pub fn slope(grid: &ElevationGrid) -> DerivativeGrid {
    map_gradients(grid, SLOPE_BORDER, |g| g.slope_degrees() as f32)
}

/// Downhill aspect in compass degrees, [`FLAT_ASPECT`] below `flat_threshold_deg`.
pub fn aspect(grid: &ElevationGrid, flat_threshold_deg: f64) -> DerivativeGrid {
    map_gradients(grid, ASPECT_BORDER, |g| g.aspect(flat_threshold_deg))
}

/// Hillshade intensity `[0, 255]`.
pub fn hillshade(grid: &ElevationGrid, azimuth_deg: f64, altitude_deg: f64) -> DerivativeGrid {
    map_gradients(grid, HILLSHADE_BORDER, |g| g.hillshade(azimuth_deg, altitude_deg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid(rows: &[&[f32]], cell_size: f64) -> ElevationGrid {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        ElevationGrid::new(data, width, height, cell_size).unwrap()
    }

    #[test]
    fn test_flat_grid() {
        let flat = grid(&[&[250.0; 3], &[250.0; 3], &[250.0; 3]], 30.0);
        assert_eq!(slope(&flat).get(1, 1), 0.0);
        assert_eq!(aspect(&flat, 1.0).get(1, 1), FLAT_ASPECT);
    }

    #[test]
    fn test_flat_hillshade_is_sine_of_altitude() {
        let flat = ElevationGrid::from_fn(3, 3, 10.0, |_, _| 1200.0);
        let hs = hillshade(&flat, 315.0, 45.0);
        assert_relative_eq!(hs.get(1, 1), 255.0 * 45f32.to_radians().sin(), epsilon = 1e-3);
    }

    #[test]
    fn test_hand_computed_gradient() {
        let g = grid(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], &[7.0, 8.0, 9.0]], 1.0);
        let gradient = gradient(&g, 1, 1).unwrap();
        assert_relative_eq!(gradient.dzdx, 1.0);
        assert_relative_eq!(gradient.dzdy, 3.0);
        assert_relative_eq!(slope(&g).get(1, 1), 10f32.sqrt().atan().to_degrees(), epsilon = 1e-4);
        // Rising to the south-east, so the surface faces north-north-west
        assert_relative_eq!(aspect(&g, 1.0).get(1, 1), 341.565, epsilon = 1e-3);
    }

    #[test]
    fn test_ramp_slope_is_translation_invariant() {
        let cell_size = 10.0;
        let ramp = ElevationGrid::from_fn(8, 6, cell_size, |_, col| col as f32);
        let s = slope(&ramp);
        for row in 1..5 {
            for col in 1..7 {
                let tan = (s.get(row, col) as f64).to_radians().tan();
                assert_relative_eq!(tan, 1.0 / cell_size, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_aspect_sign_convention() {
        // Lower to the north, higher to the south: faces north
        let north = ElevationGrid::from_fn(3, 3, 1.0, |row, _| row as f32 * 5.0);
        let a = aspect(&north, 1.0).get(1, 1);
        assert!(a < 1.0 || a > 359.0, "north-facing aspect was {}", a);

        let east = ElevationGrid::from_fn(3, 3, 1.0, |_, col| -(col as f32) * 5.0);
        assert_relative_eq!(aspect(&east, 1.0).get(1, 1), 90.0, epsilon = 1e-4);

        let south = ElevationGrid::from_fn(3, 3, 1.0, |row, _| -(row as f32) * 5.0);
        assert_relative_eq!(aspect(&south, 1.0).get(1, 1), 180.0, epsilon = 1e-4);

        let west = ElevationGrid::from_fn(3, 3, 1.0, |_, col| col as f32 * 5.0);
        assert_relative_eq!(aspect(&west, 1.0).get(1, 1), 270.0, epsilon = 1e-4);
    }

    #[test]
    fn test_aspect_flat_threshold() {
        // 1 m rise over 100 m cells is ~0.57 degrees
        let gentle = ElevationGrid::from_fn(3, 3, 100.0, |row, _| row as f32);
        assert_eq!(aspect(&gentle, 1.0).get(1, 1), FLAT_ASPECT);
        assert_ne!(aspect(&gentle, 0.5).get(1, 1), FLAT_ASPECT);
    }

    #[test]
    fn test_border_policy() {
        let bumpy = ElevationGrid::from_fn(6, 5, 3.0, |row, col| ((row * 7 + col * 13) % 11) as f32 * 4.0);
        let s = slope(&bumpy);
        let a = aspect(&bumpy, 1.0);
        let h = hillshade(&bumpy, 315.0, 45.0);
        for row in 0..5 {
            for col in 0..6 {
                if row == 0 || col == 0 || row == 4 || col == 5 {
                    assert_eq!(s.get(row, col), SLOPE_BORDER);
                    assert_eq!(a.get(row, col), ASPECT_BORDER);
                    assert_eq!(h.get(row, col), HILLSHADE_BORDER);
                }
            }
        }
        assert!(s.data().iter().any(|&v| v > 0.0));
    }

    #[test]
    fn test_tiny_grids_are_all_border() {
        let tiny = ElevationGrid::from_fn(2, 2, 1.0, |r, c| (r + c) as f32);
        assert!(slope(&tiny).data().iter().all(|&v| v == SLOPE_BORDER));
        let empty = ElevationGrid::new(Vec::new(), 0, 0, 1.0).unwrap();
        assert!(hillshade(&empty, 315.0, 45.0).data().is_empty());
    }

    #[test]
    fn test_hillshade_favors_northwest_faces() {
        let nw = ElevationGrid::from_fn(3, 3, 1.0, |row, col| (row + col) as f32);
        let se = ElevationGrid::from_fn(3, 3, 1.0, |row, col| -((row + col) as f32));
        let lit = hillshade(&nw, 315.0, 45.0).get(1, 1);
        let shaded = hillshade(&se, 315.0, 45.0).get(1, 1);
        assert!(lit > 180.0 && shaded < 180.0, "lit={} shaded={}", lit, shaded);
    }

    #[test]
    fn test_aspect_stays_below_360_after_narrowing() {
        // Faces a hair west of north: the f64 bearing is 359.9999999...
        let g = Gradient { dzdx: 1e-10, dzdy: 1.0 };
        assert!(g.downhill_bearing() < 360.0);
        assert_eq!(g.aspect(1.0), 0.0);
    }

    #[test]
    fn test_crop_and_fill_edges() {
        let source = ElevationGrid::from_fn(5, 5, 1.0, |row, col| (row * col) as f32);
        let mut s = slope(&source).crop(1, 1, 3, 3);
        assert_eq!(s.dimensions(), (3, 3));
        assert!(s.data().iter().all(|&v| v > 0.0));

        s.fill_edge(Edge::East, -5.0);
        assert_eq!(s.get(0, 2), -5.0);
        assert_eq!(s.get(2, 2), -5.0);
        assert!(s.get(1, 1) > 0.0);

        s.fill_corner(true, true, -7.0);
        assert_eq!(s.get(0, 0), -7.0);
    }
}
