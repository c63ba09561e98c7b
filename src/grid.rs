// Lattice of candidate dot positions, built once per surface size.
// Visual: the evenly spaced field of dots you see when nobody is in frame.

use crate::error::{Error, Result};
use rand::Rng;

pub const MARGIN_FRACTION: f32 = 0.06;  // margin as a share of surface width
pub const RADIUS_FRACTION: f32 = 0.013; // dot radius as a share of the smaller side
pub const MIN_DOT_RADIUS: f32 = 6.0;    // keeps dots visible on tiny surfaces
pub const SPACING_FACTOR: f32 = 2.4;    // centre-to-centre spacing in radii

/// One dot origin. `index` is its row-major position in the lattice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPoint {
    pub index: usize,
    pub x: f32,
    pub y: f32,
}

/// The full ordered set of dot origins plus the one special index.
#[derive(Clone, Debug)]
pub struct Lattice {
    points: Vec<GridPoint>,
    special: usize,
    cols: usize,
    rows: usize,
    margin: f32,
    dot_radius: f32,
    width: usize,
    height: usize,
}

impl Lattice {
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// The single point drawn in the distinguished colour.
    pub fn special_index(&self) -> usize {
        self.special
    }

    pub fn is_special(&self, point: &GridPoint) -> bool {
        point.index == self.special
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn dot_radius(&self) -> f32 {
        self.dot_radius
    }

    /// Surface size this lattice was generated for.
    pub fn surface_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// Dot radius for a surface: proportional to the smaller side, never below the minimum.
pub fn dot_radius_for(width: usize, height: usize) -> f32 {
    let short = width.min(height) as f32;
    (short * RADIUS_FRACTION).round().max(MIN_DOT_RADIUS)
}

/// Evenly spread `count` positions over `span`, starting at `margin`.
/// A single position sits at the margin (no division by zero).
fn axis_positions(margin: f32, span: f32, count: usize) -> impl Iterator<Item = f32> {
    let step = if count > 1 { span / (count - 1) as f32 } else { 0.0 };
    (0..count).map(move |i| margin + i as f32 * step)
}

/// Build the lattice for a `width` x `height` surface and pick its special point.
/// Pure apart from the one draw from `rng`.
pub fn generate<R: Rng>(width: usize, height: usize, rng: &mut R) -> Result<Lattice> {
    if width == 0 || height == 0 {
        return Err(Error::surface(format!("cannot lay out a grid on a {width}x{height} surface")));
    }

    let margin = (width as f32 * MARGIN_FRACTION).round();
    let grid_w = (width as f32 - margin * 2.0).max(0.0);
    let grid_h = (height as f32 - margin * 2.0).max(0.0);

    let dot_radius = dot_radius_for(width, height);
    let spacing = dot_radius * SPACING_FACTOR;
    let cols = ((grid_w / spacing).floor() as usize).max(1);
    let rows = ((grid_h / spacing).floor() as usize).max(1);

    let xs: Vec<f32> = axis_positions(margin, grid_w, cols).collect();
    let points: Vec<GridPoint> = axis_positions(margin, grid_h, rows)
        .flat_map(|y| xs.iter().map(move |&x| (x, y)))
        .enumerate()
        .map(|(index, (x, y))| GridPoint { index, x, y })
        .collect();

    let special = rng.gen_range(0..points.len());

    Ok(Lattice { points, special, cols, rows, margin, dot_radius, width, height })
}
