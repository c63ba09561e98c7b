// Hand-drawn looking circles for the dot field.
// Visual: each dot is a slightly wobbly filled disc traced twice by a pen,
// so the grid reads as sketched rather than stamped.

use crate::surface::Surface;
use crate::types::Rgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillStyle {
    #[default]
    Solid,
}

/// Everything the circle primitive needs besides position and size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotStyle {
    pub fill: Rgb,
    pub fill_style: FillStyle,
    pub stroke: Rgb,
    pub roughness: f32,
}

impl DotStyle {
    /// Solid dot whose outline is the same colour as its fill.
    pub fn solid(color: Rgb, roughness: f32) -> Self {
        Self { fill: color, fill_style: FillStyle::Solid, stroke: color, roughness }
    }
}

/// Draws one decorative circle. `diameter` is the full width of the circle.
pub trait CirclePainter {
    fn circle(&mut self, surface: &mut Surface, cx: f32, cy: f32, diameter: f32, style: &DotStyle);
}

pub struct SketchyCircle {
    rng: StdRng,
}

impl SketchyCircle {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Closed outline around (cx, cy) whose radius wanders with `roughness`.
    fn wobbly_outline(&mut self, cx: f32, cy: f32, radius: f32, roughness: f32) -> Vec<(f32, f32)> {
        let n = ((TAU * radius / 3.0) as usize).max(12);
        let amp = roughness * (radius * 0.08).max(0.5);
        let start = self.rng.gen_range(0.0..TAU);
        (0..n)
            .map(|i| {
                let theta = start + TAU * i as f32 / n as f32;
                let r = radius + if amp > 0.0 { self.rng.gen_range(-amp..=amp) } else { 0.0 };
                (cx + r * theta.cos(), cy + r * theta.sin())
            })
            .collect()
    }
}

impl CirclePainter for SketchyCircle {
    fn circle(&mut self, surface: &mut Surface, cx: f32, cy: f32, diameter: f32, style: &DotStyle) {
        let radius = diameter * 0.5;
        if !(radius > 0.0) {
            return;
        }

        match style.fill_style {
            FillStyle::Solid => {
                let body = self.wobbly_outline(cx, cy, radius, style.roughness);
                fill_polygon(surface, &body, style.fill);
            }
        }

        // Two pen passes, each with its own wobble.
        for _ in 0..2 {
            let pen = self.wobbly_outline(cx, cy, radius, style.roughness);
            stroke_closed(surface, &pen, style.stroke);
        }
    }
}

/// Even-odd scanline fill, sampling at pixel centres.
fn fill_polygon(surface: &mut Surface, pts: &[(f32, f32)], color: Rgb) {
    if pts.len() < 3 {
        return;
    }
    let (min_y, max_y) = pts
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));

    let mut crossings: Vec<f32> = Vec::with_capacity(8);
    for py in (min_y.floor() as i32)..=(max_y.ceil() as i32) {
        let sy = py as f32 + 0.5;
        crossings.clear();
        for (i, &(x0, y0)) in pts.iter().enumerate() {
            let (x1, y1) = pts[(i + 1) % pts.len()];
            if (y0 <= sy) != (y1 <= sy) {
                crossings.push(x0 + (sy - y0) / (y1 - y0) * (x1 - x0));
            }
        }
        crossings.sort_by(f32::total_cmp);
        for span in crossings.chunks_exact(2) {
            let from = (span[0] - 0.5).ceil() as i32;
            let to = (span[1] - 0.5).floor() as i32;
            for px in from..=to {
                surface.blend_pixel(px, py, color, 1.0);
            }
        }
    }
}

fn stroke_closed(surface: &mut Surface, pts: &[(f32, f32)], color: Rgb) {
    for (i, &(x0, y0)) in pts.iter().enumerate() {
        let (x1, y1) = pts[(i + 1) % pts.len()];
        draw_line(surface, x0.round() as i32, y0.round() as i32, x1.round() as i32, y1.round() as i32, color);
    }
}

/// Bresenham line, one pixel wide.
fn draw_line(surface: &mut Surface, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        surface.blend_pixel(x0, y0, color, 1.0);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}
