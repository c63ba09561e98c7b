// Per-dot decision: where to draw it and whether to draw it at all.
// Visual: dots sitting on the silhouette edge slide outward; dots buried inside vanish.

use crate::grid::GridPoint;
use crate::mask::MaskSampler;

pub const CONTAIN_THRESHOLD: f32 = 0.5;   // alpha above this = dot is on the subject
pub const SUPPRESS_THRESHOLD: f32 = 0.45; // alpha at/above this after the push = hide the dot
pub const GRADIENT_OFFSET: f32 = 2.0;     // central-difference half-width in pixels
pub const PUSH_FACTOR: f32 = 1.6;         // push distance in dot radii

/// Where one dot goes this frame. Never stored across frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotState {
    pub x: f32,
    pub y: f32,
    pub suppressed: bool,
}

impl DotState {
    fn at_rest(point: &GridPoint) -> Self {
        Self { x: point.x, y: point.y, suppressed: false }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DisplacementEngine {
    push_distance: f32,
}

impl DisplacementEngine {
    pub fn new(push_distance: f32) -> Self {
        Self { push_distance }
    }

    pub fn for_dot_radius(dot_radius: f32) -> Self {
        Self::new(dot_radius * PUSH_FACTOR)
    }

    pub fn render_state(&self, point: &GridPoint, sampler: &MaskSampler) -> DotState {
        if !sampler.has_data() {
            return DotState::at_rest(point);
        }
        if sampler.sample(point.x, point.y) <= CONTAIN_THRESHOLD {
            return DotState::at_rest(point);
        }

        let (gx, gy) = alpha_gradient(sampler, point.x, point.y);
        let len = match gx.hypot(gy) {
            l if l > 0.0 => l,
            _ => 1.0,
        };
        // Against the gradient: from the dense interior toward the edge.
        let x = point.x - gx / len * self.push_distance;
        let y = point.y - gy / len * self.push_distance;

        let suppressed = sampler.sample(x, y) >= SUPPRESS_THRESHOLD;
        DotState { x, y, suppressed }
    }
}

/// Central-difference estimate of the alpha gradient at (x, y).
pub fn alpha_gradient(sampler: &MaskSampler, x: f32, y: f32) -> (f32, f32) {
    let d = GRADIENT_OFFSET;
    let gx = sampler.sample(x + d, y) - sampler.sample(x - d, y);
    let gy = sampler.sample(x, y + d) - sampler.sample(x, y - d);
    (gx, gy)
}
