// One pass over the dot field.
// Visual: the background layer is wiped and every visible dot is sketched
// at its (possibly pushed) position.

use crate::displace::DisplacementEngine;
use crate::grid::Lattice;
use crate::mask::MaskSampler;
use crate::sketch::{CirclePainter, DotStyle};
use crate::surface::Surface;
use crate::types::Rgb;
use tracing::trace;

pub const IDEA_DOT_COLOR: Rgb = Rgb::new(0x7A, 0x1F, 0xF0);      // every ordinary dot
pub const EXECUTION_DOT_COLOR: Rgb = Rgb::new(0xD6, 0xD1, 0x2A); // the one special dot
pub const DOT_ROUGHNESS: f32 = 0.8;
pub const DIAMETER_FACTOR: f32 = 2.0; // circle size handed to the painter, in dot radii

pub struct FrameRenderer<P> {
    lattice: Lattice,
    engine: DisplacementEngine,
    painter: P,
}

impl<P: CirclePainter> FrameRenderer<P> {
    pub fn new(lattice: Lattice, painter: P) -> Self {
        let engine = DisplacementEngine::for_dot_radius(lattice.dot_radius());
        Self { lattice, engine, painter }
    }

    /// Swap in a lattice generated for a new surface size.
    pub fn set_lattice(&mut self, lattice: Lattice) {
        self.engine = DisplacementEngine::for_dot_radius(lattice.dot_radius());
        self.lattice = lattice;
    }

    /// Clear `surface` and draw every dot that is not suppressed.
    pub fn draw(&mut self, surface: &mut Surface, sampler: &MaskSampler) {
        surface.clear();

        let diameter = self.lattice.dot_radius() * DIAMETER_FACTOR;
        let idea = DotStyle::solid(IDEA_DOT_COLOR, DOT_ROUGHNESS);
        let execution = DotStyle::solid(EXECUTION_DOT_COLOR, DOT_ROUGHNESS);

        let mut suppressed = 0usize;
        for point in self.lattice.points() {
            let state = self.engine.render_state(point, sampler);
            if state.suppressed {
                suppressed += 1;
                continue;
            }
            let style = if self.lattice.is_special(point) { &execution } else { &idea };
            self.painter.circle(surface, state.x, state.y, diameter, style);
        }

        trace!(drawn = self.lattice.len() - suppressed, suppressed, "dot pass");
    }
}

#[cfg(test)]
impl<P> FrameRenderer<P> {
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn painter(&self) -> &P {
        &self.painter
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::grid;
    use crate::mask::tests::{constant, half_plane};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Remembers every circle request instead of drawing it.
    #[derive(Default)]
    pub(crate) struct RecordingPainter {
        pub calls: Vec<(f32, f32, f32, DotStyle)>,
    }

    impl CirclePainter for RecordingPainter {
        fn circle(&mut self, _surface: &mut Surface, cx: f32, cy: f32, diameter: f32, style: &DotStyle) {
            self.calls.push((cx, cy, diameter, *style));
        }
    }

    fn renderer(w: usize, h: usize) -> FrameRenderer<RecordingPainter> {
        let lattice = grid::generate(w, h, &mut StdRng::seed_from_u64(21)).unwrap();
        FrameRenderer::new(lattice, RecordingPainter::default())
    }

    #[test]
    fn no_mask_draws_every_dot_at_rest() {
        let mut r = renderer(320, 240);
        let mut surface = Surface::new(320, 240);
        r.draw(&mut surface, &MaskSampler::new(320, 240));

        let calls = &r.painter().calls;
        assert_eq!(calls.len(), r.lattice().len());
        for (call, p) in calls.iter().zip(r.lattice().points()) {
            assert_eq!((call.0, call.1), (p.x, p.y));
            assert_eq!(call.2, r.lattice().dot_radius() * 2.0);
            assert_eq!(call.3.roughness, DOT_ROUGHNESS);
        }
    }

    #[test]
    fn exactly_one_dot_uses_the_special_colour() {
        let mut r = renderer(640, 480);
        let mut surface = Surface::new(640, 480);
        r.draw(&mut surface, &MaskSampler::new(640, 480));

        let calls = &r.painter().calls;
        let special: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| c.3.fill == EXECUTION_DOT_COLOR)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(special, vec![r.lattice().special_index()]);
        assert!(calls.iter().all(|c| c.3.fill == c.3.stroke));
    }

    #[test]
    fn full_mask_draws_nothing() {
        let mut r = renderer(320, 240);
        let mut surface = Surface::new(320, 240);
        let mut sampler = MaskSampler::new(320, 240);
        sampler.ingest(&constant(320, 240, 255));
        r.draw(&mut surface, &sampler);
        assert!(r.painter().calls.is_empty());
    }

    #[test]
    fn half_mask_hides_the_covered_side() {
        let mut r = renderer(320, 240);
        let mut surface = Surface::new(320, 240);
        let mut sampler = MaskSampler::new(320, 240);
        sampler.ingest(&half_plane(320, 240, 160));
        r.draw(&mut surface, &sampler);

        let calls = &r.painter().calls;
        assert!(!calls.is_empty());
        assert!(calls.len() < r.lattice().len());
        assert!(calls.iter().all(|c| c.0 >= 160.0));
    }

    #[test]
    fn draw_clears_the_previous_frame() {
        let mut r = renderer(64, 64);
        let mut surface = Surface::new(64, 64);
        surface.blend_pixel(0, 0, Rgb::new(1, 2, 3), 1.0);
        r.draw(&mut surface, &MaskSampler::new(64, 64));
        assert_eq!(surface.pixel(0, 0), [0, 0, 0, 0]);
    }
}
