// Everything one frame of the effect needs, owned in one place.
// Visual: `render` redraws both layers; `present` stacks paper, dots and
// the cut-out into the buffer the window shows.

use crate::compositor::Compositor;
use crate::error::Result;
use crate::grid::{self, Lattice};
use crate::mask::MaskSampler;
use crate::render::FrameRenderer;
use crate::sketch::CirclePainter;
use crate::surface::Surface;
use crate::types::{FrameBuffer, MaskImage};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

pub const PAPER_COLOR: u32 = 0x00_F6_F2_EA;           // what shows where no dot is drawn
pub const FALLBACK_SIZE: (usize, usize) = (1280, 720); // used until the video reports a size

pub struct PipelineContext<P> {
    background: Surface,
    composite: Surface,
    sampler: MaskSampler,
    renderer: FrameRenderer<P>,
    compositor: Compositor,
    rng: StdRng,
}

fn usable_size(width: usize, height: usize) -> (usize, usize) {
    if width == 0 || height == 0 { FALLBACK_SIZE } else { (width, height) }
}

impl<P: CirclePainter> PipelineContext<P> {
    /// Build every surface at `width` x `height` (the video's native size) and lay out the dots.
    pub fn new(width: usize, height: usize, painter: P, seed: Option<u64>) -> Result<Self> {
        let (width, height) = usable_size(width, height);
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let lattice = grid::generate(width, height, &mut rng)?;
        log_lattice(&lattice);

        Ok(Self {
            background: Surface::new(width, height),
            composite: Surface::new(width, height),
            sampler: MaskSampler::new(width, height),
            renderer: FrameRenderer::new(lattice, painter),
            compositor: Compositor::new(),
            rng,
        })
    }

    pub fn size(&self) -> (usize, usize) {
        (self.background.width(), self.background.height())
    }

    /// Bring every surface and the mask resolution to a new size, and lay the
    /// dots out again for it. The old mask is dropped; the next one re-arms it.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        let (width, height) = usable_size(width, height);
        if (width, height) == self.size() {
            return Ok(());
        }
        debug!(width, height, "resizing surfaces");
        self.background.resize(width, height);
        self.composite.resize(width, height);
        self.sampler.resize(width, height);

        let lattice = grid::generate(width, height, &mut self.rng)?;
        log_lattice(&lattice);
        self.renderer.set_lattice(lattice);
        Ok(())
    }

    /// Take a fresh segmentation result.
    pub fn ingest_mask(&mut self, mask: &MaskImage) {
        self.sampler.ingest(mask);
    }

    /// Redraw the dot layer and the cut-out layer for this video frame.
    pub fn render(&mut self, video: &FrameBuffer) -> Result<()> {
        if (video.width, video.height) != self.size() {
            self.resize(video.width, video.height)?;
        }
        self.renderer.draw(&mut self.background, &self.sampler);
        self.compositor.compose(&mut self.composite, &self.sampler, video)?;
        Ok(())
    }

    /// Stack paper, dots and cut-out into `screen`, reshaping it if needed.
    pub fn present(&self, screen: &mut FrameBuffer) -> Result<()> {
        let (w, h) = self.size();
        if (screen.width, screen.height) != (w, h) {
            *screen = FrameBuffer::filled(w, h, PAPER_COLOR);
        } else {
            screen.pixels.fill(PAPER_COLOR);
        }
        self.background.present_over(screen)?;
        self.composite.present_over(screen)?;
        Ok(())
    }
}

#[cfg(test)]
impl<P: CirclePainter> PipelineContext<P> {
    pub fn lattice(&self) -> &Lattice {
        self.renderer.lattice()
    }

    pub fn sampler(&self) -> &MaskSampler {
        &self.sampler
    }

    pub fn background(&self) -> &Surface {
        &self.background
    }

    pub fn composite(&self) -> &Surface {
        &self.composite
    }
}

fn log_lattice(lattice: &Lattice) {
    let (cols, rows) = lattice.dims();
    let (width, height) = lattice.surface_size();
    info!(
        width,
        height,
        cols,
        rows,
        margin = lattice.margin(),
        special = lattice.special_index(),
        "dot lattice ready"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::tests::half_plane;
    use crate::render::{IDEA_DOT_COLOR, tests::RecordingPainter};
    use crate::sketch::SketchyCircle;

    const SKIN: u32 = 0x00_C8_96_78;

    fn context(w: usize, h: usize) -> PipelineContext<SketchyCircle> {
        PipelineContext::new(w, h, SketchyCircle::new(Some(3)), Some(42)).unwrap()
    }

    #[test]
    fn zero_size_falls_back_to_720p() {
        let ctx = context(0, 0);
        assert_eq!(ctx.size(), FALLBACK_SIZE);
        assert_eq!(ctx.sampler().resolution(), FALLBACK_SIZE);
    }

    #[test]
    fn without_a_mask_only_dots_are_drawn() {
        let mut ctx = context(320, 240);
        ctx.render(&FrameBuffer::filled(320, 240, SKIN)).unwrap();
        assert!(ctx.composite().pixels().iter().all(|p| p[3] == 0));

        let mut screen = FrameBuffer::filled(1, 1, 0);
        ctx.present(&mut screen).unwrap();
        assert_eq!((screen.width, screen.height), (320, 240));
        assert!(screen.pixels.contains(&PAPER_COLOR));
        assert!(screen.pixels.contains(&IDEA_DOT_COLOR.to_u32()));
        assert!(!screen.pixels.contains(&SKIN));
    }

    #[test]
    fn subject_is_cut_out_and_dots_part_around_it() {
        let mut ctx = context(320, 240);
        ctx.ingest_mask(&half_plane(320, 240, 160));
        ctx.render(&FrameBuffer::filled(320, 240, SKIN)).unwrap();

        let mut screen = FrameBuffer::filled(320, 240, 0);
        ctx.present(&mut screen).unwrap();
        // Left half is the person, right half is paper and dots.
        for y in (0..240).step_by(17) {
            assert_eq!(screen.pixels[y * 320 + 10], SKIN);
            assert_ne!(screen.pixels[y * 320 + 300], SKIN);
        }
        // No dot ink lands under the person.
        let bg = ctx.background();
        for y in 0..240 {
            for x in 0..150 {
                assert_eq!(bg.pixel(x, y)[3], 0, "dot ink at ({x},{y})");
            }
        }
    }

    #[test]
    fn new_video_size_resizes_every_surface_and_relays_the_grid() {
        let mut ctx = context(320, 240);
        ctx.ingest_mask(&half_plane(320, 240, 160));
        assert_eq!(ctx.lattice().surface_size(), (320, 240));

        ctx.render(&FrameBuffer::filled(640, 360, SKIN)).unwrap();
        assert_eq!(ctx.size(), (640, 360));
        assert_eq!((ctx.composite().width(), ctx.composite().height()), (640, 360));
        assert_eq!(ctx.sampler().resolution(), (640, 360));
        assert_eq!(ctx.lattice().surface_size(), (640, 360));
        assert!(!ctx.sampler().has_data(), "stale mask is dropped on resize");

        ctx.ingest_mask(&half_plane(32, 18, 16));
        ctx.render(&FrameBuffer::filled(640, 360, SKIN)).unwrap();
        assert!(ctx.sampler().has_data());
    }

    #[test]
    fn same_size_frames_keep_the_lattice_and_special_dot() {
        let mut ctx = context(320, 240);
        let special = ctx.lattice().special_index();
        for _ in 0..5 {
            ctx.render(&FrameBuffer::filled(320, 240, SKIN)).unwrap();
        }
        assert_eq!(ctx.lattice().special_index(), special);
    }

    #[test]
    fn stale_lattice_on_a_smaller_surface_does_not_panic() {
        let big = grid::generate(1280, 720, &mut StdRng::seed_from_u64(1)).unwrap();
        let mut renderer = FrameRenderer::new(big, SketchyCircle::new(Some(8)));
        let mut surface = Surface::new(320, 240);
        let mut sampler = MaskSampler::new(320, 240);
        sampler.ingest(&half_plane(320, 240, 100));
        renderer.draw(&mut surface, &sampler);

        let mut recorder = FrameRenderer::new(
            grid::generate(1280, 720, &mut StdRng::seed_from_u64(1)).unwrap(),
            RecordingPainter::default(),
        );
        recorder.draw(&mut surface, &sampler);
        assert!(!recorder.painter().calls.is_empty());
    }
}
