// Cuts the live frame out along the subject's silhouette.
// Visual: only the person is visible on this layer; everything else is transparent.

use crate::error::Result;
use crate::mask::MaskSampler;
use crate::surface::{CompositeOp, Surface};
use crate::types::FrameBuffer;

#[derive(Default)]
pub struct Compositor;

impl Compositor {
    pub fn new() -> Self {
        Self
    }

    /// Stencil `video` through the current mask onto `surface`.
    /// Returns false, and leaves `surface` untouched, while no mask has arrived yet.
    pub fn compose(&self, surface: &mut Surface, sampler: &MaskSampler, video: &FrameBuffer) -> Result<bool> {
        if !sampler.has_data() {
            return Ok(false);
        }

        surface.clear();
        surface.save();
        let drawn = surface.draw_alpha_stencil(sampler.field());
        if drawn.is_ok() {
            surface.set_composite_op(CompositeOp::SourceIn);
            surface.draw_frame_scaled(video);
        }
        // Restore even when the stencil was rejected so the mode never leaks.
        surface.restore();
        drawn.map(|()| true)
    }
}
