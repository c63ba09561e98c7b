// Software drawing surface: premultiplied RGBA pixels plus a compositing mode.
// Visual: the dot layer and the silhouette layer are both Surfaces; they are
// flattened onto the window buffer once per frame.

use crate::error::{Error, Result};
use crate::types::{FrameBuffer, Mask, Rgb};

pub type PremulRgba8 = [u8; 4];

const TRANSPARENT: PremulRgba8 = [0, 0, 0, 0];

/// How newly drawn pixels combine with what is already on the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompositeOp {
    /// Normal painting: source on top of destination.
    #[default]
    SourceOver,
    /// Keep the source only where the destination already has coverage:
    /// result = source x destination alpha.
    SourceIn,
}

pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<PremulRgba8>,
    op: CompositeOp,
    saved: Vec<CompositeOp>,
}

#[inline]
fn mul_div255(x: u8, y: u8) -> u8 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u8
}

#[inline]
fn blend(op: CompositeOp, dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match op {
        CompositeOp::SourceOver => {
            let inv = 255 - src[3];
            std::array::from_fn(|i| src[i].saturating_add(mul_div255(dst[i], inv)))
        }
        CompositeOp::SourceIn => {
            let da = dst[3];
            std::array::from_fn(|i| mul_div255(src[i], da))
        }
    }
}

/// Premultiply a straight colour by a coverage in [0,1].
#[inline]
pub fn premultiply(color: Rgb, coverage: f32) -> PremulRgba8 {
    let a = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
    [mul_div255(color.r, a), mul_div255(color.g, a), mul_div255(color.b, a), a]
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![TRANSPARENT; width * height],
            op: CompositeOp::SourceOver,
            saved: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocate at a new size. Content is cleared, as resizing a canvas does.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, TRANSPARENT);
    }

    /// Back to fully transparent. The compositing mode is left alone.
    pub fn clear(&mut self) {
        self.pixels.fill(TRANSPARENT);
    }

    pub fn set_composite_op(&mut self, op: CompositeOp) {
        self.op = op;
    }

    /// Remember the current compositing mode.
    pub fn save(&mut self) {
        self.saved.push(self.op);
    }

    /// Return to the mode at the matching `save`. Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(op) = self.saved.pop() {
            self.op = op;
        }
    }

    /// Paint one pixel with `color` at `coverage` under the current mode.
    /// Off-surface coordinates are ignored.
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgb, coverage: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        self.pixels[idx] = blend(self.op, self.pixels[idx], premultiply(color, coverage));
    }

    /// Draw a mask as an opacity-only image: each pixel contributes its alpha
    /// and no colour. The mask must match the surface size.
    pub fn draw_alpha_stencil(&mut self, mask: &Mask) -> Result<()> {
        if mask.width != self.width || mask.height != self.height {
            return Err(Error::surface(format!(
                "stencil is {}x{}, surface is {}x{}",
                mask.width, mask.height, self.width, self.height
            )));
        }
        let op = self.op;
        for (dst, &a) in self.pixels.iter_mut().zip(mask.alpha.iter()) {
            let a = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
            *dst = blend(op, *dst, [0, 0, 0, a]);
        }
        Ok(())
    }

    /// Draw an opaque frame stretched over the whole surface (nearest neighbour).
    pub fn draw_frame_scaled(&mut self, frame: &FrameBuffer) {
        if frame.width == 0 || frame.height == 0 || self.width == 0 || self.height == 0 {
            return;
        }
        let op = self.op;
        for y in 0..self.height {
            let sy = y * frame.height / self.height;
            let row = y * self.width;
            for x in 0..self.width {
                let sx = x * frame.width / self.width;
                let c = frame.rgb_at(sx, sy);
                let idx = row + x;
                self.pixels[idx] = blend(op, self.pixels[idx], [c.r, c.g, c.b, 255]);
            }
        }
    }

    /// Flatten this surface onto an opaque window buffer of the same size.
    pub fn present_over(&self, dst: &mut FrameBuffer) -> Result<()> {
        if dst.width != self.width || dst.height != self.height {
            return Err(Error::surface(format!(
                "present target is {}x{}, surface is {}x{}",
                dst.width, dst.height, self.width, self.height
            )));
        }
        for (out, src) in dst.pixels.iter_mut().zip(self.pixels.iter()) {
            if src[3] == 0 {
                continue; // nothing here; keep what is underneath
            }
            let under = Rgb::from_u32(*out);
            let [r, g, b, _] = blend(CompositeOp::SourceOver, [under.r, under.g, under.b, 255], *src);
            *out = Rgb::new(r, g, b).to_u32();
        }
        Ok(())
    }
}

#[cfg(test)]
impl Surface {
    pub fn pixels(&self) -> &[PremulRgba8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> PremulRgba8 {
        self.pixels[y * self.width + x]
    }

    pub fn composite_op(&self) -> CompositeOp {
        self.op
    }
}
