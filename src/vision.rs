// Pixel-level building blocks for the built-in foreground model.
// Visual expectation: after the background has been learned, whatever differs
// from it (you) turns into a soft white blob in the alpha field.
use crate::error::{Error, Result};
use crate::types::{FrameBuffer, Mask, MaskImage};

/// Shrink `src` so it is at most `max_width` wide (nearest neighbour, aspect kept).
/// Frames already narrow enough are copied as-is.
pub fn downscale(src: &FrameBuffer, max_width: usize) -> FrameBuffer {
    if src.width <= max_width || max_width == 0 {
        return src.clone();
    }
    let w = max_width;
    let h = (src.height * max_width / src.width).max(1);
    let mut pixels = Vec::with_capacity(w * h);
    for y in 0..h {
        let sy = y * src.height / h;
        for x in 0..w {
            let sx = x * src.width / w;
            pixels.push(src.pixels[sy * src.width + sx]);
        }
    }
    FrameBuffer { width: w, height: h, pixels }
}

/// Per-pixel, per-channel median over a stack of same-sized frames. Anything
/// present in fewer than half of them drops out. Even stacks take the upper middle value.
pub fn median_background(frames: &[FrameBuffer]) -> Result<FrameBuffer> {
    let Some(first) = frames.first() else {
        return Err(Error::segmentation("median_background: no frames"));
    };
    let (w, h) = (first.width, first.height);
    if frames.iter().any(|f| f.width != w || f.height != h) {
        return Err(Error::segmentation("median_background: frames must share identical dimensions"));
    }

    let rank = frames.len() / 2;
    let mut column: Vec<u8> = Vec::with_capacity(frames.len());
    let pixels = (0..w * h)
        .map(|idx| {
            [16u32, 8, 0].iter().fold(0u32, |acc, &shift| {
                column.clear();
                column.extend(frames.iter().map(|f| (f.pixels[idx] >> shift) as u8));
                let (_, median, _) = column.select_nth_unstable(rank);
                acc | ((*median as u32) << shift)
            })
        })
        .collect();

    Ok(FrameBuffer { width: w, height: h, pixels })
}

/// Alpha from colour distance to the background: 0 below `low`, 1 above `high`,
/// linear in between. Distance is the largest per-channel difference.
pub fn foreground_alpha(frame: &FrameBuffer, background: &FrameBuffer, low: f32, high: f32) -> Result<Mask> {
    if frame.width != background.width || frame.height != background.height {
        return Err(Error::segmentation("foreground_alpha: frame and background differ in size"));
    }
    let span = (high - low).max(f32::EPSILON);
    let alpha = frame
        .pixels
        .iter()
        .zip(background.pixels.iter())
        .map(|(&p, &b)| {
            let d = [16u32, 8, 0]
                .iter()
                .map(|&s| (((p >> s) & 0xFF) as i32 - ((b >> s) & 0xFF) as i32).unsigned_abs())
                .max()
                .unwrap_or(0) as f32;
            ((d - low) / span).clamp(0.0, 1.0)
        })
        .collect();
    Ok(Mask { width: frame.width, height: frame.height, alpha })
}

/// Separable box blur of an alpha field, edges extended. `tmp` and `dst`
/// must match `src` in size.
pub fn box_blur_alpha(src: &Mask, tmp: &mut Mask, dst: &mut Mask, radius: usize) -> Result<()> {
    if src.width != dst.width || src.height != dst.height {
        return Err(Error::segmentation("box_blur: size mismatch src/dst"));
    }
    if tmp.width != src.width || tmp.height != src.height {
        return Err(Error::segmentation("box_blur: size mismatch tmp"));
    }
    let w = src.width as i32;
    let h = src.height as i32;
    if w == 0 || h == 0 {
        return Ok(());
    }
    let r = radius as i32;
    let win = (2 * r + 1) as f32;

    // Pass 1: rows, src -> tmp.
    for y in 0..h {
        let row = (y * w) as usize;
        let mut sum = src.alpha[row] * (r + 1) as f32;
        for x in 1..=r {
            sum += src.alpha[row + x.min(w - 1) as usize];
        }
        for x in 0..w {
            tmp.alpha[row + x as usize] = sum / win;
            let left = (x - r).max(0) as usize;
            let right = (x + r + 1).min(w - 1) as usize;
            sum += src.alpha[row + right] - src.alpha[row + left];
        }
    }

    // Pass 2: columns, tmp -> dst.
    let at = |x: i32, y: i32| (y * w + x) as usize;
    for x in 0..w {
        let mut sum = tmp.alpha[at(x, 0)] * (r + 1) as f32;
        for y in 1..=r {
            sum += tmp.alpha[at(x, y.min(h - 1))];
        }
        for y in 0..h {
            dst.alpha[at(x, y)] = (sum / win).clamp(0.0, 1.0);
            let top = (y - r).max(0);
            let bottom = (y + r + 1).min(h - 1);
            sum += tmp.alpha[at(x, bottom)] - tmp.alpha[at(x, top)];
        }
    }

    Ok(())
}

/// Quantise an alpha field into the image form the segmentation pump hands out.
pub fn to_mask_image(mask: &Mask) -> MaskImage {
    let bytes: Vec<u8> = mask.alpha.iter().map(|a| (a.clamp(0.0, 1.0) * 255.0).round() as u8).collect();
    MaskImage::from_raw(mask.width as u32, mask.height as u32, bytes)
        .unwrap_or_else(|| MaskImage::new(mask.width as u32, mask.height as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downscale_keeps_aspect_and_samples_nearest() {
        let src = FrameBuffer { width: 4, height: 2, pixels: vec![1, 1, 2, 2, 1, 1, 2, 2] };
        let small = downscale(&src, 2);
        assert_eq!((small.width, small.height), (2, 1));
        assert_eq!(small.pixels, vec![1, 2]);
        assert_eq!(downscale(&src, 8), src);
    }

    #[test]
    fn median_ignores_a_passing_object() {
        let bg = FrameBuffer::filled(3, 1, 0x00_40_40_40);
        let mut frames = vec![bg.clone(); 4];
        frames.push(FrameBuffer::filled(3, 1, 0x00_FF_00_00));
        assert_eq!(median_background(&frames).unwrap(), bg);
    }

    #[test]
    fn median_picks_each_channel_independently() {
        // No single frame holds the result: red, green and blue medians come from different frames.
        let frames = [
            FrameBuffer::filled(1, 1, 0x00_10_F0_30),
            FrameBuffer::filled(1, 1, 0x00_20_10_F0),
            FrameBuffer::filled(1, 1, 0x00_F0_20_10),
        ];
        assert_eq!(median_background(&frames).unwrap().pixels, vec![0x00_20_20_30]);
    }

    #[test]
    fn median_of_an_even_stack_takes_the_upper_middle() {
        let frames: Vec<_> = [0x00_00_00_01, 0x00_00_00_04, 0x00_00_00_02, 0x00_00_00_03]
            .into_iter()
            .map(|c| FrameBuffer::filled(2, 1, c))
            .collect();
        assert_eq!(median_background(&frames).unwrap().pixels, vec![3, 3]);
    }

    #[test]
    fn median_rejects_empty_or_mixed_input() {
        assert!(median_background(&[]).is_err());
        let frames = [FrameBuffer::filled(2, 2, 0), FrameBuffer::filled(3, 2, 0)];
        assert!(median_background(&frames).is_err());
    }

    #[test]
    fn alpha_ramps_between_thresholds() {
        let bg = FrameBuffer::filled(3, 1, 0x00_00_00_00);
        let frame = FrameBuffer { width: 3, height: 1, pixels: vec![0x00_00_00_0A, 0x00_00_2C_00, 0x00_FF_00_00] };
        let m = foreground_alpha(&frame, &bg, 24.0, 64.0).unwrap();
        assert_eq!(m.alpha[0], 0.0);
        assert!((m.alpha[1] - 0.5).abs() < 1e-6); // 44 is halfway
        assert_eq!(m.alpha[2], 1.0);
    }

    #[test]
    fn blur_preserves_flat_fields_and_softens_edges() {
        let src = Mask { width: 8, height: 1, alpha: vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0] };
        let mut tmp = Mask::zeroed(8, 1);
        let mut dst = Mask::zeroed(8, 1);
        box_blur_alpha(&src, &mut tmp, &mut dst, 1).unwrap();
        assert!((dst.alpha[0] - 1.0).abs() < 1e-6);
        assert!((dst.alpha[3] - 2.0 / 3.0).abs() < 1e-6);
        assert!((dst.alpha[4] - 1.0 / 3.0).abs() < 1e-6);
        assert!(dst.alpha[7].abs() < 1e-6);

        let mut wrong = Mask::zeroed(7, 1);
        assert!(box_blur_alpha(&src, &mut tmp, &mut wrong, 1).is_err());
    }

    #[test]
    fn mask_image_quantises_alpha() {
        let m = Mask { width: 2, height: 1, alpha: vec![0.0, 1.0] };
        let img = to_mask_image(&m);
        assert_eq!(img.as_raw(), &vec![0, 255]);
    }
}
