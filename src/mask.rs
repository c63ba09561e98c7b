// Holds the latest segmentation result at the working resolution and answers
// point queries against it.
// Visual: nothing on its own; every dot decision and the silhouette stencil read from here.

use crate::types::{Mask, MaskImage};
use image::imageops::{self, FilterType};

pub struct MaskSampler {
    field: Mask,
    has_data: bool,
}

impl MaskSampler {
    /// Empty sampler at the working resolution; reports no data until the first ingest.
    pub fn new(width: usize, height: usize) -> Self {
        Self { field: Mask::zeroed(width, height), has_data: false }
    }

    /// Change the working resolution. The old field no longer lines up with
    /// anything, so it is dropped and the sampler goes back to "mask unknown".
    pub fn resize(&mut self, width: usize, height: usize) {
        self.field = Mask::zeroed(width, height);
        self.has_data = false;
    }

    /// Replace the field with `image`, rescaled to the working resolution.
    /// The previous content is overwritten, never blended.
    pub fn ingest(&mut self, image: &MaskImage) {
        let (w, h) = (self.field.width, self.field.height);
        if w == 0 || h == 0 {
            return;
        }

        let alpha: Vec<f32> = if image.width() as usize == w && image.height() as usize == h {
            image.as_raw().iter().map(|&a| a as f32 / 255.0).collect()
        } else {
            let scaled = imageops::resize(image, w as u32, h as u32, FilterType::Triangle);
            scaled.as_raw().iter().map(|&a| a as f32 / 255.0).collect()
        };

        // Swap in a whole new field: readers only ever see complete snapshots.
        self.field = Mask { width: w, height: h, alpha };
        self.has_data = true;
    }

    pub fn has_data(&self) -> bool {
        self.has_data
    }

    /// Alpha in [0,1] at the pixel containing (x, y). Coordinates outside the
    /// field are clamped to its edge. Without data, everything reads as 0.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        if !self.has_data || self.field.alpha.is_empty() {
            return 0.0;
        }
        let max_x = self.field.width as i64 - 1;
        let max_y = self.field.height as i64 - 1;
        let ix = (x.floor() as i64).clamp(0, max_x) as usize;
        let iy = (y.floor() as i64).clamp(0, max_y) as usize;
        self.field.alpha[iy * self.field.width + ix]
    }

    /// Read-only view of the current field (used as the compositing stencil).
    pub fn field(&self) -> &Mask {
        &self.field
    }
}

#[cfg(test)]
impl MaskSampler {
    pub fn resolution(&self) -> (usize, usize) {
        (self.field.width, self.field.height)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    /// Mask image with alpha 255 left of `edge_x` and 0 from `edge_x` on.
    pub(crate) fn half_plane(width: u32, height: u32, edge_x: u32) -> MaskImage {
        GrayImage::from_fn(width, height, |x, _| if x < edge_x { Luma([255]) } else { Luma([0]) })
    }

    pub(crate) fn constant(width: u32, height: u32, alpha: u8) -> MaskImage {
        GrayImage::from_pixel(width, height, Luma([alpha]))
    }

    #[test]
    fn no_data_before_first_ingest() {
        let sampler = MaskSampler::new(64, 48);
        assert!(!sampler.has_data());
        assert_eq!(sampler.sample(10.0, 10.0), 0.0);
    }

    #[test]
    fn ingest_marks_data_and_reads_back() {
        let mut sampler = MaskSampler::new(64, 48);
        sampler.ingest(&half_plane(64, 48, 32));
        assert!(sampler.has_data());
        assert_eq!(sampler.sample(5.0, 5.0), 1.0);
        assert_eq!(sampler.sample(31.9, 5.0), 1.0);
        assert_eq!(sampler.sample(32.0, 5.0), 0.0);
    }

    #[test]
    fn out_of_range_queries_clamp_to_the_edge() {
        let mut sampler = MaskSampler::new(64, 48);
        sampler.ingest(&half_plane(64, 48, 32));
        assert_eq!(sampler.sample(-100.0, -5.0), 1.0);
        assert_eq!(sampler.sample(1e6, 1e6), 0.0);
        assert_eq!(sampler.sample(f32::NAN, 3.0), 1.0);
    }

    #[test]
    fn samples_are_in_unit_range_and_repeatable() {
        let mut sampler = MaskSampler::new(40, 30);
        let img = GrayImage::from_fn(40, 30, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
        sampler.ingest(&img);
        for y in -3..33 {
            for x in -3..43 {
                let a = sampler.sample(x as f32 + 0.5, y as f32 + 0.5);
                assert!((0.0..=1.0).contains(&a));
                assert_eq!(a, sampler.sample(x as f32 + 0.5, y as f32 + 0.5));
            }
        }
    }

    #[test]
    fn ingest_overwrites_instead_of_blending() {
        let mut sampler = MaskSampler::new(16, 16);
        sampler.ingest(&constant(16, 16, 255));
        sampler.ingest(&constant(16, 16, 0));
        assert_eq!(sampler.sample(8.0, 8.0), 0.0);
    }

    #[test]
    fn smaller_mask_is_scaled_to_the_working_resolution() {
        let mut sampler = MaskSampler::new(64, 48);
        sampler.ingest(&half_plane(16, 12, 8));
        assert_eq!(sampler.resolution(), (64, 48));
        assert_eq!(sampler.field().alpha.len(), 64 * 48);
        assert!(sampler.sample(2.0, 20.0) > 0.99);
        assert!(sampler.sample(62.0, 20.0) < 0.01);
    }

    #[test]
    fn resize_forgets_the_old_field() {
        let mut sampler = MaskSampler::new(16, 16);
        sampler.ingest(&constant(16, 16, 255));
        sampler.resize(32, 24);
        assert!(!sampler.has_data());
        assert_eq!(sampler.resolution(), (32, 24));
        assert_eq!(sampler.sample(100.0, 100.0), 0.0);
    }
}
