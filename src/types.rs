// Core buffer types shared by every stage of the pipeline.

/// An opaque video frame or window buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is (pixels)
    pub height: usize,     // how tall the frame is (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A frame filled with one colour.
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }

    #[inline]
    pub fn rgb_at(&self, x: usize, y: usize) -> Rgb {
        Rgb::from_u32(self.pixels[y * self.width + x])
    }
}

/// What the segmentation model hands back: luma is the foreground alpha (0..255).
pub type MaskImage = image::GrayImage;

/// Alpha field in [0,1] per pixel; 1 = subject, 0 = background.
/// Visual: unseen directly; it drives dot displacement and the silhouette stencil.
#[derive(Clone, Debug)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub alpha: Vec<f32>,   // length = width * height, values clamped to [0.0, 1.0]
}

impl Mask {
    pub fn zeroed(width: usize, height: usize) -> Self {
        Self { width, height, alpha: vec![0.0; width * height] }
    }
}

/// Straight (not premultiplied) 8-bit colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack 0x00RRGGBB.
    #[inline]
    pub const fn from_u32(px: u32) -> Self {
        Self { r: ((px >> 16) & 0xFF) as u8, g: ((px >> 8) & 0xFF) as u8, b: (px & 0xFF) as u8 }
    }

    /// Pack as 0x00RRGGBB.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}
