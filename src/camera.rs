// Opens the default camera and converts frames into a buffer the pipeline can use.
// Visual expectation: each `next_frame()` yields a Vec<u32> of 0x00RRGGBB pixels,
// the live picture that gets cut out along your silhouette.

use crate::error::{Error, Result};
use crate::types::FrameBuffer;

use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};
use tracing::info;

/// Where live frames come from.
pub trait VideoSource {
    /// True once at least one frame has been decoded.
    fn ready(&self) -> bool;
    /// Native size of the frames being delivered.
    fn resolution(&self) -> (u32, u32);
    /// Next decoded frame; may block until the device has one.
    fn next_frame(&mut self) -> Result<FrameBuffer>;
}

// A small wrapper around nokhwa::Camera so our main loop stays clean.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
    frames_decoded: u64,
}

impl CameraCapture {
    /// Open camera `index` near the requested resolution (falls back if not exact).
    /// On success nothing is shown yet; we just hold an open stream.
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self> {
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,                // target FPS
        );

        // Ask for RGB frames, as close to our request as the device allows.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(idx, req)
            .map_err(|e| Error::CameraInit(format!("create camera: {e}")))?;

        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("open stream: {e}")))?;

        // The stream might settle on a slightly different resolution.
        let actual = cam.resolution();
        info!(index, width = actual.width(), height = actual.height(), "camera streaming");

        Ok(Self { cam, width: actual.width(), height: actual.height(), frames_decoded: 0 })
    }
}

impl VideoSource for CameraCapture {
    fn ready(&self) -> bool {
        self.frames_decoded > 0
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn next_frame(&mut self) -> Result<FrameBuffer> {
        // Blocks until the device has a new frame.
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("fetch frame: {e}")))?;

        // ImageBuffer<Rgb<u8>, Vec<u8>> regardless of the raw wire format.
        let rgb_img = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("decode RGB: {e}")))?;

        let (w, h) = rgb_img.dimensions();
        let pixels = rgb_img
            .pixels()
            .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
            .collect();

        // Devices may renegotiate mid-stream; report what actually arrived.
        self.width = w;
        self.height = h;
        self.frames_decoded += 1;

        Ok(FrameBuffer { width: w as usize, height: h as usize, pixels })
    }
}
