// Foreground segmentation: the model seam, a built-in model, and the pump that
// runs a model off the render thread.
// Visual: masks arrive whenever the model finishes; the dots react on the next frame.

use crate::error::{Error, Result};
use crate::types::{FrameBuffer, Mask, MaskImage};
use crate::vision::{box_blur_alpha, downscale, foreground_alpha, median_background, to_mask_image};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Anything that turns a video frame into a foreground alpha mask.
/// The mask may be smaller than the frame; consumers rescale it.
pub trait Segmenter: Send + 'static {
    fn segment(&mut self, frame: &FrameBuffer) -> Result<MaskImage>;
}

pub const BG_CAPTURE_COUNT: usize = 35;  // ~1-2 seconds of frames at 30 FPS
pub const MODEL_MAX_WIDTH: usize = 320;  // frames are shrunk to this before modelling
const DIFF_LOW: f32 = 24.0;              // colour distance treated as background
const DIFF_HIGH: f32 = 64.0;             // colour distance treated as subject
const ALPHA_BLUR_RADIUS: usize = 3;

/// Stand-in model: learns an empty-scene background from the first frames,
/// then reports whatever differs from it as foreground.
/// Step out of frame for the first second or two after launch.
pub struct BackgroundSubtractor {
    capture_count: usize,
    calibration: Vec<FrameBuffer>,
    background: Option<FrameBuffer>,
}

impl BackgroundSubtractor {
    pub fn new(capture_count: usize) -> Self {
        let capture_count = capture_count.max(1);
        Self { capture_count, calibration: Vec::with_capacity(capture_count), background: None }
    }

    /// Collect one more empty-scene frame. Nothing is foreground until the
    /// background is known, so the mask is blank either way.
    fn calibrate(&mut self, small: FrameBuffer) -> Result<MaskImage> {
        let blank = MaskImage::new(small.width as u32, small.height as u32);
        self.calibration.push(small);
        if self.calibration.len() >= self.capture_count {
            self.background = Some(median_background(&self.calibration)?);
            self.calibration.clear();
            info!(frames = self.capture_count, "background learned");
        }
        Ok(blank)
    }

    fn restart(&mut self) {
        self.calibration.clear();
        self.background = None;
    }
}

#[cfg(test)]
impl BackgroundSubtractor {
    pub fn is_calibrated(&self) -> bool {
        self.background.is_some()
    }
}

impl Default for BackgroundSubtractor {
    fn default() -> Self {
        Self::new(BG_CAPTURE_COUNT)
    }
}

impl Segmenter for BackgroundSubtractor {
    fn segment(&mut self, frame: &FrameBuffer) -> Result<MaskImage> {
        let small = downscale(frame, MODEL_MAX_WIDTH);

        let shape_changed = match (&self.background, self.calibration.first()) {
            (Some(bg), _) | (None, Some(bg)) => bg.width != small.width || bg.height != small.height,
            (None, None) => false,
        };
        if shape_changed {
            debug!(width = small.width, height = small.height, "frame size changed; relearning background");
            self.restart();
        }

        match &self.background {
            Some(background) => {
                let raw = foreground_alpha(&small, background, DIFF_LOW, DIFF_HIGH)?;
                let mut tmp = Mask::zeroed(raw.width, raw.height);
                let mut soft = Mask::zeroed(raw.width, raw.height);
                box_blur_alpha(&raw, &mut tmp, &mut soft, ALPHA_BLUR_RADIUS)?;
                Ok(to_mask_image(&soft))
            }
            None => self.calibrate(small),
        }
    }
}

/// Runs a `Segmenter` on its own thread with at most one request in flight.
/// Frames offered while the model is busy are dropped, never queued.
pub struct SegmentationPump {
    frames: Option<SyncSender<FrameBuffer>>,
    masks: Receiver<Result<MaskImage>>,
    in_flight: bool,
    worker: Option<JoinHandle<()>>,
}

impl SegmentationPump {
    pub fn spawn<S: Segmenter>(model: S) -> Result<Self> {
        let (frame_tx, frame_rx) = mpsc::sync_channel::<FrameBuffer>(1);
        let (mask_tx, mask_rx) = mpsc::sync_channel::<Result<MaskImage>>(1);
        let worker = thread::Builder::new()
            .name("segmentation".into())
            .spawn(move || run_model(model, frame_rx, mask_tx))
            .map_err(|e| Error::segmentation(format!("spawn worker: {e}")))?;
        Ok(Self { frames: Some(frame_tx), masks: mask_rx, in_flight: false, worker: Some(worker) })
    }

    /// True while a frame is with the model.
    pub fn busy(&self) -> bool {
        self.in_flight
    }

    /// Hand `frame` to the model unless it is still working on the previous one.
    /// Returns whether the frame was taken.
    pub fn offer(&mut self, frame: &FrameBuffer) -> bool {
        if self.in_flight {
            return false;
        }
        let Some(tx) = &self.frames else {
            return false;
        };
        match tx.try_send(frame.clone()) {
            Ok(()) => {
                self.in_flight = true;
                true
            }
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Disconnected(_)) => {
                warn!("segmentation worker is gone; no further masks");
                self.frames = None;
                false
            }
        }
    }

    /// The newest finished mask, if one arrived since the last poll.
    /// A failed request is logged and frees the pump for the next offer.
    pub fn poll(&mut self) -> Option<MaskImage> {
        let mut latest = None;
        loop {
            match self.masks.try_recv() {
                Ok(Ok(mask)) => {
                    self.in_flight = false;
                    latest = Some(mask);
                }
                Ok(Err(e)) => {
                    self.in_flight = false;
                    warn!(error = %e, "segmentation request failed");
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.in_flight = false;
                    break;
                }
            }
        }
        latest
    }
}

impl Drop for SegmentationPump {
    fn drop(&mut self) {
        // Closing the frame channel ends the worker's loop.
        self.frames.take();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("segmentation worker panicked");
            }
        }
    }
}

fn run_model<S: Segmenter>(mut model: S, frames: Receiver<FrameBuffer>, masks: SyncSender<Result<MaskImage>>) {
    for frame in frames {
        if masks.send(model.segment(&frame)).is_err() {
            break;
        }
    }
    debug!("segmentation worker stopped");
}
