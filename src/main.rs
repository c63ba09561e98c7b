// What you SEE:
// • A paper-coloured window covered in a grid of sketched purple dots (one yellow).
// • Step into frame: you appear cut out of the live camera feed, and the dots
//   under you vanish while the ones on your outline slide outward.
// • Keep out of frame for the first second or two so the background can be learned.
// • ESC quits.

mod camera;
mod compositor;
mod config;
mod displace;
mod draw;
mod error;
mod grid;
mod mask;
mod pipeline;
mod render;
mod segment;
mod sketch;
mod surface;
mod types;
mod vision;

use camera::{CameraCapture, VideoSource};
use clap::Parser;
use config::Args;
use draw::Drawer;
use error::Error;
use pipeline::{PAPER_COLOR, PipelineContext};
use segment::{BackgroundSubtractor, SegmentationPump};
use sketch::{CirclePainter, SketchyCircle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use types::FrameBuffer;

/// What one pass of the loop did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Tick {
    offered: bool,
    mask_ingested: bool,
    rendered: bool,
}

/// One pass: grab, segment, render into `screen`.
/// A bad frame or a failed render is logged and skipped; `screen` then keeps
/// the previous picture and the loop carries on.
fn tick<V: VideoSource, P: CirclePainter>(
    cam: &mut V,
    pump: &mut SegmentationPump,
    ctx: &mut PipelineContext<P>,
    screen: &mut FrameBuffer,
) -> Tick {
    let mut out = Tick::default();

    // Judged before the grab: a source that has decoded nothing yet is not
    // worth handing to the model.
    let ready = cam.ready();
    let live = match cam.next_frame() {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "dropped camera frame");
            return out;
        }
    };

    if ready && pump.offer(&live) {
        debug!("frame handed to segmentation");
        out.offered = true;
    }
    if let Some(mask) = pump.poll() {
        ctx.ingest_mask(&mask);
        out.mask_ingested = true;
    }

    match ctx.render(&live).and_then(|()| ctx.present(screen)) {
        Ok(()) => out.rendered = true,
        Err(e) => warn!(error = %e, "frame not rendered"),
    }
    out
}

fn main() -> Result<(), Error> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    info!(?args, "starting");

    /* --- Camera + window setup ---
       Visual: window opens sized to the camera feed. A camera failure ends here. */
    let mut cam = CameraCapture::new(args.camera, args.width, args.height)?;
    let (w, h) = cam.resolution();
    let mut drawer = Drawer::new("Dot Parting", w as usize, h as usize, args.fps)?;

    /* --- Pipeline state + segmentation worker ---
       Visual: dots appear at rest until the first mask arrives. */
    let mut ctx = PipelineContext::new(w as usize, h as usize, SketchyCircle::new(args.seed), args.seed)?;
    let mut pump = SegmentationPump::spawn(BackgroundSubtractor::default())?;
    let (sw, sh) = ctx.size();
    let mut screen = FrameBuffer::filled(sw, sh, PAPER_COLOR);

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut masks_this_second: u32 = 0;
    let mut dropped_this_second: u32 = 0;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1-3) Frame in, segmentation hand-off, dots + cut-out into the screen buffer. */
        let t = tick(&mut cam, &mut pump, &mut ctx, &mut screen);
        if t.rendered {
            frames_this_second += 1;
        } else {
            dropped_this_second += 1;
        }
        if t.mask_ingested {
            masks_this_second += 1;
        }

        /* 4) Show it (paced to the target fps by the window). Also keeps the
              window pumping events when a frame was dropped. */
        drawer.present(&screen)?;

        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            info!(
                fps = %format!("{:.1}", frames_this_second as f32 / secs),
                masks_per_sec = %format!("{:.1}", masks_this_second as f32 / secs),
                dropped = dropped_this_second,
                model_busy = pump.busy(),
                "frame rate"
            );
            frames_this_second = 0;
            masks_this_second = 0;
            dropped_this_second = 0;
            last_fps_time = now;
        }
    }

    info!("window closed");
    Ok(())
}
