// The on-screen window.
// Visual: one window showing the dot field with your cut-out on top.

use crate::error::{Error, Result};
use crate::types::FrameBuffer;
use minifb::{Key, Window, WindowOptions};

pub struct Drawer {
    window: Window,
}

impl Drawer {
    /// Create a window sized to the camera feed, refreshing at `fps`.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize, fps: usize) -> Result<Self> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(fps);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen. Also paces the loop to the target fps.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<()> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }
}
