use anyhow::Result;

use crate::{color::Color, input::Key, math::Rect};

/// Window and input notifications drained at the start of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformEvent {
    /// The user asked to close the window.
    CloseRequested,
    /// The drawable surface changed size, in logical pixels.
    Resized { width: u32, height: u32 },
}

/// Everything the frame loop needs from a windowing backend.
///
/// `WinitPlatform` is the real implementation; tests drive the loop with a
/// scripted fake.
pub trait Platform {
    /// Drain all pending events since the previous call.
    fn poll_events(&mut self) -> Result<Vec<PlatformEvent>>;

    /// Returns true if `key` is currently held.
    fn key_down(&self, key: Key) -> bool;

    /// Fill the whole viewport with `color`.
    fn clear(&mut self, color: Color) -> Result<()>;

    /// Draw a filled, axis-aligned rectangle.
    fn draw_rect(&mut self, rect: Rect, color: Color) -> Result<()>;

    /// Show everything drawn since the previous present.
    fn present(&mut self) -> Result<()>;
}
