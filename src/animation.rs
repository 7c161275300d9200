//! Frame-driven animation loop
//!
//! The host environment supplies the frame clock (here, the vsync-locked
//! present in main.rs) and calls `step` once per display refresh. The
//! loop itself only tracks Running/Stopped and performs the
//! update-then-render pair for one frame.

use crate::display::PixelBuffer;
use crate::field::ParticleField;
use crate::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Drives a `ParticleField` one update+render per frame while running
pub struct RenderLoop {
    field: ParticleField,
    state: LoopState,
}

impl RenderLoop {
    /// A new loop starts in the Stopped state
    pub fn new(field: ParticleField) -> Self {
        Self {
            field,
            state: LoopState::Stopped,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn start(&mut self) {
        self.state = LoopState::Running;
    }

    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Swap in a different field (preset change), preserving loop state
    pub fn replace_field(&mut self, field: ParticleField) {
        self.field = field;
    }

    /// Forwarded to the field; pointer updates apply even while stopped
    /// so resuming picks up the current position
    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.field.set_pointer(pointer);
    }

    /// Forwarded to the field; bounds must track the surface even while stopped
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.field.on_resize(width, height);
    }

    /// One frame of work: update every particle, then rasterize.
    /// No-op while stopped, leaving the last rendered frame on screen.
    pub fn step(&mut self, buffer: &mut PixelBuffer) {
        if self.state != LoopState::Running {
            return;
        }
        self.field.update();
        self.field.render(buffer);
    }
}
