//! Cooperative stop/pause signaling for the step loop.
//!
//! The handle is cheap to clone and safe to flip from another thread; the
//! scheduler reads it once per step boundary, so nothing is interrupted
//! mid-step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct ControlFlags {
    stop: AtomicBool,
    pause: AtomicBool,
}

/// Shared stop/pause flags for a running simulation.
#[derive(Debug, Clone, Default)]
pub struct ControlHandle {
    flags: Arc<ControlFlags>,
}

impl ControlHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.flags.stop.store(true, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.flags.stop.load(Ordering::Relaxed)
    }

    pub fn set_paused(&self, paused: bool) {
        self.flags.pause.store(paused, Ordering::Relaxed);
    }

    pub fn toggle_pause(&self) {
        self.flags.pause.fetch_xor(true, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.flags.pause.load(Ordering::Relaxed)
    }
}
