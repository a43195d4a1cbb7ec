//! Font zoom and the transient zoom indicator.
//!
//! The indicator is a one-shot timer expressed as a deadline. Showing it
//! again pushes the deadline out, which is the "restart on repeated zoom"
//! behavior without any timer object to cancel. Callers pass the current
//! `Instant` in, so tests step time explicitly.

use std::time::{Duration, Instant};

/// Font size steps for one viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    default_size: f32,
    min_size: f32,
}

impl Zoom {
    pub fn new(default_size: f32, min_size: f32) -> Self {
        Self {
            default_size,
            min_size,
        }
    }

    /// One point larger.
    pub fn zoom_in(&self, size: f32) -> f32 {
        size + 1.0
    }

    /// One point smaller, never going under the minimum.
    pub fn zoom_out(&self, size: f32) -> f32 {
        if size > self.min_size {
            (size - 1.0).max(self.min_size)
        } else {
            size
        }
    }

    pub fn reset(&self) -> f32 {
        self.default_size
    }

    /// Size relative to the default, rounded down (`12pt` of `11pt` is 109%).
    pub fn percent(&self, size: f32) -> u32 {
        (size / self.default_size * 100.0).floor() as u32
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new(11.0, 6.0)
    }
}

/// Popup that shows the zoom level for a short while.
#[derive(Debug, Clone)]
pub struct ZoomIndicator {
    duration: Duration,
    label: String,
    deadline: Option<Instant>,
}

impl ZoomIndicator {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            label: String::new(),
            deadline: None,
        }
    }

    /// Shows `percent` and (re)starts the dismissal timer.
    pub fn show(&mut self, percent: u32, now: Instant) {
        self.label = format!("{percent}%");
        self.deadline = Some(now + self.duration);
    }

    /// Hides the indicator once its deadline passed.
    ///
    /// Returns true when this call hid it.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Text to show, if the indicator is up.
    pub fn visible_label(&self) -> Option<&str> {
        self.deadline.map(|_| self.label.as_str())
    }

    pub fn is_visible(&self) -> bool {
        self.deadline.is_some()
    }
}

impl Default for ZoomIndicator {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}
