//! Timers driven by accumulated elapsed time
//!
//! Neither timer reads a clock. Callers feed them the frame delta so that
//! behavior is deterministic under test and pauses with the frame loop.

/// One-shot animation progress over a fixed duration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OneShot {
    duration: f32,
    elapsed: f32,
    active: bool,
}

impl OneShot {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(f32::EPSILON),
            elapsed: 0.0,
            active: false,
        }
    }

    /// Restart from zero
    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.active = true;
    }

    pub fn cancel(&mut self) {
        self.active = false;
        self.elapsed = 0.0;
    }

    /// Advance and return the progress (0-1) reached this frame
    ///
    /// The frame that reaches the end still reports `1.0`; the timer is
    /// inactive afterwards.
    pub fn update(&mut self, dt: f32) -> Option<f32> {
        if !self.active {
            return None;
        }
        self.elapsed += dt.max(0.0);
        let progress = (self.elapsed / self.duration).min(1.0);
        if progress >= 1.0 {
            self.active = false;
        }
        Some(progress)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn progress(&self) -> f32 {
        if self.active {
            (self.elapsed / self.duration).min(1.0)
        } else {
            0.0
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

/// Countdown that fires when it reaches zero
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Countdown {
    remaining: f32,
}

impl Countdown {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    pub fn reset(&mut self, seconds: f32) {
        self.remaining = seconds;
    }

    /// Decrement; returns `true` when the countdown is at or below zero
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt.max(0.0);
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}
