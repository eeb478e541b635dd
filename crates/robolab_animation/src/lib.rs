//! Robolab Animation
//!
//! Frame-rate independent motion helpers used by every per-frame stage of
//! the robot viewer.
//!
//! # Features
//!
//! - **Damping**: exponential approach `value += (target - value) * (1 - e^(-k*dt))`
//!   for scalars, vectors, rotations, and colors
//! - **Easing**: named easing curves for one-shot gestures
//! - **Timers**: one-shot progress and countdowns driven by accumulated time

pub mod damping;
pub mod easing;
pub mod timer;

pub use damping::{damp, damp_factor, Damped, Interpolate};
pub use easing::Easing;
pub use timer::{Countdown, OneShot};
