//! Exponential damping
//!
//! Every "ease toward target" in the viewer uses the same frame-rate
//! independent step:
//!
//! ```text
//! value += (target - value) * (1 - e^(-k * dt))
//! ```
//!
//! Two half-frames produce exactly the same result as one full frame, so
//! animation speed does not depend on display refresh rate.

use robolab_core::{Euler, Vec3};

/// Trait for values that can be damped toward a target
pub trait Interpolate: Copy {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal (for settling detection)
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() <= epsilon
    }
}

impl Interpolate for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::lerp(self, *other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }
}

impl Interpolate for Euler {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Euler::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.max_abs_diff(other) <= epsilon
    }
}

/// Fraction of the remaining distance covered in `dt` seconds at rate `k`
///
/// Returns 0 for non-positive or non-finite inputs so a bad frame never
/// moves a value.
pub fn damp_factor(k: f32, dt: f32) -> f32 {
    if !k.is_finite() || !dt.is_finite() || k <= 0.0 || dt <= 0.0 {
        return 0.0;
    }
    1.0 - (-k * dt).exp()
}

/// Damp `current` toward `target`
pub fn damp<T: Interpolate>(current: T, target: T, k: f32, dt: f32) -> T {
    current.lerp(&target, damp_factor(k, dt))
}

/// A value that continuously damps toward a target
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Damped<T> {
    current: T,
    target: T,
    rate: f32,
}

impl<T: Interpolate> Damped<T> {
    /// Create a settled value
    pub fn new(value: T, rate: f32) -> Self {
        Self {
            current: value,
            target: value,
            rate,
        }
    }

    pub fn current(&self) -> T {
        self.current
    }

    pub fn target(&self) -> T {
        self.target
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_target(&mut self, target: T) {
        self.target = target;
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    /// Jump to a value immediately, making it the target too
    pub fn snap(&mut self, value: T) {
        self.current = value;
        self.target = value;
    }

    /// Advance by `dt` seconds and return the new current value
    pub fn update(&mut self, dt: f32) -> T {
        self.current = damp(self.current, self.target, self.rate, dt);
        self.current
    }

    pub fn is_settled(&self, epsilon: f32) -> bool {
        self.current.approx_eq(&self.target, epsilon)
    }
}
