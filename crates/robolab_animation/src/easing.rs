//! Easing functions for one-shot animations

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Easing curve mapping linear progress (0-1) to eased progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    EaseInQuad,
    EaseOutQuad,
    #[default]
    EaseInOutQuad,
    EaseInOutCubic,
    EaseInOutSine,
    /// Rises to 1 at the midpoint and back to 0 (sine hump)
    Pulse,
}

impl Easing {
    /// Apply the curve. Input is clamped to 0..=1.
    pub fn apply(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => t * (2.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let f = 2.0 * t - 2.0;
                    0.5 * f * f * f + 1.0
                }
            }
            Easing::EaseInOutSine => 0.5 * (1.0 - (PI * t).cos()),
            Easing::Pulse => (PI * t).sin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::EaseInQuad,
            Easing::EaseOutQuad,
            Easing::EaseInOutQuad,
            Easing::EaseInOutCubic,
            Easing::EaseInOutSine,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-6, "{:?}", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{:?}", easing);
        }
    }

    #[test]
    fn test_clamps_input() {
        assert_eq!(Easing::Linear.apply(-3.0), 0.0);
        assert_eq!(Easing::Linear.apply(7.0), 1.0);
        assert_eq!(Easing::Linear.apply(f32::NAN), 0.0);
    }

    #[test]
    fn test_pulse_peaks_at_midpoint() {
        assert!((Easing::Pulse.apply(0.5) - 1.0).abs() < 1e-6);
        assert!(Easing::Pulse.apply(1.0).abs() < 1e-5);
    }
}
