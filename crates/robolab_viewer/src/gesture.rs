//! Discrete poses and arm gestures
//!
//! Poses write or clear explicit rotation targets. Gestures drive the right
//! arm procedurally, after gait, so they replace the gait swing on that arm
//! but never an explicit pose.

use crate::command::PoseName;
use crate::config::PoseConfig;
use crate::rig::Part;
use crate::targets::RotationTargets;
use robolab_animation::{Easing, OneShot};
use robolab_core::Euler;

/// Fraction of the salute spent raising, and again lowering, the arm
const SALUTE_EASE: f32 = 0.3;

/// Salute envelope over normalized progress
pub fn salute_envelope(progress: f32) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    if p < SALUTE_EASE {
        Easing::EaseInOutQuad.apply(p / SALUTE_EASE)
    } else if p > 1.0 - SALUTE_EASE {
        Easing::EaseInOutQuad.apply((1.0 - p) / SALUTE_EASE)
    } else {
        1.0
    }
}

#[derive(Clone, Debug)]
pub struct Gestures {
    waving: bool,
    wave_time: f32,
    salute: OneShot,
}

impl Gestures {
    pub fn new(salute_duration: f32) -> Self {
        Self {
            waving: false,
            wave_time: 0.0,
            salute: OneShot::new(salute_duration),
        }
    }

    pub fn start_wave(&mut self) {
        if !self.waving {
            self.wave_time = 0.0;
        }
        self.waving = true;
        self.salute.cancel();
    }

    pub fn stop_wave(&mut self) {
        self.waving = false;
    }

    pub fn toggle_wave(&mut self) {
        if self.waving {
            self.stop_wave();
        } else {
            self.start_wave();
        }
    }

    /// Start or restart the salute
    pub fn salute(&mut self) {
        self.waving = false;
        self.salute.start();
    }

    pub fn cancel(&mut self) {
        self.waving = false;
        self.salute.cancel();
    }

    pub fn is_waving(&self) -> bool {
        self.waving
    }

    pub fn is_saluting(&self) -> bool {
        self.salute.is_active()
    }

    /// Advance timers and write right-arm targets
    pub fn update(&mut self, config: &PoseConfig, targets: &mut RotationTargets, dt: f32) {
        if self.waving {
            self.wave_time += dt;
            let swing = config.wave_amplitude * (self.wave_time * config.wave_frequency).sin();
            targets.set_procedural(Part::RightArmPivot, Euler::new(0.0, 0.0, config.wave_raise));
            targets.set_procedural(Part::RightElbow, Euler::new(0.0, 0.0, swing));
        }

        if let Some(progress) = self.salute.update(dt) {
            let env = salute_envelope(progress);
            let [x, y, z] = config.salute_arm;
            targets.set_procedural(Part::RightArmPivot, Euler::new(x * env, y * env, z * env));
            targets.set_procedural(
                Part::RightElbow,
                Euler::new(config.salute_elbow * env, 0.0, 0.0),
            );
            if !self.salute.is_active() {
                tracing::debug!("salute finished");
            }
        }
    }
}

/// Apply a discrete pose
pub fn apply_pose(
    pose: PoseName,
    config: &PoseConfig,
    targets: &mut RotationTargets,
    gestures: &mut Gestures,
) {
    match pose {
        PoseName::ArmsUp => {
            let raised = Euler::new(config.arms_up_angle, 0.0, 0.0);
            targets.set_explicit(Part::LeftArmPivot, raised);
            targets.set_explicit(Part::RightArmPivot, raised);
        }
        PoseName::ArmsDown => {
            targets.set_explicit(Part::LeftArmPivot, Euler::IDENTITY);
            targets.set_explicit(Part::RightArmPivot, Euler::IDENTITY);
        }
        PoseName::HeadLeft => {
            targets.set_explicit(Part::Neck, Euler::new(0.0, -config.head_turn, 0.0));
        }
        PoseName::HeadRight => {
            targets.set_explicit(Part::Neck, Euler::new(0.0, config.head_turn, 0.0));
        }
        PoseName::Reset => {
            targets.clear();
            gestures.cancel();
        }
    }
}
