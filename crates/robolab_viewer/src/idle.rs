//! Idle micro-motion: eye blinks and the chest indicator glow

use crate::config::IdleConfig;
use crate::rig::{Part, Rig};
use rand::Rng;
use robolab_animation::{Countdown, Easing, OneShot};
use robolab_3d::SceneGraph;

/// Closed eyes keep this fraction of their height
const BLINK_DEPTH: f32 = 0.9;

fn next_interval<R: Rng + ?Sized>(config: &IdleConfig, rng: &mut R) -> f32 {
    let [lo, hi] = config.blink_interval;
    rng.gen_range(lo..=hi)
}

#[derive(Clone, Debug)]
pub struct IdleMotion {
    next_blink: Countdown,
    blink: OneShot,
    eye_scale: f32,
    chest_intensity: f32,
}

impl IdleMotion {
    pub fn new<R: Rng + ?Sized>(config: &IdleConfig, rng: &mut R) -> Self {
        Self {
            next_blink: Countdown::new(next_interval(config, rng)),
            blink: OneShot::new(config.blink_duration),
            eye_scale: 1.0,
            chest_intensity: config.chest_glow[0],
        }
    }

    pub fn is_blinking(&self) -> bool {
        self.blink.is_active()
    }

    /// Vertical eye scale applied last frame
    pub fn eye_scale(&self) -> f32 {
        self.eye_scale
    }

    pub fn chest_intensity(&self) -> f32 {
        self.chest_intensity
    }

    pub fn time_to_blink(&self) -> f32 {
        self.next_blink.remaining()
    }

    /// Advance both cycles
    ///
    /// `chest_held` skips the chest glow while another stage owns that
    /// material, such as the hover highlight.
    #[allow(clippy::too_many_arguments)]
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        config: &IdleConfig,
        rng: &mut R,
        scene: &mut SceneGraph,
        rig: &Rig,
        elapsed: f32,
        dt: f32,
        chest_held: bool,
    ) {
        if let Some(progress) = self.blink.update(dt) {
            self.eye_scale = 1.0 - BLINK_DEPTH * Easing::Pulse.apply(progress);
            if !self.blink.is_active() {
                self.eye_scale = 1.0;
            }
        } else if self.next_blink.tick(dt) {
            self.blink.start();
            self.next_blink.reset(next_interval(config, rng));
        }

        for eye in [Part::LeftEye, Part::RightEye] {
            if let Some(t) = scene.transform_mut(rig.node(eye)) {
                t.scale.y = self.eye_scale;
            }
        }

        if !chest_held {
            let [lo, hi] = config.chest_glow;
            let wave = 0.5 + 0.5 * (elapsed * config.chest_pulse_speed).sin();
            self.chest_intensity = lo + (hi - lo) * wave;
            if let Some(m) = scene.material_mut(rig.node(Part::ChestLight)) {
                m.emissive_intensity = self.chest_intensity;
            }
        }
    }
}
