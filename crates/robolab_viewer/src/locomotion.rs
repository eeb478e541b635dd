//! Kinetic model and walk cycle
//!
//! Velocity is damped toward the intent, integrated, and clamped to the
//! play area. The walk-cycle phase advances with speed; its swing weight
//! decays toward zero when the robot stops so limbs settle at rest.

use crate::config::LocomotionConfig;
use crate::rig::Part;
use crate::targets::RotationTargets;
use robolab_animation::{damp, damp_factor};
use robolab_3d::Transform;
use robolab_core::{Euler, Vec3};
use std::f32::consts::{PI, TAU};

/// Speeds below this do not turn the robot
const TURN_SPEED: f32 = 0.05;

/// Procedural limb angles for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GaitPose {
    /// Left leg pitch; the right leg swings opposite
    pub leg: f32,
    /// Left arm pitch; the right arm swings opposite
    pub arm: f32,
    pub bob: f32,
    pub head_yaw: f32,
}

#[derive(Clone, Debug)]
pub struct Locomotion {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Yaw of the root, 0 facing +Z
    pub facing: f32,
    pub phase: f32,
    /// 0 at rest, 1 at base speed
    pub gait_weight: f32,
    speed_scale: f32,
    pose: GaitPose,
}

impl Default for Locomotion {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            facing: 0.0,
            phase: 0.0,
            gait_weight: 0.0,
            speed_scale: 1.0,
            pose: GaitPose::default(),
        }
    }
}

/// Wrap an angle into -PI..PI
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped.is_finite() {
        wrapped
    } else {
        0.0
    }
}

impl Locomotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp and store a requested speed scalar
    pub fn set_speed(&mut self, requested: f32, config: &LocomotionConfig) -> f32 {
        self.speed_scale = requested.clamp(config.speed_min, config.speed_max);
        self.speed_scale
    }

    pub fn speed_scale(&self) -> f32 {
        self.speed_scale
    }

    pub fn speed(&self) -> f32 {
        self.velocity.planar_length()
    }

    pub fn pose(&self) -> GaitPose {
        self.pose
    }

    /// Damp velocity toward `direction`, integrate, clamp, and turn
    ///
    /// `direction` longer than one is normalized; shorter vectors walk
    /// proportionally slower.
    pub fn integrate(&mut self, direction: Vec3, config: &LocomotionConfig, dt: f32) {
        let mut direction = Vec3::new(direction.x, 0.0, direction.z);
        if direction.length_squared() > 1.0 {
            direction = direction.normalize();
        }
        let target = direction * (config.base_speed * self.speed_scale);
        self.velocity = damp(self.velocity, target, config.velocity_damping, dt);
        self.position += self.velocity * dt;

        let [hx, hz] = config.play_area;
        if self.position.x.abs() > hx {
            self.position.x = self.position.x.clamp(-hx, hx);
            if self.velocity.x * self.position.x > 0.0 {
                self.velocity.x = 0.0;
            }
        }
        if self.position.z.abs() > hz {
            self.position.z = self.position.z.clamp(-hz, hz);
            if self.velocity.z * self.position.z > 0.0 {
                self.velocity.z = 0.0;
            }
        }

        if self.speed() > TURN_SPEED {
            let heading = self.velocity.x.atan2(self.velocity.z);
            let delta = wrap_angle(heading - self.facing);
            self.facing = wrap_angle(self.facing + delta * damp_factor(config.facing_damping, dt));
        }
    }

    /// Advance the walk cycle and return this frame's limb angles
    pub fn advance_gait(&mut self, config: &LocomotionConfig, dt: f32) -> GaitPose {
        let speed = self.speed();
        let weight = if config.base_speed > 0.0 {
            (speed / config.base_speed).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.gait_weight = damp(self.gait_weight, weight, config.gait_damping, dt);
        self.phase = (self.phase + speed * config.stride_rate * dt) % (2.0 * TAU);

        let w = self.gait_weight;
        let swing = self.phase.sin();
        self.pose = GaitPose {
            leg: swing * config.leg_swing * w,
            arm: -swing * config.arm_swing * w,
            bob: swing.abs() * config.bob_height * w,
            head_yaw: (self.phase * 0.5).sin() * config.head_sway * w,
        };
        self.pose
    }

    /// Write gait targets for every joint not held by a pose
    pub fn write_targets(&self, targets: &mut RotationTargets) {
        let p = self.pose;
        targets.set_procedural(Part::LeftLegPivot, Euler::new(p.leg, 0.0, 0.0));
        targets.set_procedural(Part::RightLegPivot, Euler::new(-p.leg, 0.0, 0.0));
        targets.set_procedural(Part::LeftArmPivot, Euler::new(p.arm, 0.0, 0.0));
        targets.set_procedural(Part::RightArmPivot, Euler::new(-p.arm, 0.0, 0.0));
        targets.set_procedural(Part::LeftElbow, Euler::IDENTITY);
        targets.set_procedural(Part::RightElbow, Euler::IDENTITY);
        targets.set_procedural(Part::Neck, Euler::new(0.0, p.head_yaw, 0.0));
    }

    /// Root placement including bob and facing
    pub fn root_transform(&self) -> Transform {
        Transform::from_xyz(self.position.x, self.pose.bob, self.position.z)
            .with_rotation(Euler::new(0.0, self.facing, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_velocity_settles_after_release() {
        let config = LocomotionConfig::default();
        let mut loco = Locomotion::new();
        for _ in 0..60 {
            loco.integrate(Vec3::new(0.0, 0.0, -1.0), &config, DT);
        }
        assert!(loco.speed() > 1.0);
        assert!(loco.position.z < 0.0);

        for _ in 0..240 {
            loco.integrate(Vec3::ZERO, &config, DT);
        }
        assert!(loco.speed() < 1e-3);
    }

    #[test]
    fn test_play_area_clamps_without_bounce() {
        let config = LocomotionConfig::default();
        let mut loco = Locomotion::new();
        for _ in 0..600 {
            loco.integrate(Vec3::new(1.0, 0.0, 0.0), &config, DT);
            assert!(loco.position.x <= config.play_area[0]);
        }
        assert_eq!(loco.position.x, config.play_area[0]);
        assert_eq!(loco.velocity.x, 0.0);
    }

    #[test]
    fn test_faces_direction_of_travel() {
        let config = LocomotionConfig::default();
        let mut loco = Locomotion::new();
        for _ in 0..120 {
            loco.integrate(Vec3::new(1.0, 0.0, 0.0), &config, DT);
        }
        assert!((loco.facing - PI / 2.0).abs() < 0.05);
    }

    #[test]
    fn test_speed_is_clamped() {
        let config = LocomotionConfig::default();
        let mut loco = Locomotion::new();
        assert_eq!(loco.set_speed(10.0, &config), config.speed_max);
        assert_eq!(loco.set_speed(0.0, &config), config.speed_min);
    }

    #[test]
    fn test_gait_decays_at_rest() {
        let config = LocomotionConfig::default();
        let mut loco = Locomotion::new();
        for _ in 0..90 {
            loco.integrate(Vec3::new(0.0, 0.0, 1.0), &config, DT);
            loco.advance_gait(&config, DT);
        }
        assert!(loco.gait_weight > 0.5);

        for _ in 0..300 {
            loco.integrate(Vec3::ZERO, &config, DT);
            loco.advance_gait(&config, DT);
        }
        let pose = loco.pose();
        assert!(pose.leg.abs() < 1e-3);
        assert!(pose.bob < 1e-3);
    }

    #[test]
    fn test_pose_entries_block_gait() {
        let mut targets = RotationTargets::new();
        targets.set_explicit(Part::LeftArmPivot, Euler::new(-2.8, 0.0, 0.0));
        let mut loco = Locomotion::new();
        loco.pose = GaitPose {
            leg: 0.3,
            arm: 0.2,
            bob: 0.0,
            head_yaw: 0.0,
        };
        loco.write_targets(&mut targets);
        assert_eq!(targets.get(Part::LeftArmPivot).unwrap().rotation.x, -2.8);
        assert_eq!(targets.get(Part::RightArmPivot).unwrap().rotation.x, -0.2);
        assert_eq!(targets.get(Part::RightLegPivot).unwrap().rotation.x, -0.3);
    }
}
