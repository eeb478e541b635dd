//! Orbit camera controller
//!
//! Orbits around a target point with damped rotation, pan, and zoom.
//! Angles are spherical: `azimuth` around +Y (0 = camera on +Z), `polar`
//! measured down from +Y.

use robolab_animation::damp;
use robolab_core::{Vec2, Vec3};
use std::f32::consts::PI;

/// Accumulated pointer input for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrbitInput {
    /// Rotate drag delta in pixels
    pub rotate: Vec2,
    /// Pan drag delta in pixels
    pub pan: Vec2,
    /// Wheel steps, positive zooms out
    pub zoom: f32,
}

impl OrbitInput {
    pub fn is_empty(&self) -> bool {
        self.rotate == Vec2::ZERO && self.pan == Vec2::ZERO && self.zoom == 0.0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Camera placement produced by the controller
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitPose {
    pub position: Vec3,
    pub target: Vec3,
}

/// Orbit camera controller
#[derive(Clone, Debug)]
pub struct OrbitController {
    /// Point orbited around
    pub target: Vec3,
    pub distance: f32,
    pub azimuth: f32,
    pub polar: f32,

    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,

    /// Damping rate `k` for every orbit component
    pub damping: f32,
    /// Zoom ratio per wheel step
    pub zoom_step: f32,

    pub rotate_enabled: bool,
    pub zoom_enabled: bool,
    pub pan_enabled: bool,

    // Smooth interpolation state
    goal_azimuth: f32,
    goal_polar: f32,
    goal_distance: f32,
    goal_target: Vec3,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 5.0)
    }
}

impl OrbitController {
    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            target,
            distance,
            azimuth: 0.0,
            polar: PI * 0.5,
            min_distance: 0.5,
            max_distance: 50.0,
            min_polar: 0.0,
            max_polar: PI,
            damping: 5.0,
            zoom_step: 0.95,
            rotate_enabled: true,
            zoom_enabled: true,
            pan_enabled: true,
            goal_azimuth: 0.0,
            goal_polar: PI * 0.5,
            goal_distance: distance,
            goal_target: target,
        }
    }

    /// Move the orbit target immediately
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.goal_target = target;
    }

    /// Re-base the orbit from an externally placed camera
    ///
    /// Angles and distance are recomputed relative to the current target,
    /// so the next drag continues from where the camera actually is.
    pub fn sync_from_position(&mut self, position: Vec3) {
        let offset = position - self.target;
        let distance = offset.length().clamp(self.min_distance, self.max_distance);
        let (azimuth, polar) = if offset.length() > 1e-6 {
            let polar = (offset.y / offset.length()).clamp(-1.0, 1.0).acos();
            (offset.x.atan2(offset.z), polar)
        } else {
            (self.azimuth, self.polar)
        };

        self.distance = distance;
        self.azimuth = azimuth;
        self.polar = self.clamp_polar(polar);
        self.goal_distance = self.distance;
        self.goal_azimuth = self.azimuth;
        self.goal_polar = self.polar;
        self.goal_target = self.target;
    }

    /// Bounds are kept ordered; a ceiling below the floor pins to the floor
    fn clamp_polar(&self, polar: f32) -> f32 {
        let lo = self.min_polar.max(1e-4);
        let hi = self.max_polar.min(PI - 1e-4).max(lo);
        polar.clamp(lo, hi)
    }

    /// Camera position for the current spherical state
    pub fn position(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + Vec3::new(
                self.distance * sin_polar * self.azimuth.sin(),
                self.distance * self.polar.cos(),
                self.distance * sin_polar * self.azimuth.cos(),
            )
    }

    /// Whether current state has reached its goals
    pub fn is_settled(&self) -> bool {
        const EPS: f32 = 1e-4;
        (self.azimuth - self.goal_azimuth).abs() < EPS
            && (self.polar - self.goal_polar).abs() < EPS
            && (self.distance - self.goal_distance).abs() < EPS
            && self.target.distance(self.goal_target) < EPS
    }

    /// Apply input and advance damping
    ///
    /// `viewport_height` and `fov_y` (radians) scale drags so a full-height
    /// drag rotates one turn and pans track the pointer. Returns a pose only
    /// while the orbit is moving; a settled controller leaves the camera
    /// alone so externally placed views keep their aim.
    pub fn update(
        &mut self,
        input: &OrbitInput,
        viewport_height: f32,
        fov_y: f32,
        dt: f32,
    ) -> Option<OrbitPose> {
        let height = if viewport_height > 0.0 {
            viewport_height
        } else {
            1.0
        };

        if self.rotate_enabled && input.rotate != Vec2::ZERO {
            self.goal_azimuth -= 2.0 * PI * input.rotate.x / height;
            self.goal_polar = self.clamp_polar(self.goal_polar - 2.0 * PI * input.rotate.y / height);
        }

        if self.pan_enabled && input.pan != Vec2::ZERO {
            let forward = (self.target - self.position()).normalize();
            let mut right = forward.cross(Vec3::UP).normalize();
            if right == Vec3::ZERO {
                right = Vec3::new(self.azimuth.cos(), 0.0, -self.azimuth.sin());
            }
            let up = right.cross(forward);
            let world_per_pixel = 2.0 * self.distance * (fov_y * 0.5).tan() / height;
            self.goal_target -= right * (input.pan.x * world_per_pixel);
            self.goal_target += up * (input.pan.y * world_per_pixel);
        }

        if self.zoom_enabled && input.zoom != 0.0 {
            let ratio = self.zoom_step.powf(-input.zoom);
            self.goal_distance =
                (self.goal_distance * ratio).clamp(self.min_distance, self.max_distance);
        }

        if self.is_settled() {
            return None;
        }

        self.azimuth = damp(self.azimuth, self.goal_azimuth, self.damping, dt);
        self.polar = damp(self.polar, self.goal_polar, self.damping, dt);
        self.distance = damp(self.distance, self.goal_distance, self.damping, dt);
        self.target = damp(self.target, self.goal_target, self.damping, dt);

        Some(OrbitPose {
            position: self.position(),
            target: self.target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orbit() -> OrbitController {
        let mut o = OrbitController::new(Vec3::new(0.0, 1.0, 0.0), 5.0);
        o.max_polar = PI / 2.1;
        o
    }

    #[test]
    fn test_sync_round_trips_position() {
        let mut o = orbit();
        let p = Vec3::new(3.0, 2.5, 3.0);
        o.sync_from_position(p);
        assert!(o.position().distance(p) < 1e-4);
        assert!(o.is_settled());
    }

    #[test]
    fn test_settled_orbit_leaves_camera_alone() {
        let mut o = orbit();
        o.sync_from_position(Vec3::new(0.0, 1.5, 4.0));
        assert_eq!(o.update(&OrbitInput::default(), 600.0, 0.87, 1.0 / 60.0), None);
    }

    #[test]
    fn test_drag_continues_from_synced_position() {
        let mut o = orbit();
        let top = Vec3::new(0.0, 6.0, 0.01);
        o.sync_from_position(top);

        let input = OrbitInput {
            rotate: Vec2::new(30.0, 0.0),
            ..Default::default()
        };
        let pose = o.update(&input, 600.0, 0.87, 1.0 / 60.0).unwrap();
        // First damped step stays close to where the view placed the camera
        assert!(pose.position.distance(top) < 0.5);
        assert!(pose.position.y > 5.0);
    }

    #[test]
    fn test_polar_limit_keeps_camera_above_ground() {
        let mut o = orbit();
        o.sync_from_position(Vec3::new(0.0, 1.5, 4.0));
        let input = OrbitInput {
            rotate: Vec2::new(0.0, -2000.0),
            ..Default::default()
        };
        o.update(&input, 600.0, 0.87, 1.0 / 60.0);
        for _ in 0..600 {
            o.update(&OrbitInput::default(), 600.0, 0.87, 1.0 / 60.0);
        }
        assert!(o.polar <= PI / 2.1 + 1e-4);
        assert!(o.position().y >= o.target.y);
    }

    #[test]
    fn test_zoom_clamps_distance() {
        let mut o = orbit();
        o.max_distance = 10.0;
        let input = OrbitInput {
            zoom: 100.0,
            ..Default::default()
        };
        o.update(&input, 600.0, 0.87, 1.0 / 60.0);
        for _ in 0..600 {
            o.update(&OrbitInput::default(), 600.0, 0.87, 1.0 / 60.0);
        }
        assert!((o.distance - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_tiny_polar_ceiling_pins_to_floor() {
        let mut o = orbit();
        o.max_polar = 1e-5;
        o.sync_from_position(Vec3::new(0.0, 1.5, 4.0));
        assert_eq!(o.polar, 1e-4);

        let input = OrbitInput {
            rotate: Vec2::new(0.0, 500.0),
            ..Default::default()
        };
        o.update(&input, 600.0, 0.87, 1.0 / 60.0);
        assert_eq!(o.polar, 1e-4);
        assert!(o.position().y > o.target.y);
    }
}
