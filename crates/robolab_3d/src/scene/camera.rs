//! Perspective camera

use robolab_core::{Mat4, Ray, Vec2, Vec3};

/// Perspective camera (like Three.js PerspectiveCamera)
///
/// The camera keeps an explicit look-at point rather than a rotation, so
/// repositioning and re-aiming are both plain assignments.
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    /// World point the camera looks at
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(50.0, 1.0, 0.1, 100.0)
    }
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::UP,
        }
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Update the aspect ratio; non-finite or non-positive values are ignored
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov.to_radians()
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        let dir = (self.target - self.position).normalize();
        if dir == Vec3::ZERO {
            Vec3::FORWARD
        } else {
            dir
        }
    }

    /// Camera right and up axes in world space
    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = self.forward();
        let mut right = forward.cross(self.up).normalize();
        if right == Vec3::ZERO {
            right = Vec3::new(1.0, 0.0, 0.0);
        }
        let up = right.cross(forward);
        (forward, right, up)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix().mul(&self.view_matrix())
    }

    /// World-space picking ray through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let (forward, right, up) = self.basis();
        let half_h = (self.fov_radians() * 0.5).tan();
        let half_w = half_h * self.aspect;
        let dir = forward + right * (ndc.x * half_w) + up * (ndc.y * half_h);
        Ray::new(self.position, dir)
    }
}
