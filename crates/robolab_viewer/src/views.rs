//! Camera setup and named views

use crate::command::CameraView;
use crate::config::ViewerConfig;
use robolab_3d::{OrbitController, PerspectiveCamera};
use robolab_core::Vec3;

/// Configured position for a named view; `Reset` uses the perspective view
pub fn view_position(config: &ViewerConfig, view: CameraView) -> Vec3 {
    let views = &config.camera.views;
    Vec3::from(match view {
        CameraView::Front => views.front,
        CameraView::Side => views.side,
        CameraView::Top => views.top,
        CameraView::Perspective | CameraView::Reset => views.perspective,
    })
}

/// Camera at the perspective view, aimed at the look-at point
pub fn build_camera(config: &ViewerConfig, aspect: f32) -> PerspectiveCamera {
    let cam = &config.camera;
    let mut camera = PerspectiveCamera::new(cam.fov, aspect, cam.near, cam.far);
    camera.set_position(view_position(config, CameraView::Perspective));
    camera.look_at(config.look_at());
    camera
}

/// Orbit controller based on the camera's current position
pub fn build_orbit(config: &ViewerConfig, camera: &PerspectiveCamera) -> OrbitController {
    let cam = &config.camera;
    let target = config.orbit_target();
    let mut orbit = OrbitController::new(target, camera.position.distance(target));
    orbit.damping = cam.orbit_damping;
    orbit.max_polar = cam.max_polar_angle;
    orbit.min_distance = cam.min_distance;
    orbit.max_distance = cam.max_distance;
    orbit.sync_from_position(camera.position);
    orbit
}

/// Move the camera to a named view and re-base the orbit from there
pub fn apply_view(
    view: CameraView,
    config: &ViewerConfig,
    camera: &mut PerspectiveCamera,
    orbit: &mut OrbitController,
) {
    let position = view_position(config, view);
    camera.set_position(position);
    camera.look_at(config.look_at());
    if view == CameraView::Reset {
        orbit.set_target(config.orbit_target());
    }
    orbit.sync_from_position(position);
    tracing::debug!(?view, ?position, "camera view set");
}
