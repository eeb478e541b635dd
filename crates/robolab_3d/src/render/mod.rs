//! Render seam
//!
//! The scene is flattened into a [`FrameDescription`] each frame: GPU-ready
//! uniforms for the camera and every visible mesh, the lights, and the
//! post-processing passes. A [`RenderBackend`] consumes it. The workspace
//! ships [`HeadlessBackend`], which records frames instead of drawing.

mod post_process;

pub use post_process::{
    BloomPass, OutlinePass, PassDescription, PostEffect, PostProcessChain, RenderPass,
};

use crate::geometry::Geometry;
use crate::lights::Light;
use crate::materials::StandardMaterial;
use crate::scene::{NodeId, NodeKind, PerspectiveCamera, SceneGraph};
use robolab_core::{Mat4, Vec3};
use robolab_platform::{PlatformError, Viewport};
use thiserror::Error;

/// Render errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Surface could not be attached to the host
    #[error("Failed to attach render surface: {0}")]
    SurfaceAttach(String),

    /// Frame submitted before attach or after detach
    #[error("Render surface is not attached")]
    NotAttached,

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result type for render operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Camera uniform data for GPU
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_projection: [[f32; 4]; 4],
    /// Camera position in world space
    pub position: [f32; 4],
    /// Near and far planes
    pub near_far: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix();
        let p = camera.position;
        Self {
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            view_projection: projection.mul(&view).to_cols_array_2d(),
            position: [p.x, p.y, p.z, 1.0],
            near_far: [camera.near, camera.far, 0.0, 0.0],
        }
    }
}

/// Model uniform data for GPU
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    /// Model matrix (local to world)
    pub model: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }
}

/// Material parameters for GPU
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
    /// RGB emissive premultiplied by intensity, A unused
    pub emissive: [f32; 4],
    /// metalness, roughness, opacity, padding
    pub params: [f32; 4],
}

impl MaterialUniform {
    pub fn from_material(material: &StandardMaterial) -> Self {
        let e = material.emissive;
        let i = material.emissive_intensity;
        Self {
            color: material.color.to_array(),
            emissive: [e.r * i, e.g * i, e.b * i, 1.0],
            params: [material.metalness, material.roughness, material.opacity, 0.0],
        }
    }
}

/// Time uniform for animated shaders
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TimeUniform {
    /// Total elapsed time in seconds
    pub time: f32,
    /// Delta time since last frame
    pub delta_time: f32,
    /// Frame count
    pub frame: u32,
    pub _padding: u32,
}

impl TimeUniform {
    pub fn new(time: f32, delta_time: f32, frame: u32) -> Self {
        Self {
            time,
            delta_time,
            frame,
            _padding: 0,
        }
    }
}

/// One mesh to draw
#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub geometry: Geometry,
    pub model: ModelUniform,
    pub material: MaterialUniform,
    pub transparent: bool,
}

/// One light with its world position
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightItem {
    pub light: Light,
    pub position: Vec3,
}

/// Everything a backend needs to draw one frame
#[derive(Clone, Debug, PartialEq)]
pub struct FrameDescription {
    pub camera: CameraUniform,
    pub time: TimeUniform,
    pub draws: Vec<DrawItem>,
    pub lights: Vec<LightItem>,
    pub passes: Vec<PassDescription>,
}

impl FrameDescription {
    /// Flatten the visible scene
    pub fn build(
        scene: &SceneGraph,
        camera: &PerspectiveCamera,
        time: TimeUniform,
        chain: &PostProcessChain,
    ) -> Self {
        let mut draws = Vec::new();
        let mut lights = Vec::new();

        scene.visit_visible(|id, node, world| match node.kind {
            NodeKind::Mesh(_) => {
                if let (Some(geometry), Some(material)) = (scene.geometry(id), scene.material(id)) {
                    draws.push(DrawItem {
                        node: id,
                        geometry: *geometry,
                        model: ModelUniform::new(*world),
                        material: MaterialUniform::from_material(material),
                        transparent: material.transparent,
                    });
                }
            }
            NodeKind::Light(light) => lights.push(LightItem {
                light,
                position: world.translation_part(),
            }),
            NodeKind::Group => {}
        });

        Self {
            camera: CameraUniform::from_camera(camera),
            time,
            draws,
            lights,
            passes: chain.passes(),
        }
    }

    pub fn draw_for(&self, node: NodeId) -> Option<&DrawItem> {
        self.draws.iter().find(|d| d.node == node)
    }
}

/// Seam between the viewer and a graphics API
pub trait RenderBackend {
    fn name(&self) -> &'static str;

    /// Acquire the surface. Failure aborts mount.
    fn attach(&mut self, viewport: Viewport) -> Result<()>;

    fn resize(&mut self, viewport: Viewport) -> Result<()>;

    fn render(&mut self, frame: &FrameDescription) -> Result<()>;

    /// Release the surface. Safe to call when not attached.
    fn detach(&mut self);

    fn is_attached(&self) -> bool;
}

impl<B: RenderBackend + ?Sized> RenderBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn attach(&mut self, viewport: Viewport) -> Result<()> {
        (**self).attach(viewport)
    }

    fn resize(&mut self, viewport: Viewport) -> Result<()> {
        (**self).resize(viewport)
    }

    fn render(&mut self, frame: &FrameDescription) -> Result<()> {
        (**self).render(frame)
    }

    fn detach(&mut self) {
        (**self).detach()
    }

    fn is_attached(&self) -> bool {
        (**self).is_attached()
    }
}

/// Backend that records frames instead of drawing them
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    viewport: Option<Viewport>,
    last_frame: Option<FrameDescription>,
    frames_rendered: u64,
    attach_count: u32,
    detach_count: u32,
    fail_attach: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose attach always fails, for exercising partial mounts
    pub fn failing() -> Self {
        Self {
            fail_attach: true,
            ..Default::default()
        }
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn last_frame(&self) -> Option<&FrameDescription> {
        self.last_frame.as_ref()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Number of attach and detach calls that actually changed state
    pub fn attach_detach_counts(&self) -> (u32, u32) {
        (self.attach_count, self.detach_count)
    }
}

impl RenderBackend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn attach(&mut self, viewport: Viewport) -> Result<()> {
        if self.fail_attach {
            return Err(RenderError::SurfaceAttach(
                "headless backend configured to fail".to_string(),
            ));
        }
        if !viewport.is_valid() {
            return Err(PlatformError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            }
            .into());
        }
        if self.viewport.is_none() {
            self.attach_count += 1;
        }
        self.viewport = Some(viewport);
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            "headless surface attached"
        );
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> Result<()> {
        if self.viewport.is_none() {
            return Err(RenderError::NotAttached);
        }
        if !viewport.is_valid() {
            return Err(PlatformError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            }
            .into());
        }
        self.viewport = Some(viewport);
        Ok(())
    }

    fn render(&mut self, frame: &FrameDescription) -> Result<()> {
        if self.viewport.is_none() {
            return Err(RenderError::NotAttached);
        }
        self.frames_rendered += 1;
        self.last_frame = Some(frame.clone());
        Ok(())
    }

    fn detach(&mut self) {
        if self.viewport.take().is_some() {
            self.detach_count += 1;
            tracing::debug!("headless surface detached");
        }
    }

    fn is_attached(&self) -> bool {
        self.viewport.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Transform;
    use robolab_core::Color;

    #[test]
    fn test_uniforms_are_pod() {
        let uniform = TimeUniform::new(1.5, 0.016, 90);
        let bytes: &[u8] = bytemuck::bytes_of(&uniform);
        assert_eq!(bytes.len(), 16);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 4 * 16 * 3 + 32);
    }

    #[test]
    fn test_frame_skips_hidden_meshes_and_collects_lights() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let shown = scene.spawn_mesh(
            root,
            "shown",
            Transform::IDENTITY,
            Geometry::sphere(0.5),
            StandardMaterial::default(),
        );
        let hidden = scene.spawn_mesh(
            root,
            "hidden",
            Transform::IDENTITY,
            Geometry::sphere(0.5),
            StandardMaterial::default(),
        );
        scene.set_visible(hidden, false);
        scene.spawn_light(
            root,
            "sun",
            Transform::from_xyz(5.0, 10.0, 7.0),
            Light::directional(Color::WHITE, 0.8),
        );

        let chain = PostProcessChain::new(Color::WHITE, OutlinePass::default(), BloomPass::default());
        let frame = FrameDescription::build(
            &scene,
            &PerspectiveCamera::default(),
            TimeUniform::new(0.0, 0.0, 0),
            &chain,
        );

        assert!(frame.draw_for(shown).is_some());
        assert!(frame.draw_for(hidden).is_none());
        assert_eq!(frame.lights.len(), 1);
        assert_eq!(frame.lights[0].position, Vec3::new(5.0, 10.0, 7.0));
        assert_eq!(frame.passes.len(), 3);
    }

    #[test]
    fn test_headless_lifecycle() {
        let mut backend = HeadlessBackend::new();
        let frame = FrameDescription::build(
            &SceneGraph::new(),
            &PerspectiveCamera::default(),
            TimeUniform::new(0.0, 0.0, 0),
            &PostProcessChain::new(Color::WHITE, OutlinePass::default(), BloomPass::default()),
        );
        assert!(matches!(backend.render(&frame), Err(RenderError::NotAttached)));

        backend.attach(Viewport { width: 640.0, height: 480.0 }).unwrap();
        backend.render(&frame).unwrap();
        backend.detach();
        backend.detach();

        assert_eq!(backend.frames_rendered(), 1);
        assert_eq!(backend.attach_detach_counts(), (1, 1));
        assert!(!backend.is_attached());
    }

    #[test]
    fn test_failing_backend() {
        let mut backend = HeadlessBackend::failing();
        assert!(backend.attach(Viewport { width: 640.0, height: 480.0 }).is_err());
        assert!(!backend.is_attached());
    }
}
