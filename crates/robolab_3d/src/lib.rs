//! Robolab 3D
//!
//! Retained-mode 3D scene support for the robot viewer.
//!
//! # Features
//!
//! - **Scene Graph**: slotmap arena with exclusive parent/child ownership
//!   and counted resource disposal
//! - **Primitives**: parametric geometry with local bounds
//! - **Materials**: standard material with emissive/opacity snapshots
//! - **Camera**: perspective camera with NDC picking rays
//! - **Controls**: damped orbit/pan/zoom controller
//! - **Picking**: nearest-hit ray casts against mesh bounds
//! - **Render seam**: GPU-ready uniforms, fixed post-processing chain, and
//!   the `RenderBackend` trait with a headless implementation

pub mod controls;
pub mod geometry;
pub mod lights;
pub mod materials;
pub mod picking;
pub mod render;
pub mod scene;

pub use controls::{OrbitController, OrbitInput, OrbitPose};
pub use geometry::Geometry;
pub use lights::Light;
pub use materials::{MaterialSnapshot, StandardMaterial};
pub use picking::{intersect_node, pick_nearest, PickHit};
pub use render::{
    FrameDescription, HeadlessBackend, PostProcessChain, RenderBackend, RenderError, TimeUniform,
};
pub use scene::{NodeId, PerspectiveCamera, ResourceStats, SceneGraph, Transform};
