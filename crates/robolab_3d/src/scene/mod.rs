//! Scene graph, transforms, and camera

mod camera;
mod graph;
mod transform;

pub use camera::PerspectiveCamera;
pub use graph::{GeometryId, MaterialId, Mesh, Node, NodeId, NodeKind, ResourceStats, SceneGraph};
pub use transform::Transform;
