//! Ray picking against mesh nodes
//!
//! The world ray is carried into each node's local space with the inverse
//! world matrix and tested against the geometry's local bounds. The local
//! direction is left unnormalized so the hit parameter stays comparable
//! across nodes with different scales.

use crate::scene::{NodeId, SceneGraph};
use robolab_core::Ray;

/// Nearest hit of a picking ray
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    /// Distance along the world ray
    pub distance: f32,
}

/// Distance along `ray` to a single mesh node, if hit
///
/// Hidden nodes, non-mesh nodes, unpickable geometry, and nodes scaled down
/// to nothing never hit.
pub fn intersect_node(scene: &SceneGraph, node: NodeId, ray: &Ray) -> Option<f32> {
    if !scene.is_visible_in_tree(node) {
        return None;
    }
    let geometry = scene.geometry(node)?;
    if !geometry.is_pickable() {
        return None;
    }
    let inverse = scene.world_matrix(node).affine_inverse()?;
    let local = Ray {
        origin: inverse.transform_point(ray.origin),
        direction: inverse.transform_vector(ray.direction),
    };
    local.intersect_box(&geometry.local_bounds())
}

/// Nearest hit among candidate nodes
pub fn pick_nearest<I>(scene: &SceneGraph, candidates: I, ray: &Ray) -> Option<PickHit>
where
    I: IntoIterator<Item = NodeId>,
{
    candidates
        .into_iter()
        .filter_map(|node| intersect_node(scene, node, ray).map(|distance| PickHit { node, distance }))
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}
