//! Retained scene graph
//!
//! Nodes live in a slotmap arena. A node exclusively owns its children:
//! despawning a node despawns its whole subtree, and every mesh in that
//! subtree releases its geometry and material. [`ResourceStats`] counts
//! allocations and releases so teardown can be verified.

use crate::geometry::Geometry;
use crate::lights::Light;
use crate::materials::StandardMaterial;
use crate::scene::Transform;
use robolab_core::Mat4;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Unique identifier for a node in the scene
    pub struct NodeId;

    /// Handle to geometry owned by the scene
    pub struct GeometryId;

    /// Handle to a material owned by the scene
    pub struct MaterialId;
}

/// Geometry and material pair drawn at a node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mesh {
    pub geometry: GeometryId,
    pub material: MaterialId,
}

/// What a node contributes besides its transform
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeKind {
    /// Transform-only group or pivot
    Group,
    Mesh(Mesh),
    Light(Light),
}

/// Scene node
#[derive(Clone, Debug)]
pub struct Node {
    /// Optional name for debugging
    pub name: Option<String>,
    pub transform: Transform,
    /// Hidden nodes hide their whole subtree
    pub visible: bool,
    pub kind: NodeKind,
}

impl Node {
    fn new(name: Option<String>, transform: Transform, kind: NodeKind) -> Self {
        Self {
            name,
            transform,
            visible: true,
            kind,
        }
    }

    pub fn mesh(&self) -> Option<Mesh> {
        match self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

/// Allocation and release counters for retained resources
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceStats {
    pub nodes_created: usize,
    pub nodes_removed: usize,
    pub geometries_created: usize,
    pub geometries_disposed: usize,
    pub materials_created: usize,
    pub materials_disposed: usize,
}

impl ResourceStats {
    /// Every geometry and material ever created has been disposed
    pub fn all_released(&self) -> bool {
        self.geometries_created == self.geometries_disposed
            && self.materials_created == self.materials_disposed
    }
}

/// Scene graph arena
pub struct SceneGraph {
    nodes: SlotMap<NodeId, Node>,
    /// Parent-child relationships
    children: FxHashMap<NodeId, SmallVec<[NodeId; 8]>>,
    /// Child-parent relationships
    parents: FxHashMap<NodeId, NodeId>,
    geometries: SlotMap<GeometryId, Geometry>,
    materials: SlotMap<MaterialId, StandardMaterial>,
    root: NodeId,
    stats: ResourceStats,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a scene containing only the root node
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(
            Some("scene".to_string()),
            Transform::IDENTITY,
            NodeKind::Group,
        ));
        Self {
            nodes,
            children: FxHashMap::default(),
            parents: FxHashMap::default(),
            geometries: SlotMap::with_key(),
            materials: SlotMap::with_key(),
            root,
            stats: ResourceStats {
                nodes_created: 1,
                ..Default::default()
            },
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn insert(&mut self, parent: NodeId, node: Node) -> NodeId {
        let parent = if self.nodes.contains_key(parent) {
            parent
        } else {
            tracing::warn!("spawn under missing parent, attaching to scene root");
            self.root
        };
        let id = self.nodes.insert(node);
        self.stats.nodes_created += 1;
        self.parents.insert(id, parent);
        self.children.entry(parent).or_default().push(id);
        id
    }

    /// Spawn a transform-only group node
    pub fn spawn_group(&mut self, parent: NodeId, name: &str, transform: Transform) -> NodeId {
        self.insert(
            parent,
            Node::new(Some(name.to_string()), transform, NodeKind::Group),
        )
    }

    /// Spawn a mesh node owning a new geometry and material
    pub fn spawn_mesh(
        &mut self,
        parent: NodeId,
        name: &str,
        transform: Transform,
        geometry: Geometry,
        material: StandardMaterial,
    ) -> NodeId {
        let geometry = self.geometries.insert(geometry);
        let material = self.materials.insert(material);
        self.stats.geometries_created += 1;
        self.stats.materials_created += 1;
        self.insert(
            parent,
            Node::new(
                Some(name.to_string()),
                transform,
                NodeKind::Mesh(Mesh { geometry, material }),
            ),
        )
    }

    /// Spawn a light node
    pub fn spawn_light(
        &mut self,
        parent: NodeId,
        name: &str,
        transform: Transform,
        light: Light,
    ) -> NodeId {
        self.insert(
            parent,
            Node::new(Some(name.to_string()), transform, NodeKind::Light(light)),
        )
    }

    /// Check if a node exists
    pub fn exists(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node)
    }

    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node)
    }

    pub fn transform(&self, node: NodeId) -> Option<&Transform> {
        self.nodes.get(node).map(|n| &n.transform)
    }

    pub fn transform_mut(&mut self, node: NodeId) -> Option<&mut Transform> {
        self.nodes.get_mut(node).map(|n| &mut n.transform)
    }

    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).and_then(|n| n.name.as_deref())
    }

    pub fn set_visible(&mut self, node: NodeId, visible: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.visible = visible;
        }
    }

    /// Visible itself and through every ancestor
    pub fn is_visible_in_tree(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            match self.nodes.get(id) {
                Some(n) if n.visible => current = self.parents.get(&id).copied(),
                _ => return false,
            }
        }
        true
    }

    pub fn geometry(&self, node: NodeId) -> Option<&Geometry> {
        let mesh = self.nodes.get(node)?.mesh()?;
        self.geometries.get(mesh.geometry)
    }

    pub fn material(&self, node: NodeId) -> Option<&StandardMaterial> {
        let mesh = self.nodes.get(node)?.mesh()?;
        self.materials.get(mesh.material)
    }

    pub fn material_mut(&mut self, node: NodeId) -> Option<&mut StandardMaterial> {
        let mesh = self.nodes.get(node)?.mesh()?;
        self.materials.get_mut(mesh.material)
    }

    /// Get parent of a node
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied()
    }

    /// Get children of a node
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.children
            .get(&node)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Move a node under a new parent
    ///
    /// Refuses to create cycles and ignores missing nodes.
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> bool {
        if child == self.root || !self.exists(child) || !self.exists(parent) {
            return false;
        }
        if child == parent || self.is_ancestor(child, parent) {
            return false;
        }

        if let Some(old_parent) = self.parents.remove(&child) {
            if let Some(siblings) = self.children.get_mut(&old_parent) {
                siblings.retain(|e| *e != child);
            }
        }
        self.parents.insert(child, parent);
        self.children.entry(parent).or_default().push(child);
        true
    }

    /// Whether `ancestor` is on the parent chain of `node`
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parents.get(&node).copied();
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parents.get(&id).copied();
        }
        false
    }

    /// Despawn a node and all its children, releasing mesh resources
    ///
    /// Returns the number of nodes removed. Missing nodes remove nothing;
    /// the root itself is never removed, only its children.
    pub fn despawn(&mut self, node: NodeId) -> usize {
        if !self.exists(node) {
            return 0;
        }
        if node == self.root {
            let children: SmallVec<[NodeId; 8]> = self.children(node).iter().copied().collect();
            return children.into_iter().map(|c| self.despawn(c)).sum();
        }

        let mut removed = 0;
        if let Some(children) = self.children.remove(&node) {
            for child in children {
                removed += self.despawn(child);
            }
        }

        if let Some(parent) = self.parents.remove(&node) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|e| *e != node);
            }
        }

        if let Some(n) = self.nodes.remove(node) {
            if let NodeKind::Mesh(mesh) = n.kind {
                if self.geometries.remove(mesh.geometry).is_some() {
                    self.stats.geometries_disposed += 1;
                }
                if self.materials.remove(mesh.material).is_some() {
                    self.stats.materials_disposed += 1;
                }
            }
            self.stats.nodes_removed += 1;
            removed += 1;
        }
        removed
    }

    /// Remove everything below the root
    pub fn clear(&mut self) -> usize {
        self.despawn(self.root)
    }

    /// Local-to-world matrix
    pub fn world_matrix(&self, node: NodeId) -> Mat4 {
        let mut chain: SmallVec<[NodeId; 8]> = SmallVec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            if !self.nodes.contains_key(id) {
                break;
            }
            chain.push(id);
            current = self.parents.get(&id).copied();
        }

        chain.iter().rev().fold(Mat4::IDENTITY, |acc, id| {
            let local = self.nodes[*id].transform.matrix();
            acc.mul(&local)
        })
    }

    /// Visit every node visible through its ancestors, with its world matrix
    pub fn visit_visible<F>(&self, mut visit: F)
    where
        F: FnMut(NodeId, &Node, &Mat4),
    {
        let mut stack: Vec<(NodeId, Mat4)> = vec![(self.root, Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            let world = parent_world.mul(&node.transform.matrix());
            visit(id, node, &world);
            for child in self.children(id).iter().rev() {
                stack.push((*child, world));
            }
        }
    }

    /// All nodes in a subtree, root of the subtree first
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.exists(node) {
            return out;
        }
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            out.push(id);
            for child in self.children(id).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Number of live nodes, including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }

    pub fn stats(&self) -> ResourceStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robolab_core::{Euler, Vec3};

    fn box_mesh(scene: &mut SceneGraph, parent: NodeId, name: &str, y: f32) -> NodeId {
        scene.spawn_mesh(
            parent,
            name,
            Transform::from_xyz(0.0, y, 0.0),
            Geometry::cuboid(1.0, 1.0, 1.0),
            StandardMaterial::default(),
        )
    }

    #[test]
    fn test_despawn_releases_subtree_once() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let group = scene.spawn_group(root, "robot", Transform::IDENTITY);
        let body = box_mesh(&mut scene, group, "body", 1.0);
        box_mesh(&mut scene, body, "badge", 0.2);

        assert_eq!(scene.live_geometries(), 2);
        assert_eq!(scene.despawn(group), 3);
        assert_eq!(scene.despawn(group), 0);
        assert!(!scene.exists(body));
        assert!(scene.children(root).is_empty());

        let stats = scene.stats();
        assert!(stats.all_released());
        assert_eq!(stats.geometries_disposed, 2);
        assert_eq!(stats.materials_disposed, 2);
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let pivot = scene.spawn_group(
            root,
            "pivot",
            Transform::from_xyz(1.0, 2.0, 0.0)
                .with_rotation(Euler::new(0.0, 0.0, std::f32::consts::FRAC_PI_2)),
        );
        let arm = box_mesh(&mut scene, pivot, "arm", -0.5);

        let p = scene.world_matrix(arm).translation_part();
        // -0.5 along Y rotated +90 deg about Z lands on +X
        assert!(p.distance(Vec3::new(1.5, 2.0, 0.0)) < 1e-5);
    }

    #[test]
    fn test_set_parent_rejects_cycles() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let a = scene.spawn_group(root, "a", Transform::IDENTITY);
        let b = scene.spawn_group(a, "b", Transform::IDENTITY);

        assert!(!scene.set_parent(a, b));
        assert!(!scene.set_parent(root, a));
        assert!(scene.set_parent(b, root));
        assert_eq!(scene.parent(b), Some(root));
        assert!(scene.children(a).is_empty());
    }

    #[test]
    fn test_hidden_parent_hides_subtree() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let wings = scene.spawn_group(root, "wings", Transform::IDENTITY);
        let panel = box_mesh(&mut scene, wings, "panel", 0.0);
        scene.set_visible(wings, false);

        assert!(!scene.is_visible_in_tree(panel));
        let mut visited = Vec::new();
        scene.visit_visible(|id, _, _| visited.push(id));
        assert_eq!(visited, vec![root]);
    }

    #[test]
    fn test_clear_keeps_root() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        box_mesh(&mut scene, root, "a", 0.0);
        box_mesh(&mut scene, root, "b", 0.0);
        assert_eq!(scene.clear(), 2);
        assert!(scene.exists(root));
        assert!(scene.is_empty());
        assert!(scene.stats().all_released());
    }
}
