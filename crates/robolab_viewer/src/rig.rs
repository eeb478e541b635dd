//! Character rig
//!
//! The robot is a fixed hierarchy of primitive meshes hung off pivot
//! groups, so every joint rotates about its own origin. [`Part`] names each
//! node; [`Rig`] maps parts to scene handles.
//!
//! The robot faces +Z. Its left side is -X, matching the viewer's left in
//! the front view.

use crate::targets::RotationTargets;
use robolab_3d::{Geometry, Light, NodeId, SceneGraph, StandardMaterial, Transform};
use robolab_core::{Color, Euler};

/// Every node of the rig
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Part {
    Root,
    Torso,
    ChestLight,
    /// Attachment point on the back for wings and boosters
    BackMount,
    Neck,
    Head,
    LeftEye,
    RightEye,
    LeftArmPivot,
    LeftArm,
    LeftElbow,
    LeftForearm,
    RightArmPivot,
    RightArm,
    RightElbow,
    RightForearm,
    LeftLegPivot,
    LeftLeg,
    RightLegPivot,
    RightLeg,
}

impl Part {
    pub const COUNT: usize = 20;

    pub const ALL: [Part; Part::COUNT] = [
        Part::Root,
        Part::Torso,
        Part::ChestLight,
        Part::BackMount,
        Part::Neck,
        Part::Head,
        Part::LeftEye,
        Part::RightEye,
        Part::LeftArmPivot,
        Part::LeftArm,
        Part::LeftElbow,
        Part::LeftForearm,
        Part::RightArmPivot,
        Part::RightArm,
        Part::RightElbow,
        Part::RightForearm,
        Part::LeftLegPivot,
        Part::LeftLeg,
        Part::RightLegPivot,
        Part::RightLeg,
    ];

    /// Joints seeded in the rotation table at build time
    pub const PRIMARY_JOINTS: [Part; 4] = [
        Part::LeftArmPivot,
        Part::RightArmPivot,
        Part::LeftLegPivot,
        Part::RightLegPivot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Part::Root => "robot",
            Part::Torso => "torso",
            Part::ChestLight => "chest-light",
            Part::BackMount => "back-mount",
            Part::Neck => "neck",
            Part::Head => "head",
            Part::LeftEye => "left-eye",
            Part::RightEye => "right-eye",
            Part::LeftArmPivot => "left-shoulder",
            Part::LeftArm => "left-arm",
            Part::LeftElbow => "left-elbow",
            Part::LeftForearm => "left-forearm",
            Part::RightArmPivot => "right-shoulder",
            Part::RightArm => "right-arm",
            Part::RightElbow => "right-elbow",
            Part::RightForearm => "right-forearm",
            Part::LeftLegPivot => "left-hip",
            Part::LeftLeg => "left-leg",
            Part::RightLegPivot => "right-hip",
            Part::RightLeg => "right-leg",
        }
    }

    /// Parts drawn as meshes, and therefore hoverable
    pub fn is_mesh(self) -> bool {
        matches!(
            self,
            Part::Torso
                | Part::ChestLight
                | Part::Head
                | Part::LeftEye
                | Part::RightEye
                | Part::LeftArm
                | Part::LeftForearm
                | Part::RightArm
                | Part::RightForearm
                | Part::LeftLeg
                | Part::RightLeg
        )
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Part to node lookup
#[derive(Clone, Debug)]
pub struct Rig {
    nodes: [NodeId; Part::COUNT],
}

const BODY: u32 = 0x6b7280;
const HEAD: u32 = 0x9ca3af;
const ARM: u32 = 0x4b5563;
const LEG: u32 = 0x374151;
const EYE: u32 = 0x0f172a;
const CHEST: u32 = 0x22d3ee;

impl Rig {
    /// Build the robot under `parent`
    ///
    /// Returns the part table and a rotation table seeded with identity
    /// procedural targets for both shoulders and both hips.
    pub fn build(scene: &mut SceneGraph, parent: NodeId) -> (Rig, RotationTargets) {
        let mut nodes = [NodeId::default(); Part::COUNT];
        let mut put = |part: Part, id: NodeId| nodes[part.index()] = id;

        let root = scene.spawn_group(parent, Part::Root.name(), Transform::IDENTITY);
        put(Part::Root, root);

        let torso = scene.spawn_mesh(
            root,
            Part::Torso.name(),
            Transform::from_xyz(0.0, 1.0, 0.0),
            Geometry::cuboid(1.2, 1.2, 0.6),
            StandardMaterial::from_hex(BODY).with_metalness(0.3),
        );
        put(Part::Torso, torso);
        put(
            Part::ChestLight,
            scene.spawn_mesh(
                torso,
                Part::ChestLight.name(),
                Transform::from_xyz(0.0, 0.2, 0.31),
                Geometry::sphere(0.08),
                StandardMaterial::from_hex(CHEST).with_emissive(Color::from_hex(CHEST), 0.6),
            ),
        );
        put(
            Part::BackMount,
            scene.spawn_group(torso, Part::BackMount.name(), Transform::from_xyz(0.0, 0.1, -0.32)),
        );

        let neck = scene.spawn_group(root, Part::Neck.name(), Transform::from_xyz(0.0, 1.6, 0.0));
        put(Part::Neck, neck);
        let head = scene.spawn_mesh(
            neck,
            Part::Head.name(),
            Transform::from_xyz(0.0, 0.3, 0.0),
            Geometry::cuboid(0.6, 0.6, 0.5),
            StandardMaterial::from_hex(HEAD).with_metalness(0.3),
        );
        put(Part::Head, head);
        for (part, x) in [(Part::LeftEye, -0.14), (Part::RightEye, 0.14)] {
            put(
                part,
                scene.spawn_mesh(
                    head,
                    part.name(),
                    Transform::from_xyz(x, 0.05, 0.26),
                    Geometry::sphere(0.06),
                    StandardMaterial::from_hex(EYE)
                        .with_emissive(Color::from_hex(0x38bdf8), 0.4),
                ),
            );
        }

        let arms = [
            (Part::LeftArmPivot, Part::LeftArm, Part::LeftElbow, Part::LeftForearm, -0.95),
            (Part::RightArmPivot, Part::RightArm, Part::RightElbow, Part::RightForearm, 0.95),
        ];
        for (pivot_part, upper_part, elbow_part, fore_part, x) in arms {
            let pivot = scene.spawn_group(root, pivot_part.name(), Transform::from_xyz(x, 1.5, 0.0));
            put(pivot_part, pivot);
            put(
                upper_part,
                scene.spawn_mesh(
                    pivot,
                    upper_part.name(),
                    Transform::from_xyz(0.0, -0.225, 0.0),
                    Geometry::cuboid(0.25, 0.45, 0.25),
                    StandardMaterial::from_hex(ARM),
                ),
            );
            let elbow = scene.spawn_group(pivot, elbow_part.name(), Transform::from_xyz(0.0, -0.45, 0.0));
            put(elbow_part, elbow);
            put(
                fore_part,
                scene.spawn_mesh(
                    elbow,
                    fore_part.name(),
                    Transform::from_xyz(0.0, -0.225, 0.0),
                    Geometry::cuboid(0.22, 0.45, 0.22),
                    StandardMaterial::from_hex(ARM),
                ),
            );
        }

        let legs = [
            (Part::LeftLegPivot, Part::LeftLeg, -0.3),
            (Part::RightLegPivot, Part::RightLeg, 0.3),
        ];
        for (pivot_part, leg_part, x) in legs {
            let pivot = scene.spawn_group(root, pivot_part.name(), Transform::from_xyz(x, 0.8, 0.0));
            put(pivot_part, pivot);
            put(
                leg_part,
                scene.spawn_mesh(
                    pivot,
                    leg_part.name(),
                    Transform::from_xyz(0.0, -0.4, 0.0),
                    Geometry::cuboid(0.3, 0.8, 0.3),
                    StandardMaterial::from_hex(LEG),
                ),
            );
        }

        let mut targets = RotationTargets::new();
        for joint in Part::PRIMARY_JOINTS {
            targets.set_procedural(joint, Euler::IDENTITY);
        }

        tracing::debug!(nodes = Part::COUNT, "robot rig built");
        (Rig { nodes }, targets)
    }

    pub fn node(&self, part: Part) -> NodeId {
        self.nodes[part.index()]
    }

    /// Reverse lookup from a scene node
    pub fn part_of(&self, node: NodeId) -> Option<Part> {
        Part::ALL.into_iter().find(|p| self.node(*p) == node)
    }

    /// Hoverable mesh nodes
    pub fn mesh_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        Part::ALL
            .into_iter()
            .filter(|p| p.is_mesh())
            .map(|p| self.node(p))
    }
}

/// Lights and floor grid around the robot
#[derive(Clone, Copy, Debug)]
pub struct Dressing {
    pub ambient: NodeId,
    pub sun: NodeId,
    pub grid: NodeId,
}

impl Dressing {
    pub fn build(scene: &mut SceneGraph, parent: NodeId) -> Self {
        let ambient = scene.spawn_light(
            parent,
            "ambient",
            Transform::IDENTITY,
            Light::ambient(Color::WHITE, 0.5),
        );
        let sun = scene.spawn_light(
            parent,
            "sun",
            Transform::from_xyz(5.0, 10.0, 7.0),
            Light::directional(Color::WHITE, 0.8),
        );
        let grid = scene.spawn_mesh(
            parent,
            "grid",
            Transform::IDENTITY,
            Geometry::Grid {
                size: 6.0,
                divisions: 12,
            },
            StandardMaterial::from_hex(0xcccccc),
        );
        Self { ambient, sun, grid }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robolab_core::Vec3;

    #[test]
    fn test_every_part_has_a_distinct_node() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let (rig, _) = Rig::build(&mut scene, root);

        let mut seen = std::collections::HashSet::new();
        for part in Part::ALL {
            assert!(scene.exists(rig.node(part)), "{:?}", part);
            assert!(seen.insert(rig.node(part)));
            assert_eq!(rig.part_of(rig.node(part)), Some(part));
            assert_eq!(scene.name(rig.node(part)), Some(part.name()));
            assert_eq!(scene.geometry(rig.node(part)).is_some(), part.is_mesh());
        }
    }

    #[test]
    fn test_seeded_targets() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let (_, targets) = Rig::build(&mut scene, root);
        assert_eq!(targets.len(), 4);
        for joint in Part::PRIMARY_JOINTS {
            assert_eq!(targets.get(joint).unwrap().rotation, Euler::IDENTITY);
            assert!(!targets.is_explicit(joint));
        }
    }

    #[test]
    fn test_rest_pose_matches_body_layout() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let (rig, _) = Rig::build(&mut scene, root);

        let head = scene.world_matrix(rig.node(Part::Head)).translation_part();
        assert!(head.distance(Vec3::new(0.0, 1.9, 0.0)) < 1e-5);

        let hand = scene
            .world_matrix(rig.node(Part::RightForearm))
            .transform_point(Vec3::new(0.0, -0.225, 0.0));
        assert!(hand.distance(Vec3::new(0.95, 0.6, 0.0)) < 1e-5);
    }
}
