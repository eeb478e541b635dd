//! Attachable accessories
//!
//! Each accessory is a group that starts hidden at zero scale. Its blend
//! amount is damped toward 0 or 1 and drives both visibility and a
//! type-specific secondary effect. Sub-parts that need per-frame effect
//! updates are kept in a side-table so the graph is never searched.

use crate::command::Accessory;
use crate::config::AccessoryConfig;
use crate::rig::{Part, Rig};
use robolab_animation::Damped;
use robolab_3d::{Geometry, NodeId, SceneGraph, StandardMaterial, Transform};
use robolab_core::{Color, Euler, Vec3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::f32::consts::{FRAC_PI_2, PI};

/// Animation record for one accessory
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccessoryState {
    pub group: NodeId,
    pub base_scale: Vec3,
    blend: Damped<f32>,
}

impl AccessoryState {
    fn new(group: NodeId) -> Self {
        Self {
            group,
            base_scale: Vec3::ONE,
            blend: Damped::new(0.0, 0.0),
        }
    }

    /// Current blend amount in 0..=1
    pub fn blend(&self) -> f32 {
        self.blend.current()
    }

    /// 1 when enabled, 0 when disabled
    pub fn target(&self) -> f32 {
        self.blend.target()
    }
}

/// Secondary effect parameters for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AccessoryEffect {
    /// Wing panel yaw, mirrored on the two sides
    Flutter { angle: f32 },
    /// Booster flame height per nozzle and emissive glow
    Pulse { flames: [f32; 2], glow: f32 },
    /// Shield bubble opacity and ring yaw
    Ripple { opacity: f32, ring_spin: f32 },
}

impl AccessoryEffect {
    /// Effect for `accessory` at `elapsed` seconds with the given blend
    pub fn evaluate(accessory: Accessory, elapsed: f32, blend: f32) -> Self {
        match accessory {
            Accessory::Wings => AccessoryEffect::Flutter {
                angle: (0.3 + 0.25 * (elapsed * 8.0).sin()) * blend,
            },
            Accessory::Boosters => AccessoryEffect::Pulse {
                flames: [
                    (0.7 + 0.3 * (elapsed * 20.0).sin()) * blend,
                    (0.7 + 0.3 * (elapsed * 20.0 + 1.0).sin()) * blend,
                ],
                glow: (0.8 + 0.6 * (elapsed * 12.0).sin().abs()) * blend,
            },
            Accessory::Shield => AccessoryEffect::Ripple {
                opacity: (0.18 + 0.07 * (elapsed * 3.0).sin()) * blend,
                ring_spin: elapsed * 0.8,
            },
        }
    }
}

/// All accessories attached to one rig
#[derive(Debug)]
pub struct Accessories {
    states: [AccessoryState; 3],
    aux: FxHashMap<Accessory, SmallVec<[NodeId; 4]>>,
    effects: [Option<AccessoryEffect>; 3],
}

fn slot(accessory: Accessory) -> usize {
    accessory as usize
}

impl Accessories {
    /// Build every accessory group, hidden, on the rig
    pub fn build(scene: &mut SceneGraph, rig: &Rig) -> Self {
        let mount = rig.node(Part::BackMount);
        let wings = build_wings(scene, mount);
        let boosters = build_boosters(scene, mount);
        let shield = build_shield(scene, rig.node(Part::Root));

        let mut aux = FxHashMap::default();
        let mut states = [AccessoryState::new(NodeId::default()); 3];
        for (accessory, (group, parts)) in Accessory::ALL.into_iter().zip([wings, boosters, shield]) {
            let state = AccessoryState::new(group);
            apply_blend(scene, &state, 0.0);
            states[slot(accessory)] = state;
            aux.insert(accessory, parts);
        }

        Self {
            states,
            aux,
            effects: [None; 3],
        }
    }

    pub fn set_enabled(&mut self, accessory: Accessory, enabled: bool) {
        self.states[slot(accessory)]
            .blend
            .set_target(if enabled { 1.0 } else { 0.0 });
    }

    pub fn state(&self, accessory: Accessory) -> &AccessoryState {
        &self.states[slot(accessory)]
    }

    /// Last applied effect, `None` while hidden
    pub fn effect(&self, accessory: Accessory) -> Option<AccessoryEffect> {
        self.effects[slot(accessory)]
    }

    pub fn parts(&self, accessory: Accessory) -> &[NodeId] {
        self.aux.get(&accessory).map(|p| p.as_slice()).unwrap_or(&[])
    }

    /// Advance blends and secondary effects
    pub fn update(&mut self, scene: &mut SceneGraph, config: &AccessoryConfig, elapsed: f32, dt: f32) {
        for accessory in Accessory::ALL {
            let i = slot(accessory);
            let state = &mut self.states[i];
            state.blend.set_rate(config.blend_rate);
            state.blend.update(dt);
            if state.blend.is_settled(config.snap_epsilon) {
                state.blend.snap(state.blend.target());
            }

            let blend = state.blend();
            let visible = blend > config.visibility_threshold;
            apply_blend(scene, state, if visible { blend } else { 0.0 });

            let effect = visible.then(|| AccessoryEffect::evaluate(accessory, elapsed, blend));
            if let Some(effect) = effect {
                apply_effect(scene, self.parts(accessory), effect);
            }
            self.effects[i] = effect;
        }
    }
}

fn apply_blend(scene: &mut SceneGraph, state: &AccessoryState, blend: f32) {
    scene.set_visible(state.group, blend > 0.0);
    if let Some(transform) = scene.transform_mut(state.group) {
        transform.scale = state.base_scale * blend;
    }
}

fn apply_effect(scene: &mut SceneGraph, parts: &[NodeId], effect: AccessoryEffect) {
    match effect {
        AccessoryEffect::Flutter { angle } => {
            for (hinge, sign) in parts.iter().zip([-1.0, 1.0]) {
                if let Some(t) = scene.transform_mut(*hinge) {
                    t.rotation.y = angle * sign;
                }
            }
        }
        AccessoryEffect::Pulse { flames, glow } => {
            for (flame, height) in parts.iter().zip(flames) {
                if let Some(t) = scene.transform_mut(*flame) {
                    t.scale.y = height;
                }
                if let Some(m) = scene.material_mut(*flame) {
                    m.emissive_intensity = glow;
                }
            }
        }
        AccessoryEffect::Ripple { opacity, ring_spin } => {
            if let [bubble, ring, ..] = parts {
                if let Some(m) = scene.material_mut(*bubble) {
                    m.opacity = opacity;
                }
                if let Some(t) = scene.transform_mut(*ring) {
                    t.rotation.y = ring_spin;
                }
            }
        }
    }
}

fn build_wings(scene: &mut SceneGraph, mount: NodeId) -> (NodeId, SmallVec<[NodeId; 4]>) {
    let group = scene.spawn_group(mount, "wings", Transform::IDENTITY);
    let mut hinges = SmallVec::new();
    for (name, x) in [("left-wing", -0.1), ("right-wing", 0.1)] {
        let hinge = scene.spawn_group(group, name, Transform::from_xyz(x, 0.0, 0.0));
        scene.spawn_mesh(
            hinge,
            name,
            Transform::from_xyz(x * 5.0, 0.1, -0.05),
            Geometry::cuboid(0.9, 0.6, 0.04),
            StandardMaterial::from_hex(0xe2e8f0)
                .with_metalness(0.6)
                .with_emissive(Color::from_hex(0x93c5fd), 0.2),
        );
        hinges.push(hinge);
    }
    (group, hinges)
}

fn build_boosters(scene: &mut SceneGraph, mount: NodeId) -> (NodeId, SmallVec<[NodeId; 4]>) {
    let group = scene.spawn_group(mount, "boosters", Transform::from_xyz(0.0, -0.2, -0.05));
    let mut flames = SmallVec::new();
    for x in [-0.3, 0.3] {
        scene.spawn_mesh(
            group,
            "booster",
            Transform::from_xyz(x, 0.0, -0.1),
            Geometry::cylinder(0.12, 0.5),
            StandardMaterial::from_hex(0x475569).with_metalness(0.7),
        );
        let flame = scene.spawn_mesh(
            group,
            "booster-flame",
            Transform::from_xyz(x, -0.4, -0.1).with_rotation(Euler::new(PI, 0.0, 0.0)),
            Geometry::Cone {
                radius: 0.1,
                height: 0.3,
            },
            StandardMaterial::from_hex(0xfb923c).with_emissive(Color::from_hex(0xf97316), 1.0),
        );
        flames.push(flame);
    }
    (group, flames)
}

fn build_shield(scene: &mut SceneGraph, root: NodeId) -> (NodeId, SmallVec<[NodeId; 4]>) {
    let group = scene.spawn_group(root, "shield", Transform::from_xyz(0.0, 1.1, 0.0));
    let bubble = scene.spawn_mesh(
        group,
        "shield-bubble",
        Transform::IDENTITY,
        Geometry::sphere(1.3),
        StandardMaterial::from_hex(0x60a5fa)
            .with_emissive(Color::from_hex(0x3b82f6), 0.3)
            .with_opacity(0.18),
    );
    let ring = scene.spawn_mesh(
        group,
        "shield-ring",
        Transform::IDENTITY.with_rotation(Euler::new(FRAC_PI_2, 0.0, 0.0)),
        Geometry::Torus {
            radius: 1.35,
            tube: 0.03,
        },
        StandardMaterial::from_hex(0x93c5fd).with_emissive(Color::from_hex(0x60a5fa), 0.8),
    );
    (group, SmallVec::from_slice(&[bubble, ring]))
}
