//! Rotation target table
//!
//! Maps rig parts to desired orientations. Explicit entries come from pose
//! commands and hold their node against every procedural stage; procedural
//! entries are rewritten each frame by gait and gestures.

use crate::rig::{Part, Rig};
use robolab_animation::damp;
use robolab_3d::SceneGraph;
use robolab_core::Euler;
use rustc_hash::FxHashMap;

/// Who wrote a rotation target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetSource {
    /// Written by a pose command; procedural stages leave it alone
    Explicit,
    /// Written by the builder, gait, or a gesture
    Procedural,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationTarget {
    pub rotation: Euler,
    pub source: TargetSource,
}

#[derive(Clone, Debug, Default)]
pub struct RotationTargets {
    entries: FxHashMap<Part, RotationTarget>,
}

impl RotationTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a pose target, replacing any entry
    pub fn set_explicit(&mut self, part: Part, rotation: Euler) {
        self.entries.insert(
            part,
            RotationTarget {
                rotation,
                source: TargetSource::Explicit,
            },
        );
    }

    /// Write a procedural target unless the part is held explicitly
    ///
    /// Returns whether the target was written.
    pub fn set_procedural(&mut self, part: Part, rotation: Euler) -> bool {
        if self.is_explicit(part) {
            return false;
        }
        self.entries.insert(
            part,
            RotationTarget {
                rotation,
                source: TargetSource::Procedural,
            },
        );
        true
    }

    pub fn remove(&mut self, part: Part) -> Option<RotationTarget> {
        self.entries.remove(&part)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, part: Part) -> Option<&RotationTarget> {
        self.entries.get(&part)
    }

    pub fn contains(&self, part: Part) -> bool {
        self.entries.contains_key(&part)
    }

    pub fn is_explicit(&self, part: Part) -> bool {
        matches!(
            self.entries.get(&part),
            Some(RotationTarget {
                source: TargetSource::Explicit,
                ..
            })
        )
    }

    pub fn explicit_count(&self) -> usize {
        self.entries
            .values()
            .filter(|t| t.source == TargetSource::Explicit)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Part, &RotationTarget)> {
        self.entries.iter().map(|(p, t)| (*p, t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Damp each listed node's rotation toward its target, per axis
    pub fn drive(&self, scene: &mut SceneGraph, rig: &Rig, rate: f32, dt: f32) {
        for (part, target) in &self.entries {
            if let Some(transform) = scene.transform_mut(rig.node(*part)) {
                transform.rotation = damp(transform.rotation, target.rotation, rate, dt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_blocks_procedural() {
        let mut targets = RotationTargets::new();
        targets.set_explicit(Part::LeftArmPivot, Euler::new(-2.8, 0.0, 0.0));
        assert!(!targets.set_procedural(Part::LeftArmPivot, Euler::IDENTITY));
        assert_eq!(
            targets.get(Part::LeftArmPivot).unwrap().rotation,
            Euler::new(-2.8, 0.0, 0.0)
        );

        assert!(targets.set_procedural(Part::RightArmPivot, Euler::new(0.3, 0.0, 0.0)));
        assert_eq!(targets.explicit_count(), 1);
    }

    #[test]
    fn test_removal_returns_control() {
        let mut targets = RotationTargets::new();
        targets.set_explicit(Part::Neck, Euler::new(0.0, 0.6, 0.0));
        targets.remove(Part::Neck);
        assert!(targets.set_procedural(Part::Neck, Euler::IDENTITY));
        targets.clear();
        assert!(targets.is_empty());
    }

    #[test]
    fn test_drive_damps_only_listed_parts() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let (rig, mut targets) = Rig::build(&mut scene, root);
        targets.set_explicit(Part::LeftArmPivot, Euler::new(-2.8, 0.0, 0.0));
        if let Some(t) = scene.transform_mut(rig.node(Part::Neck)) {
            t.rotation = Euler::new(0.0, 0.5, 0.0);
        }

        for _ in 0..120 {
            targets.drive(&mut scene, &rig, 10.0, 1.0 / 60.0);
        }
        let arm = scene.transform(rig.node(Part::LeftArmPivot)).unwrap().rotation;
        assert!(arm.max_abs_diff(&Euler::new(-2.8, 0.0, 0.0)) < 1e-3);
        let neck = scene.transform(rig.node(Part::Neck)).unwrap().rotation;
        assert_eq!(neck, Euler::new(0.0, 0.5, 0.0));
    }
}
