//! Hover highlight for rig parts
//!
//! At most one part is highlighted. The first time a node is tinted its
//! emissive/opacity values are captured; un-highlighting restores them.

use crate::rig::{Part, Rig};
use robolab_3d::render::PostProcessChain;
use robolab_3d::{MaterialSnapshot, NodeId, SceneGraph};
use robolab_core::Color;
use rustc_hash::FxHashMap;

#[derive(Debug)]
pub struct Highlighter {
    hovered: Option<Part>,
    saved: FxHashMap<NodeId, MaterialSnapshot>,
    color: Color,
    intensity: f32,
}

impl Highlighter {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            hovered: None,
            saved: FxHashMap::default(),
            color,
            intensity,
        }
    }

    pub fn hovered(&self) -> Option<Part> {
        self.hovered
    }

    /// Number of nodes whose base material has been captured
    pub fn captured(&self) -> usize {
        self.saved.len()
    }

    /// Move the highlight to `part`
    ///
    /// Returns `true` when the hovered part changed.
    pub fn set_hover(
        &mut self,
        scene: &mut SceneGraph,
        rig: &Rig,
        chain: &mut PostProcessChain,
        part: Option<Part>,
    ) -> bool {
        if part == self.hovered {
            return false;
        }
        if let Some(previous) = self.hovered.take() {
            let node = rig.node(previous);
            if let (Some(material), Some(base)) = (scene.material_mut(node), self.saved.get(&node)) {
                material.restore(base);
            }
        }

        let selected = part.map(|p| rig.node(p));
        if let Some(node) = selected {
            if let Some(material) = scene.material_mut(node) {
                self.saved.entry(node).or_insert_with(|| material.snapshot());
                material.emissive = self.color;
                material.emissive_intensity = self.intensity;
            }
        }
        chain.set_selection(selected);
        self.hovered = part;
        true
    }

    /// Drop all captured state without touching materials; used after the
    /// scene is cleared
    pub fn reset(&mut self) {
        self.hovered = None;
        self.saved.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robolab_3d::render::{BloomPass, OutlinePass};

    fn setup() -> (SceneGraph, Rig, PostProcessChain) {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let (rig, _) = Rig::build(&mut scene, root);
        let chain = PostProcessChain::new(Color::WHITE, OutlinePass::default(), BloomPass::default());
        (scene, rig, chain)
    }

    #[test]
    fn test_single_highlight_and_restore() {
        let (mut scene, rig, mut chain) = setup();
        let mut hl = Highlighter::new(Color::from_hex(0x3b82f6), 0.6);
        let head = rig.node(Part::Head);
        let torso = rig.node(Part::Torso);
        let head_base = scene.material(head).unwrap().snapshot();

        assert!(hl.set_hover(&mut scene, &rig, &mut chain, Some(Part::Head)));
        assert_eq!(scene.material(head).unwrap().emissive_intensity, 0.6);
        assert_eq!(chain.selection(), Some(head));
        assert!(!hl.set_hover(&mut scene, &rig, &mut chain, Some(Part::Head)));

        assert!(hl.set_hover(&mut scene, &rig, &mut chain, Some(Part::Torso)));
        assert_eq!(scene.material(head).unwrap().snapshot(), head_base);
        assert_eq!(scene.material(torso).unwrap().emissive_intensity, 0.6);
        assert_eq!(chain.selection(), Some(torso));

        assert!(hl.set_hover(&mut scene, &rig, &mut chain, None));
        assert_eq!(chain.selection(), None);
        assert_eq!(hl.hovered(), None);
        assert_eq!(hl.captured(), 2);
    }
}
