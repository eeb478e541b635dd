//! Post-processing chain
//!
//! The chain is fixed: base render, then selection outline, then bloom.
//! Each effect describes the pass it wants; a GPU backend turns the
//! descriptions into render passes.

use crate::scene::NodeId;
use robolab_core::Color;
use smallvec::SmallVec;

/// Pass description handed to the render backend
#[derive(Clone, Debug, PartialEq)]
pub enum PassDescription {
    Render {
        clear_color: Color,
    },
    Outline {
        selected: SmallVec<[NodeId; 1]>,
        edge_color: Color,
        edge_strength: f32,
        thickness: f32,
    },
    Bloom {
        strength: f32,
        radius: f32,
        threshold: f32,
    },
}

impl PassDescription {
    pub fn name(&self) -> &'static str {
        match self {
            PassDescription::Render { .. } => "render",
            PassDescription::Outline { .. } => "outline",
            PassDescription::Bloom { .. } => "bloom",
        }
    }
}

/// Post-processing effect trait
pub trait PostEffect {
    /// Effect name
    fn name(&self) -> &'static str;

    /// Whether this effect is enabled
    fn is_enabled(&self) -> bool {
        true
    }

    /// Describe the pass for this frame
    fn describe(&self) -> PassDescription;
}

/// Base scene render
#[derive(Clone, Debug)]
pub struct RenderPass {
    pub clear_color: Color,
}

impl PostEffect for RenderPass {
    fn name(&self) -> &'static str {
        "render"
    }

    fn describe(&self) -> PassDescription {
        PassDescription::Render {
            clear_color: self.clear_color,
        }
    }
}

/// Outline around the selected meshes
#[derive(Clone, Debug)]
pub struct OutlinePass {
    pub selected: SmallVec<[NodeId; 1]>,
    pub edge_color: Color,
    pub edge_strength: f32,
    pub thickness: f32,
    pub enabled: bool,
}

impl Default for OutlinePass {
    fn default() -> Self {
        Self {
            selected: SmallVec::new(),
            edge_color: Color::from_hex(0x3b82f6),
            edge_strength: 3.0,
            thickness: 1.0,
            enabled: true,
        }
    }
}

impl PostEffect for OutlinePass {
    fn name(&self) -> &'static str {
        "outline"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn describe(&self) -> PassDescription {
        PassDescription::Outline {
            selected: self.selected.clone(),
            edge_color: self.edge_color,
            edge_strength: self.edge_strength,
            thickness: self.thickness,
        }
    }
}

/// Bloom effect
#[derive(Clone, Debug)]
pub struct BloomPass {
    /// Bloom intensity
    pub strength: f32,
    /// Blur radius
    pub radius: f32,
    /// Brightness threshold for bloom
    pub threshold: f32,
    pub enabled: bool,
}

impl Default for BloomPass {
    fn default() -> Self {
        Self {
            strength: 0.6,
            radius: 0.4,
            threshold: 0.85,
            enabled: true,
        }
    }
}

impl PostEffect for BloomPass {
    fn name(&self) -> &'static str {
        "bloom"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn describe(&self) -> PassDescription {
        PassDescription::Bloom {
            strength: self.strength,
            radius: self.radius,
            threshold: self.threshold,
        }
    }
}

/// Fixed render, outline, bloom chain
#[derive(Clone, Debug)]
pub struct PostProcessChain {
    pub render: RenderPass,
    pub outline: OutlinePass,
    pub bloom: BloomPass,
}

impl PostProcessChain {
    pub fn new(clear_color: Color, outline: OutlinePass, bloom: BloomPass) -> Self {
        Self {
            render: RenderPass { clear_color },
            outline,
            bloom,
        }
    }

    /// Replace the outlined selection
    pub fn set_selection(&mut self, node: Option<NodeId>) {
        self.outline.selected.clear();
        self.outline.selected.extend(node);
    }

    pub fn selection(&self) -> Option<NodeId> {
        self.outline.selected.first().copied()
    }

    /// Effects in execution order
    pub fn effects(&self) -> [&dyn PostEffect; 3] {
        [&self.render, &self.outline, &self.bloom]
    }

    /// Descriptions of the enabled passes, in execution order
    pub fn passes(&self) -> Vec<PassDescription> {
        self.effects()
            .iter()
            .filter(|e| e.is_enabled())
            .map(|e| e.describe())
            .collect()
    }
}
