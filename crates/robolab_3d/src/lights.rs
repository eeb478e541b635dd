//! Light descriptors attached to scene nodes

use robolab_core::Color;

/// Light types
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    /// Uniform light from every direction
    Ambient { color: Color, intensity: f32 },
    /// Parallel light shining from the node position toward the origin
    Directional { color: Color, intensity: f32 },
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Light::Ambient { color, intensity }
    }

    pub fn directional(color: Color, intensity: f32) -> Self {
        Light::Directional { color, intensity }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Light::Ambient { intensity, .. } | Light::Directional { intensity, .. } => *intensity,
        }
    }
}
