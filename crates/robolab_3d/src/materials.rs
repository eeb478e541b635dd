//! Standard material
//!
//! One material instance per mesh. Highlighting mutates emissive and
//! opacity in place, so instances are never shared between meshes.

use robolab_core::Color;

/// Standard PBR material (metallic-roughness workflow)
#[derive(Clone, Debug, PartialEq)]
pub struct StandardMaterial {
    /// Base color (albedo)
    pub color: Color,
    /// Metalness factor (0.0 = dielectric, 1.0 = metal)
    pub metalness: f32,
    /// Roughness factor (0.0 = smooth/mirror, 1.0 = rough)
    pub roughness: f32,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub opacity: f32,
    pub transparent: bool,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            metalness: 0.0,
            roughness: 0.5,
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
            opacity: 1.0,
            transparent: false,
        }
    }
}

impl StandardMaterial {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self::new(Color::from_hex(hex))
    }

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn with_emissive(mut self, emissive: Color, intensity: f32) -> Self {
        self.emissive = emissive;
        self.emissive_intensity = intensity;
        self
    }

    /// Make the material translucent; opacity below 1 enables blending
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = self.opacity < 1.0;
        self
    }

    /// Capture the values that highlighting overrides
    pub fn snapshot(&self) -> MaterialSnapshot {
        MaterialSnapshot {
            emissive: self.emissive,
            emissive_intensity: self.emissive_intensity,
            opacity: self.opacity,
        }
    }

    /// Restore values captured by [`snapshot`](Self::snapshot)
    pub fn restore(&mut self, snapshot: &MaterialSnapshot) {
        self.emissive = snapshot.emissive;
        self.emissive_intensity = snapshot.emissive_intensity;
        self.opacity = snapshot.opacity;
    }
}

/// Emissive and opacity values of a material at one point in time
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialSnapshot {
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub opacity: f32,
}
