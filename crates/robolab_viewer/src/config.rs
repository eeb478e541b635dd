//! Viewer configuration
//!
//! Every tunable of the scene controller lives here. All sections default
//! to the classroom viewer's values, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! rng_seed = 7
//!
//! [game]
//! life_max = 3
//! contact_radius = 0.6
//! ```

use crate::error::{Result, ViewerError};
use robolab_core::{Color, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fs;
use std::path::Path;

/// Root configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Upper bound on a single frame's time step, in seconds
    pub max_frame_dt: f32,
    /// Seed for spawn and blink randomness; entropy when absent
    pub rng_seed: Option<u64>,
    pub camera: CameraConfig,
    pub locomotion: LocomotionConfig,
    pub pose: PoseConfig,
    pub accessories: AccessoryConfig,
    pub idle: IdleConfig,
    pub game: GameConfig,
    pub input: InputConfig,
    pub render: RenderConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            max_frame_dt: 0.1,
            rng_seed: None,
            camera: CameraConfig::default(),
            locomotion: LocomotionConfig::default(),
            pose: PoseConfig::default(),
            accessories: AccessoryConfig::default(),
            idle: IdleConfig::default(),
            game: GameConfig::default(),
            input: InputConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Named camera positions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewPositions {
    pub front: [f32; 3],
    pub side: [f32; 3],
    pub top: [f32; 3],
    pub perspective: [f32; 3],
}

impl Default for ViewPositions {
    fn default() -> Self {
        Self {
            front: [0.0, 1.5, 4.0],
            side: [4.0, 1.2, 0.0],
            top: [0.0, 6.0, 0.01],
            perspective: [3.0, 2.5, 3.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Point every named view is aimed at
    pub look_at: [f32; 3],
    /// Initial orbit pivot
    pub orbit_target: [f32; 3],
    /// Damping rate for orbit, pan, and zoom
    pub orbit_damping: f32,
    /// Largest angle from straight up, in radians
    pub max_polar_angle: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub views: ViewPositions,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 50.0,
            near: 0.1,
            far: 100.0,
            look_at: [0.0, 0.8, 0.0],
            orbit_target: [0.0, 1.0, 0.0],
            orbit_damping: 5.0,
            max_polar_angle: PI / 2.1,
            min_distance: 1.5,
            max_distance: 20.0,
            views: ViewPositions::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Walking speed in units per second at speed scale 1
    pub base_speed: f32,
    /// Allowed range of the `speed` command scalar
    pub speed_min: f32,
    pub speed_max: f32,
    pub velocity_damping: f32,
    /// Half extents of the play area on X and Z
    pub play_area: [f32; 2],
    /// How long a one-shot `move` holds its direction, in seconds
    pub step_duration: f32,
    /// Walk-cycle radians per unit travelled
    pub stride_rate: f32,
    pub gait_damping: f32,
    pub leg_swing: f32,
    pub arm_swing: f32,
    pub bob_height: f32,
    pub head_sway: f32,
    pub facing_damping: f32,
    /// Turn rate of the auto-walk heading, radians per second
    pub auto_walk_rate: f32,
    /// Length of the synthesized direction vector
    pub auto_walk_magnitude: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            base_speed: 1.6,
            speed_min: 0.25,
            speed_max: 3.0,
            velocity_damping: 8.0,
            play_area: [2.6, 2.6],
            step_duration: 0.25,
            stride_rate: 4.5,
            gait_damping: 6.0,
            leg_swing: 0.6,
            arm_swing: 0.35,
            bob_height: 0.05,
            head_sway: 0.08,
            facing_damping: 10.0,
            auto_walk_rate: 0.6,
            auto_walk_magnitude: 0.7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    pub rotation_damping: f32,
    /// X rotation of both shoulders for "arms-up"
    pub arms_up_angle: f32,
    /// Neck yaw for "head-left" / "head-right"
    pub head_turn: f32,
    pub salute_duration: f32,
    /// Shoulder rotation at the top of a salute
    pub salute_arm: [f32; 3],
    /// Elbow bend at the top of a salute
    pub salute_elbow: f32,
    /// Sideways shoulder raise while waving
    pub wave_raise: f32,
    /// Forearm oscillation frequency in radians per second
    pub wave_frequency: f32,
    pub wave_amplitude: f32,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            rotation_damping: 10.0,
            arms_up_angle: -2.8,
            head_turn: 0.6,
            salute_duration: 1.2,
            salute_arm: [-2.4, 0.0, -0.5],
            salute_elbow: -1.2,
            wave_raise: 2.6,
            wave_frequency: 8.0,
            wave_amplitude: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessoryConfig {
    pub blend_rate: f32,
    /// Blend amount below which an accessory is hidden
    pub visibility_threshold: f32,
    /// Blend distance at which the blend snaps onto its target
    pub snap_epsilon: f32,
}

impl Default for AccessoryConfig {
    fn default() -> Self {
        Self {
            blend_rate: 6.0,
            visibility_threshold: 0.01,
            snap_epsilon: 1e-3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Seconds between blinks, drawn uniformly from this range
    pub blink_interval: [f32; 2],
    pub blink_duration: f32,
    /// Chest indicator pulse speed in radians per second
    pub chest_pulse_speed: f32,
    pub chest_glow: [f32; 2],
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            blink_interval: [2.0, 5.0],
            blink_duration: 0.15,
            chest_pulse_speed: 2.0,
            chest_glow: [0.3, 1.2],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub life_max: u32,
    /// Base seconds between spawns
    pub spawn_interval: f32,
    /// Multiplier range applied to the base interval after each spawn
    pub interval_jitter: [f32; 2],
    pub ring_radius: f32,
    pub spawn_height: [f32; 2],
    /// Max horizontal offset of the aim point from the character
    pub aim_jitter: f32,
    pub projectile_speed: [f32; 2],
    pub projectile_radius: f32,
    /// Spin rate range in radians per second
    pub spin_rate: [f32; 2],
    /// Extra lifetime beyond the time needed to reach the aim point
    pub ttl_margin: f32,
    pub contact_radius: f32,
    /// Height above the character's base where contact is measured
    pub contact_height: f32,
    /// Radius used when clicking projectiles
    pub pick_radius: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            life_max: 5,
            spawn_interval: 1.6,
            interval_jitter: [0.6, 1.4],
            ring_radius: 6.0,
            spawn_height: [0.6, 2.2],
            aim_jitter: 0.4,
            projectile_speed: [2.0, 3.2],
            projectile_radius: 0.15,
            spin_rate: [2.0, 6.0],
            ttl_margin: 1.5,
            contact_radius: 0.75,
            contact_height: 0.9,
            pick_radius: 0.35,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub gamepad_deadzone: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            gamepad_deadzone: 0.25,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Initial surface size in pixels
    pub width: f32,
    pub height: f32,
    /// `#rrggbb`
    pub clear_color: String,
    pub highlight_color: String,
    pub highlight_intensity: f32,
    pub outline_color: String,
    pub outline_strength: f32,
    pub bloom_enabled: bool,
    pub bloom_strength: f32,
    pub bloom_radius: f32,
    pub bloom_threshold: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 520.0,
            clear_color: "#f8fafc".to_string(),
            highlight_color: "#3b82f6".to_string(),
            highlight_intensity: 0.6,
            outline_color: "#3b82f6".to_string(),
            outline_strength: 3.0,
            bloom_enabled: true,
            bloom_strength: 0.6,
            bloom_radius: 0.4,
            bloom_threshold: 0.85,
        }
    }
}

/// Parse `#rrggbb` or `rrggbb`
pub fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().map(Color::from_hex)
}

/// Smallest polar ceiling the orbit controller can hold
const MIN_POLAR_ANGLE: f32 = 1e-4;

fn invalid(msg: impl Into<String>) -> ViewerError {
    ViewerError::InvalidConfig(msg.into())
}

fn check_range(name: &str, range: [f32; 2]) -> Result<()> {
    if !(range[0].is_finite() && range[1].is_finite()) || range[0] > range[1] {
        return Err(invalid(format!(
            "{name} must be an ordered range, got [{}, {}]",
            range[0], range[1]
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: f32) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(format!("{name} must be positive, got {value}")));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f32) -> Result<()> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(invalid(format!("{name} must be non-negative, got {value}")));
    }
    Ok(())
}

impl ViewerConfig {
    /// Parse from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: ViewerConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        check_positive("max_frame_dt", self.max_frame_dt)?;

        let cam = &self.camera;
        check_positive("camera.fov", cam.fov)?;
        if cam.fov >= 180.0 {
            return Err(invalid("camera.fov must be below 180 degrees"));
        }
        check_positive("camera.near", cam.near)?;
        if cam.far <= cam.near {
            return Err(invalid("camera.far must exceed camera.near"));
        }
        check_positive("camera.orbit_damping", cam.orbit_damping)?;
        if !(MIN_POLAR_ANGLE..=PI).contains(&cam.max_polar_angle) {
            return Err(invalid(format!(
                "camera.max_polar_angle must be in [{MIN_POLAR_ANGLE}, pi], got {}",
                cam.max_polar_angle
            )));
        }
        check_positive("camera.min_distance", cam.min_distance)?;
        check_range("camera distance", [cam.min_distance, cam.max_distance])?;

        let loco = &self.locomotion;
        check_positive("locomotion.base_speed", loco.base_speed)?;
        check_positive("locomotion.speed_min", loco.speed_min)?;
        check_range("locomotion speed", [loco.speed_min, loco.speed_max])?;
        check_positive("locomotion.velocity_damping", loco.velocity_damping)?;
        check_positive("locomotion.play_area x", loco.play_area[0])?;
        check_positive("locomotion.play_area z", loco.play_area[1])?;
        check_positive("locomotion.step_duration", loco.step_duration)?;

        check_positive("pose.rotation_damping", self.pose.rotation_damping)?;
        check_positive("pose.salute_duration", self.pose.salute_duration)?;

        check_positive("accessories.blend_rate", self.accessories.blend_rate)?;

        let idle = &self.idle;
        check_positive("idle.blink_interval min", idle.blink_interval[0])?;
        check_range("idle.blink_interval", idle.blink_interval)?;
        check_positive("idle.blink_duration", idle.blink_duration)?;
        check_range("idle.chest_glow", idle.chest_glow)?;

        let game = &self.game;
        if game.life_max == 0 {
            return Err(invalid("game.life_max must be at least 1"));
        }
        check_positive("game.spawn_interval", game.spawn_interval)?;
        check_positive("game.interval_jitter min", game.interval_jitter[0])?;
        check_range("game.interval_jitter", game.interval_jitter)?;
        check_positive("game.ring_radius", game.ring_radius)?;
        check_range("game.spawn_height", game.spawn_height)?;
        check_positive("game.projectile_speed min", game.projectile_speed[0])?;
        check_range("game.projectile_speed", game.projectile_speed)?;
        check_range("game.spin_rate", game.spin_rate)?;
        check_positive("game.contact_radius", game.contact_radius)?;
        check_positive("game.pick_radius", game.pick_radius)?;
        check_non_negative("game.aim_jitter", game.aim_jitter)?;
        check_non_negative("game.ttl_margin", game.ttl_margin)?;
        if game.contact_radius >= game.ring_radius {
            return Err(invalid("game.contact_radius must be smaller than game.ring_radius"));
        }

        let dz = self.input.gamepad_deadzone;
        if !(0.0..1.0).contains(&dz) {
            return Err(invalid(format!(
                "input.gamepad_deadzone must be in [0, 1), got {dz}"
            )));
        }

        let render = &self.render;
        check_positive("render.width", render.width)?;
        check_positive("render.height", render.height)?;
        for (name, value) in [
            ("render.clear_color", &render.clear_color),
            ("render.highlight_color", &render.highlight_color),
            ("render.outline_color", &render.outline_color),
        ] {
            if parse_hex_color(value).is_none() {
                return Err(invalid(format!("{name} must be #rrggbb, got {value:?}")));
            }
        }
        Ok(())
    }

    pub fn look_at(&self) -> Vec3 {
        Vec3::from(self.camera.look_at)
    }

    pub fn orbit_target(&self) -> Vec3 {
        Vec3::from(self.camera.orbit_target)
    }

    pub fn clear_color(&self) -> Color {
        parse_hex_color(&self.render.clear_color).unwrap_or(Color::WHITE)
    }

    pub fn highlight_color(&self) -> Color {
        parse_hex_color(&self.render.highlight_color).unwrap_or(Color::WHITE)
    }

    pub fn outline_color(&self) -> Color {
        parse_hex_color(&self.render.outline_color).unwrap_or(Color::WHITE)
    }
}
