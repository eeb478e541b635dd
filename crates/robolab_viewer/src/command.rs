//! Inbound commands
//!
//! Hosts either queue typed [`Command`] values or hand over a command name
//! plus a JSON payload, as the browser shell does with its custom events.
//! Payloads that do not match the command's shape are rejected by
//! [`Command::parse`] and never reach the viewer state.

use serde::Deserialize;
use serde_json::Value;

/// Movement direction intents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    #[serde(alias = "backward")]
    Back,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Back,
        Direction::Left,
        Direction::Right,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Continuous movement edge
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveState {
    Start,
    Stop,
}

/// Named camera views
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraView {
    Front,
    Side,
    Top,
    Perspective,
    Reset,
}

/// Discrete poses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PoseName {
    ArmsUp,
    ArmsDown,
    HeadLeft,
    HeadRight,
    Reset,
}

/// Attachable accessories
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessory {
    Wings,
    Boosters,
    Shield,
}

impl Accessory {
    pub const ALL: [Accessory; 3] = [Accessory::Wings, Accessory::Boosters, Accessory::Shield];

    pub fn name(self) -> &'static str {
        match self {
            Accessory::Wings => "wings",
            Accessory::Boosters => "boosters",
            Accessory::Shield => "shield",
        }
    }
}

/// Auto-walk path shapes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalkPattern {
    #[default]
    Circle,
    #[serde(alias = "figure-8")]
    Figure8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameAction {
    Start,
    Stop,
}

/// Commands accepted by the viewer
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    SetView(CameraView),
    Pose(PoseName),
    ToggleWave,
    StartWave,
    StopWave,
    Salute,
    /// Requested speed scalar, clamped by the viewer
    Speed(f32),
    Accessory {
        accessory: Accessory,
        enabled: bool,
    },
    Walk {
        active: bool,
        pattern: WalkPattern,
    },
    Game(GameAction),
    /// `state: None` is a one-shot step
    Move {
        direction: Direction,
        state: Option<MoveState>,
    },
}

#[derive(Deserialize)]
struct AccessoryPayload {
    name: Accessory,
    enabled: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum WalkMode {
    Start,
    Stop,
}

#[derive(Deserialize)]
struct WalkPayload {
    mode: WalkMode,
    #[serde(default)]
    pattern: Option<WalkPattern>,
}

#[derive(Deserialize)]
struct GamePayload {
    action: GameAction,
}

#[derive(Deserialize)]
struct MovePayload {
    dir: Direction,
    #[serde(default)]
    state: Option<MoveState>,
}

/// Deserialize a payload that may be a bare string or `{ key: string }`
fn named<T>(payload: &Value, key: &str) -> Option<T>
where
    T: for<'de> Deserialize<'de>,
{
    let value = match payload {
        Value::Object(map) => map.get(key)?,
        other => other,
    };
    T::deserialize(value).ok()
}

fn number(payload: &Value) -> Option<f32> {
    let value = match payload {
        Value::Object(map) => map.get("speed").or_else(|| map.get("value"))?,
        other => other,
    };
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    let n = n as f32;
    n.is_finite().then_some(n)
}

impl Command {
    /// Parse a named command and its JSON payload
    ///
    /// Names may carry the `robot3d-` prefix used by the browser shell.
    /// Returns `None` for unknown names and malformed payloads.
    pub fn parse(name: &str, payload: &Value) -> Option<Command> {
        let name = name.strip_prefix("robot3d-").unwrap_or(name);
        let command = match name {
            "set-view" | "setview" => Command::SetView(named(payload, "view")?),
            "pose" => Command::Pose(named(payload, "pose")?),
            "wave" => Command::ToggleWave,
            "salute" => Command::Salute,
            "speed" => Command::Speed(number(payload)?),
            "action" => match named::<String>(payload, "action")?.as_str() {
                "salute" => Command::Salute,
                "wave:start" => Command::StartWave,
                "wave:stop" => Command::StopWave,
                _ => return None,
            },
            "accessory" => {
                let p = AccessoryPayload::deserialize(payload).ok()?;
                Command::Accessory {
                    accessory: p.name,
                    enabled: p.enabled,
                }
            }
            "walk" => {
                let p = WalkPayload::deserialize(payload).ok()?;
                Command::Walk {
                    active: matches!(p.mode, WalkMode::Start),
                    pattern: p.pattern.unwrap_or_default(),
                }
            }
            "game" => Command::Game(GamePayload::deserialize(payload).ok()?.action),
            "move" => {
                let p = MovePayload::deserialize(payload).ok()?;
                Command::Move {
                    direction: p.dir,
                    state: p.state,
                }
            }
            _ => return None,
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_string_payloads() {
        assert_eq!(
            Command::parse("robot3d-setview", &json!("top")),
            Some(Command::SetView(CameraView::Top))
        );
        assert_eq!(
            Command::parse("set-view", &json!({ "view": "front" })),
            Some(Command::SetView(CameraView::Front))
        );
        assert_eq!(
            Command::parse("pose", &json!("arms-up")),
            Some(Command::Pose(PoseName::ArmsUp))
        );
        assert_eq!(
            Command::parse("action", &json!("wave:start")),
            Some(Command::StartWave)
        );
        assert_eq!(Command::parse("wave", &Value::Null), Some(Command::ToggleWave));
    }

    #[test]
    fn test_parse_object_payloads() {
        assert_eq!(
            Command::parse("accessory", &json!({ "name": "wings", "enabled": true })),
            Some(Command::Accessory {
                accessory: Accessory::Wings,
                enabled: true
            })
        );
        assert_eq!(
            Command::parse("walk", &json!({ "mode": "start", "pattern": "figure8" })),
            Some(Command::Walk {
                active: true,
                pattern: WalkPattern::Figure8
            })
        );
        assert_eq!(
            Command::parse("walk", &json!({ "mode": "stop" })),
            Some(Command::Walk {
                active: false,
                pattern: WalkPattern::Circle
            })
        );
        assert_eq!(
            Command::parse("move", &json!({ "dir": "left", "state": "start" })),
            Some(Command::Move {
                direction: Direction::Left,
                state: Some(MoveState::Start)
            })
        );
        assert_eq!(
            Command::parse("move", &json!({ "dir": "forward" })),
            Some(Command::Move {
                direction: Direction::Forward,
                state: None
            })
        );
        assert_eq!(
            Command::parse("game", &json!({ "action": "start" })),
            Some(Command::Game(GameAction::Start))
        );
    }

    #[test]
    fn test_speed_accepts_numbers_and_numeric_strings() {
        assert_eq!(Command::parse("speed", &json!(1.5)), Some(Command::Speed(1.5)));
        assert_eq!(Command::parse("speed", &json!("2")), Some(Command::Speed(2.0)));
        assert_eq!(Command::parse("speed", &json!("fast")), None);
        assert_eq!(Command::parse("speed", &json!(null)), None);
    }

    #[test]
    fn test_malformed_payloads_are_rejected() {
        assert_eq!(Command::parse("set-view", &json!("diagonal")), None);
        assert_eq!(Command::parse("pose", &json!(42)), None);
        assert_eq!(Command::parse("accessory", &json!({ "name": "jetpack", "enabled": true })), None);
        assert_eq!(Command::parse("accessory", &json!({ "name": "wings" })), None);
        assert_eq!(Command::parse("walk", &json!({ "mode": "start", "pattern": "spiral" })), None);
        assert_eq!(Command::parse("move", &json!({ "dir": "up" })), None);
        assert_eq!(Command::parse("game", &json!({ "action": "pause" })), None);
        assert_eq!(Command::parse("action", &json!("dance")), None);
        assert_eq!(Command::parse("teleport", &json!({})), None);
    }
}
