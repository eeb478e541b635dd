//! Outbound notifications

use serde::Serialize;

/// Notifications published by the viewer
///
/// Serialized with an `event` tag naming the browser shell event, for
/// example `{"event":"life","value":4,"max":5}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Notification {
    /// Hovered body part changed; `None` when nothing is hovered
    PieceHover { name: Option<&'static str> },
    GameScore { score: u32 },
    Life { value: u32, max: u32 },
    GameOver { score: u32 },
}

impl Notification {
    pub fn event_name(&self) -> &'static str {
        match self {
            Notification::PieceHover { .. } => "piece-hover",
            Notification::GameScore { .. } => "game-score",
            Notification::Life { .. } => "life",
            Notification::GameOver { .. } => "game-over",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(Notification::Life { value: 4, max: 5 }).unwrap();
        assert_eq!(json, serde_json::json!({ "event": "life", "value": 4, "max": 5 }));

        let hover = serde_json::to_value(Notification::PieceHover { name: None }).unwrap();
        assert_eq!(hover, serde_json::json!({ "event": "piece-hover", "name": null }));
        assert_eq!(Notification::GameOver { score: 3 }.event_name(), "game-over");
    }
}
