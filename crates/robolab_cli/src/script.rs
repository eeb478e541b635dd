//! Timed command scripts
//!
//! A script is a JSON array of steps:
//!
//! ```json
//! [
//!   { "at": 0.0, "command": "set-view", "payload": "front" },
//!   { "at": 0.5, "command": "game", "payload": { "action": "start" } }
//! ]
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// One scheduled command
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ScriptStep {
    /// Seconds since the session started
    pub at: f64,
    pub command: String,
    #[serde(default)]
    pub payload: Value,
}

/// Steps ordered by time
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Script {
    steps: Vec<ScriptStep>,
    cursor: usize,
}

impl Script {
    pub fn parse(source: &str) -> Result<Self> {
        let mut steps: Vec<ScriptStep> =
            serde_json::from_str(source).context("Failed to parse command script")?;
        for (i, step) in steps.iter().enumerate() {
            if !step.at.is_finite() || step.at < 0.0 {
                bail!("Step {} has invalid time {}", i, step.at);
            }
        }
        // stable, so steps sharing a time keep file order
        steps.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(Self { steps, cursor: 0 })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid script {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Time of the last step, 0 for an empty script
    pub fn end_time(&self) -> f64 {
        self.steps.last().map_or(0.0, |s| s.at)
    }

    /// Steps due at or before `time` that have not been returned yet
    pub fn due(&mut self, time: f64) -> &[ScriptStep] {
        let start = self.cursor;
        while self.cursor < self.steps.len() && self.steps[self.cursor].at <= time {
            self.cursor += 1;
        }
        &self.steps[start..self.cursor]
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_sorts_by_time() {
        let script = Script::parse(
            r#"[
                { "at": 1.0, "command": "salute" },
                { "at": 0.0, "command": "set-view", "payload": "top" },
                { "at": 1.0, "command": "wave" }
            ]"#,
        )
        .unwrap();

        assert_eq!(script.len(), 3);
        assert_eq!(script.end_time(), 1.0);
        assert_eq!(script.steps[0].payload, json!("top"));
        assert_eq!(script.steps[1].command, "salute");
        assert_eq!(script.steps[2].command, "wave");
        assert_eq!(script.steps[1].payload, Value::Null);
    }

    #[test]
    fn test_due_returns_each_step_once() {
        let mut script = Script::parse(
            r#"[
                { "at": 0.0, "command": "a" },
                { "at": 0.5, "command": "b" },
                { "at": 2.0, "command": "c" }
            ]"#,
        )
        .unwrap();

        assert_eq!(script.due(0.0).len(), 1);
        assert!(script.due(0.25).is_empty());
        let due: Vec<_> = script.due(1.0).iter().map(|s| s.command.clone()).collect();
        assert_eq!(due, vec!["b"]);
        assert!(!script.is_finished());
        assert_eq!(script.due(10.0).len(), 1);
        assert!(script.is_finished());
    }

    #[test]
    fn test_rejects_bad_scripts() {
        assert!(Script::parse(r#"{ "at": 0 }"#).is_err());
        assert!(Script::parse(r#"[{ "command": "wave" }]"#).is_err());
        assert!(Script::parse(r#"[{ "at": -1.0, "command": "wave" }]"#).is_err());
    }
}
