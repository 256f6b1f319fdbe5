//! Score sheet configuration.

use serde::{Deserialize, Serialize};

use crate::error::SheetError;

use super::subject::Subject;

fn default_subjects() -> Vec<Subject> {
    vec![Subject::new("swim", 100.0), Subject::new("run", 90.0)]
}

fn default_score() -> String {
    "0".to_string()
}

/// Initial state of a [`ScoreSheet`](super::ScoreSheet).
///
/// Missing fields fall back to the defaults, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Rows present when the sheet opens.
    pub subjects: Vec<Subject>,

    /// Text the score input shows initially and after each submit.
    pub default_score: String,
}

impl SheetConfig {
    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, SheetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the config to JSON.
    pub fn to_json(&self) -> Result<String, SheetError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            subjects: default_subjects(),
            default_score: default_score(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_two_rows() {
        let config = SheetConfig::default();
        assert_eq!(config.subjects.len(), 2);
        assert_eq!(config.subjects[0], Subject::new("swim", 100.0));
        assert_eq!(config.default_score, "0");
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config = SheetConfig::from_json("{}").unwrap();
        assert_eq!(config, SheetConfig::default());
    }

    #[test]
    fn json_overrides_rows() {
        let config =
            SheetConfig::from_json(r#"{"subjects":[{"name":"bike","score":80}]}"#).unwrap();
        assert_eq!(config.subjects, vec![Subject::new("bike", 80.0)]);
        assert_eq!(config.default_score, "0");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            SheetConfig::from_json("{\"subjects\": 3}"),
            Err(SheetError::Config(_))
        ));
    }

    #[test]
    fn json_round_trip_keeps_rows() {
        let config = SheetConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(SheetConfig::from_json(&json).unwrap(), config);
    }
}
