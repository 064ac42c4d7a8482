//! Board configuration.
//!
//! # Responsibility
//! - Carry gesture timing, reset policy and screen labels into a session.
//! - Parse the JSON blob handed over by the UI at start-up.
//!
//! # Invariants
//! - Every field has a default; an empty object is a valid config.
//! - Timing values stay within `TIMING_MIN_MS..=TIMING_MAX_MS`.

use crate::gesture::GestureConfig;
use crate::schedule::ResetPolicy;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const TIMING_MIN_MS: u64 = 1;
pub const TIMING_MAX_MS: u64 = 10_000;

const DEFAULT_TITLE: &str = "To-do";
const DEFAULT_INPUT_PLACEHOLDER: &str = "Something to do...";
const DEFAULT_COMMIT_LABEL: &str = "Save";

/// Session configuration supplied by the host app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub gesture: GestureConfig,
    pub reset_policy: ResetPolicy,
    /// Header title shown next to the incomplete count.
    pub title: String,
    pub input_placeholder: String,
    pub commit_label: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            reset_policy: ResetPolicy::default(),
            title: DEFAULT_TITLE.to_string(),
            input_placeholder: DEFAULT_INPUT_PLACEHOLDER.to_string(),
            commit_label: DEFAULT_COMMIT_LABEL.to_string(),
        }
    }
}

impl BoardConfig {
    /// Parses and validates a JSON config.
    ///
    /// # Errors
    /// - `Parse` when the text is not a valid config object.
    /// - `TimingOutOfRange` when a gesture timing is outside the allowed range.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_timing("long_press_ms", self.gesture.long_press_ms)?;
        check_timing("double_tap_ms", self.gesture.double_tap_ms)?;
        Ok(())
    }
}

fn check_timing(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if (TIMING_MIN_MS..=TIMING_MAX_MS).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::TimingOutOfRange { field, value })
    }
}

/// Config parse/validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    TimingOutOfRange { field: &'static str, value: u64 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid board config: {message}"),
            Self::TimingOutOfRange { field, value } => write!(
                f,
                "{field} must be within {TIMING_MIN_MS}..={TIMING_MAX_MS} ms, got {value}"
            ),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{BoardConfig, ConfigError};
    use crate::schedule::ResetPolicy;

    #[test]
    fn empty_object_yields_defaults() {
        let config = BoardConfig::from_json("{}").expect("defaults");
        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.gesture.long_press_ms, 500);
        assert_eq!(config.gesture.double_tap_ms, 300);
        assert_eq!(config.reset_policy, ResetPolicy::Rearm);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config =
            BoardConfig::from_json(r#"{"gesture":{"double_tap_ms":250},"reset_policy":"once"}"#)
                .expect("valid config");
        assert_eq!(config.gesture.double_tap_ms, 250);
        assert_eq!(config.gesture.long_press_ms, 500);
        assert_eq!(config.reset_policy, ResetPolicy::Once);
    }

    #[test]
    fn rejects_out_of_range_timing() {
        let err = BoardConfig::from_json(r#"{"gesture":{"long_press_ms":0}}"#).unwrap_err();
        assert_eq!(
            err,
            ConfigError::TimingOutOfRange {
                field: "long_press_ms",
                value: 0
            }
        );
    }

    #[test]
    fn rejects_malformed_json() {
        let err = BoardConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
