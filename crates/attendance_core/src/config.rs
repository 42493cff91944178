//! Core configuration.
//!
//! # Invariants
//! - Every field has a default, so a partial config always deserializes.
//! - `low_attendance_threshold` is a percentage in `0..=100`.

use crate::logging::default_log_level;
use crate::service::metrics::LOW_ATTENDANCE_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite file for durable state. `None` keeps state in memory.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logs.
    pub log_dir: Option<PathBuf>,
    pub low_attendance_threshold: f64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            low_attendance_threshold: LOW_ATTENDANCE_THRESHOLD,
        }
    }
}

impl CoreConfig {
    /// Returns the threshold clamped into `0..=100`.
    pub fn threshold(&self) -> f64 {
        if self.low_attendance_threshold.is_nan() {
            return LOW_ATTENDANCE_THRESHOLD;
        }
        self.low_attendance_threshold.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::CoreConfig;

    #[test]
    fn partial_config_fills_defaults() {
        let config: CoreConfig = serde_json::from_str(r#"{"db_path":"/tmp/a.db"}"#).unwrap();
        assert_eq!(config.low_attendance_threshold, 75.0);
        assert!(config.log_dir.is_none());
        assert_eq!(config.db_path.unwrap().to_str(), Some("/tmp/a.db"));
    }

    #[test]
    fn threshold_is_clamped() {
        let config = CoreConfig {
            low_attendance_threshold: 140.0,
            ..CoreConfig::default()
        };
        assert_eq!(config.threshold(), 100.0);
    }
}
