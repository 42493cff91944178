use attendance_core::CoreConfig;
use clap::Parser;
use std::path::PathBuf;

/// Attendance report runner.
#[derive(Debug, Parser, Clone)]
#[clap(name = "attendance", version)]
pub struct Config {
    /// SQLite file backing state. Omit to run in memory.
    #[clap(long, env = "ATTENDANCE_DB_PATH")]
    pub db_path: Option<PathBuf>,

    #[clap(long, env = "ATTENDANCE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[clap(long, env = "ATTENDANCE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "ATTENDANCE_EMAIL", requires = "password")]
    pub email: Option<String>,

    #[clap(long, env = "ATTENDANCE_PASSWORD", requires = "email")]
    pub password: Option<String>,

    /// Semester id to report on. Defaults to the active semester.
    #[clap(long, env = "ATTENDANCE_SEMESTER")]
    pub semester: Option<String>,

    #[clap(long, env = "ATTENDANCE_THRESHOLD")]
    pub threshold: Option<f64>,
}

impl Config {
    pub fn core(&self) -> CoreConfig {
        let defaults = CoreConfig::default();
        CoreConfig {
            db_path: self.db_path.clone(),
            log_level: self.log_level.clone().unwrap_or(defaults.log_level),
            log_dir: self.log_dir.clone(),
            low_attendance_threshold: self
                .threshold
                .unwrap_or(defaults.low_attendance_threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use clap::Parser;

    #[test]
    fn unset_options_fall_back_to_core_defaults() {
        let config = Config::parse_from(["attendance"]);
        let core = config.core();
        assert!(core.db_path.is_none());
        assert_eq!(core.low_attendance_threshold, 75.0);
    }

    #[test]
    fn email_requires_password() {
        assert!(Config::try_parse_from(["attendance", "--email", "admin@college.edu"]).is_err());
        let config = Config::try_parse_from([
            "attendance",
            "--email",
            "admin@college.edu",
            "--password",
            "admin123",
            "--threshold",
            "60",
        ])
        .unwrap();
        assert_eq!(config.core().threshold(), 60.0);
    }
}
