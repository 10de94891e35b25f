//! Dashboard configuration loaded from a JSON file, with environment overrides.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use xdr_core::error::AppError;
use xdr_core::stats::DEFAULT_OVERVIEW_WINDOW;

use crate::shell::ViewKind;

pub const ENV_DB_PATH: &str = "XDR_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "XDR_LOG_LEVEL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`. `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardConfig {
    /// SQLite workspace holding alerts, incidents and rules.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// How many recent alerts the overview summarizes.
    #[serde(default = "default_overview_window")]
    pub overview_window: u32,

    #[serde(default)]
    pub default_view: ViewKind,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("xdr.sqlite")
}

fn default_overview_window() -> u32 {
    DEFAULT_OVERVIEW_WINDOW
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            overview_window: default_overview_window(),
            default_view: ViewKind::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::new("CONFIG_READ_FAILED", "Failed to read config file")
                .with_details(format!("path={}; err={e}", path.display()))
        })?;
        Self::from_json_str(&contents).map_err(|e| {
            let details = format!("path={}; {}", path.display(), e.details.unwrap_or_default());
            AppError::new(e.code, e.message).with_details(details)
        })
    }

    pub fn from_json_str(contents: &str) -> Result<Self, AppError> {
        let config: Self = serde_json::from_str(contents).map_err(|e| {
            AppError::new("CONFIG_PARSE_FAILED", "Failed to parse config")
                .with_details(e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `XDR_DB_PATH` and `XDR_LOG_LEVEL` from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, AppError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        if let Some(path) = lookup(ENV_DB_PATH).filter(|v| !v.is_empty()) {
            self.db_path = PathBuf::from(path);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.is_empty()) {
            self.logging.level = level;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.overview_window == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "overview_window must be at least 1",
            ));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::new("CONFIG_INVALID", "db_path is empty"));
        }
        tracing::Level::from_str(&self.logging.level).map_err(|e| {
            AppError::new("CONFIG_INVALID", "Unknown log level")
                .with_details(format!("level={}; err={e}", self.logging.level))
        })?;
        Ok(())
    }
}
