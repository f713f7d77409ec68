//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{LlvError, Result};
use crate::core::paths;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "LLV_CONFIG";

/// Full configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub aws: AwsConfig,
    pub dashboard: DashboardConfig,
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
}

/// How the production backend reaches the cloud APIs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AwsConfig {
    /// Name or path of the AWS command-line client.
    pub binary: String,
    /// Named credentials profile, passed as `--profile`.
    pub profile: Option<String>,
    /// Region override, passed as `--region`.
    pub region: Option<String>,
    /// Upper bound for any single backend call.
    pub call_timeout_ms: u64,
    /// Log group name prefix; the function name is appended.
    pub log_group_prefix: String,
}

/// Dashboard layout and navigation knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    pub page_step: usize,
    pub line_step: usize,
    /// Width of the entity list column.
    pub side_width: u16,
    /// Height of the metadata panel.
    pub metadata_rows: u16,
    pub utc_timestamps: bool,
    /// Input poll / redraw interval.
    pub tick_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub activity_log: PathBuf,
}

/// Activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            binary: "aws".to_string(),
            profile: None,
            region: None,
            call_timeout_ms: 15_000,
            log_group_prefix: "/aws/lambda/".to_string(),
        }
    }
}

impl AwsConfig {
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_step: 5,
            line_step: 1,
            side_width: 30,
            metadata_rows: 10,
            utc_timestamps: false,
            tick_ms: 250,
        }
    }
}

impl DashboardConfig {
    #[must_use]
    pub const fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_file: paths::default_config_file(),
            activity_log: paths::default_activity_log(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size_bytes: 10 * 1024 * 1024, // 10 MiB
            max_rotated_files: 3,
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        paths::default_config_file()
    }

    /// Load config from `$LLV_CONFIG` or the default path.
    pub fn load_from_env() -> Result<Self> {
        let explicit = env_var(CONFIG_ENV_VAR).map(PathBuf::from);
        Self::load(explicit.as_deref())
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, env_var)
    }

    fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| LlvError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(LlvError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(lookup)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("LLV_AWS_BINARY") {
            self.aws.binary = raw;
        }
        if let Some(raw) = lookup("LLV_AWS_PROFILE") {
            self.aws.profile = Some(raw);
        }
        if let Some(raw) = lookup("LLV_AWS_REGION") {
            self.aws.region = Some(raw);
        }
        if let Some(raw) = lookup("LLV_AWS_CALL_TIMEOUT_MS") {
            self.aws.call_timeout_ms = parse_env("LLV_AWS_CALL_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = lookup("LLV_DASHBOARD_PAGE_STEP") {
            self.dashboard.page_step = parse_env("LLV_DASHBOARD_PAGE_STEP", &raw)?;
        }
        if let Some(raw) = lookup("LLV_DASHBOARD_UTC_TIMESTAMPS") {
            self.dashboard.utc_timestamps = parse_env("LLV_DASHBOARD_UTC_TIMESTAMPS", &raw)?;
        }
        if let Some(raw) = lookup("LLV_ACTIVITY_LOG") {
            self.paths.activity_log = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("LLV_LOGGING_ENABLED") {
            self.logging.enabled = parse_env("LLV_LOGGING_ENABLED", &raw)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.aws.binary.trim().is_empty() {
            return Err(LlvError::InvalidConfig {
                details: "aws.binary must not be empty".to_string(),
            });
        }
        if self.aws.call_timeout_ms == 0 {
            return Err(LlvError::InvalidConfig {
                details: "aws.call_timeout_ms must be > 0".to_string(),
            });
        }
        if self.dashboard.line_step == 0 {
            return Err(LlvError::InvalidConfig {
                details: "dashboard.line_step must be > 0".to_string(),
            });
        }
        if self.dashboard.page_step <= self.dashboard.line_step {
            return Err(LlvError::InvalidConfig {
                details: format!(
                    "dashboard.page_step ({}) must be greater than dashboard.line_step ({})",
                    self.dashboard.page_step, self.dashboard.line_step
                ),
            });
        }
        if self.dashboard.side_width < 8 {
            return Err(LlvError::InvalidConfig {
                details: "dashboard.side_width must be >= 8".to_string(),
            });
        }
        if self.dashboard.metadata_rows < 3 {
            return Err(LlvError::InvalidConfig {
                details: "dashboard.metadata_rows must be >= 3".to_string(),
            });
        }
        if self.dashboard.tick_ms == 0 {
            return Err(LlvError::InvalidConfig {
                details: "dashboard.tick_ms must be > 0".to_string(),
            });
        }
        if self.logging.max_size_bytes == 0 {
            return Err(LlvError::InvalidConfig {
                details: "logging.max_size_bytes must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|error| LlvError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
