//! Steady Configuration Module
//!
//! Retry, logging, export and browser settings for a suite run.
//! Config is stored in `~/.config/steady/config.toml`.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Environment variables (`STEADY_LOG_LEVEL`, `STEADY_MAX_ATTEMPTS`,
//!    `STEADY_EXPORT_DIR`, `STEADY_FATAL_EXPORT`, `STEADY_BASE_URL`)
//! 2. Config file (`~/.config/steady/config.toml`)
//! 3. Defaults

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SteadyError};
use crate::logs::LogLevel;
use crate::page::DEFAULT_BASE_URL;
use crate::resilience::RetryPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SteadyConfig {
    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub export: ExportSettings,

    #[serde(default)]
    pub browser: BrowserSettings,
}

/// Default retry policy for executors handed out by the harness
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 1000,
            backoff_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Minimum level kept by the log store
    pub level: LogLevel,
}

/// Teardown export of the log and data stores
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportSettings {
    pub enabled: bool,
    pub dir: PathBuf,
    /// Fail teardown when an export cannot be written
    pub fatal_on_failure: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("test-results"),
            fatal_on_failure: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrowserSettings {
    pub base_url: String,
    /// Per-attempt timeout for page actions
    pub action_timeout_ms: u64,
    pub screenshots_on_failure: bool,
    pub screenshot_dir: PathBuf,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            action_timeout_ms: 5000,
            screenshots_on_failure: true,
            screenshot_dir: PathBuf::from("test-results/screenshots"),
        }
    }
}

impl SteadyConfig {
    /// Get the config directory path
    ///
    /// Returns `~/.config/steady/` on Unix, `%APPDATA%/steady/` on Windows
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("steady")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from the default path
    ///
    /// Returns default config if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from an explicit file
    ///
    /// Unlike [`SteadyConfig::load`], a missing file is an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SteadyError::ConfigError {
            reason: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| SteadyError::ConfigError {
            reason: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;
        config.retry_policy()?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to `path`, creating its directory if needed
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| SteadyError::ConfigError {
                reason: format!("Failed to create config directory: {}", e),
            })?;
        }

        let content = self.to_toml()?;
        fs::write(path, content).map_err(|e| SteadyError::ConfigError {
            reason: format!("Failed to write config file: {}", e),
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SteadyError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
        })
    }

    /// Merge with environment variables
    ///
    /// Environment variables take precedence over config file values. Empty
    /// values are ignored; unparsable ones are errors.
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(level) = env_var("STEADY_LOG_LEVEL") {
            self.logging.level = level.parse()?;
        }

        if let Some(attempts) = env_var("STEADY_MAX_ATTEMPTS") {
            self.retry.max_attempts =
                attempts.parse().map_err(|_| SteadyError::ConfigError {
                    reason: format!("STEADY_MAX_ATTEMPTS must be a positive integer, got '{}'", attempts),
                })?;
        }

        if let Some(dir) = env_var("STEADY_EXPORT_DIR") {
            self.export.dir = PathBuf::from(dir);
        }

        if let Some(flag) = env_var("STEADY_FATAL_EXPORT") {
            self.export.fatal_on_failure = parse_flag("STEADY_FATAL_EXPORT", &flag)?;
        }

        if let Some(url) = env_var("STEADY_BASE_URL") {
            self.browser.base_url = url;
        }

        self.retry_policy()?;
        Ok(self)
    }

    /// Validated retry policy from the `[retry]` section
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        let policy = RetryPolicy::default()
            .with_max_attempts(self.retry.max_attempts)
            .with_base_delay(Duration::from_millis(self.retry.base_delay_ms))
            .with_max_delay(Duration::from_millis(self.retry.max_delay_ms))
            .with_backoff_multiplier(self.retry.backoff_multiplier);
        policy.validate()?;
        Ok(policy)
    }

    pub fn log_level(&self) -> LogLevel {
        self.logging.level
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.browser.action_timeout_ms)
    }

    /// Screenshot directory when failure screenshots are on
    pub fn screenshot_dir(&self) -> Option<&Path> {
        self.browser
            .screenshots_on_failure
            .then_some(self.browser.screenshot_dir.as_path())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SteadyError::ConfigError {
            reason: format!("{} must be true or false, got '{}'", name, value),
        }),
    }
}
