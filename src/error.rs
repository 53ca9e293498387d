// The #[error] attribute from thiserror uses struct fields via string interpolation,
// but Rust's unused_assignments lint doesn't recognize this.
#![allow(unused_assignments)]

//! Steady Error Types with Error Codes
//!
//! Error code ranges:
//! - STEADY-000-009: Argument/policy errors
//! - STEADY-010-019: IO and export file errors
//! - STEADY-020-029: Configuration errors
//! - STEADY-030-039: Executor infrastructure errors
//!
//! Action failures are not `SteadyError`s: they stay typed as the action's own
//! error inside [`crate::resilience::RetryError`]. Validation failures are
//! reported as [`crate::store::Violation`] lists and never raised.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SteadyError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug, Diagnostic)]
pub enum SteadyError {
    // ═══════════════════════════════════════════
    // ARGUMENT / POLICY ERRORS (000-009)
    // ═══════════════════════════════════════════
    #[error("[STEADY-001] Invalid argument '{name}': {reason}")]
    #[diagnostic(code(steady::invalid_argument))]
    InvalidArgument { name: String, reason: String },

    #[error("[STEADY-002] Invalid retry policy: {reason}")]
    #[diagnostic(
        code(steady::invalid_policy),
        help("max_attempts >= 1, max_delay >= base_delay, backoff_multiplier >= 1")
    )]
    InvalidPolicy { reason: String },

    // ═══════════════════════════════════════════
    // IO / EXPORT ERRORS (010-019)
    // ═══════════════════════════════════════════
    #[error("[STEADY-010] IO error on '{}': {source}", path.display())]
    #[diagnostic(code(steady::io_error), help("Check file path and permissions"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[STEADY-011] JSON error: {0}")]
    #[diagnostic(code(steady::json_error))]
    Json(#[from] serde_json::Error),

    #[error("[STEADY-012] Invalid export file '{}': {reason}", path.display())]
    #[diagnostic(code(steady::invalid_export))]
    InvalidExport { path: PathBuf, reason: String },

    // ═══════════════════════════════════════════
    // CONFIG ERRORS (020-029)
    // ═══════════════════════════════════════════
    #[error("[STEADY-020] Config error: {reason}")]
    #[diagnostic(code(steady::config_error))]
    ConfigError { reason: String },

    #[error("[STEADY-021] Unknown log level '{level}'")]
    #[diagnostic(code(steady::invalid_level))]
    InvalidLevel { level: String },

    #[error("[STEADY-022] Unknown record kind '{kind}'")]
    #[diagnostic(code(steady::unknown_kind))]
    UnknownKind { kind: String },

    // ═══════════════════════════════════════════
    // EXECUTOR INFRASTRUCTURE (030-039)
    // ═══════════════════════════════════════════
    #[error("[STEADY-030] Sleep between attempts failed: {reason}")]
    #[diagnostic(code(steady::sleep_failed))]
    SleepFailed { reason: String },
}

impl SteadyError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Get the error code (e.g., "STEADY-001")
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "STEADY-001",
            Self::InvalidPolicy { .. } => "STEADY-002",
            Self::Io { .. } => "STEADY-010",
            Self::Json(_) => "STEADY-011",
            Self::InvalidExport { .. } => "STEADY-012",
            Self::ConfigError { .. } => "STEADY-020",
            Self::InvalidLevel { .. } => "STEADY-021",
            Self::UnknownKind { .. } => "STEADY-022",
            Self::SleepFailed { .. } => "STEADY-030",
        }
    }
}

impl FixSuggestion for SteadyError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            SteadyError::InvalidArgument { .. } => None,
            SteadyError::InvalidPolicy { .. } => Some(
                "Use max_attempts >= 1, max_delay >= base_delay and backoff_multiplier >= 1",
            ),
            SteadyError::Io { .. } => Some("Check file path and permissions"),
            SteadyError::Json(_) => Some("Check JSON syntax"),
            SteadyError::InvalidExport { .. } => {
                Some("Pass a file written by a log or data store export")
            }
            SteadyError::ConfigError { .. } => Some("Check ~/.config/steady/config.toml"),
            SteadyError::InvalidLevel { .. } => Some("Use one of: debug, info, warn, error"),
            SteadyError::UnknownKind { .. } => {
                Some("Use one of: user, employee, leave, performance, admin, custom")
            }
            SteadyError::SleepFailed { .. } => None,
        }
    }
}
