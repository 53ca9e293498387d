//! Steady - resilient actions, run logs and test data for browser e2e suites
//!
//! ## Module Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         RUN CONTEXT                          │
//! │  harness/    Harness (stores, executors, pages, teardown)    │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      APPLICATION LAYER                       │
//! │  page/       ResilientPage, Page trait, OrangeHRM objects    │
//! │  resilience/ RetryPolicy, ResilientExecutor, Sleeper         │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    INFRASTRUCTURE LAYER                      │
//! │  logs/       Structured log store (LogStore, LogEntry)       │
//! │  store/      Keyed data store, generation, validation        │
//! │  clock/      Injectable wall clock                           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`harness`] | Explicit run lifecycle: open, hand out executors, export + clear |
//! | [`page`] | Retried click/fill/wait over an external browser driver |
//! | [`resilience`] | Bounded retry with deterministic exponential backoff |
//! | [`logs`] | Leveled, tagged, queryable, exportable run log |
//! | [`store`] | Key → JSON store, record generators, schema checks |
//! | [`clock`] | `SystemClock` / `FixedClock` |
//! | [`config`] | TOML config + env overrides |
//! | [`error`] | Error types with codes and fix suggestions |

// ═══════════════════════════════════════════════════════════════
// RUN CONTEXT
// ═══════════════════════════════════════════════════════════════
pub mod harness;

// ═══════════════════════════════════════════════════════════════
// APPLICATION LAYER
// ═══════════════════════════════════════════════════════════════
pub mod page;
pub mod resilience;

// ═══════════════════════════════════════════════════════════════
// INFRASTRUCTURE LAYER
// ═══════════════════════════════════════════════════════════════
pub mod clock;
pub mod logs;
pub mod store;

// ═══════════════════════════════════════════════════════════════
// CROSS-CUTTING - Error handling, configuration
// ═══════════════════════════════════════════════════════════════
pub mod config;
pub mod error;

// ═══════════════════════════════════════════════════════════════
// PUBLIC API RE-EXPORTS
// ═══════════════════════════════════════════════════════════════

pub use error::{FixSuggestion, Result, SteadyError};

pub use config::SteadyConfig;

pub use harness::{ExportFailure, Harness, TeardownReport};

pub use resilience::{
    ExecutionResult, RecordingSleeper, ResilientExecutor, RetryError, RetryPolicy, Sleeper,
    TokioSleeper,
};

pub use logs::{LogEntry, LogExport, LogFilter, LogLevel, LogSink, LogStore, LogSummary};

pub use store::{DataExport, DataStore, GenerateOptions, RecordKind, Schema, Violation};

pub use page::{ElementState, Locator, Page, PageError, ResilientPage, StepError};

pub use clock::{Clock, FixedClock, SystemClock};
