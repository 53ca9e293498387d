//! Harness - the run context of one suite run
//!
//! Owns the run's [`LogStore`] and [`DataStore`] and hands out executors and
//! resilient pages wired to them. Open it once at suite start, share it
//! through `Arc` or by reference, and [`Harness::close`] it at teardown to
//! export both stores and clear them.
//!
//! Export failures at teardown are logged and skipped unless
//! `export.fatal_on_failure` is set.

use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use crate::clock::{self, Clock};
use crate::config::SteadyConfig;
use crate::error::Result;
use crate::logs::LogStore;
use crate::page::{Page, ResilientPage};
use crate::resilience::{ResilientExecutor, RetryPolicy, Sleeper, TokioSleeper};
use crate::store::DataStore;

/// An export that could not be written at teardown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of [`Harness::export_artifacts`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<ExportFailure>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Harness {
    run_id: String,
    config: SteadyConfig,
    policy: RetryPolicy,
    logs: Arc<LogStore>,
    data: Arc<DataStore>,
    clock: Arc<dyn Clock>,
}

impl Harness {
    pub fn open(config: SteadyConfig) -> Result<Self> {
        Self::open_with_clock(config, clock::system())
    }

    /// Open with an injected clock shared by both stores
    pub fn open_with_clock(config: SteadyConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let policy = config.retry_policy()?;
        let logs = Arc::new(LogStore::with_clock(clock.clone()));
        logs.set_level(config.log_level());
        let data = Arc::new(DataStore::with_clock(clock.clone()));
        let run_id = Uuid::new_v4().to_string();

        tracing::debug!(%run_id, level = %config.log_level(), "Harness opened");
        Ok(Self {
            run_id,
            config,
            policy,
            logs,
            data,
            clock,
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn config(&self) -> &SteadyConfig {
        &self.config
    }

    pub fn logs(&self) -> Arc<LogStore> {
        self.logs.clone()
    }

    pub fn data(&self) -> Arc<DataStore> {
        self.data.clone()
    }

    /// Executor with the configured policy, logging under `tag`
    pub fn executor(&self, tag: impl Into<String>) -> ResilientExecutor {
        self.executor_with_sleeper(tag, Arc::new(TokioSleeper))
    }

    pub fn executor_with_sleeper(
        &self,
        tag: impl Into<String>,
        sleeper: Arc<dyn Sleeper>,
    ) -> ResilientExecutor {
        ResilientExecutor::from_validated(self.policy.clone())
            .with_sleeper(sleeper)
            .with_log(self.logs.clone())
            .with_tag(tag)
    }

    /// Wrap `page` with the configured timeout and screenshot directory
    pub fn page<P: Page>(&self, page: P, tag: impl Into<String>) -> ResilientPage<P> {
        self.page_with_executor(page, self.executor(tag))
    }

    pub fn page_with_executor<P: Page>(
        &self,
        page: P,
        executor: ResilientExecutor,
    ) -> ResilientPage<P> {
        let resilient = ResilientPage::new(page, executor)
            .with_timeout(self.config.action_timeout())
            .with_clock(self.clock.clone());
        match self.config.screenshot_dir() {
            Some(dir) => resilient.with_screenshots(dir),
            None => resilient,
        }
    }

    /// Write `logs-<run_id>.json` and `data-<run_id>.json` to the export dir
    pub fn export_artifacts(&self) -> Result<TeardownReport> {
        let dir = &self.config.export.dir;
        let mut report = TeardownReport::default();

        let logs_path = dir.join(format!("logs-{}.json", self.run_id));
        let logs_result = self.logs.export(&logs_path);
        self.record(&mut report, logs_path, logs_result)?;

        let data_path = dir.join(format!("data-{}.json", self.run_id));
        let data_result = self.data.export(&data_path);
        self.record(&mut report, data_path, data_result)?;

        Ok(report)
    }

    fn record(
        &self,
        report: &mut TeardownReport,
        path: PathBuf,
        result: Result<PathBuf>,
    ) -> Result<()> {
        match result {
            Ok(written) => {
                report.written.push(written);
                Ok(())
            }
            Err(e) if self.config.export.fatal_on_failure => Err(e),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Export failed, continuing");
                self.logs.warn(format!("Export to {} failed: {}", path.display(), e), None);
                report.failures.push(ExportFailure {
                    path,
                    error: e.to_string(),
                });
                Ok(())
            }
        }
    }

    /// Export (when enabled), then clear both stores
    ///
    /// The stores are cleared even when a fatal export error is returned.
    pub fn close(self) -> Result<TeardownReport> {
        let result = if self.config.export.enabled {
            self.export_artifacts()
        } else {
            Ok(TeardownReport::default())
        };

        self.logs.clear();
        self.data.clear();
        tracing::debug!(run_id = %self.run_id, "Harness closed");
        result
    }
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("run_id", &self.run_id)
            .field("logs", &self.logs)
            .field("data", &self.data)
            .finish()
    }
}
