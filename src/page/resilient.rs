//! ResilientPage - retried page actions for page objects
//!
//! Every action runs under the page's [`ResilientExecutor`]. When the last
//! attempt fails a screenshot is captured (if enabled) and the step fails
//! with the last driver error, the attempt count and the screenshot path.
//! A failing screenshot never masks the original failure: it is logged and
//! dropped. Screenshot files are named
//! `<tag>-<action>-<timestamp>-<8 hex>.png` so two failures in the same
//! millisecond never share a file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use super::driver::{ElementState, Locator, Page, PageError};
use crate::clock::{self, Clock};
use crate::error::SteadyError;
use crate::logs::LogLevel;
use crate::resilience::{ExecutionResult, ResilientExecutor, RetryError};

fn screenshot_note(screenshot: &Option<PathBuf>) -> String {
    match screenshot {
        Some(path) => format!(" (screenshot: {})", path.display()),
        None => String::new(),
    }
}

/// A page step that did not succeed
#[derive(Debug, Error)]
pub enum StepError {
    #[error("{action} failed after {attempts} attempt(s): {error}{}", screenshot_note(.screenshot))]
    Failed {
        action: String,
        attempts: u32,
        error: PageError,
        screenshot: Option<PathBuf>,
    },

    #[error(transparent)]
    Infrastructure(#[from] SteadyError),
}

impl StepError {
    pub fn screenshot(&self) -> Option<&Path> {
        match self {
            Self::Failed { screenshot, .. } => screenshot.as_deref(),
            Self::Infrastructure(_) => None,
        }
    }

    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Failed { attempts, .. } => Some(*attempts),
            Self::Infrastructure(_) => None,
        }
    }
}

/// Page wrapper whose actions retry under a policy
pub struct ResilientPage<P> {
    page: P,
    executor: ResilientExecutor,
    timeout: Duration,
    screenshot_dir: Option<PathBuf>,
    clock: Arc<dyn Clock>,
}

impl<P: Page> ResilientPage<P> {
    pub fn new(page: P, executor: ResilientExecutor) -> Self {
        Self {
            page,
            executor,
            timeout: Duration::from_secs(5),
            screenshot_dir: None,
            clock: clock::system(),
        }
    }

    /// Per-attempt driver timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Capture a screenshot into `dir` when a step is exhausted
    pub fn with_screenshots(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = Some(dir.into());
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn executor(&self) -> &ResilientExecutor {
        &self.executor
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn goto(&self, url: &str) -> Result<(), StepError> {
        let result = self
            .executor
            .execute(|| async move { self.page.goto(url).await })
            .await;
        self.finish(format!("goto {}", url), result).await
    }

    /// Wait until visible, then click
    pub async fn click_with_retry(&self, locator: &Locator) -> Result<(), StepError> {
        let timeout = self.timeout;
        let result = self
            .executor
            .execute(|| async move {
                self.page
                    .wait_for(locator, ElementState::Visible, timeout)
                    .await?;
                self.page.click(locator, timeout).await
            })
            .await;
        self.finish(format!("click {}", locator), result).await
    }

    /// Wait until visible, then fill
    pub async fn fill_with_retry(&self, locator: &Locator, value: &str) -> Result<(), StepError> {
        let timeout = self.timeout;
        let result = self
            .executor
            .execute(|| async move {
                self.page
                    .wait_for(locator, ElementState::Visible, timeout)
                    .await?;
                self.page.fill(locator, value, timeout).await
            })
            .await;
        self.finish(format!("fill {}", locator), result).await
    }

    /// Poll until every field is visible and enabled
    pub async fn wait_for_form_ready(&self, fields: &[Locator]) -> Result<(), StepError> {
        let timeout = self.timeout;
        let result = self
            .executor
            .execute(|| async move {
                for field in fields {
                    self.page
                        .wait_for(field, ElementState::Visible, timeout)
                        .await?;
                    self.page
                        .wait_for(field, ElementState::Enabled, timeout)
                        .await?;
                }
                Ok::<(), PageError>(())
            })
            .await;
        self.finish(format!("form ready ({} fields)", fields.len()), result).await
    }

    /// Poll until the current URL contains `fragment`; returns the URL
    pub async fn wait_for_url(&self, fragment: &str) -> Result<String, StepError> {
        let result = self
            .executor
            .execute(|| async move {
                let url = self.page.current_url().await?;
                if url.contains(fragment) {
                    Ok(url)
                } else {
                    Err(PageError::UnexpectedUrl {
                        expected: fragment.to_string(),
                        actual: url,
                    })
                }
            })
            .await;
        self.finish(format!("wait for url '{}'", fragment), result).await
    }

    async fn finish<T>(
        &self,
        action: String,
        result: ExecutionResult<T, PageError>,
    ) -> Result<T, StepError> {
        match result {
            Ok(value) => Ok(value),
            Err(RetryError::Infrastructure(e)) => Err(e.into()),
            Err(RetryError::Exhausted {
                attempts,
                last_error,
            }) => {
                let screenshot = self.capture_failure(&action).await;
                Err(StepError::Failed {
                    action,
                    attempts,
                    error: last_error,
                    screenshot,
                })
            }
        }
    }

    async fn capture_failure(&self, action: &str) -> Option<PathBuf> {
        let dir = self.screenshot_dir.as_ref()?;
        let id = Uuid::new_v4().simple().to_string();
        let name = format!(
            "{}-{}-{}-{}.png",
            file_stem(self.executor.tag().unwrap_or("action")),
            file_stem(action),
            self.clock.now().format("%Y%m%dT%H%M%S%3f"),
            &id[..8]
        );
        let path = dir.join(name);

        let captured = match tokio::fs::create_dir_all(dir).await {
            Ok(()) => self.page.screenshot(&path).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let sink = self.executor.sink();
        let tag = self.executor.tag();
        match captured {
            Ok(()) => {
                sink.log(
                    LogLevel::Info,
                    format!("Saved failure screenshot for '{}': {}", action, path.display()),
                    None,
                    tag,
                );
                Some(path)
            }
            Err(reason) => {
                tracing::warn!(action, %reason, "Failure screenshot not captured");
                sink.log(
                    LogLevel::Warn,
                    format!("Could not capture screenshot for '{}': {}", action, reason),
                    None,
                    tag,
                );
                None
            }
        }
    }
}

/// Lowercase alphanumeric runs joined by single dashes
fn file_stem(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}
