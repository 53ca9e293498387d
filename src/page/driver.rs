//! Page - the browser capability set consumed by the suite
//!
//! The driver itself (element resolution, waiting, navigation, screenshots)
//! lives outside this crate; suites implement [`Page`] over it.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// How to find an element, described the way a user sees it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Role { role: String, name: Option<String> },
    Text(String),
    Label(String),
    Placeholder(String),
    Css(String),
}

impl Locator {
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: Some(name.into()),
        }
    }

    pub fn button(name: impl Into<String>) -> Self {
        Self::role("button", name)
    }

    pub fn link(name: impl Into<String>) -> Self {
        Self::role("link", name)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self::Label(label.into())
    }

    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::Placeholder(text.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role { role, name: Some(name) } => write!(f, "role={}[name=\"{}\"]", role, name),
            Self::Role { role, name: None } => write!(f, "role={}", role),
            Self::Text(t) => write!(f, "text=\"{}\"", t),
            Self::Label(l) => write!(f, "label=\"{}\"", l),
            Self::Placeholder(p) => write!(f, "placeholder=\"{}\"", p),
            Self::Css(s) => write!(f, "css={}", s),
        }
    }
}

/// Element state to wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementState {
    Attached,
    Visible,
    Hidden,
    Enabled,
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Attached => "attached",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Enabled => "enabled",
        })
    }
}

/// Failure reported by the driver for one action
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Timed out after {timeout_ms}ms waiting for {locator} to be {state}")]
    Timeout {
        locator: String,
        state: ElementState,
        timeout_ms: u64,
    },

    #[error("No element matches {locator}")]
    NotFound { locator: String },

    #[error("Expected URL containing '{expected}', got '{actual}'")]
    UnexpectedUrl { expected: String, actual: String },

    #[error("Driver error: {0}")]
    Driver(String),
}

/// Browser page as seen by page objects
#[async_trait]
pub trait Page: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), PageError>;

    async fn click(&self, locator: &Locator, timeout: Duration) -> Result<(), PageError>;

    async fn fill(&self, locator: &Locator, value: &str, timeout: Duration)
        -> Result<(), PageError>;

    async fn wait_for(
        &self,
        locator: &Locator,
        state: ElementState,
        timeout: Duration,
    ) -> Result<(), PageError>;

    async fn screenshot(&self, path: &Path) -> Result<(), PageError>;

    async fn current_url(&self) -> Result<String, PageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_display() {
        assert_eq!(Locator::button("Login").to_string(), "role=button[name=\"Login\"]");
        assert_eq!(
            Locator::Role {
                role: "navigation".into(),
                name: None
            }
            .to_string(),
            "role=navigation"
        );
        assert_eq!(Locator::placeholder("Username").to_string(), "placeholder=\"Username\"");
        assert_eq!(Locator::css(".oxd-alert").to_string(), "css=.oxd-alert");
    }

    #[test]
    fn timeout_error_message() {
        let err = PageError::Timeout {
            locator: Locator::label("Password").to_string(),
            state: ElementState::Visible,
            timeout_ms: 5000,
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 5000ms waiting for label=\"Password\" to be visible"
        );
    }
}
