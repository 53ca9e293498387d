//! Page objects for the OrangeHRM demo application
//!
//! Login, password reset and side-menu navigation, all built on
//! [`ResilientPage`] so every step retries and leaves a screenshot behind
//! when it finally fails.

use std::fmt;

use super::driver::{Locator, Page};
use super::resilient::{ResilientPage, StepError};

pub const DEFAULT_BASE_URL: &str = "https://opensource-demo.orangehrmlive.com";

const LOGIN_PATH: &str = "/web/index.php/auth/login";

/// Side-menu modules reachable after login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Module {
    Admin,
    Pim,
    Leave,
    Time,
    Recruitment,
    MyInfo,
    Performance,
    Dashboard,
}

impl Module {
    pub const ALL: [Module; 8] = [
        Self::Admin,
        Self::Pim,
        Self::Leave,
        Self::Time,
        Self::Recruitment,
        Self::MyInfo,
        Self::Performance,
        Self::Dashboard,
    ];

    /// Link text in the side menu
    pub fn menu_label(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Pim => "PIM",
            Self::Leave => "Leave",
            Self::Time => "Time",
            Self::Recruitment => "Recruitment",
            Self::MyInfo => "My Info",
            Self::Performance => "Performance",
            Self::Dashboard => "Dashboard",
        }
    }

    /// Path segment the module's landing URL contains
    pub fn url_fragment(&self) -> &'static str {
        match self {
            Self::Admin => "/admin/",
            Self::Pim => "/pim/",
            Self::Leave => "/leave/",
            Self::Time => "/time/",
            Self::Recruitment => "/recruitment/",
            Self::MyInfo => "/pim/viewPersonalDetails",
            Self::Performance => "/performance/",
            Self::Dashboard => "/dashboard/",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.menu_label())
    }
}

/// Login screen plus the flows that start from it
pub struct LoginPage<'a, P> {
    page: &'a ResilientPage<P>,
    base_url: String,
}

impl<P> LoginPage<'_, P> {
    pub fn username_field() -> Locator {
        Locator::placeholder("Username")
    }

    pub fn password_field() -> Locator {
        Locator::placeholder("Password")
    }

    pub fn login_button() -> Locator {
        Locator::button("Login")
    }

    pub fn forgot_password_link() -> Locator {
        Locator::text("Forgot your password?")
    }
}

impl<'a, P: Page> LoginPage<'a, P> {
    pub fn new(page: &'a ResilientPage<P>, base_url: impl Into<String>) -> Self {
        Self {
            page,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, LOGIN_PATH)
    }

    /// Navigate to the login screen and wait for the form
    pub async fn open(&self) -> Result<(), StepError> {
        self.page.goto(&self.url()).await?;
        self.page
            .wait_for_form_ready(&[Self::username_field(), Self::password_field()])
            .await
    }

    /// Fill and submit the form, then wait for the dashboard
    pub async fn login(&self, username: &str, password: &str) -> Result<(), StepError> {
        self.submit_credentials(username, password).await?;
        self.page
            .wait_for_url(Module::Dashboard.url_fragment())
            .await
            .map(|_| ())
    }

    /// Fill and submit the form without waiting for the outcome
    pub async fn submit_credentials(&self, username: &str, password: &str) -> Result<(), StepError> {
        self.page
            .fill_with_retry(&Self::username_field(), username)
            .await?;
        self.page
            .fill_with_retry(&Self::password_field(), password)
            .await?;
        self.page.click_with_retry(&Self::login_button()).await
    }

    /// Forgot-password flow up to the confirmation page
    pub async fn request_password_reset(&self, username: &str) -> Result<(), StepError> {
        self.page
            .click_with_retry(&Self::forgot_password_link())
            .await?;
        self.page.wait_for_url("/auth/requestPasswordResetCode").await?;
        self.page
            .fill_with_retry(&Self::username_field(), username)
            .await?;
        self.page
            .click_with_retry(&Locator::button("Reset Password"))
            .await?;
        self.page
            .wait_for_url("/auth/sendPasswordReset")
            .await
            .map(|_| ())
    }

    /// Click a side-menu entry and wait for its landing page
    pub async fn navigate_to(&self, module: Module) -> Result<String, StepError> {
        self.page
            .click_with_retry(&Locator::link(module.menu_label()))
            .await?;
        self.page.wait_for_url(module.url_fragment()).await
    }
}
