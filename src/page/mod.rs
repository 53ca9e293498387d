//! Page Module - resilient page objects over an external browser driver
//!
//! Key types:
//! - `Page`: async capability trait the suite implements over its driver
//! - `ResilientPage`: retried click/fill/wait actions with failure screenshots
//! - `LoginPage` / `Module`: OrangeHRM page objects

mod driver;
pub mod orangehrm;
mod resilient;

pub use driver::{ElementState, Locator, Page, PageError};
pub use orangehrm::{LoginPage, Module, DEFAULT_BASE_URL};
pub use resilient::{ResilientPage, StepError};
