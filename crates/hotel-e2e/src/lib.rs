//! hotel-e2e: behaviour-driven browser tests for the App Runner Hotel
//!
//! Gherkin scenarios are bound to async step handlers that drive a browser
//! through page objects for the homepage, the room list and the add-room
//! form. Every scenario runs in a fresh browser session.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ .feature     │──►│ Scenario     │──►│ Step         │──►│ Page         │
//! │ files        │   │ Runner       │   │ Registry     │   │ Objects      │
//! └──────────────┘   └──────┬───────┘   └──────────────┘   └──────┬───────┘
//!                           │ one session per scenario            │ waits
//!                           ▼                                     ▼
//!                    ┌──────────────┐                      ┌──────────────┐
//!                    │ Session      │─────────────────────►│ Driver       │
//!                    │ Factory      │                      │ (CDP / mock) │
//!                    └──────────────┘                      └──────────────┘
//! ```

#![warn(missing_docs)]

mod assertion;
#[cfg(feature = "browser")]
mod browser;
mod config;
mod driver;
mod locator;
mod result;
mod session;

/// Feature file discovery and parsing
pub mod feature;
/// Per-scenario session lifecycle
pub mod fixture;
/// Scriptable in-memory driver
pub mod mock;
/// Page object trait
pub mod page_object;
/// Hotel page objects
pub mod pages;
/// Scenario and step results
pub mod reporter;
/// Scenario execution
pub mod runner;
/// Step patterns, bindings and the hotel step library
pub mod steps;
/// Explicit waits
pub mod wait;

pub use assertion::{Assertion, AssertionResult};
#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use config::{
    cdp_endpoint, BrowserProfile, DriverTarget, SessionConfig, Viewport, BASE_URL_ENV, CHROMIUM_PATH_ENV,
    DEFAULT_IMPLICIT_WAIT_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_VIEWPORT_HEIGHT,
    DEFAULT_VIEWPORT_WIDTH, GRID_URL_ENV, HEADED_ENV,
};
pub use driver::{Driver, Element, ElementState};
pub use fixture::{
    scoped, with_session, ChromiumSessions, DriverFactory, SessionFactory, SessionOutcome,
};
pub use locator::{By, Locator};
pub use reporter::{render_text, RunSummary, ScenarioResult, StepResult, StepStatus};
pub use result::{E2eError, E2eResult, FailureKind};
pub use runner::{ScenarioRunner, StepIssue};
pub use session::Session;
pub use steps::{hotel_steps, StepArgs, StepKind, StepRegistry};

/// Prelude for writing steps and running scenarios
pub mod prelude {
    pub use super::feature::{load_features, parse_file, parse_str, ScenarioSpec, StepSpec};
    pub use super::mock::MockDriver;
    pub use super::page_object::PageObject;
    pub use super::pages::*;
    pub use super::wait::{Condition, Satisfied, WaitOptions, Waiter};
    pub use super::*;
}
