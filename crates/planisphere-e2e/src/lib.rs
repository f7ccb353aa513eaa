//! planisphere-e2e: page-object end-to-end suite for the HOTEL PLANISPHERE
//! reservation site
//!
//! The suite drives the site through Playwright (via `playwright-rs`) behind
//! the [`BrowserTab`] trait. Page objects wrap one screen each, flows chain
//! them into reservations, and data-driven tables describe the login,
//! validation and reservation cases. Results are written as Allure 2 files.
//!
//! # Examples
//!
//! ## Run a reservation
//!
//! ```ignore
//! use planisphere_e2e::{
//!     CaseMeta, ReservationFlowOptions, Session, SuiteConfig, execute_reservation_flow,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     planisphere_e2e::init_tracing(std::io::stderr);
//!     let config = SuiteConfig::from_env()?;
//!     let session = Session::launch(&config).await?;
//!     let settings = session.settings().clone();
//!
//!     session
//!         .run_case("予約フロー", &CaseMeta::new().feature("宿泊予約"), |tab, report| {
//!             Box::pin(async move {
//!                 let options = ReservationFlowOptions::default();
//!                 let result = execute_reservation_flow(tab, &settings, &options, report).await;
//!                 assert!(result.success, "{:?}", result.error_message);
//!                 Ok::<(), planisphere_e2e::Error>(())
//!             })
//!         })
//!         .await?;
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Validation cases
//!
//! ```ignore
//! use planisphere_e2e::{VALIDATION_TEST_CASES, open_reservation_page, run_validation_case};
//!
//! for case in VALIDATION_TEST_CASES {
//!     let meta = CaseMeta::new()
//!         .severity(case.severity)
//!         .issue(case.issue_id)
//!         .tags(case.tags.iter().copied());
//!     session
//!         .run_case(case.name, &meta, |tab, report| {
//!             Box::pin(async move {
//!                 let page = open_reservation_page(tab, &settings).await?;
//!                 run_validation_case(&page, case, report).await
//!             })
//!         })
//!         .await?;
//! }
//! ```
//!
//! # Waiting
//!
//! The site renders some text after its element appears, and the reserve
//! form only toggles `display` on inline errors. Reads therefore go through
//! [`retry::read_until_non_empty`], and submit waits race an error being
//! displayed against the confirm page loading ([`wait::first_of`]).

pub mod config;
pub mod driver;
pub mod error;
pub mod fixtures;
pub mod flows;
pub mod pages;
pub mod perf;
pub mod report;
pub mod retry;
pub mod session;
pub mod visual;
pub mod wait;

pub use config::{PerformanceThresholds, SiteSettings, SuiteConfig, Timeouts};
pub use driver::{AriaRole, BrowserTab, PlaywrightTab, Selector, TabHandle};
pub use error::{Error, Result};
pub use fixtures::{
    COMPLETION_MESSAGE, DEFAULT_RESERVATION, EXPECTED_ERROR_MESSAGES, LOGIN_TEST_CASES,
    MAIN_PAGES, NAVIGATION_ACTIONS, RESERVATION_TEST_CASES, VALIDATION_CONSTANTS,
    VALIDATION_TEST_CASES,
};
pub use flows::{
    ReservationFlowOptions, ReservationFlowResult, ReservationStep, execute_reservation_flow,
    open_reservation_page, run_login_case, run_validation_case,
};
pub use pages::{
    BasePage, ConfirmPage, IndexPage, LoginPage, NavTarget, PlansPage, ReservePage,
};
pub use perf::PerformanceMetrics;
pub use report::{AllureReport, CaseMeta, ContentType, MemoryReport, ReportSink, Severity, Status};
pub use retry::RetryPolicy;
pub use session::{Session, init_test_tracing, init_tracing};
pub use visual::{SnapshotOutcome, capture_snapshot};
pub use wait::FirstSignal;
