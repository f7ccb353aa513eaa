// Suite configuration
//
// Values come from environment variables so CI can point the suite at a
// different deployment or relax thresholds without a rebuild.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Default deployment of the site under test.
pub const DEFAULT_BASE_URL: &str = "https://hotel.testplanisphere.dev";

/// Default per-test timeout (30 seconds).
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounded waits used by page objects and flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Network-idle wait after navigation-triggering actions
    pub load: Duration,
    /// Element visibility waits
    pub visible: Duration,
    /// URL assertions
    pub url: Duration,
    /// Waiting for the confirm page after a valid submit
    pub navigation: Duration,
    /// Each branch of the submit-and-validate race
    pub validation_race: Duration,
    /// Settle delay after the validation race
    pub settle: Duration,
    /// Plan card lookup and new-tab delivery
    pub plan_selection: Duration,
    /// Polling interval of every wait loop
    pub poll: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            load: Duration::from_secs(30),
            visible: Duration::from_secs(5),
            url: Duration::from_secs(5),
            navigation: Duration::from_secs(10),
            validation_race: Duration::from_secs(3),
            settle: Duration::from_millis(100),
            plan_selection: Duration::from_secs(5),
            poll: Duration::from_millis(100),
        }
    }
}

/// Stopwatch thresholds for the performance checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceThresholds {
    pub page_load: Duration,
    pub navigation: Duration,
    pub form_submit: Duration,
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            page_load: Duration::from_millis(3000),
            navigation: Duration::from_millis(2000),
            form_submit: Duration::from_millis(2500),
        }
    }
}

/// Everything a page object needs to know about the site.
#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub base_url: Url,
    pub timeouts: Timeouts,
    /// Where diagnostic screenshots land; `None` disables them
    pub artifacts_dir: Option<PathBuf>,
}

impl SiteSettings {
    /// Settings for `base_url` with default timeouts and no artifacts dir.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeouts: Timeouts::default(),
            artifacts_dir: None,
        }
    }

    /// Joins a site path such as `/ja/login` onto the base URL.
    pub fn url_for(&self, path: &str) -> Result<String> {
        self.base_url
            .join(path)
            .map(String::from)
            .map_err(|e| Error::Config(format!("cannot join '{}' onto base URL: {}", path, e)))
    }
}

/// Full suite configuration.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    pub site: SiteSettings,
    pub headless: bool,
    pub test_timeout: Duration,
    pub allure_results_dir: PathBuf,
    pub thresholds: PerformanceThresholds,
}

impl SuiteConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `HOTEL_BASE_URL` | `https://hotel.testplanisphere.dev` |
    /// | `HOTEL_HEADLESS` | `true` |
    /// | `HOTEL_TEST_TIMEOUT_MS` | `30000` |
    /// | `ALLURE_RESULTS_DIR` | `allure-results` |
    /// | `HOTEL_ARTIFACTS_DIR` | unset (no diagnostic screenshots on disk) |
    /// | `PERF_THRESHOLD_PAGE_LOAD` | `3000` |
    /// | `PERF_THRESHOLD_NAVIGATION` | `2000` |
    /// | `PERF_THRESHOLD_FORM_SUBMIT` | `2500` |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("HOTEL_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&raw_url)
            .map_err(|e| Error::Config(format!("HOTEL_BASE_URL '{}': {}", raw_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "HOTEL_BASE_URL '{}' cannot be used as a base URL",
                raw_url
            )));
        }

        let headless = match lookup("HOTEL_HEADLESS") {
            Some(value) => parse_bool("HOTEL_HEADLESS", &value)?,
            None => true,
        };

        let test_timeout = millis_or(&lookup, "HOTEL_TEST_TIMEOUT_MS", DEFAULT_TEST_TIMEOUT)?;

        let defaults = PerformanceThresholds::default();
        let thresholds = PerformanceThresholds {
            page_load: millis_or(&lookup, "PERF_THRESHOLD_PAGE_LOAD", defaults.page_load)?,
            navigation: millis_or(&lookup, "PERF_THRESHOLD_NAVIGATION", defaults.navigation)?,
            form_submit: millis_or(&lookup, "PERF_THRESHOLD_FORM_SUBMIT", defaults.form_submit)?,
        };

        let allure_results_dir = lookup("ALLURE_RESULTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("allure-results"));

        let mut site = SiteSettings::new(base_url);
        site.artifacts_dir = lookup("HOTEL_ARTIFACTS_DIR").map(PathBuf::from);

        Ok(Self {
            site,
            headless,
            test_timeout,
            allure_results_dir,
            thresholds,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!("{} must be a boolean, got '{}'", key, other))),
    }
}

fn millis_or<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| Error::Config(format!("{} must be milliseconds, got '{}': {}", key, value, e))),
        None => Ok(default),
    }
}
