// Browser session and per-case hook
//
// One `Session` per test binary: it owns the Playwright server and the
// Chromium instance. Every case gets a fresh context and tab, its own
// Allure result, and a screenshot attached when it fails.

use futures_util::future::BoxFuture;
use playwright_rs::{Browser, BrowserContext, LaunchOptions, Playwright};
use tracing_subscriber::fmt::TestWriter;
use tracing_subscriber::fmt::writer::MakeWriter;

use crate::config::{SiteSettings, SuiteConfig};
use crate::driver::TabHandle;
use crate::driver::playwright::PlaywrightTab;
use crate::error::{Error, Result};
use crate::report::{AllureReport, CaseMeta, ContentType, ReportSink};

/// Installs a global `tracing` subscriber filtered by `RUST_LOG` that
/// writes to `writer`.
///
/// Returns `false` when a subscriber was already installed; the existing one
/// is kept.
pub fn init_tracing<W>(writer: W) -> bool
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .try_init()
        .is_ok()
}

/// Test-harness initializer: logs go through libtest's captured output, so
/// they show only for failing tests (or with `--nocapture`).
pub fn init_test_tracing() {
    init_tracing(TestWriter::new);
}

/// A tab in its own browser context.
pub struct CaseTab {
    pub tab: TabHandle,
    context: BrowserContext,
}

impl CaseTab {
    /// Closes the context and every tab opened from it.
    pub async fn close(self) -> Result<()> {
        self.context.close().await?;
        Ok(())
    }
}

pub struct Session {
    config: SuiteConfig,
    // Keeps the driver process alive for the browser's lifetime.
    _playwright: Playwright,
    browser: Browser,
}

impl Session {
    /// Starts Playwright and launches Chromium.
    pub async fn launch(config: &SuiteConfig) -> Result<Self> {
        let playwright = Playwright::launch()
            .await
            .map_err(|e| Error::from(e).context("starting Playwright"))?;
        let options = LaunchOptions::new().headless(config.headless);
        let browser = playwright
            .chromium()
            .launch_with_options(options)
            .await
            .map_err(|e| Error::from(e).context("launching Chromium"))?;
        tracing::info!(
            base_url = %config.site.base_url,
            headless = config.headless,
            "browser session started"
        );
        Ok(Self {
            config: config.clone(),
            _playwright: playwright,
            browser,
        })
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.config.site
    }

    /// Opens a fresh context with one tab.
    pub async fn new_tab(&self) -> Result<CaseTab> {
        let context = self.browser.new_context().await?;
        let page = context.new_page().await?;
        Ok(CaseTab {
            tab: PlaywrightTab::handle(page),
            context,
        })
    }

    /// Runs one test case in a fresh tab under the per-test timeout.
    ///
    /// `meta` is applied to the case's Allure result before the body runs.
    /// When the body fails, a full-page screenshot is attached on a
    /// best-effort basis. The result file is written either way and the
    /// body's outcome is returned.
    pub async fn run_case<F>(&self, name: &str, meta: &CaseMeta, body: F) -> Result<()>
    where
        F: for<'r> FnOnce(TabHandle, &'r mut dyn ReportSink) -> BoxFuture<'r, Result<()>>,
    {
        let mut report = AllureReport::new(&self.config.allure_results_dir, name);
        meta.apply(&mut report);

        let case_tab = self.new_tab().await?;
        let tab = case_tab.tab.clone();
        tracing::info!("case started: {}", name);

        let timeout = self.config.test_timeout;
        let outcome = match tokio::time::timeout(timeout, body(tab.clone(), &mut report)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Timeout(format!(
                "test case '{}' exceeded {:?}",
                name, timeout
            ))),
        };

        if let Err(e) = &outcome {
            tracing::error!("case failed: {}: {}", name, e);
            match tab.screenshot(true).await {
                Ok(png) => report.attach("screenshot-on-failure", ContentType::Png, &png),
                Err(shot_err) => tracing::warn!("could not take failure screenshot: {}", shot_err),
            }
        }

        report.finish(&outcome);
        if let Err(e) = report.write().await {
            tracing::warn!("could not write Allure result for '{}': {}", name, e);
        }
        if let Err(e) = case_tab.close().await {
            tracing::warn!("could not close browser context: {}", e);
        }
        outcome
    }

    pub async fn close(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}
