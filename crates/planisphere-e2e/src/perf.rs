// Stopwatch performance checks
//
// Each measurement covers the action plus the wait for network idle. The
// numbers are wall-clock timings against fixed thresholds, nothing more.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::SiteSettings;
use crate::driver::TabHandle;
use crate::error::{Error, Result};
use crate::fixtures::login::LoginCredentials;
use crate::fixtures::performance::{LOGIN_SUBMIT, NavigationAction, PLAN_SELECTION, PageLoadTarget};
use crate::pages::{BasePage, LoginPage, PlansPage};
use crate::report::{ReportSink, Status};

/// Fails when `elapsed` reaches `threshold`.
pub fn check_threshold(description: &str, elapsed: Duration, threshold: Duration) -> Result<()> {
    if elapsed >= threshold {
        Err(Error::ThresholdExceeded {
            description: description.to_string(),
            elapsed_ms: elapsed.as_millis(),
            threshold_ms: threshold.as_millis(),
        })
    } else {
        Ok(())
    }
}

pub struct PerformanceMetrics {
    page: BasePage,
}

impl PerformanceMetrics {
    pub fn new(tab: TabHandle, settings: SiteSettings) -> Self {
        Self {
            page: BasePage::new(tab, settings),
        }
    }

    /// Page object used for the navigations being timed.
    pub fn page(&self) -> &BasePage {
        &self.page
    }

    /// Opens `path` and times it until the network is idle.
    pub async fn measure_page_load(
        &self,
        path: &str,
        description: &str,
        report: &mut dyn ReportSink,
    ) -> Result<Duration> {
        let start = Instant::now();
        self.page.goto_path(path).await?;
        self.page.wait_for_load().await?;
        let elapsed = start.elapsed();

        tracing::info!(page = description, elapsed_ms = elapsed.as_millis() as u64, "page load");
        report.parameter(
            &format!("{} 読み込み時間", description),
            &format!("{}ms", elapsed.as_millis()),
        );
        Ok(elapsed)
    }

    /// Times `action` until the network is idle afterwards.
    pub async fn measure_navigation<F>(
        &self,
        action: F,
        description: &str,
        report: &mut dyn ReportSink,
    ) -> Result<Duration>
    where
        F: Future<Output = Result<()>>,
    {
        let ((), elapsed) = timed(async {
            action.await?;
            self.page.wait_for_load().await
        })
        .await?;

        tracing::info!(action = description, elapsed_ms = elapsed.as_millis() as u64, "navigation");
        report.parameter(
            &format!("{} 遷移時間", description),
            &format!("{}ms", elapsed.as_millis()),
        );
        Ok(elapsed)
    }

    /// Times every page load in its own step; stops at the first page over
    /// `threshold`.
    pub async fn measure_multiple_page_loads(
        &self,
        pages: &[PageLoadTarget],
        threshold: Duration,
        report: &mut dyn ReportSink,
    ) -> Result<()> {
        for target in pages {
            report.start_step(&format!("{}の読み込み時間を測定", target.name));
            let checked = self
                .measure_page_load(target.path, target.name, report)
                .await
                .and_then(|elapsed| check_threshold(target.name, elapsed, threshold));
            report.finish_step(Status::of(&checked));
            checked?;
        }
        Ok(())
    }

    /// Clicks each header navigation in turn and times it in its own step.
    pub async fn measure_multiple_navigations(
        &self,
        actions: &[NavigationAction],
        threshold: Duration,
        report: &mut dyn ReportSink,
    ) -> Result<()> {
        for action in actions {
            report.start_step(&format!("{}の応答時間を測定", action.description));
            let measured = self
                .measure_navigation(self.page.navigate_to(action.target), action.description, report)
                .await;
            let checked =
                measured.and_then(|elapsed| check_threshold(action.description, elapsed, threshold));
            report.finish_step(Status::of(&checked));
            checked?;
        }
        Ok(())
    }

    /// Logs in with `credentials` and times the form submission, in its own
    /// step. The member page must be reached after the timing passes.
    pub async fn measure_login_submit(
        &self,
        credentials: LoginCredentials,
        threshold: Duration,
        report: &mut dyn ReportSink,
    ) -> Result<Duration> {
        let login = LoginPage::new(self.page.tab().clone(), self.page.settings().clone());
        login.goto().await?;
        login.fill_email(credentials.email).await?;
        login.fill_password(credentials.password).await?;

        report.start_step(&format!("{}の応答時間を測定", LOGIN_SUBMIT));
        let checked = async {
            // `submit` already waits for the member page to settle.
            let ((), elapsed) = timed(login.submit()).await?;
            tracing::info!(
                action = LOGIN_SUBMIT,
                elapsed_ms = elapsed.as_millis() as u64,
                "form submit"
            );
            report.parameter(
                &format!("{} 応答時間", LOGIN_SUBMIT),
                &format!("{}ms", elapsed.as_millis()),
            );
            check_threshold(LOGIN_SUBMIT, elapsed, threshold)?;
            login.assert_login_success().await?;
            Ok::<_, Error>(elapsed)
        }
        .await;
        report.finish_step(Status::of(&checked));
        checked
    }

    /// Opens the plans page and times picking `plan_name` until its reserve
    /// tab settles, in its own step. Returns the reserve tab.
    pub async fn measure_plan_selection(
        &self,
        plan_name: &str,
        threshold: Duration,
        report: &mut dyn ReportSink,
    ) -> Result<(TabHandle, Duration)> {
        let plans = PlansPage::new(self.page.tab().clone(), self.page.settings().clone());
        plans.goto().await?;
        plans.wait_for_load().await?;

        report.start_step(&format!("{}の応答時間を測定", PLAN_SELECTION));
        let checked = async {
            let (reserve_tab, elapsed) = timed(plans.select_plan_by_name(plan_name)).await?;
            tracing::info!(
                action = PLAN_SELECTION,
                plan = plan_name,
                elapsed_ms = elapsed.as_millis() as u64,
                "plan selection"
            );
            report.parameter(
                &format!("{} 表示時間", PLAN_SELECTION),
                &format!("{}ms", elapsed.as_millis()),
            );
            check_threshold(PLAN_SELECTION, elapsed, threshold)?;
            Ok::<_, Error>((reserve_tab, elapsed))
        }
        .await;
        report.finish_step(Status::of(&checked));
        checked
    }
}

async fn timed<T>(action: impl Future<Output = Result<T>>) -> Result<(T, Duration)> {
    let start = Instant::now();
    let value = action.await?;
    Ok((value, start.elapsed()))
}
