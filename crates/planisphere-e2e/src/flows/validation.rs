// Data-driven reserve form validation

use crate::config::SiteSettings;
use crate::driver::TabHandle;
use crate::error::{Error, Result};
use crate::fixtures::reservation::DEFAULT_RESERVATION;
use crate::fixtures::validation::ValidationTestCase;
use crate::pages::{PlansPage, ReservePage};
use crate::report::{ContentType, ReportSink, Status, run_step};

/// Opens the plans page in `tab`, picks the default plan and returns the
/// reserve form on the tab it opens.
pub async fn open_reservation_page(tab: TabHandle, settings: &SiteSettings) -> Result<ReservePage> {
    let plans = PlansPage::new(tab, settings.clone());
    plans.goto().await?;
    let reservation_tab = plans
        .select_plan_by_name(&DEFAULT_RESERVATION.plan_name)
        .await?;
    Ok(ReservePage::new(reservation_tab, settings.clone()))
}

/// Applies the case's setup, submits, and checks the outcome.
///
/// Positive cases must reach the confirm page with no inline error shown.
/// Negative cases must show at least as many inline errors as they expect,
/// each field's error containing its expected text.
pub async fn run_validation_case(
    page: &ReservePage,
    case: &ValidationTestCase,
    report: &mut dyn ReportSink,
) -> Result<()> {
    tracing::info!(issue = case.issue_id, "validation case: {}", case.name);

    report.start_step("入力値を設定");
    let applied = apply_setup(page, case, report).await;
    report.finish_step(Status::of(&applied));
    applied?;

    if case.positive {
        run_step(report, "フォームを送信", page.proceed_to_confirm()).await?;
        run_step(report, "確認ページへの遷移を検証", async {
            page.assert_navigation_to_confirm_page().await?;
            let visible = page.visible_invalid_feedback_count().await?;
            if visible == 0 {
                Ok(())
            } else {
                Err(Error::assertion(
                    "inline errors shown after a valid submit",
                    0,
                    visible,
                ))
            }
        })
        .await
    } else {
        run_step(
            report,
            "フォームを送信",
            page.submit_and_wait_for_validation(),
        )
        .await?;
        attach_screenshot(page, case, report).await;
        run_step(report, "エラーメッセージを検証", async {
            let visible = page.visible_invalid_feedback_count().await?;
            let expected = case.expected_errors.len();
            if visible < expected {
                return Err(Error::assertion(
                    "fewer inline errors displayed than expected",
                    format!(">= {}", expected),
                    visible,
                ));
            }
            page.assert_multiple_field_errors(case.expected_errors).await
        })
        .await
    }
}

async fn apply_setup(
    page: &ReservePage,
    case: &ValidationTestCase,
    report: &mut dyn ReportSink,
) -> Result<()> {
    for action in case.setup {
        let label = action.to_string();
        run_step(report, &label, page.apply(action)).await?;
    }
    Ok(())
}

async fn attach_screenshot(page: &ReservePage, case: &ValidationTestCase, report: &mut dyn ReportSink) {
    match page.tab().screenshot(false).await {
        Ok(png) => report.attach(
            &format!("{}-screenshot", case.issue_id),
            ContentType::Png,
            &png,
        ),
        Err(e) => tracing::warn!("could not take validation screenshot: {}", e),
    }
}
