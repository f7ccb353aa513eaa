// End-to-end reservation flow
//
// Plan selection, form input, confirmation and completion, each reported as
// a labelled step. Failures never propagate: the flow returns a result with
// the error message and an error screenshot attached to the report.

use std::fmt;

use regex::Regex;

use crate::config::SiteSettings;
use crate::driver::TabHandle;
use crate::error::{Error, Result};
use crate::fixtures::reservation::{
    COMPLETION_MESSAGE, DEFAULT_RESERVATION, ReservationData, ReservationOverrides,
};
use crate::pages::reserve::CONFIRM_URL_PATTERN;
use crate::pages::{ConfirmPage, PlansPage, ReservePage};
use crate::report::{ContentType, ReportSink, Status, run_step};

/// Top-level steps of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservationStep {
    SelectPlan,
    FillForm,
    Confirm,
    Complete,
}

impl ReservationStep {
    pub fn label(&self) -> &'static str {
        match self {
            ReservationStep::SelectPlan => "プラン選択",
            ReservationStep::FillForm => "予約情報入力",
            ReservationStep::Confirm => "予約内容確認",
            ReservationStep::Complete => "予約完了",
        }
    }
}

impl fmt::Display for ReservationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label of the step that submits the form.
pub const PROCEED_TO_CONFIRM_STEP: &str = "予約内容確認画面へ進む";

#[derive(Debug, Clone)]
pub struct ReservationFlowOptions {
    pub data: ReservationData,
    /// Steps to leave out. Picking the plan always happens, since every later
    /// step needs the tab it opens; skipping `SelectPlan` only skips opening
    /// the plans page first.
    pub skip_steps: Vec<ReservationStep>,
}

impl Default for ReservationFlowOptions {
    fn default() -> Self {
        Self {
            data: DEFAULT_RESERVATION.clone(),
            skip_steps: Vec::new(),
        }
    }
}

impl ReservationFlowOptions {
    pub fn from_overrides(overrides: &ReservationOverrides) -> Self {
        Self {
            data: overrides.apply(&DEFAULT_RESERVATION),
            skip_steps: Vec::new(),
        }
    }

    pub fn skip(mut self, step: ReservationStep) -> Self {
        self.skip_steps.push(step);
        self
    }

    fn runs(&self, step: ReservationStep) -> bool {
        !self.skip_steps.contains(&step)
    }
}

/// Outcome of one flow execution.
#[derive(Clone, Default)]
pub struct ReservationFlowResult {
    pub success: bool,
    /// Tab the plan's reserve control opened
    pub reservation_tab: Option<TabHandle>,
    pub confirm_page: Option<ConfirmPage>,
    pub error_message: Option<String>,
}

impl fmt::Debug for ReservationFlowResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReservationFlowResult")
            .field("success", &self.success)
            .field(
                "reservation_tab",
                &self.reservation_tab.as_ref().map(|tab| tab.url()),
            )
            .field("error_message", &self.error_message)
            .finish()
    }
}

/// Runs the reservation flow starting from `tab`.
pub async fn execute_reservation_flow(
    tab: TabHandle,
    settings: &SiteSettings,
    options: &ReservationFlowOptions,
    report: &mut dyn ReportSink,
) -> ReservationFlowResult {
    let mut opened = None;
    match run_flow(&tab, settings, options, &mut opened, report).await {
        Ok((reservation_tab, confirm_page)) => ReservationFlowResult {
            success: true,
            reservation_tab: Some(reservation_tab),
            confirm_page: Some(confirm_page),
            error_message: None,
        },
        Err(e) => {
            tracing::error!("reservation flow failed: {}", e);
            // Once a plan is picked, the reserve tab shows where the flow stopped.
            let evidence_tab = opened.as_ref().unwrap_or(&tab);
            attach_failure_evidence(evidence_tab, &e, report).await;
            ReservationFlowResult {
                success: false,
                error_message: Some(e.to_string()),
                ..ReservationFlowResult::default()
            }
        }
    }
}

async fn run_flow(
    tab: &TabHandle,
    settings: &SiteSettings,
    options: &ReservationFlowOptions,
    opened: &mut Option<TabHandle>,
    report: &mut dyn ReportSink,
) -> Result<(TabHandle, ConfirmPage)> {
    let data = &options.data;
    let plans = PlansPage::new(tab.clone(), settings.clone());

    if options.runs(ReservationStep::SelectPlan) {
        let label = format!("{}: {}", ReservationStep::SelectPlan, data.plan_name);
        run_step(report, &label, async {
            plans.goto().await?;
            plans.wait_for_load().await
        })
        .await?;
    }

    let reservation_tab = plans.select_plan_by_name(&data.plan_name).await?;
    *opened = Some(reservation_tab.clone());
    let reserve = ReservePage::new(reservation_tab.clone(), settings.clone());

    if options.runs(ReservationStep::FillForm) {
        report.start_step(ReservationStep::FillForm.label());
        let filled = reserve.fill_reservation_form(data).await;
        if filled.is_ok() {
            record_form_values(data, report);
        }
        report.finish_step(Status::of(&filled));
        filled?;

        run_step(report, PROCEED_TO_CONFIRM_STEP, reserve.proceed_to_confirm()).await?;
    }

    let confirm = ConfirmPage::new(reservation_tab.clone(), settings.clone());

    if options.runs(ReservationStep::Confirm) {
        let confirm_url = Regex::new(CONFIRM_URL_PATTERN)?;
        run_step(report, ReservationStep::Confirm.label(), async {
            confirm.assert_current_url(&confirm_url).await?;
            confirm
                .assert_reservation_details(&data.plan_name, &data.guest_name, data.contact_detail())
                .await
        })
        .await?;
    }

    if options.runs(ReservationStep::Complete) {
        run_step(report, ReservationStep::Complete.label(), async {
            confirm.confirm().await?;
            confirm.assert_completion_modal(COMPLETION_MESSAGE).await
        })
        .await?;
    }

    Ok((reservation_tab, confirm))
}

fn record_form_values(data: &ReservationData, report: &mut dyn ReportSink) {
    report.step(&format!("宿泊日: {}", data.check_in_date));
    report.step(&format!("宿泊数: {}泊", data.stay_days));
    report.step(&format!("宿泊人数: {}人", data.guests));
    for plan in &data.additional_plans {
        report.step(&format!("追加プラン: {}", plan));
    }
    report.step(&format!("宿泊者名: {}", data.guest_name));
    report.step(&format!("連絡先: {}", data.contact_detail()));
}

async fn attach_failure_evidence(tab: &TabHandle, error: &Error, report: &mut dyn ReportSink) {
    match tab.screenshot(false).await {
        Ok(png) => report.attach("error-screenshot", ContentType::Png, &png),
        Err(e) => tracing::warn!("could not take error screenshot: {}", e),
    }

    if let Error::PlanSelection { diagnostics, .. } = error {
        match serde_json::to_vec_pretty(diagnostics) {
            Ok(json) => report.attach("plan-selection-diagnostics", ContentType::Json, &json),
            Err(e) => tracing::warn!("could not serialize plan diagnostics: {}", e),
        }
    }
}
