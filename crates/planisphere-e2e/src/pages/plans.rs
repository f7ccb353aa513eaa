// Plans page
//
// Plan discovery and plan selection. Selecting a plan opens the reserve
// form in a new tab, which is the one place a flow crosses from one tab to
// another.

use serde::Serialize;

use crate::config::SiteSettings;
use crate::driver::{Selector, TabHandle};
use crate::error::{Error, Result};
use crate::wait;

use super::base::BasePage;
use super::derive_base_page;

pub const PATH: &str = "/ja/plans";

pub(crate) const CARD_TITLES: Selector = Selector::css("h5.card-title");
pub(crate) const RESERVE_CONTROL: Selector = Selector::css(r#"a.btn, a[role="button"]"#);
pub(crate) const CARD_LINKS: Selector = Selector::css("a");
pub(crate) const PRICE_TEXT: Selector = Selector::css(r#".card-text:has-text("お値段")"#);
pub(crate) const FIRST_CARD_TEXT: Selector = Selector::css(".card-text >> nth=0");

/// Card whose title is exactly `plan_name`.
pub(crate) fn plan_card(plan_name: &str) -> Selector {
    Selector::has_text(".card-body", "h5.card-title", plan_name)
}

/// What the page looked like when a plan could not be selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanDiagnostics {
    /// Every card title on the page
    pub card_titles: Vec<String>,
    pub card_exists: bool,
    /// Link texts inside the card, empty when the card is missing
    pub link_texts: Vec<String>,
    /// Button-like links inside the card
    pub button_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanDetails {
    pub title: String,
    pub price: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub name: String,
    pub price: String,
}

#[derive(Clone)]
pub struct PlansPage {
    base: BasePage,
}

derive_base_page!(PlansPage);

impl PlansPage {
    pub fn new(tab: TabHandle, settings: SiteSettings) -> Self {
        Self {
            base: BasePage::new(tab, settings),
        }
    }

    pub async fn goto(&self) -> Result<()> {
        self.goto_path(PATH).await?;
        self.wait_for_load().await
    }

    /// Titles of every plan card, in page order.
    pub async fn available_plans(&self) -> Result<Vec<String>> {
        self.wait_for_load().await?;
        self.tab().all_text_contents(&CARD_TITLES).await
    }

    pub async fn plan_price(&self, plan_name: &str) -> Result<String> {
        self.get_text_with_retry(&plan_card(plan_name).within(PRICE_TEXT))
            .await
    }

    pub async fn plan_details(&self, plan_name: &str) -> Result<PlanDetails> {
        let card = plan_card(plan_name);
        Ok(PlanDetails {
            title: self.get_text_with_retry(&card.within(CARD_TITLES)).await?,
            price: self.get_text_with_retry(&card.within(PRICE_TEXT)).await?,
            description: self.get_text_with_retry(&card.within(FIRST_CARD_TEXT)).await?,
        })
    }

    /// Plan titles containing `keyword`.
    pub async fn search_plans(&self, keyword: &str) -> Result<Vec<String>> {
        let plans = self.available_plans().await?;
        Ok(plans.into_iter().filter(|plan| plan.contains(keyword)).collect())
    }

    pub async fn all_plans_summary(&self) -> Result<Vec<PlanSummary>> {
        let mut summary = Vec::new();
        for name in self.available_plans().await? {
            let price = self.plan_price(&name).await?;
            summary.push(PlanSummary { name, price });
        }
        Ok(summary)
    }

    /// Clicks the reserve control of the plan titled exactly `plan_name`
    /// and returns the tab it opens, settled to network idle.
    ///
    /// On failure the page state is collected into
    /// [`Error::PlanSelection`] and, when an artifacts dir is configured, a
    /// screenshot is saved there.
    pub async fn select_plan_by_name(&self, plan_name: &str) -> Result<TabHandle> {
        match self.open_reserve_tab(plan_name).await {
            Ok(tab) => Ok(tab),
            Err(source) => {
                tracing::error!("failed to select plan '{}': {}", plan_name, source);
                let diagnostics = self.debug_plan_selection(plan_name).await;
                self.save_diagnostic_screenshot("error-plan-selection.png")
                    .await;
                Err(Error::PlanSelection {
                    plan: plan_name.to_string(),
                    diagnostics,
                    source: Box::new(source),
                })
            }
        }
    }

    async fn open_reserve_tab(&self, plan_name: &str) -> Result<TabHandle> {
        let timeout = self.settings().timeouts.plan_selection;
        let card = plan_card(plan_name);
        wait::wait_for_visible(self.tab().as_ref(), &card, timeout).await?;

        // Scoped to the card: every card has its own reserve control.
        let control = card.within(RESERVE_CONTROL);
        wait::wait_for_visible(self.tab().as_ref(), &control, timeout).await?;

        let reserve_tab = self.tab().click_expecting_popup(&control, timeout).await?;
        BasePage::new(reserve_tab.clone(), self.settings().clone())
            .wait_for_load()
            .await?;
        tracing::debug!("plan '{}' opened {}", plan_name, reserve_tab.url());
        Ok(reserve_tab)
    }

    /// Collects what the page shows for `plan_name`. Never fails; queries
    /// that error are logged and left empty.
    pub async fn debug_plan_selection(&self, plan_name: &str) -> PlanDiagnostics {
        let tab = self.tab();
        let card = plan_card(plan_name);
        let mut diagnostics = PlanDiagnostics {
            card_titles: tab
                .all_text_contents(&CARD_TITLES)
                .await
                .unwrap_or_else(|e| diagnostic_failed("card titles", e)),
            card_exists: tab
                .count(&card)
                .await
                .map(|n| n > 0)
                .unwrap_or_else(|e| diagnostic_failed("card count", e)),
            ..PlanDiagnostics::default()
        };

        if diagnostics.card_exists {
            diagnostics.link_texts = tab
                .all_text_contents(&card.within(CARD_LINKS))
                .await
                .unwrap_or_else(|e| diagnostic_failed("card links", e));
            diagnostics.button_count = tab
                .count(&card.within(RESERVE_CONTROL))
                .await
                .unwrap_or_else(|e| diagnostic_failed("button links", e));
        }

        tracing::info!(
            plan = plan_name,
            card_exists = diagnostics.card_exists,
            button_count = diagnostics.button_count,
            "plan cards on page: {:?}, links in card: {:?}",
            diagnostics.card_titles,
            diagnostics.link_texts
        );
        diagnostics
    }
}

fn diagnostic_failed<T: Default>(what: &str, e: Error) -> T {
    tracing::warn!("could not collect {}: {}", what, e);
    T::default()
}
