// Confirm page and completion modal

use crate::config::SiteSettings;
use crate::driver::{Selector, TabHandle};
use crate::error::{Error, Result};

use super::base::BasePage;
use super::derive_base_page;

pub(crate) const CONFIRM_BUTTON: Selector = Selector::exact_text("この内容で予約する");
pub(crate) const MODAL: Selector = Selector::css(".modal");
pub(crate) const MODAL_BODY: Selector = Selector::css(".modal-body");
pub(crate) const MODAL_CLOSE: Selector = Selector::css(r#".modal button:has-text("閉じる")"#);
pub(crate) const PLAN_NAME: Selector = Selector::css("#plan-name");
pub(crate) const GUEST_NAME: Selector = Selector::css("#username");
pub(crate) const CONTACT: Selector = Selector::css("#contact");

#[derive(Clone)]
pub struct ConfirmPage {
    base: BasePage,
}

derive_base_page!(ConfirmPage);

impl ConfirmPage {
    pub fn new(tab: TabHandle, settings: SiteSettings) -> Self {
        Self {
            base: BasePage::new(tab, settings),
        }
    }

    /// Books the reservation shown on the page.
    pub async fn confirm(&self) -> Result<()> {
        self.click_element(&CONFIRM_BUTTON).await
    }

    pub async fn expect_modal_visible(&self) -> Result<()> {
        self.assert_element_visible(&MODAL).await
    }

    pub async fn close_modal(&self) -> Result<()> {
        self.click_element(&MODAL_CLOSE).await
    }

    // The confirm screen fills these fields from session storage after
    // load, so every read goes through the retry.

    pub async fn plan_name_text(&self) -> Result<String> {
        self.get_text_with_retry(&PLAN_NAME).await
    }

    pub async fn guest_name_text(&self) -> Result<String> {
        self.get_text_with_retry(&GUEST_NAME).await
    }

    pub async fn contact_text(&self) -> Result<String> {
        self.get_text_with_retry(&CONTACT).await
    }

    pub async fn modal_text(&self) -> Result<String> {
        self.get_text_with_retry(&MODAL_BODY).await
    }

    /// Asserts plan, guest and contact fields contain the submitted values.
    pub async fn assert_reservation_details(
        &self,
        plan_name: &str,
        guest_name: &str,
        contact: &str,
    ) -> Result<()> {
        check_contains("plan name", &self.plan_name_text().await?, plan_name)?;
        check_contains("guest name", &self.guest_name_text().await?, guest_name)?;
        check_contains("contact", &self.contact_text().await?, contact)
    }

    pub async fn assert_completion_modal(&self, expected: &str) -> Result<()> {
        self.expect_modal_visible().await?;
        check_contains("completion modal", &self.modal_text().await?, expected)
    }
}

fn check_contains(what: &str, actual: &str, expected: &str) -> Result<()> {
    if actual.contains(expected) {
        Ok(())
    } else {
        Err(Error::assertion(
            format!("{} on the confirm page differs", what),
            expected,
            actual,
        ))
    }
}
