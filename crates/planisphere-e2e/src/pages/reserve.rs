// Reserve form
//
// Input actions act once and never retry. Validation reads go through
// computed style because every `.invalid-feedback` element is in the
// document from the start and only its `display` changes.

use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::config::SiteSettings;
use crate::driver::{AriaRole, Selector, TabHandle};
use crate::error::{Error, Result};
use crate::fixtures::reservation::ReservationData;
use crate::wait::{self, FirstSignal};

use super::base::BasePage;
use super::derive_base_page;

/// Inline error element next to each form field.
pub const INVALID_FEEDBACK: &str = ".invalid-feedback";

/// URL of the confirm screen the form submits to.
pub const CONFIRM_URL_PATTERN: &str = r"confirm\.html";

pub(crate) const DATE_INPUT: Selector = Selector::role(AriaRole::Textbox, "宿泊日 必須");
pub(crate) const DATEPICKER_CLOSE: Selector = Selector::role(AriaRole::Button, "閉じる");
pub(crate) const STAY_DAYS_INPUT: Selector = Selector::role(AriaRole::Spinbutton, "宿泊数 必須");
pub(crate) const GUESTS_INPUT: Selector = Selector::role(AriaRole::Spinbutton, "人数 必須");
pub(crate) const NAME_INPUT: Selector = Selector::role(AriaRole::Textbox, "氏名 必須");
pub(crate) const CONTACT_SELECT: Selector = Selector::css(r#"select[name="contact"]"#);
pub(crate) const EMAIL_INPUT: Selector = Selector::role(AriaRole::Textbox, "メールアドレス 必須");
pub(crate) const TEL_INPUT: Selector = Selector::role(AriaRole::Textbox, "電話番号 必須");
pub(crate) const REMARKS_INPUT: Selector = Selector::css(r#"textarea[name="comment"]"#);
pub(crate) const SUBMIT_BUTTON: Selector = Selector::css(r#"[data-test="submit-button"]"#);

/// How the hotel should contact the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactMethod {
    /// No contact wanted
    None,
    Email,
    Tel,
}

impl ContactMethod {
    /// `<option>` value of the contact select.
    pub fn as_value(&self) -> &'static str {
        match self {
            ContactMethod::None => "no",
            ContactMethod::Email => "email",
            ContactMethod::Tel => "tel",
        }
    }
}

/// A single reserve form input, as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Date(&'static str),
    StayDays(&'static str),
    Guests(&'static str),
    AdditionalPlans(&'static [&'static str]),
    Name(&'static str),
    Contact(ContactMethod),
    Email(&'static str),
    Tel(&'static str),
    Remarks(&'static str),
}

impl fmt::Display for FormAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormAction::Date(date) => write!(f, "宿泊日: {}", date),
            FormAction::StayDays(days) => write!(f, "宿泊数: {}", days),
            FormAction::Guests(guests) => write!(f, "人数: {}", guests),
            FormAction::AdditionalPlans(plans) => write!(f, "追加プラン: {}", plans.join(", ")),
            FormAction::Name(name) => write!(f, "氏名: {}", name),
            FormAction::Contact(method) => write!(f, "確認のご連絡: {}", method.as_value()),
            FormAction::Email(email) => write!(f, "メールアドレス: {}", email),
            FormAction::Tel(tel) => write!(f, "電話番号: {}", tel),
            FormAction::Remarks(remarks) => write!(f, "ご要望・ご連絡事項: {}", remarks),
        }
    }
}

#[derive(Clone)]
pub struct ReservePage {
    base: BasePage,
}

derive_base_page!(ReservePage);

impl ReservePage {
    pub fn new(tab: TabHandle, settings: SiteSettings) -> Self {
        Self {
            base: BasePage::new(tab, settings),
        }
    }

    /// Types the check-in date and closes the date picker it opens.
    pub async fn select_date(&self, date: &str) -> Result<()> {
        self.click_element(&DATE_INPUT).await?;
        self.fill_input(&DATE_INPUT, date).await?;
        self.click_element(&DATEPICKER_CLOSE).await
    }

    pub async fn select_stay_days(&self, days: &str) -> Result<()> {
        self.fill_input(&STAY_DAYS_INPUT, days).await
    }

    pub async fn select_guests(&self, guests: &str) -> Result<()> {
        self.fill_input(&GUESTS_INPUT, guests).await
    }

    pub async fn choose_additional_plans<S: AsRef<str>>(&self, plans: &[S]) -> Result<()> {
        for plan in plans {
            self.tab()
                .check(&Selector::role_named(AriaRole::Checkbox, plan.as_ref()))
                .await?;
        }
        Ok(())
    }

    pub async fn fill_name(&self, name: &str) -> Result<()> {
        self.fill_input(&NAME_INPUT, name).await
    }

    pub async fn select_contact_method(&self, method: ContactMethod) -> Result<()> {
        self.tab()
            .select_option(&CONTACT_SELECT, method.as_value())
            .await
    }

    pub async fn fill_email(&self, email: &str) -> Result<()> {
        self.fill_input(&EMAIL_INPUT, email).await
    }

    pub async fn fill_tel(&self, tel: &str) -> Result<()> {
        self.fill_input(&TEL_INPUT, tel).await
    }

    pub async fn fill_remarks(&self, remarks: &str) -> Result<()> {
        self.fill_input(&REMARKS_INPUT, remarks).await
    }

    pub async fn proceed_to_confirm(&self) -> Result<()> {
        self.click_element(&SUBMIT_BUTTON).await
    }

    pub async fn apply(&self, action: &FormAction) -> Result<()> {
        tracing::debug!("form input {}", action);
        match *action {
            FormAction::Date(date) => self.select_date(date).await,
            FormAction::StayDays(days) => self.select_stay_days(days).await,
            FormAction::Guests(guests) => self.select_guests(guests).await,
            FormAction::AdditionalPlans(plans) => self.choose_additional_plans(plans).await,
            FormAction::Name(name) => self.fill_name(name).await,
            FormAction::Contact(method) => self.select_contact_method(method).await,
            FormAction::Email(email) => self.fill_email(email).await,
            FormAction::Tel(tel) => self.fill_tel(tel).await,
            FormAction::Remarks(remarks) => self.fill_remarks(remarks).await,
        }
    }

    pub async fn apply_all(&self, actions: &[FormAction]) -> Result<()> {
        for action in actions {
            self.apply(action).await?;
        }
        Ok(())
    }

    /// Fills every field from `data`. Only the contact detail matching
    /// `data.contact` is typed.
    pub async fn fill_reservation_form(&self, data: &ReservationData) -> Result<()> {
        self.select_date(&data.check_in_date).await?;
        self.select_stay_days(&data.stay_days).await?;
        self.select_guests(&data.guests).await?;
        self.choose_additional_plans(&data.additional_plans).await?;
        self.fill_name(&data.guest_name).await?;
        self.select_contact_method(data.contact).await?;
        match data.contact {
            ContactMethod::Email => self.fill_email(&data.email).await?,
            ContactMethod::Tel => self.fill_tel(&data.tel).await?,
            ContactMethod::None => {}
        }
        self.fill_remarks(&data.remarks).await
    }

    /// Inline errors whose computed `display` is not `none`.
    pub async fn visible_invalid_feedback_count(&self) -> Result<usize> {
        self.tab().displayed_count(INVALID_FEEDBACK).await
    }

    /// Displayed inline error of the field with id `field_id`, if any.
    pub async fn field_error_message(&self, field_id: &str) -> Result<Option<String>> {
        self.tab()
            .displayed_feedback(field_id, INVALID_FEEDBACK)
            .await
    }

    /// Submits, then waits for whichever comes first: an inline error being
    /// displayed or the confirm page loading. Neither outcome is required;
    /// callers read the page state afterwards.
    pub async fn submit_and_wait_for_validation(&self) -> Result<FirstSignal> {
        self.proceed_to_confirm().await?;

        let timeouts = self.settings().timeouts;
        let confirm_url = Regex::new(CONFIRM_URL_PATTERN)?;
        let tab = self.tab().as_ref();
        let signal = wait::first_of(
            wait::wait_for_displayed(tab, INVALID_FEEDBACK, timeouts.validation_race),
            wait::wait_for_url(tab, &confirm_url, timeouts.validation_race),
            timeouts.validation_race,
        )
        .await;
        tracing::debug!("submit settled: {:?}", signal);

        // Let the form's debounced rendering finish before anyone reads it.
        tokio::time::sleep(timeouts.settle).await;
        Ok(signal)
    }

    pub async fn assert_field_error(&self, field_id: &str, expected: &str) -> Result<()> {
        match self.field_error_message(field_id).await? {
            None => Err(Error::assertion(
                format!("field '{}' shows no error message", field_id),
                expected,
                "no message",
            )),
            Some(message) if !message.contains(expected) => Err(Error::assertion(
                format!("field '{}' error message differs", field_id),
                expected,
                message,
            )),
            Some(_) => Ok(()),
        }
    }

    pub async fn assert_multiple_field_errors(&self, field_errors: &[(&str, &str)]) -> Result<()> {
        for (field_id, expected) in field_errors {
            self.assert_field_error(field_id, expected).await?;
        }
        Ok(())
    }

    /// Waits for the confirm page.
    ///
    /// When it never loads, a visible inline error count takes priority in
    /// the failure over the bare timeout.
    pub async fn assert_navigation_to_confirm_page(&self) -> Result<()> {
        let confirm_url = Regex::new(CONFIRM_URL_PATTERN)?;
        let navigation = self.settings().timeouts.navigation;
        match wait::wait_for_url(self.tab().as_ref(), &confirm_url, navigation).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let visible = self.visible_invalid_feedback_count().await?;
                if visible > 0 {
                    Err(Error::assertion(
                        "visible inline errors keep the form from reaching the confirm page",
                        0,
                        visible,
                    ))
                } else {
                    Err(e.context("failed to reach the confirm page"))
                }
            }
        }
    }
}
