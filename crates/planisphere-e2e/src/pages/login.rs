// Login page

use std::fmt;

use regex::Regex;

use crate::config::SiteSettings;
use crate::driver::{AriaRole, Selector, TabHandle};
use crate::error::{Error, Result};
use crate::fixtures::login::{LoginOutcome, LoginTestCase};

use super::base::BasePage;
use super::derive_base_page;

pub const PATH: &str = "/ja/login";

pub(crate) const EMAIL_INPUT: Selector = Selector::role(AriaRole::Textbox, "メールアドレス");
pub(crate) const PASSWORD_INPUT: Selector = Selector::role(AriaRole::Textbox, "パスワード");
pub(crate) const LOGIN_BUTTON: Selector = Selector::css("#login-button");
pub(crate) const EMAIL_MESSAGE: Selector = Selector::css("#email-message");
pub(crate) const PASSWORD_MESSAGE: Selector = Selector::css("#password-message");
pub(crate) const MYPAGE_HEADING: Selector = Selector::css(r#"h2:has-text("マイページ")"#);

/// Login form fields that carry an inline error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

impl LoginField {
    fn message(&self) -> Selector {
        match self {
            LoginField::Email => EMAIL_MESSAGE,
            LoginField::Password => PASSWORD_MESSAGE,
        }
    }
}

impl fmt::Display for LoginField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginField::Email => f.write_str("email"),
            LoginField::Password => f.write_str("password"),
        }
    }
}

#[derive(Clone)]
pub struct LoginPage {
    base: BasePage,
}

derive_base_page!(LoginPage);

impl LoginPage {
    pub fn new(tab: TabHandle, settings: SiteSettings) -> Self {
        Self {
            base: BasePage::new(tab, settings),
        }
    }

    pub async fn goto(&self) -> Result<()> {
        self.goto_path(PATH).await?;
        self.wait_for_load().await
    }

    pub async fn fill_email(&self, email: &str) -> Result<()> {
        self.fill_input(&EMAIL_INPUT, email).await
    }

    pub async fn fill_password(&self, password: &str) -> Result<()> {
        self.fill_input(&PASSWORD_INPUT, password).await
    }

    pub async fn submit(&self) -> Result<()> {
        self.click_element(&LOGIN_BUTTON).await?;
        self.wait_for_load().await
    }

    pub async fn login_as(&self, email: &str, password: &str) -> Result<()> {
        self.fill_email(email).await?;
        self.fill_password(password).await?;
        self.submit().await
    }

    pub async fn email_error_message(&self) -> Result<String> {
        self.get_text_with_retry(&EMAIL_MESSAGE).await
    }

    pub async fn password_error_message(&self) -> Result<String> {
        self.get_text_with_retry(&PASSWORD_MESSAGE).await
    }

    /// Asserts both inline errors contain the expected fragments.
    pub async fn assert_error_messages(&self, expected_email: &str, expected_password: &str) -> Result<()> {
        let email = self.email_error_message().await?;
        let password = self.password_error_message().await?;
        contains_or_fail(LoginField::Email, &email, expected_email)?;
        contains_or_fail(LoginField::Password, &password, expected_password)
    }

    /// Checks whether `field` shows an inline error.
    ///
    /// With `should_exist` the message must be visible and, when `expected`
    /// is given, contain it. Without it a missing or hidden message passes; a
    /// visible one must be blank.
    pub async fn assert_error_message_presence(
        &self,
        field: LoginField,
        should_exist: bool,
        expected: Option<&str>,
    ) -> Result<()> {
        let message = field.message();

        if should_exist {
            self.assert_element_visible(&message).await?;
            if let Some(expected) = expected {
                let text = self.get_text_with_retry(&message).await?;
                contains_or_fail(field, &text, expected)?;
            }
            return Ok(());
        }

        match self.tab().is_visible(&message).await {
            Ok(true) => {
                let text = self.get_text_with_retry(&message).await?;
                if text.trim().is_empty() {
                    Ok(())
                } else {
                    Err(Error::assertion(
                        format!("{} error shown where none was expected", field),
                        "no message",
                        text.trim(),
                    ))
                }
            }
            Ok(false) => Ok(()),
            Err(e) => {
                tracing::debug!("{} error element unavailable, treating as no error: {}", field, e);
                Ok(())
            }
        }
    }

    /// Asserts the member page was reached.
    pub async fn assert_login_success(&self) -> Result<()> {
        self.assert_current_url(&Regex::new("mypage")?).await?;
        self.assert_element_visible(&MYPAGE_HEADING).await
    }

    /// Asserts the tab is still on the login page.
    pub async fn assert_login_failure(&self) -> Result<()> {
        self.assert_current_url(&Regex::new("/login")?).await
    }

    /// Submits the case's credentials and checks the expected outcome and
    /// per-field errors.
    pub async fn execute_login_test(&self, case: &LoginTestCase) -> Result<()> {
        self.login_as(case.email, case.password).await?;

        match case.expected_outcome {
            LoginOutcome::Success => self.assert_login_success().await,
            LoginOutcome::Failure => {
                self.assert_login_failure().await?;
                for (field, expected) in [
                    (LoginField::Email, case.expected_email_error),
                    (LoginField::Password, case.expected_password_error),
                ] {
                    if expected.is_empty() {
                        self.assert_error_message_presence(field, false, None).await?;
                    } else {
                        self.assert_error_message_presence(field, true, Some(expected))
                            .await?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn contains_or_fail(field: LoginField, actual: &str, expected: &str) -> Result<()> {
    if actual.contains(expected) {
        Ok(())
    } else {
        Err(Error::assertion(
            format!("{} error message does not contain the expected text", field),
            expected,
            actual,
        ))
    }
}
