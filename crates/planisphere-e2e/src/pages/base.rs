// Base page object
//
// Navigation, bounded waits and the retry-read shared by every screen.
// Concrete pages wrap a `BasePage` and deref to it.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use regex::Regex;

use crate::config::SiteSettings;
use crate::driver::{AriaRole, Selector, TabHandle};
use crate::error::{Error, Result};
use crate::retry::{self, RetryPolicy};
use crate::wait;

/// Header navigation entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavTarget {
    Home,
    Plans,
    Signup,
    Login,
    Logout,
}

impl NavTarget {
    pub const ALL: [NavTarget; 5] = [
        NavTarget::Home,
        NavTarget::Plans,
        NavTarget::Signup,
        NavTarget::Login,
        NavTarget::Logout,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NavTarget::Home => "home",
            NavTarget::Plans => "plans",
            NavTarget::Signup => "signup",
            NavTarget::Login => "login",
            NavTarget::Logout => "logout",
        }
    }

    pub fn selector(&self) -> Selector {
        match self {
            NavTarget::Home => Selector::role(AriaRole::Link, "ホーム"),
            NavTarget::Plans => Selector::role(AriaRole::Link, "宿泊予約"),
            NavTarget::Signup => Selector::role(AriaRole::Link, "会員登録"),
            NavTarget::Login => Selector::role(AriaRole::Button, "ログイン"),
            NavTarget::Logout => Selector::role(AriaRole::Button, "ログアウト"),
        }
    }
}

impl fmt::Display for NavTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed map from navigation name to locator.
///
/// Built once per page; the key set never changes afterwards.
#[derive(Debug, Clone)]
pub struct NavRegistry {
    entries: Vec<(&'static str, Selector)>,
}

impl NavRegistry {
    pub fn new() -> Self {
        Self {
            entries: NavTarget::ALL
                .iter()
                .map(|target| (target.name(), target.selector()))
                .collect(),
        }
    }

    /// Looks up a navigation entry by name.
    ///
    /// Unknown names fail with [`Error::UnknownNavTarget`] listing what is
    /// registered.
    pub fn resolve(&self, name: &str) -> Result<&Selector> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, selector)| selector)
            .ok_or_else(|| Error::UnknownNavTarget {
                name: name.to_string(),
                registered: self.names().join(", "),
            })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(key, _)| *key).collect()
    }
}

impl Default for NavRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// State and behavior shared by every page object.
#[derive(Clone)]
pub struct BasePage {
    tab: TabHandle,
    settings: SiteSettings,
    nav: NavRegistry,
}

impl BasePage {
    pub fn new(tab: TabHandle, settings: SiteSettings) -> Self {
        Self {
            tab,
            settings,
            nav: NavRegistry::new(),
        }
    }

    /// The tab this page acts on.
    pub fn tab(&self) -> &TabHandle {
        &self.tab
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    pub fn nav(&self) -> &NavRegistry {
        &self.nav
    }

    /// Opens a site path such as `/ja/plans` in this tab.
    pub async fn goto_path(&self, path: &str) -> Result<()> {
        let url = self.settings.url_for(path)?;
        self.tab.goto(&url, self.settings.timeouts.load).await
    }

    /// Waits for the network to go idle.
    ///
    /// A timeout is logged and swallowed: later visibility waits surface
    /// real failures.
    pub async fn wait_for_load(&self) -> Result<()> {
        self.wait_for_load_within(self.settings.timeouts.load).await
    }

    pub async fn wait_for_load_within(&self, timeout: Duration) -> Result<()> {
        match self.tab.wait_for_network_idle(timeout).await {
            Err(e) if e.is_timeout() => {
                tracing::warn!("page did not reach network idle, continuing: {}", e);
                Ok(())
            }
            other => other,
        }
    }

    /// Asserts the tab URL matches `pattern` within the URL timeout.
    pub async fn assert_current_url(&self, pattern: &Regex) -> Result<()> {
        match wait::wait_for_url(self.tab.as_ref(), pattern, self.settings.timeouts.url).await {
            Err(e) if e.is_timeout() => Err(Error::assertion(
                "URL did not match",
                format!("/{}/", pattern.as_str()),
                self.tab.url(),
            )),
            other => other,
        }
    }

    /// Asserts `selector` becomes visible within the visibility timeout.
    pub async fn assert_element_visible(&self, selector: &Selector) -> Result<()> {
        match wait::wait_for_visible(self.tab.as_ref(), selector, self.settings.timeouts.visible)
            .await
        {
            Err(Error::ElementNotFound(_)) => Err(Error::assertion(
                format!("element '{}' did not become visible", selector),
                "visible",
                "not visible",
            )),
            other => other,
        }
    }

    /// Reads text that the site renders after the element appears.
    pub async fn get_text_with_retry(&self, selector: &Selector) -> Result<String> {
        self.get_text_with_policy(selector, RetryPolicy::default()).await
    }

    /// Waits for `selector` to be visible, then re-reads its text while it is
    /// whitespace-only, within `policy`.
    ///
    /// The last value read is returned even if still empty.
    pub async fn get_text_with_policy(
        &self,
        selector: &Selector,
        policy: RetryPolicy,
    ) -> Result<String> {
        wait::wait_for_visible(self.tab.as_ref(), selector, self.settings.timeouts.visible).await?;
        retry::read_until_non_empty(policy, || self.tab.text_content(selector)).await
    }

    pub async fn assert_text_contains(&self, selector: &Selector, expected: &str) -> Result<()> {
        let text = self.get_text_with_retry(selector).await?;
        if text.contains(expected) {
            Ok(())
        } else {
            Err(Error::assertion(
                format!("text of '{}' does not contain the expected value", selector),
                expected,
                text,
            ))
        }
    }

    pub async fn fill_input(&self, selector: &Selector, value: &str) -> Result<()> {
        self.tab.fill(selector, value).await
    }

    pub async fn click_element(&self, selector: &Selector) -> Result<()> {
        self.tab.click(selector).await
    }

    /// Clicks the first element whose text contains `text`.
    pub async fn click_by_text(&self, text: &str) -> Result<()> {
        self.tab.click(&Selector::text(text)).await
    }

    /// Clicks a header navigation entry by name.
    pub async fn click_nav(&self, name: &str) -> Result<()> {
        let selector = self.nav.resolve(name)?;
        tracing::debug!("nav -> {}", name);
        self.tab.click(selector).await
    }

    pub async fn navigate_to(&self, target: NavTarget) -> Result<()> {
        self.click_nav(target.name()).await
    }

    pub async fn navigate_to_home(&self) -> Result<()> {
        self.navigate_to(NavTarget::Home).await
    }

    pub async fn navigate_to_plans(&self) -> Result<()> {
        self.navigate_to(NavTarget::Plans).await
    }

    pub async fn navigate_to_signup(&self) -> Result<()> {
        self.navigate_to(NavTarget::Signup).await
    }

    pub async fn navigate_to_login(&self) -> Result<()> {
        self.navigate_to(NavTarget::Login).await
    }

    pub async fn navigate_to_logout(&self) -> Result<()> {
        self.navigate_to(NavTarget::Logout).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.navigate_to_logout().await
    }

    pub async fn page_title(&self) -> Result<String> {
        self.tab.title().await
    }

    /// Saves a full-page PNG to `path`.
    pub async fn take_screenshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.tab.screenshot(true).await?;
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    /// Best-effort screenshot into the artifacts dir, when one is configured.
    pub async fn save_diagnostic_screenshot(&self, file_name: &str) {
        let Some(dir) = &self.settings.artifacts_dir else {
            return;
        };
        let path = dir.join(file_name);
        match self.take_screenshot(&path).await {
            Ok(()) => tracing::info!("diagnostic screenshot saved to {}", path.display()),
            Err(e) => tracing::warn!("failed to save diagnostic screenshot: {}", e),
        }
    }

    pub async fn debug(&self, message: &str) {
        let title = self
            .page_title()
            .await
            .unwrap_or_else(|e| format!("<title unavailable: {}>", e));
        tracing::debug!(page = %title, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fake::{FakeElement, FakeTab, hotel};
    use crate::report::Status;
    use url::Url;

    fn page_on(tab: &FakeTab) -> BasePage {
        let settings = SiteSettings::new(Url::parse(hotel::BASE).unwrap());
        BasePage::new(tab.handle(), settings)
    }

    #[test]
    fn test_unknown_nav_target_lists_registered_names() {
        let registry = NavRegistry::new();
        let err = registry.resolve("contact").unwrap_err();
        match err {
            Error::UnknownNavTarget { name, registered } => {
                assert_eq!(name, "contact");
                assert_eq!(registered, "home, plans, signup, login, logout");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_registry_resolves_every_target() {
        let registry = NavRegistry::new();
        for target in NavTarget::ALL {
            assert_eq!(registry.resolve(target.name()).unwrap(), &target.selector());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_nav_unknown_is_an_error_not_a_noop() {
        let tab = hotel::index_page();
        let page = page_on(&tab);
        assert!(matches!(
            page.click_nav("mypage").await,
            Err(Error::UnknownNavTarget { .. })
        ));
        assert!(tab.actions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigate_and_assert_url() {
        let tab = hotel::index_page();
        let page = page_on(&tab);

        page.navigate_to_plans().await.unwrap();
        page.assert_current_url(&Regex::new("/plans").unwrap()).await.unwrap();

        page.navigate_to_home().await.unwrap();
        page.navigate_to_signup().await.unwrap();
        page.assert_current_url(&Regex::new("/signup").unwrap()).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_assert_current_url_reports_mismatch() {
        let tab = hotel::index_page();
        let page = page_on(&tab);
        let err = page
            .assert_current_url(&Regex::new("mypage").unwrap())
            .await
            .unwrap_err();
        match err {
            Error::Assertion { expected, actual, .. } => {
                assert_eq!(expected, "/mypage/");
                assert_eq!(actual, "https://hotel.example/ja/index");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_element_fails_visibility_assertion() {
        let tab = FakeTab::new(hotel::url("/ja/mypage.html"));
        let page = page_on(&tab);

        let result = page.assert_element_visible(&Selector::css("h2")).await;
        assert_eq!(Status::of(&result), Status::Failed);
        match result {
            Err(Error::Assertion { message, expected, actual }) => {
                assert!(message.contains("'h2'"));
                assert_eq!(expected, "visible");
                assert_eq!(actual, "not visible");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_load_timeout_is_not_fatal() {
        let tab = FakeTab::new(hotel::url("/ja/index"));
        tab.with_state(|state| state.never_idle = true);
        let page = page_on(&tab);
        page.wait_for_load_within(Duration::from_secs(2)).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_text_with_retry_waits_for_render() {
        let tab = FakeTab::new(hotel::url("/ja/confirm.html"));
        tab.insert(Selector::css("#plan-name"), FakeElement::rendered_after("素泊まり", 5));
        let page = page_on(&tab);

        let text = page.get_text_with_retry(&Selector::css("#plan-name")).await.unwrap();
        assert_eq!(text, "素泊まり");
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_text_with_retry_returns_empty_after_exhausting_attempts() {
        let tab = FakeTab::new(hotel::url("/ja/confirm.html"));
        tab.insert(Selector::css("#contact"), FakeElement::rendered_after("late", 50));
        let page = page_on(&tab);

        let text = page
            .get_text_with_policy(&Selector::css("#contact"), RetryPolicy::new(3, Duration::from_millis(200)))
            .await
            .unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_assert_text_contains_carries_actual_text() {
        let tab = FakeTab::new(hotel::url("/ja/index"));
        tab.insert(Selector::css("h2"), FakeElement::visible("ログイン"));
        let page = page_on(&tab);

        page.assert_text_contains(&Selector::css("h2"), "ログ").await.unwrap();
        let err = page
            .assert_text_contains(&Selector::css("h2"), "マイページ")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("actual: ログイン"));
    }

    #[tokio::test]
    async fn test_take_screenshot_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let tab = FakeTab::new(hotel::url("/ja/index"));
        let page = page_on(&tab);

        let path = dir.path().join("shots/index.png");
        page.take_screenshot(&path).await.unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
