// Scripted in-memory tab for unit tests
//
// Elements are keyed by their rendered selector string. Clicks can run a
// handler against the tab state, which is how the hotel scripts below model
// navigation, validation and modals without a browser.

use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{BrowserTab, Selector, TabHandle};
use crate::error::{Error, Result};

pub(crate) type ClickHandler = Arc<dyn Fn(&mut FakeState) + Send + Sync>;

#[derive(Debug, Clone)]
pub(crate) struct FakeElement {
    pub text: Option<String>,
    pub visible: bool,
    /// Reads that return an empty string before `text` shows up
    pub blank_reads: u32,
}

impl FakeElement {
    pub fn visible(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            visible: true,
            blank_reads: 0,
        }
    }

    pub fn hidden(text: impl Into<String>) -> Self {
        Self {
            visible: false,
            ..Self::visible(text)
        }
    }

    /// Visible at once, but its text renders only after `blank_reads` reads.
    pub fn rendered_after(text: impl Into<String>, blank_reads: u32) -> Self {
        Self {
            blank_reads,
            ..Self::visible(text)
        }
    }
}

pub(crate) struct FakeState {
    pub url: String,
    pub title: String,
    pub elements: HashMap<String, FakeElement>,
    pub lists: HashMap<String, Vec<String>>,
    pub clicks: HashMap<String, ClickHandler>,
    pub popups: HashMap<String, FakeTab>,
    /// field id -> displayed `.invalid-feedback` text
    pub feedback: BTreeMap<String, String>,
    /// selector -> last filled/selected value
    pub values: HashMap<String, String>,
    pub actions: Vec<String>,
    pub idle_delay: Duration,
    pub never_idle: bool,
    pub fail_screenshots: bool,
    pub screenshots_taken: usize,
    pub screenshot_png: Vec<u8>,
}

impl FakeState {
    pub fn value(&self, selector: &Selector) -> Option<&str> {
        self.values.get(&selector.to_string()).map(String::as_str)
    }

    pub fn insert(&mut self, selector: &Selector, element: FakeElement) {
        self.elements.insert(selector.to_string(), element);
    }

    pub fn on_click(&mut self, selector: &Selector, handler: ClickHandler) {
        self.clicks.insert(selector.to_string(), handler);
    }
}

/// Solid-colour PNG of the given size.
pub(crate) fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}

#[derive(Clone)]
pub(crate) struct FakeTab {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTab {
    pub fn new(url: impl Into<String>) -> Self {
        let state = FakeState {
            url: url.into(),
            title: "HOTEL PLANISPHERE - テスト自動化練習サイト".to_string(),
            elements: HashMap::new(),
            lists: HashMap::new(),
            clicks: HashMap::new(),
            popups: HashMap::new(),
            feedback: BTreeMap::new(),
            values: HashMap::new(),
            actions: Vec::new(),
            idle_delay: Duration::ZERO,
            never_idle: false,
            fail_screenshots: false,
            screenshots_taken: 0,
            screenshot_png: solid_png(4, 4, [255, 255, 255]),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn handle(&self) -> TabHandle {
        Arc::new(self.clone())
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        f(&mut self.state.lock())
    }

    pub fn insert(&self, selector: Selector, element: FakeElement) {
        self.state.lock().insert(&selector, element);
    }

    pub fn set_visible(&self, selector: &Selector, visible: bool) {
        if let Some(element) = self.state.lock().elements.get_mut(&selector.to_string()) {
            element.visible = visible;
        }
    }

    pub fn set_list(&self, selector: Selector, texts: &[&str]) {
        self.state.lock().lists.insert(
            selector.to_string(),
            texts.iter().map(|t| t.to_string()).collect(),
        );
    }

    pub fn on_click(&self, selector: Selector, handler: impl Fn(&mut FakeState) + Send + Sync + 'static) {
        self.state.lock().on_click(&selector, Arc::new(handler));
    }

    pub fn set_popup(&self, selector: Selector, popup: FakeTab) {
        self.state.lock().popups.insert(selector.to_string(), popup);
    }

    pub fn value(&self, selector: &Selector) -> Option<String> {
        self.state.lock().value(selector).map(str::to_string)
    }

    pub fn actions(&self) -> Vec<String> {
        self.state.lock().actions.clone()
    }

    pub fn current_url(&self) -> String {
        self.state.lock().url.clone()
    }
}

#[async_trait]
impl BrowserTab for FakeTab {
    fn url(&self) -> String {
        self.state.lock().url.clone()
    }

    async fn title(&self) -> Result<String> {
        Ok(self.state.lock().title.clone())
    }

    async fn goto(&self, url: &str, _timeout: Duration) -> Result<()> {
        let mut state = self.state.lock();
        state.actions.push(format!("goto {}", url));
        state.url = url.to_string();
        Ok(())
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<()> {
        let (delay, never) = {
            let state = self.state.lock();
            (state.idle_delay, state.never_idle)
        };
        if never || delay > timeout {
            tokio::time::sleep(timeout).await;
            return Err(Error::Timeout(format!("network not idle after {:?}", timeout)));
        }
        tokio::time::sleep(delay).await;
        Ok(())
    }

    async fn count(&self, selector: &Selector) -> Result<usize> {
        let state = self.state.lock();
        let key = selector.to_string();
        if let Some(list) = state.lists.get(&key) {
            return Ok(list.len());
        }
        Ok(usize::from(state.elements.contains_key(&key)))
    }

    async fn is_visible(&self, selector: &Selector) -> Result<bool> {
        let state = self.state.lock();
        Ok(state
            .elements
            .get(&selector.to_string())
            .is_some_and(|element| element.visible))
    }

    async fn text_content(&self, selector: &Selector) -> Result<Option<String>> {
        let mut state = self.state.lock();
        let Some(element) = state.elements.get_mut(&selector.to_string()) else {
            return Err(Error::Timeout(format!("no element matches {}", selector)));
        };
        if element.blank_reads > 0 {
            element.blank_reads -= 1;
            return Ok(Some(String::new()));
        }
        Ok(element.text.clone())
    }

    async fn all_text_contents(&self, selector: &Selector) -> Result<Vec<String>> {
        let state = self.state.lock();
        let key = selector.to_string();
        if let Some(list) = state.lists.get(&key) {
            return Ok(list.clone());
        }
        Ok(state
            .elements
            .get(&key)
            .map(|element| vec![element.text.clone().unwrap_or_default()])
            .unwrap_or_default())
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        let mut state = self.state.lock();
        let key = selector.to_string();
        let handler = state.clicks.get(&key).cloned();
        if handler.is_none() && !state.elements.contains_key(&key) {
            return Err(Error::Timeout(format!("click: no element matches {}", key)));
        }
        state.actions.push(format!("click {}", key));
        if let Some(handler) = handler {
            handler(&mut state);
        }
        Ok(())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> Result<()> {
        let mut state = self.state.lock();
        let key = selector.to_string();
        state.actions.push(format!("fill {} = {}", key, value));
        state.values.insert(key, value.to_string());
        Ok(())
    }

    async fn check(&self, selector: &Selector) -> Result<()> {
        let mut state = self.state.lock();
        let key = selector.to_string();
        state.actions.push(format!("check {}", key));
        state.values.insert(key, "checked".to_string());
        Ok(())
    }

    async fn select_option(&self, selector: &Selector, value: &str) -> Result<()> {
        let mut state = self.state.lock();
        let key = selector.to_string();
        state.actions.push(format!("select {} = {}", key, value));
        state.values.insert(key, value.to_string());
        Ok(())
    }

    async fn displayed_count(&self, css: &str) -> Result<usize> {
        let state = self.state.lock();
        let elements = state
            .elements
            .get(css)
            .map_or(0, |element| usize::from(element.visible));
        let feedback = if css == crate::pages::reserve::INVALID_FEEDBACK {
            state.feedback.len()
        } else {
            0
        };
        Ok(elements + feedback)
    }

    async fn displayed_feedback(
        &self,
        field_id: &str,
        _feedback_css: &str,
    ) -> Result<Option<String>> {
        Ok(self.state.lock().feedback.get(field_id).cloned())
    }

    async fn screenshot(&self, _full_page: bool) -> Result<Vec<u8>> {
        let mut state = self.state.lock();
        if state.fail_screenshots {
            return Err(Error::Timeout("screenshot timed out".into()));
        }
        state.screenshots_taken += 1;
        Ok(state.screenshot_png.clone())
    }

    async fn click_expecting_popup(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<TabHandle> {
        let popup = {
            let mut state = self.state.lock();
            let key = selector.to_string();
            if !state.elements.contains_key(&key) {
                return Err(Error::Timeout(format!("click: no element matches {}", key)));
            }
            state.actions.push(format!("click {}", key));
            state.popups.get(&key).cloned()
        };
        match popup {
            Some(popup) => Ok(popup.handle()),
            None => {
                tokio::time::sleep(timeout).await;
                Err(Error::Timeout(format!("no new tab opened within {:?}", timeout)))
            }
        }
    }
}

/// Scripted screens of the hotel site.
pub(crate) mod hotel {
    use super::*;
    use crate::driver::AriaRole;
    use crate::fixtures::validation::EXPECTED_ERROR_MESSAGES;
    use crate::pages::{base, confirm, login, plans, reserve};

    pub const BASE: &str = "https://hotel.example";

    pub const PLANS: &[(&str, &str)] = &[
        ("お得な特典付きプラン", "お値段 7,000円〜"),
        ("素泊まり", "お値段 6,000円〜"),
        ("出張ビジネスプラン", "お値段 6,000円〜"),
    ];

    pub fn url(path: &str) -> String {
        format!("{}{}", BASE, path)
    }

    /// Index page whose nav links move the tab around the site.
    pub fn index_page() -> FakeTab {
        let tab = FakeTab::new(url("/ja/index"));
        for (target, path) in [
            (base::NavTarget::Home, "/ja/index"),
            (base::NavTarget::Plans, "/ja/plans"),
            (base::NavTarget::Signup, "/ja/signup"),
            (base::NavTarget::Login, "/ja/login"),
        ] {
            let dest = url(path);
            tab.insert(target.selector(), FakeElement::visible(target.name()));
            tab.on_click(target.selector(), move |state| state.url = dest.clone());
        }
        tab
    }

    pub fn login_page() -> FakeTab {
        let tab = FakeTab::new(url("/ja/login"));
        tab.insert(login::EMAIL_MESSAGE, FakeElement::hidden(""));
        tab.insert(login::PASSWORD_MESSAGE, FakeElement::hidden(""));
        tab.on_click(login::LOGIN_BUTTON, submit_login);
        tab
    }

    fn submit_login(state: &mut FakeState) {
        let email = state.value(&login::EMAIL_INPUT).unwrap_or_default().to_string();
        let password = state.value(&login::PASSWORD_INPUT).unwrap_or_default().to_string();

        let mut email_error = String::new();
        let mut password_error = String::new();
        if email.is_empty() {
            email_error = "このフィールドを入力してください。".to_string();
        } else if !email.contains('@') {
            email_error = "メールアドレスを入力してください。".to_string();
        }
        if password.is_empty() {
            password_error = "このフィールドを入力してください。".to_string();
        }

        if email_error.is_empty() && password_error.is_empty() {
            if email == "ichiro@example.com" && password == "password" {
                state.url = url("/ja/mypage.html");
                state.title = "マイページ | HOTEL PLANISPHERE".to_string();
                state.insert(&login::MYPAGE_HEADING, FakeElement::visible("マイページ"));
                return;
            }
            email_error = "メールアドレスまたはパスワードが違います。".to_string();
            password_error = email_error.clone();
        }

        for (selector, text) in [
            (login::EMAIL_MESSAGE, email_error),
            (login::PASSWORD_MESSAGE, password_error),
        ] {
            let element = if text.is_empty() {
                FakeElement::hidden("")
            } else {
                FakeElement::rendered_after(text, 1)
            };
            state.insert(&selector, element);
        }
    }

    /// Plans page whose reserve controls open a reserve tab per plan.
    pub fn plans_page() -> FakeTab {
        let tab = FakeTab::new(url("/ja/plans"));
        let titles: Vec<&str> = PLANS.iter().map(|(name, _)| *name).collect();
        tab.set_list(plans::CARD_TITLES, &titles);

        for (name, price) in PLANS {
            let card = plans::plan_card(name);
            tab.insert(card.clone(), FakeElement::visible(*name));
            tab.insert(card.within(plans::CARD_TITLES), FakeElement::visible(*name));
            tab.insert(card.within(plans::PRICE_TEXT), FakeElement::rendered_after(*price, 2));
            tab.insert(
                card.within(plans::FIRST_CARD_TEXT),
                FakeElement::visible(format!("{}の説明", name)),
            );
            tab.insert(card.within(plans::RESERVE_CONTROL), FakeElement::visible("このプランで予約"));
            tab.set_list(card.within(plans::RESERVE_CONTROL), &["このプランで予約"]);
            tab.set_list(card.within(plans::CARD_LINKS), &["このプランで予約"]);
            tab.set_popup(card.within(plans::RESERVE_CONTROL), reserve_page(name));
        }
        tab
    }

    /// Reserve form with the site's validation rules.
    pub fn reserve_page(plan: &str) -> FakeTab {
        let tab = FakeTab::new(url("/ja/reserve.html?plan-id=0"));
        tab.insert(reserve::DATE_INPUT, FakeElement::visible(""));
        tab.insert(reserve::DATEPICKER_CLOSE, FakeElement::visible("閉じる"));
        tab.insert(reserve::SUBMIT_BUTTON, FakeElement::visible("予約内容を確認する"));
        let plan = plan.to_string();
        tab.on_click(reserve::SUBMIT_BUTTON, move |state| submit_reservation(state, &plan));
        tab
    }

    fn submit_reservation(state: &mut FakeState, plan: &str) {
        let required = EXPECTED_ERROR_MESSAGES.required_field.to_string();
        let mut errors = BTreeMap::new();

        let term = state.value(&reserve::STAY_DAYS_INPUT).unwrap_or("1");
        if term.trim().parse::<i64>().map_or(true, |n| n < 1) {
            errors.insert("term".to_string(), "1以上の値を入力してください。".to_string());
        }
        let name = state.value(&reserve::NAME_INPUT).unwrap_or_default().to_string();
        if name.is_empty() {
            errors.insert("username".to_string(), required.clone());
        }
        let email = state.value(&reserve::EMAIL_INPUT).unwrap_or_default().to_string();
        let tel = state.value(&reserve::TEL_INPUT).unwrap_or_default().to_string();
        let contact = match state.value(&reserve::CONTACT_SELECT).unwrap_or("no") {
            "email" if email.is_empty() => {
                errors.insert("email".to_string(), required.clone());
                String::new()
            }
            "email" if !email.contains('@') => {
                errors.insert(
                    "email".to_string(),
                    EXPECTED_ERROR_MESSAGES.invalid_email.to_string(),
                );
                String::new()
            }
            "email" => format!("メール：{}", email),
            "tel" if tel.is_empty() => {
                errors.insert("tel".to_string(), required.clone());
                String::new()
            }
            "tel" => format!("電話：{}", tel),
            _ => "希望しない".to_string(),
        };

        state.feedback = errors;
        if !state.feedback.is_empty() {
            return;
        }

        state.url = url("/ja/confirm.html");
        state.title = "宿泊予約確認 | HOTEL PLANISPHERE".to_string();
        state.insert(&confirm::PLAN_NAME, FakeElement::rendered_after(plan, 2));
        state.insert(&confirm::GUEST_NAME, FakeElement::rendered_after(format!("{}様", name), 1));
        state.insert(&confirm::CONTACT, FakeElement::visible(contact));
        state.insert(&confirm::CONFIRM_BUTTON, FakeElement::visible("この内容で予約する"));
        state.on_click(&confirm::CONFIRM_BUTTON, Arc::new(open_completion_modal));
    }

    fn open_completion_modal(state: &mut FakeState) {
        state.insert(&confirm::MODAL, FakeElement::visible(""));
        state.insert(
            &confirm::MODAL_BODY,
            FakeElement::visible("ご予約ありがとうございました。ご来館、心よりお待ちしております。"),
        );
        state.insert(&confirm::MODAL_CLOSE, FakeElement::visible("閉じる"));
        state.on_click(
            &confirm::MODAL_CLOSE,
            Arc::new(|state: &mut FakeState| {
                if let Some(modal) = state.elements.get_mut(&confirm::MODAL.to_string()) {
                    modal.visible = false;
                }
            }),
        );
    }

    /// Checkbox for an additional plan on the reserve form.
    pub fn additional_plan(name: &str) -> Selector {
        Selector::role_named(AriaRole::Checkbox, name)
    }
}
