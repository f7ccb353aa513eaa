// Browser tab seam
//
// Page objects never touch the automation engine directly. They describe
// elements with `Selector` values and act through `BrowserTab`, which the
// Playwright backend implements against a live browser.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub mod playwright;

#[cfg(test)]
pub(crate) mod fake;

pub use playwright::PlaywrightTab;

/// Shared handle to one browser tab.
///
/// Several page objects may be bound to the same tab (the reserve and
/// confirm screens live in the popup opened by plan selection).
pub type TabHandle = Arc<dyn BrowserTab>;

/// ARIA roles the suite locates elements by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AriaRole {
    Button,
    Checkbox,
    Heading,
    Link,
    Spinbutton,
    Textbox,
}

impl AriaRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AriaRole::Button => "button",
            AriaRole::Checkbox => "checkbox",
            AriaRole::Heading => "heading",
            AriaRole::Link => "link",
            AriaRole::Spinbutton => "spinbutton",
            AriaRole::Textbox => "textbox",
        }
    }
}

/// Element locator, resolved lazily by the tab on every call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (Playwright pseudo-classes allowed)
    Css(Cow<'static, str>),
    /// Element by ARIA role and accessible name (case-insensitive substring)
    Role {
        role: AriaRole,
        name: Cow<'static, str>,
    },
    /// Element by its text, exact or substring
    Text { text: Cow<'static, str>, exact: bool },
    /// `scope` element owning a `child` whose text is exactly `text`
    HasText {
        scope: Cow<'static, str>,
        child: Cow<'static, str>,
        text: Cow<'static, str>,
    },
    /// `inner` resolved inside the subtree of `outer`
    Within(Box<Selector>, Box<Selector>),
}

impl Selector {
    pub const fn css(css: &'static str) -> Self {
        Selector::Css(Cow::Borrowed(css))
    }

    pub const fn role(role: AriaRole, name: &'static str) -> Self {
        Selector::Role {
            role,
            name: Cow::Borrowed(name),
        }
    }

    pub const fn exact_text(text: &'static str) -> Self {
        Selector::Text {
            text: Cow::Borrowed(text),
            exact: true,
        }
    }

    /// Case-insensitive substring text match.
    pub fn text(text: impl Into<String>) -> Self {
        Selector::Text {
            text: Cow::Owned(text.into()),
            exact: false,
        }
    }

    /// By-role locator with a runtime name (checkbox labels, plan names).
    pub fn role_named(role: AriaRole, name: impl Into<String>) -> Self {
        Selector::Role {
            role,
            name: Cow::Owned(name.into()),
        }
    }

    pub fn has_text(scope: &'static str, child: &'static str, text: impl Into<String>) -> Self {
        Selector::HasText {
            scope: Cow::Borrowed(scope),
            child: Cow::Borrowed(child),
            text: Cow::Owned(text.into()),
        }
    }

    /// Scopes `inner` to this selector's subtree.
    pub fn within(&self, inner: Selector) -> Self {
        Selector::Within(Box::new(self.clone()), Box::new(inner))
    }
}

/// Quotes a string for Playwright's selector engines.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(css) => f.write_str(css),
            Selector::Role { role, name } => {
                write!(f, "internal:role={}[name={}i]", role.as_str(), quote(name))
            }
            Selector::Text { text, exact } => {
                write!(f, "internal:text={}{}", quote(text), if *exact { "s" } else { "i" })
            }
            Selector::HasText { scope, child, text } => {
                write!(f, "{}:has({}:text-is({}))", scope, child, quote(text))
            }
            Selector::Within(outer, inner) => write!(f, "{} >> {}", outer, inner),
        }
    }
}

/// What the suite needs from one browser tab.
///
/// Every method is a single engine round trip; waiting and retrying live in
/// [`crate::wait`] and [`crate::retry`].
#[async_trait]
pub trait BrowserTab: Send + Sync {
    /// Last committed URL.
    fn url(&self) -> String;

    async fn title(&self) -> Result<String>;

    async fn goto(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Resolves once the network has been quiet, or fails with
    /// [`crate::Error::Timeout`].
    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<()>;

    async fn count(&self, selector: &Selector) -> Result<usize>;

    /// Non-waiting visibility check; a missing element is not visible.
    async fn is_visible(&self, selector: &Selector) -> Result<bool>;

    async fn text_content(&self, selector: &Selector) -> Result<Option<String>>;

    /// Text of every element matching the selector, in document order.
    async fn all_text_contents(&self, selector: &Selector) -> Result<Vec<String>>;

    async fn click(&self, selector: &Selector) -> Result<()>;

    async fn fill(&self, selector: &Selector, value: &str) -> Result<()>;

    async fn check(&self, selector: &Selector) -> Result<()>;

    async fn select_option(&self, selector: &Selector, value: &str) -> Result<()>;

    /// Number of elements matching plain CSS whose computed `display` is not
    /// `none`. Presence in the document does not imply visibility.
    async fn displayed_count(&self, css: &str) -> Result<usize>;

    /// Text of the `feedback_css` element inside the parent of the element
    /// with id `field_id`, when that feedback element is displayed.
    async fn displayed_feedback(&self, field_id: &str, feedback_css: &str)
    -> Result<Option<String>>;

    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>>;

    /// Clicks the selector and returns the new tab it opens. A failed click
    /// is reported without waiting for the popup.
    async fn click_expecting_popup(&self, selector: &Selector, timeout: Duration)
    -> Result<TabHandle>;
}

impl fmt::Debug for dyn BrowserTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserTab").field("url", &self.url()).finish()
    }
}
