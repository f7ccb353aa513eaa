// Top page

use crate::config::SiteSettings;
use crate::driver::TabHandle;
use crate::error::{Error, Result};
use crate::wait;

use super::base::BasePage;
use super::derive_base_page;

pub const PATH: &str = "/ja/index";

/// Fragment every page title of the site carries.
pub const SITE_TITLE: &str = "HOTEL PLANISPHERE";

#[derive(Clone)]
pub struct IndexPage {
    base: BasePage,
}

derive_base_page!(IndexPage);

impl IndexPage {
    pub fn new(tab: TabHandle, settings: SiteSettings) -> Self {
        Self {
            base: BasePage::new(tab, settings),
        }
    }

    pub async fn goto(&self) -> Result<()> {
        self.goto_path(PATH).await
    }

    /// Asserts the document title contains the site name.
    pub async fn assert_title(&self) -> Result<()> {
        let matched = wait::poll_until(
            self.settings().timeouts.visible,
            self.settings().timeouts.poll,
            || async { Ok::<_, Error>(self.page_title().await?.contains(SITE_TITLE)) },
        )
        .await?;
        if matched {
            Ok(())
        } else {
            Err(Error::assertion(
                "page title does not name the site",
                SITE_TITLE,
                self.page_title().await?,
            ))
        }
    }
}
