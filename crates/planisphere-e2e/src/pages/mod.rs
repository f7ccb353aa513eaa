// Page objects, one per screen of the booking flow
//
// Every page wraps a `BasePage` bound to a shared tab handle. The reserve
// and confirm pages live in the tab opened by plan selection, so they are
// built from the handle `PlansPage::select_plan_by_name` returns.

/// Implements `Deref<Target = BasePage>` for a page object with a `base`
/// field, so shared behavior reads as if inherited.
macro_rules! derive_base_page {
    ($page:ty) => {
        impl std::ops::Deref for $page {
            type Target = crate::pages::base::BasePage;

            fn deref(&self) -> &Self::Target {
                &self.base
            }
        }
    };
}

pub(crate) use derive_base_page;

pub mod base;
pub mod confirm;
pub mod index;
pub mod login;
pub mod plans;
pub mod reserve;

pub use base::{BasePage, NavRegistry, NavTarget};
pub use confirm::ConfirmPage;
pub use index::IndexPage;
pub use login::{LoginField, LoginPage};
pub use plans::{PlanDetails, PlanDiagnostics, PlanSummary, PlansPage};
pub use reserve::{ContactMethod, FormAction, ReservePage};
