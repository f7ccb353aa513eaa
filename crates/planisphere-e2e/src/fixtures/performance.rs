// Pages and navigations timed by the performance checks

use crate::pages::NavTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLoadTarget {
    pub path: &'static str,
    pub name: &'static str,
}

pub static MAIN_PAGES: &[PageLoadTarget] = &[
    PageLoadTarget {
        path: crate::pages::index::PATH,
        name: "トップページ",
    },
    PageLoadTarget {
        path: crate::pages::plans::PATH,
        name: "プラン一覧ページ",
    },
    PageLoadTarget {
        path: crate::pages::login::PATH,
        name: "ログインページ",
    },
];

/// A header navigation whose response time is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationAction {
    pub target: NavTarget,
    pub description: &'static str,
}

/// Starting from the top page: plans, back home, then login.
pub static NAVIGATION_ACTIONS: &[NavigationAction] = &[
    NavigationAction {
        target: NavTarget::Plans,
        description: "宿泊プランページへの遷移",
    },
    NavigationAction {
        target: NavTarget::Home,
        description: "トップページへの遷移",
    },
    NavigationAction {
        target: NavTarget::Login,
        description: "ログインページへの遷移",
    },
];

/// Login form submission, from the click until the member page settles.
pub const LOGIN_SUBMIT: &str = "ログイン処理";

/// Plan selection, from the reserve click until the new tab settles.
pub const PLAN_SELECTION: &str = "予約画面表示";
