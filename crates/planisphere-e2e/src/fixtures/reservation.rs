// Reservation data and end-to-end cases

use std::sync::LazyLock;

use serde::Serialize;

use crate::pages::reserve::ContactMethod;
use crate::report::Severity;

/// Text the completion modal shows after a successful booking.
pub const COMPLETION_MESSAGE: &str = "ご来館、心よりお待ちしております";

/// Everything the reserve form is filled with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationData {
    pub plan_name: String,
    pub check_in_date: String,
    pub stay_days: String,
    pub guests: String,
    pub additional_plans: Vec<String>,
    pub guest_name: String,
    pub contact: ContactMethod,
    pub email: String,
    pub tel: String,
    pub remarks: String,
}

impl ReservationData {
    /// What the confirm page shows as the contact detail.
    pub fn contact_detail(&self) -> &str {
        match self.contact {
            ContactMethod::Email => &self.email,
            ContactMethod::Tel => &self.tel,
            ContactMethod::None => "",
        }
    }
}

impl Default for ReservationData {
    fn default() -> Self {
        DEFAULT_RESERVATION.clone()
    }
}

pub static DEFAULT_RESERVATION: LazyLock<ReservationData> = LazyLock::new(|| ReservationData {
    plan_name: "お得な特典付きプラン".to_string(),
    check_in_date: "2025/04/01".to_string(),
    stay_days: "2".to_string(),
    guests: "2".to_string(),
    additional_plans: vec!["朝食バイキング".to_string(), "お得な観光プラン".to_string()],
    guest_name: "テスト太郎".to_string(),
    contact: ContactMethod::Email,
    email: "test@example.com".to_string(),
    tel: String::new(),
    remarks: "静かな部屋を希望します".to_string(),
});

/// Field overrides for one reservation run; `None` keeps the default.
#[derive(Debug, Clone, Copy)]
pub struct ReservationOverrides {
    pub plan_name: Option<&'static str>,
    pub check_in_date: Option<&'static str>,
    pub stay_days: Option<&'static str>,
    pub guests: Option<&'static str>,
    pub additional_plans: Option<&'static [&'static str]>,
    pub guest_name: Option<&'static str>,
    pub contact: Option<ContactMethod>,
    pub email: Option<&'static str>,
    pub tel: Option<&'static str>,
    pub remarks: Option<&'static str>,
}

impl Default for ReservationOverrides {
    fn default() -> Self {
        Self::NONE
    }
}

impl ReservationOverrides {
    /// Keeps every default.
    pub const NONE: Self = Self {
        plan_name: None,
        check_in_date: None,
        stay_days: None,
        guests: None,
        additional_plans: None,
        guest_name: None,
        contact: None,
        email: None,
        tel: None,
        remarks: None,
    };

    /// Applies the overrides onto `base`.
    pub fn apply(&self, base: &ReservationData) -> ReservationData {
        let pick = |value: Option<&'static str>, default: &String| {
            value.map_or_else(|| default.clone(), str::to_string)
        };
        ReservationData {
            plan_name: pick(self.plan_name, &base.plan_name),
            check_in_date: pick(self.check_in_date, &base.check_in_date),
            stay_days: pick(self.stay_days, &base.stay_days),
            guests: pick(self.guests, &base.guests),
            additional_plans: self.additional_plans.map_or_else(
                || base.additional_plans.clone(),
                |plans| plans.iter().map(|p| p.to_string()).collect(),
            ),
            guest_name: pick(self.guest_name, &base.guest_name),
            contact: self.contact.unwrap_or(base.contact),
            email: pick(self.email, &base.email),
            tel: pick(self.tel, &base.tel),
            remarks: pick(self.remarks, &base.remarks),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReservationTestCase {
    pub name: &'static str,
    pub description: &'static str,
    pub overrides: ReservationOverrides,
    pub expect_success: bool,
    /// Substring the failure message must contain, for negative cases
    pub expected_error: Option<&'static str>,
    pub severity: Severity,
    pub tags: &'static [&'static str],
}

pub static RESERVATION_TEST_CASES: &[ReservationTestCase] = &[
    ReservationTestCase {
        name: "標準的な予約フローが正常に完了すること",
        description: "プラン選択から予約入力、確認、完了までの一連のE2Eフロー検証",
        overrides: ReservationOverrides::NONE,
        expect_success: true,
        expected_error: None,
        severity: Severity::Critical,
        tags: &["smoke", "e2e", "regression", "booking", "positive"],
    },
    ReservationTestCase {
        name: "電話番号を連絡先として予約が完了すること",
        description: "連絡方法を電話番号に設定した場合の予約フロー",
        overrides: ReservationOverrides {
            contact: Some(ContactMethod::Tel),
            email: Some(""),
            tel: Some("03-1234-5678"),
            ..ReservationOverrides::NONE
        },
        expect_success: true,
        expected_error: None,
        severity: Severity::Normal,
        tags: &["e2e", "regression", "booking", "positive"],
    },
    ReservationTestCase {
        name: "氏名が未入力の場合は確認画面へ進めないこと",
        description: "必須項目の氏名を空のまま送信した場合、フローが確認画面で失敗することを検証",
        overrides: ReservationOverrides {
            guest_name: Some(""),
            ..ReservationOverrides::NONE
        },
        expect_success: false,
        expected_error: Some("confirm"),
        severity: Severity::Normal,
        tags: &["e2e", "booking", "negative"],
    },
];
