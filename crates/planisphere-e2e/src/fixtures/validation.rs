// Reserve form validation cases

use crate::pages::reserve::{ContactMethod, FormAction};
use crate::report::Severity;

/// Inputs shared by the validation cases.
#[derive(Debug, Clone, Copy)]
pub struct ValidationConstants {
    pub invalid_feedback_selector: &'static str,
    pub test_user_name: &'static str,
    pub test_email: &'static str,
    pub test_phone: &'static str,
    pub invalid_email: &'static str,
    pub zero_stay_days: &'static str,
}

pub const VALIDATION_CONSTANTS: ValidationConstants = ValidationConstants {
    invalid_feedback_selector: crate::pages::reserve::INVALID_FEEDBACK,
    test_user_name: "テスト太郎",
    test_email: "test@example.com",
    test_phone: "03-1234-5678",
    invalid_email: "invalid-email",
    zero_stay_days: "0",
};

/// Inline error texts the reserve form shows.
#[derive(Debug, Clone, Copy)]
pub struct ExpectedErrorMessages {
    pub required_field: &'static str,
    pub invalid_stay_days: &'static str,
    pub invalid_email: &'static str,
}

pub const EXPECTED_ERROR_MESSAGES: ExpectedErrorMessages = ExpectedErrorMessages {
    required_field: "このフィールドを入力してください。",
    invalid_stay_days: "1以上の値を入力してください",
    invalid_email: "メールアドレスを入力してください。",
};

/// One validation scenario on the reserve form.
#[derive(Debug, Clone, Copy)]
pub struct ValidationTestCase {
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub issue_id: &'static str,
    pub tags: &'static [&'static str],
    pub setup: &'static [FormAction],
    /// `(field id, expected substring)`; empty means no error expected
    pub expected_errors: &'static [(&'static str, &'static str)],
    /// Valid input that must reach the confirm page
    pub positive: bool,
}

const C: ValidationConstants = VALIDATION_CONSTANTS;
const E: ExpectedErrorMessages = EXPECTED_ERROR_MESSAGES;

pub static VALIDATION_TEST_CASES: &[ValidationTestCase] = &[
    ValidationTestCase {
        name: "宿泊数に0を入力するとエラーメッセージが表示される",
        description: "宿泊数に0を入力した場合、適切なバリデーションエラーメッセージが表示されることを検証します",
        severity: Severity::Critical,
        issue_id: "VAL-101",
        tags: &["validation", "negative", "boundary"],
        setup: &[
            FormAction::StayDays(C.zero_stay_days),
            FormAction::Name(C.test_user_name),
            FormAction::Contact(ContactMethod::Email),
            FormAction::Email(C.test_email),
        ],
        expected_errors: &[("term", E.invalid_stay_days)],
        positive: false,
    },
    ValidationTestCase {
        name: "氏名を入力しないとエラーメッセージが表示される",
        description: "氏名を入力せずにフォームを送信した場合、適切なバリデーションエラーメッセージが表示されることを検証します",
        severity: Severity::Critical,
        issue_id: "VAL-102",
        tags: &["validation", "negative", "required"],
        setup: &[
            FormAction::Contact(ContactMethod::Email),
            FormAction::Email(C.test_email),
        ],
        expected_errors: &[("username", E.required_field)],
        positive: false,
    },
    ValidationTestCase {
        name: "メールアドレスの形式が不正な場合にエラーメッセージが表示される",
        description: "不正な形式のメールアドレスを入力した場合、適切なバリデーションエラーメッセージが表示されることを検証します",
        severity: Severity::Critical,
        issue_id: "VAL-103",
        tags: &["validation", "negative", "format"],
        setup: &[
            FormAction::Name(C.test_user_name),
            FormAction::Contact(ContactMethod::Email),
            FormAction::Email(C.invalid_email),
        ],
        expected_errors: &[("email", E.invalid_email)],
        positive: false,
    },
    ValidationTestCase {
        name: "電話番号を選択したが入力しない場合にエラーメッセージが表示される",
        description: "連絡方法として電話番号を選択したが電話番号を入力しない場合、適切なバリデーションエラーメッセージが表示されることを検証します",
        severity: Severity::Critical,
        issue_id: "VAL-104",
        tags: &["validation", "negative", "required"],
        setup: &[
            FormAction::Name(C.test_user_name),
            FormAction::Contact(ContactMethod::Tel),
        ],
        expected_errors: &[("tel", E.required_field)],
        positive: false,
    },
    ValidationTestCase {
        name: "すべての必須項目に有効な値を入力すると確認ページに遷移する",
        description: "すべての必須項目に有効な値を入力した場合、バリデーションが通過し確認ページに遷移することを検証します",
        severity: Severity::Critical,
        issue_id: "VAL-105",
        tags: &["validation", "positive"],
        setup: &[
            FormAction::Name(C.test_user_name),
            FormAction::Contact(ContactMethod::Email),
            FormAction::Email(C.test_email),
        ],
        expected_errors: &[],
        positive: true,
    },
    ValidationTestCase {
        name: "複数のフィールドにエラーがある場合、すべてのエラーメッセージが表示される",
        description: "複数のフィールドに無効な値がある場合、すべてのフィールドに対応するエラーメッセージが表示されることを検証します",
        severity: Severity::Normal,
        issue_id: "VAL-106",
        tags: &["validation", "negative", "multiple"],
        setup: &[
            FormAction::StayDays(C.zero_stay_days),
            FormAction::Contact(ContactMethod::Email),
        ],
        expected_errors: &[
            ("term", E.invalid_stay_days),
            ("username", E.required_field),
            ("email", E.required_field),
        ],
        positive: false,
    },
];
