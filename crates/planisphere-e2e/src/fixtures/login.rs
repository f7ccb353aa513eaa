// Login credentials and boundary cases

use serde::Serialize;

use crate::report::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoginCredentials {
    pub email: &'static str,
    pub password: &'static str,
}

/// Registered member of the demo site.
pub const VALID_USER: LoginCredentials = LoginCredentials {
    email: "ichiro@example.com",
    password: "password",
};

pub const INVALID_USER: LoginCredentials = LoginCredentials {
    email: "ichiro@example.com",
    password: "wrongpassword",
};

pub const NON_EXISTENT_USER: LoginCredentials = LoginCredentials {
    email: "nonexistent@example.com",
    password: "password",
};

const AUTH_FAILURE: &str = "メールアドレスまたはパスワードが違います";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginOutcome {
    Success,
    Failure,
}

/// One login attempt and what the site should answer.
///
/// An empty expected error means the field must show no error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginTestCase {
    pub name: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub expected_outcome: LoginOutcome,
    pub expected_email_error: &'static str,
    pub expected_password_error: &'static str,
    pub severity: Severity,
    pub tags: &'static [&'static str],
}

impl LoginTestCase {
    /// Password as it may appear in reports.
    pub fn masked_password(&self) -> String {
        "*".repeat(self.password.chars().count())
    }
}

pub static LOGIN_TEST_CASES: &[LoginTestCase] = &[
    LoginTestCase {
        name: "標準的な有効なログイン情報",
        email: VALID_USER.email,
        password: VALID_USER.password,
        expected_outcome: LoginOutcome::Success,
        expected_email_error: "",
        expected_password_error: "",
        severity: Severity::Critical,
        tags: &["positive", "smoke"],
    },
    LoginTestCase {
        name: "空のメールアドレス",
        email: "",
        password: VALID_USER.password,
        expected_outcome: LoginOutcome::Failure,
        expected_email_error: "このフィールドを入力してください",
        expected_password_error: "",
        severity: Severity::Normal,
        tags: &["negative", "validation", "boundary"],
    },
    LoginTestCase {
        name: "無効な形式のメールアドレス",
        email: "ichiro-example.com",
        password: VALID_USER.password,
        expected_outcome: LoginOutcome::Failure,
        expected_email_error: "メールアドレスを入力してください",
        expected_password_error: "",
        severity: Severity::Normal,
        tags: &["negative", "validation", "format"],
    },
    LoginTestCase {
        name: "存在しないユーザーのメールアドレス",
        email: NON_EXISTENT_USER.email,
        password: NON_EXISTENT_USER.password,
        expected_outcome: LoginOutcome::Failure,
        expected_email_error: AUTH_FAILURE,
        expected_password_error: AUTH_FAILURE,
        severity: Severity::Critical,
        tags: &["negative", "authentication"],
    },
    LoginTestCase {
        name: "空のパスワード",
        email: VALID_USER.email,
        password: "",
        expected_outcome: LoginOutcome::Failure,
        expected_email_error: "",
        expected_password_error: "このフィールドを入力してください",
        severity: Severity::Normal,
        tags: &["negative", "validation", "boundary"],
    },
    LoginTestCase {
        name: "誤ったパスワード",
        email: INVALID_USER.email,
        password: INVALID_USER.password,
        expected_outcome: LoginOutcome::Failure,
        expected_email_error: AUTH_FAILURE,
        expected_password_error: AUTH_FAILURE,
        severity: Severity::Critical,
        tags: &["negative", "authentication"],
    },
    LoginTestCase {
        name: "極端に長いメールアドレス",
        email: "very-very-very-very-very-very-very-very-very-very-long-email-address@example.com",
        password: VALID_USER.password,
        expected_outcome: LoginOutcome::Failure,
        expected_email_error: AUTH_FAILURE,
        expected_password_error: AUTH_FAILURE,
        severity: Severity::Minor,
        tags: &["negative", "boundary", "security"],
    },
    LoginTestCase {
        name: "特殊文字を含むパスワード（XSSパターン）",
        email: VALID_USER.email,
        password: r#"<script>alert("XSS")</script>"#,
        expected_outcome: LoginOutcome::Failure,
        expected_email_error: AUTH_FAILURE,
        expected_password_error: AUTH_FAILURE,
        severity: Severity::Critical,
        tags: &["negative", "security"],
    },
];
