// Data-driven login cases

use crate::error::Result;
use crate::fixtures::login::{LoginOutcome, LoginTestCase};
use crate::pages::LoginPage;
use crate::report::{ReportSink, run_step};

/// Records the case inputs, then logs in and checks the outcome.
///
/// The password is only ever reported masked.
pub async fn run_login_case(
    page: &LoginPage,
    case: &LoginTestCase,
    report: &mut dyn ReportSink,
) -> Result<()> {
    report.parameter("メールアドレス", case.email);
    report.parameter("パスワード", &case.masked_password());
    report.parameter(
        "期待結果",
        match case.expected_outcome {
            LoginOutcome::Success => "success",
            LoginOutcome::Failure => "failure",
        },
    );

    run_step(report, "ログインページを開く", page.goto()).await?;
    run_step(
        report,
        &format!("ログインを試行: {}", case.name),
        page.execute_login_test(case),
    )
    .await
}
