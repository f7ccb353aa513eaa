// Login cases against the local mock site
//
// Tests cover:
// - every data-driven login case, each as its own Allure result
// - successful login lands on the member page
// - masked password in the recorded parameters
// - the member page redirects visitors without a session to the top page

mod common;

use hotel_site::{HotelSite, SESSION_COOKIE};
use planisphere_e2e::fixtures::login::VALID_USER;
use planisphere_e2e::{BasePage, CaseMeta, LOGIN_TEST_CASES, LoginPage, run_login_case};
use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Plain HTTP/1.1 GET against the mock site, returning the raw response.
async fn raw_get(site: &HotelSite, path: &str, cookie: Option<&str>) -> anyhow::Result<String> {
    let authority = site.url().trim_start_matches("http://").to_string();
    let mut stream = tokio::net::TcpStream::connect(&authority).await?;
    let cookie = cookie.map(|c| format!("Cookie: {c}\r\n")).unwrap_or_default();
    let request =
        format!("GET {path} HTTP/1.1\r\nHost: {authority}\r\n{cookie}Connection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;

    let mut response = String::new();
    stream.read_to_string(&mut response).await?;
    Ok(response)
}

#[tokio::test]
async fn test_mock_member_page_requires_session_cookie() -> anyhow::Result<()> {
    let site = HotelSite::start().await;

    for path in ["/ja/mypage", "/ja/mypage.html"] {
        let response = raw_get(&site, path, None).await?;
        let head = response.to_ascii_lowercase();
        assert!(head.starts_with("http/1.1 303"), "{path}: {response}");
        assert!(head.contains("location: /ja/index.html"), "{path}: {response}");
    }

    let cookie = format!("{SESSION_COOKIE}=ichiro");
    let response = raw_get(&site, "/ja/mypage.html", Some(&cookie)).await?;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("<h2>マイページ</h2>"));

    site.shutdown();
    Ok(())
}

#[tokio::test]
#[ignore = "requires Playwright browsers"]
async fn test_login_cases() -> anyhow::Result<()> {
    let site = HotelSite::start().await;
    let results = tempfile::tempdir()?;
    let session = common::launch(&site.url(), results.path()).await;
    let settings = session.settings().clone();

    for case in LOGIN_TEST_CASES {
        let meta = CaseMeta::new()
            .epic("HOTEL PLANISPHERE")
            .feature("ログイン")
            .story(case.name)
            .severity(case.severity)
            .tags(case.tags.iter().copied());
        let settings = settings.clone();
        session
            .run_case(case.name, &meta, |tab, report| {
                Box::pin(async move {
                    let page = LoginPage::new(tab, settings);
                    run_login_case(&page, case, report).await
                })
            })
            .await?;
    }

    assert_eq!(common::result_file_count(results.path()), LOGIN_TEST_CASES.len());

    session.close().await?;
    site.shutdown();
    Ok(())
}

#[tokio::test]
#[ignore = "requires Playwright browsers"]
async fn test_valid_login_reaches_member_page_and_logs_out() -> anyhow::Result<()> {
    let site = HotelSite::start().await;
    let results = tempfile::tempdir()?;
    let session = common::launch(&site.url(), results.path()).await;

    let case_tab = session.new_tab().await?;
    let page = LoginPage::new(case_tab.tab.clone(), session.settings().clone());
    page.goto().await?;
    page.login_as(VALID_USER.email, VALID_USER.password).await?;
    page.assert_login_success().await?;

    page.logout().await?;
    page.wait_for_load().await?;
    assert!(case_tab.tab.url().ends_with("/ja/index.html"));

    case_tab.close().await?;
    session.close().await?;
    site.shutdown();
    Ok(())
}

#[tokio::test]
#[ignore = "requires Playwright browsers"]
async fn test_member_page_without_login_redirects_to_top() -> anyhow::Result<()> {
    let site = HotelSite::start().await;
    let results = tempfile::tempdir()?;
    let session = common::launch(&site.url(), results.path()).await;

    let case_tab = session.new_tab().await?;
    let page = BasePage::new(case_tab.tab.clone(), session.settings().clone());
    page.goto_path("/ja/mypage").await?;
    page.wait_for_load().await?;

    page.assert_current_url(&Regex::new("/index")?).await?;
    assert!(case_tab.tab.url().ends_with("/ja/index.html"));

    case_tab.close().await?;
    session.close().await?;
    site.shutdown();
    Ok(())
}

#[tokio::test]
#[ignore = "requires Playwright browsers"]
async fn test_wrong_password_stays_on_login_page() -> anyhow::Result<()> {
    let site = HotelSite::start().await;
    let results = tempfile::tempdir()?;
    let session = common::launch(&site.url(), results.path()).await;

    let case_tab = session.new_tab().await?;
    let page = LoginPage::new(case_tab.tab.clone(), session.settings().clone());
    page.goto().await?;
    page.login_as(VALID_USER.email, "wrongpassword").await?;

    page.assert_login_failure().await?;
    page.assert_error_messages(
        "メールアドレスまたはパスワードが違います",
        "メールアドレスまたはパスワードが違います",
    )
    .await?;

    case_tab.close().await?;
    session.close().await?;
    site.shutdown();
    Ok(())
}
