// Shared setup for the browser-backed tests

#![allow(dead_code)]

use std::path::Path;

use planisphere_e2e::{Session, SuiteConfig};

/// Suite configuration pointed at `base_url`, writing Allure results to
/// `results_dir`.
pub fn config_for(base_url: &str, results_dir: &Path) -> SuiteConfig {
    let base_url = base_url.to_string();
    let results_dir = results_dir.display().to_string();
    SuiteConfig::from_lookup(|key| match key {
        "HOTEL_BASE_URL" => Some(base_url.clone()),
        "ALLURE_RESULTS_DIR" => Some(results_dir.clone()),
        _ => std::env::var(key).ok(),
    })
    .expect("Failed to build suite config")
}

/// Starts tracing and launches a browser session against `base_url`.
pub async fn launch(base_url: &str, results_dir: &Path) -> Session {
    planisphere_e2e::init_test_tracing();
    Session::launch(&config_for(base_url, results_dir))
        .await
        .expect("Failed to launch browser session")
}

/// Number of Allure result files written to `dir`.
pub fn result_file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_name().to_string_lossy().ends_with("-result.json"))
                .count()
        })
        .unwrap_or(0)
}
