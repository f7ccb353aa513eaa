// Screenshot baselines
//
// The first capture of a name becomes its baseline; later captures are
// compared pixel by pixel against it.

use std::path::Path;

use image::{GenericImageView, Rgba};

use crate::error::{Error, Result};
use crate::pages::BasePage;

/// Per-channel difference below which two pixels count as equal.
pub const COLOR_TOLERANCE: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapshotOutcome {
    /// No baseline existed; the capture was stored as one
    BaselineCreated,
    /// Share of pixels that differed, within tolerance
    Matched { diff_ratio: f64 },
}

/// Takes a full-page screenshot once the network is idle and checks it
/// against `<dir>/<name>`.
///
/// On mismatch the capture is written next to the baseline as
/// `<name>.actual.png` and an assertion error is returned.
pub async fn capture_snapshot(
    page: &BasePage,
    name: &str,
    dir: &Path,
    max_diff_ratio: f64,
) -> Result<SnapshotOutcome> {
    page.wait_for_load().await?;
    let actual = page.tab().screenshot(true).await?;
    let baseline_path = dir.join(name);

    if !tokio::fs::try_exists(&baseline_path).await? {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&baseline_path, &actual).await?;
        tracing::info!("created baseline {}", baseline_path.display());
        return Ok(SnapshotOutcome::BaselineCreated);
    }

    let expected = tokio::fs::read(&baseline_path).await?;
    match compare_png(&actual, &expected, max_diff_ratio) {
        Ok(diff_ratio) => Ok(SnapshotOutcome::Matched { diff_ratio }),
        Err(e) => {
            let actual_path = dir.join(format!("{}.actual.png", name));
            if let Err(write_err) = tokio::fs::write(&actual_path, &actual).await {
                tracing::warn!("could not save {}: {}", actual_path.display(), write_err);
            }
            Err(e.context(format!("snapshot '{}'", name)))
        }
    }
}

/// Decodes both PNGs and returns the share of differing pixels, or an
/// assertion error when the dimensions differ or the share exceeds
/// `max_diff_ratio`.
pub fn compare_png(actual: &[u8], expected: &[u8], max_diff_ratio: f64) -> Result<f64> {
    let actual = image::load_from_memory(actual)?;
    let expected = image::load_from_memory(expected)?;

    let (width, height) = actual.dimensions();
    let (exp_width, exp_height) = expected.dimensions();
    if (width, height) != (exp_width, exp_height) {
        return Err(Error::assertion(
            "screenshot dimensions differ from the baseline",
            format!("{}x{}", exp_width, exp_height),
            format!("{}x{}", width, height),
        ));
    }

    let total = u64::from(width) * u64::from(height);
    if total == 0 {
        return Ok(0.0);
    }

    let actual = actual.to_rgba8();
    let expected = expected.to_rgba8();
    let differing = actual
        .pixels()
        .zip(expected.pixels())
        .filter(|(a, e)| !pixels_match(**a, **e))
        .count() as u64;

    let ratio = differing as f64 / total as f64;
    if ratio > max_diff_ratio {
        return Err(Error::assertion(
            "screenshot differs from the baseline",
            format!("<= {:.4} of pixels", max_diff_ratio),
            format!("{:.4} ({} of {} pixels)", ratio, differing, total),
        ));
    }
    Ok(ratio)
}

fn pixels_match(a: Rgba<u8>, b: Rgba<u8>) -> bool {
    a.0.iter()
        .zip(b.0.iter())
        .all(|(x, y)| x.abs_diff(*y) <= COLOR_TOLERANCE)
}
