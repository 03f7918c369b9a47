use crate::playlist;
use crate::types::ScanSummary;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use ::time::{format_description::well_known, OffsetDateTime};

/// Paths of the files produced by [`write_results`].
#[derive(Debug, Clone)]
pub struct SavedResults {
    pub reachable_path: PathBuf,
    pub unreachable_path: PathBuf,
    pub report_path: PathBuf,
}

/// Derive the results directory from the playlist locator:
/// `channels.m3u` -> `channels_scan_results`, URLs -> `playlist_scan_results`.
pub fn default_output_dir(locator: &str) -> PathBuf {
    let stem = if locator.starts_with("http://") || locator.starts_with("https://") {
        "playlist".to_string()
    } else {
        Path::new(locator)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "playlist".to_string())
    };
    PathBuf::from(format!("{stem}_scan_results"))
}

/// Write the two manifest fragments and the text report into `dir`.
///
/// The fragments reuse each entry's original header line, so feeding them
/// back through the parser reproduces the same entries. A failure here does
/// not invalidate the in-memory summary; the caller just reports it.
pub fn write_results(dir: &Path, locator: &str, summary: &ScanSummary) -> Result<SavedResults> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create results directory: {}", dir.display()))?;

    let reachable_path = dir.join("reachable_channels.m3u");
    fs::write(&reachable_path, playlist::fragment_str(&summary.reachable))
        .with_context(|| format!("failed to write {}", reachable_path.display()))?;

    let unreachable_entries: Vec<_> = summary
        .unreachable
        .iter()
        .map(|u| u.entry.clone())
        .collect();
    let unreachable_path = dir.join("unreachable_channels.m3u");
    fs::write(&unreachable_path, playlist::fragment_str(&unreachable_entries))
        .with_context(|| format!("failed to write {}", unreachable_path.display()))?;

    let report_path = dir.join("scan_report.txt");
    fs::write(&report_path, render_report(locator, summary))
        .with_context(|| format!("failed to write {}", report_path.display()))?;

    Ok(SavedResults {
        reachable_path,
        unreachable_path,
        report_path,
    })
}

/// Plain-text summary: totals plus one numbered block per unreachable entry.
pub fn render_report(locator: &str, summary: &ScanSummary) -> String {
    let mut s = String::new();
    s.push_str(&format!("M3U scan report for: {locator}\n"));
    s.push_str(&format!("Date: {}\n", now_iso_like()));
    s.push_str(&format!("Total channels: {}\n", summary.total));
    s.push_str(&format!("Reachable channels: {}\n", summary.reachable_count));
    s.push_str(&format!(
        "Unreachable channels: {}\n\n",
        summary.unreachable_count
    ));

    s.push_str(&"=".repeat(60));
    s.push_str("\nUNREACHABLE CHANNELS:\n");
    s.push_str(&"=".repeat(60));
    s.push('\n');
    for (i, u) in summary.unreachable.iter().enumerate() {
        s.push_str(&format!("{}. {}\n", i + 1, u.entry.name));
        s.push_str(&format!("   Address: {}\n", u.entry.address));
        s.push_str(&format!("   Error: {}\n\n", u.diagnostic));
    }
    s
}

fn now_iso_like() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
