use anyhow::{Context, Result};
use std::time::Duration;

/// Load raw playlist text from a filesystem path or an http(s) URL.
///
/// Failures here abort the scan before any entry is processed; the caller
/// reports them and stays re-runnable.
pub async fn load_playlist_text(locator: &str, timeout: Duration) -> Result<String> {
    if locator.starts_with("http://") || locator.starts_with("https://") {
        let client = crate::probe::new_client()?;
        let resp = client
            .get(locator)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("failed to download playlist: {locator}"))?
            .error_for_status()
            .with_context(|| format!("playlist server rejected request: {locator}"))?;
        resp.text()
            .await
            .with_context(|| format!("failed to read playlist body: {locator}"))
    } else {
        tokio::fs::read_to_string(locator)
            .await
            .with_context(|| format!("failed to read playlist file: {locator}"))
    }
}
