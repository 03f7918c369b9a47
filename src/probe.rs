use crate::types::{ProbeOutcome, StreamEntry};
use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Diagnostics longer than this are cut and marked with an ellipsis.
const MAX_DIAGNOSTIC_CHARS: usize = 100;

/// Build the HTTP client shared by all probe workers of one scan.
/// Redirects are followed with reqwest's default policy, so an in-range
/// redirect counts as part of the probe itself.
pub fn new_client() -> Result<Client> {
    Client::builder()
        .build()
        .context("failed to build HTTP client")
}

/// Check whether one entry's address is reachable.
///
/// - `http`/`https` addresses get a HEAD request first; if that fails at the
///   transport level, a streaming GET is tried whose body is never read.
///   Reachable means a status in `[200, 400)`.
/// - Any other scheme is checked structurally only: the address must parse
///   with a scheme and a host. No network traffic for those.
///
/// Every path returns an outcome; this function never errors past its
/// boundary. The caller owns concurrency; only the per-request `timeout`
/// is applied here.
pub async fn probe_entry(client: &Client, entry: &StreamEntry, timeout: Duration) -> ProbeOutcome {
    let (reachable, diagnostic) = match Url::parse(&entry.address) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            match probe_http(client, url, timeout).await {
                Ok(status) if status_ok(status) => (true, String::new()),
                Ok(status) => (false, format!("Status code: {}", status.as_u16())),
                Err(e) => (false, truncate_diagnostic(&e.to_string())),
            }
        }
        // Non-HTTP streaming protocols (rtmp, udp, ...): structural check only.
        Ok(url) => {
            if url.has_host() {
                (true, String::new())
            } else {
                (false, "Status code: N/A".to_string())
            }
        }
        Err(_) => (false, "Status code: N/A".to_string()),
    };

    ProbeOutcome {
        entry: entry.clone(),
        reachable,
        diagnostic,
    }
}

/// HEAD first; on any transport failure fall back to a GET and drop the
/// response after the status line, without consuming the payload.
async fn probe_http(client: &Client, url: Url, timeout: Duration) -> reqwest::Result<StatusCode> {
    match client.head(url.clone()).timeout(timeout).send().await {
        Ok(resp) => Ok(resp.status()),
        Err(_) => {
            let resp = client.get(url).timeout(timeout).send().await?;
            Ok(resp.status())
        }
    }
}

fn status_ok(status: StatusCode) -> bool {
    (200..400).contains(&status.as_u16())
}

/// Cut a transport error description down to a readable length.
fn truncate_diagnostic(message: &str) -> String {
    if message.chars().count() > MAX_DIAGNOSTIC_CHARS {
        let cut: String = message.chars().take(MAX_DIAGNOSTIC_CHARS).collect();
        format!("{cut}...")
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(address: &str) -> StreamEntry {
        StreamEntry {
            name: "test".into(),
            raw_header: "#EXTINF:-1,test".into(),
            address: address.into(),
        }
    }

    #[tokio::test]
    async fn rtmp_address_is_structurally_reachable() {
        let client = new_client().unwrap();
        let outcome = probe_entry(
            &client,
            &entry("rtmp://host/app/stream"),
            Duration::from_secs(1),
        )
        .await;
        assert!(outcome.reachable);
        assert!(outcome.diagnostic.is_empty());
    }

    #[tokio::test]
    async fn unparseable_address_is_unreachable() {
        let client = new_client().unwrap();
        let outcome = probe_entry(&client, &entry("not a url"), Duration::from_secs(1)).await;
        assert!(!outcome.reachable);
        assert_eq!(outcome.diagnostic, "Status code: N/A");
    }

    #[tokio::test]
    async fn hostless_scheme_is_unreachable() {
        let client = new_client().unwrap();
        let outcome = probe_entry(&client, &entry("mailto:nobody"), Duration::from_secs(1)).await;
        assert!(!outcome.reachable);
    }

    #[test]
    fn long_diagnostics_are_truncated() {
        let long = "x".repeat(150);
        let cut = truncate_diagnostic(&long);
        assert_eq!(cut.chars().count(), MAX_DIAGNOSTIC_CHARS + 3);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_diagnostic("short"), "short");
    }
}
