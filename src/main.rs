use std::path::PathBuf;
use std::time::Duration;

use m3u_scan_rs::types::ScanSummary;
use m3u_scan_rs::{playlist, report, scanner, server, source};

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

/// m3u-scan-rs — Async M3U playlist scanner that checks which streams are reachable.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "m3u-scan-rs",
    version,
    about = "Async M3U playlist scanner that checks which streams are reachable.",
    long_about = None
)]
struct Cli {
    /// Playlist to scan: a local .m3u path or an http(s) URL.
    #[arg(long)]
    playlist: Option<String>,

    /// Per-probe timeout in seconds.
    #[arg(long = "timeout-secs", default_value_t = 5)]
    timeout_secs: u64,

    /// Max concurrent probes.
    #[arg(long, default_value_t = 10)]
    concurrency: usize,

    /// Directory for result fragments and the report.
    /// Defaults to `<playlist stem>_scan_results`.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Skip writing result files; print the summary only.
    #[arg(long = "no-save", default_value_t = false)]
    no_save: bool,

    /// Start the embedded HTTP UI server.
    #[arg(long = "serve-ui", default_value_t = false)]
    serve_ui: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    println!("m3u-scan-rs configuration:");
    println!(
        "  playlist     : {}",
        cli.playlist.as_deref().unwrap_or("<none>")
    );
    println!("  timeout_secs : {}", cli.timeout_secs);
    println!("  concurrency  : {}", cli.concurrency);
    println!(
        "  output       : {}",
        cli.output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<derived from playlist name>".to_string())
    );
    println!("  serve_ui     : {}", cli.serve_ui);

    // Start embedded UI server if requested (non-blocking background task)
    if cli.serve_ui {
        let bind = "127.0.0.1:8080";
        tokio::spawn(async move {
            if let Err(e) = server::spawn_server(bind).await {
                eprintln!("HTTP UI server error: {e}");
            }
        });
        println!("UI server starting at http://{} (Ctrl+C to stop)", bind);
    }

    if let Some(locator) = cli.playlist.as_deref() {
        let timeout = Duration::from_secs(cli.timeout_secs.max(1));

        println!("\nLoading playlist from {locator}...");
        let text = match source::load_playlist_text(locator, timeout).await {
            Ok(t) => t,
            Err(e) => {
                // Not fatal to the process; nothing was scanned.
                eprintln!("Error loading playlist: {e:#}");
                return Ok(());
            }
        };

        let parsed = playlist::parse_playlist_str(&text);
        if parsed.missing_header {
            eprintln!("Warning: playlist may not be in valid M3U format");
        }
        if parsed.entries.is_empty() {
            println!("No channels found in the playlist");
            return Ok(());
        }
        println!("Found {} channels. Scanning...", parsed.entries.len());

        // Ctrl-C cancels the scan; signal wiring stays out of the library
        // so web-triggered scans only answer to their own token.
        let cancel = CancellationToken::new();
        let cancel_ctrlc = cancel.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            cancel_ctrlc.cancel();
        });

        let summary =
            scanner::scan_entries_with_cancel(&parsed.entries, timeout, cli.concurrency, cancel)
                .await?;
        print_summary_table(&summary);

        if !cli.no_save {
            let dir = cli
                .output
                .clone()
                .unwrap_or_else(|| report::default_output_dir(locator));
            match report::write_results(&dir, locator, &summary) {
                Ok(saved) => {
                    println!("\nResults saved in:");
                    println!("- {}", saved.reachable_path.display());
                    println!("- {}", saved.unreachable_path.display());
                    println!("- {}", saved.report_path.display());
                }
                Err(e) => eprintln!("Error saving results: {e:#}"),
            }
        }
    }

    // If UI is running, keep the process alive until Ctrl+C.
    if cli.serve_ui {
        println!("Press Ctrl+C to stop the server...");
        let _ = tokio::signal::ctrl_c().await;
    }

    Ok(())
}

fn print_summary_table(summary: &ScanSummary) {
    println!(
        "\nScan completed: {} channels checked",
        summary.reachable_count + summary.unreachable_count
    );
    println!("Reachable channels  : {}", summary.reachable_count);
    println!("Unreachable channels: {}", summary.unreachable_count);

    if summary.unreachable.is_empty() {
        return;
    }

    let mut name_w = "name".len();
    let mut addr_w = "address".len();
    for u in &summary.unreachable {
        name_w = name_w.max(u.entry.name.chars().count().min(30));
        addr_w = addr_w.max(u.entry.address.chars().count().min(60));
    }

    println!(
        "\n{:<name_w$}  {:<addr_w$}  {}",
        "name",
        "address",
        "error",
        name_w = name_w,
        addr_w = addr_w
    );
    println!(
        "{:-<name_w$}  {:-<addr_w$}  {:-<5}",
        "",
        "",
        "",
        name_w = name_w,
        addr_w = addr_w
    );
    for u in &summary.unreachable {
        let name = clip(&u.entry.name, 30);
        let addr = clip(&u.entry.address, 60);
        println!(
            "{:<name_w$}  {:<addr_w$}  {}",
            name,
            addr,
            u.diagnostic,
            name_w = name_w,
            addr_w = addr_w
        );
    }
}

/// Cut display text to `max` characters. Byte-offset truncation would split
/// multibyte channel names (accents, Cyrillic, CJK).
fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
