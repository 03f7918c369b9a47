use std::{sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;

use crate::{
    playlist,
    scanner::{self, SharedProgress},
    source,
    types::ScanSummary,
};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<RwLock<ServerState>>, // shared mutable state for progress/results
}

#[derive(Debug)]
struct ServerState {
    status: Status,
    results: Option<ScanSummary>,
    progress: Option<SharedProgress>,
    cancel: Option<CancellationToken>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct Status {
    pub total: u64,
    pub completed: u64,
    pub reachable: u64,
    pub state: String, // "idle" | "running" | "done"
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Playlist path or http(s) URL.
    pub source: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub concurrency: Option<usize>,
}

pub async fn spawn_server(bind: &str) -> Result<()> {
    let state = AppState {
        inner: Arc::new(RwLock::new(ServerState {
            status: Status {
                total: 0,
                completed: 0,
                reachable: 0,
                state: "idle".into(),
            },
            results: None,
            progress: None,
            cancel: None,
        })),
    };

    let api = Router::new()
        .route("/status", get(get_status))
        .route("/scan", post(post_scan))
        .route("/cancel", post(post_cancel))
        .route("/results", get(get_results))
        .with_state(state.clone());

    let static_svc = ServeDir::new("ui").append_index_html_on_directories(true);

    let app = Router::new().nest("/api", api).fallback_service(static_svc);

    println!("Serving UI on http://{}", bind);
    axum::serve(tokio::net::TcpListener::bind(bind).await?, app).await?;
    Ok(())
}

async fn get_status(State(app): State<AppState>) -> impl IntoResponse {
    let s = app.inner.read().await;
    let (completed, reachable) = if let Some(p) = s.progress.as_ref() {
        (
            p.completed.load(std::sync::atomic::Ordering::Relaxed),
            p.reachable.load(std::sync::atomic::Ordering::Relaxed),
        )
    } else {
        (s.status.completed, s.status.reachable)
    };
    let out = Status {
        total: s.status.total,
        completed,
        reachable,
        state: s.status.state.clone(),
    };
    (StatusCode::OK, Json(out))
}

async fn get_results(State(app): State<AppState>) -> impl IntoResponse {
    let s = app.inner.read().await;
    if let Some(res) = s.results.as_ref() {
        (StatusCode::OK, Json(res.clone())).into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn post_cancel(State(app): State<AppState>) -> impl IntoResponse {
    let s = app.inner.read().await;
    if let Some(c) = s.cancel.as_ref() {
        c.cancel();
        StatusCode::ACCEPTED.into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn post_scan(State(app): State<AppState>, Json(req): Json<ScanRequest>) -> impl IntoResponse {
    let timeout = Duration::from_secs(req.timeout_secs.unwrap_or(5).max(1));
    let concurrency = req.concurrency.unwrap_or(10);

    let cancel = CancellationToken::new();

    // One scan at a time: a second request is rejected, not queued.
    {
        let mut s = app.inner.write().await;
        if s.status.state == "running" {
            return (StatusCode::CONFLICT, "a scan is already running").into_response();
        }
        s.status = Status {
            total: 0,
            completed: 0,
            reachable: 0,
            state: "running".into(),
        };
        s.results = None;
        s.progress = None;
        s.cancel = Some(cancel.clone());
    }

    // Fetch and parse the playlist before dispatching any probes.
    let text = match source::load_playlist_text(&req.source, timeout).await {
        Ok(t) => t,
        Err(e) => {
            let mut s = app.inner.write().await;
            s.status.state = "idle".into();
            s.cancel = None;
            return (StatusCode::BAD_GATEWAY, format!("failed to load playlist: {e:#}"))
                .into_response();
        }
    };
    let parsed = playlist::parse_playlist_str(&text);
    if parsed.missing_header {
        eprintln!("Warning: playlist may not be in valid M3U format");
    }

    let total = parsed.entries.len() as u64;
    let progress = SharedProgress::new();
    {
        let mut s = app.inner.write().await;
        s.status.total = total;
        s.progress = Some(progress.clone());
    }

    // Spawn scan task
    let app2 = app.clone();
    tokio::spawn(async move {
        let res = scanner::scan_entries_with_shared(
            &parsed.entries,
            timeout,
            concurrency,
            cancel.clone(),
            progress.clone(),
        )
        .await;

        let mut s = app2.inner.write().await;
        match res {
            Ok(summary) => {
                s.status.completed = summary.reachable_count + summary.unreachable_count;
                s.status.reachable = summary.reachable_count;
                s.status.state = "done".into();
                s.results = Some(summary);
                s.progress = None;
                s.cancel = None;
            }
            Err(e) => {
                s.status.state = "idle".into();
                s.progress = None;
                s.cancel = None;
                eprintln!("scan error: {e}");
            }
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(Status {
            total,
            completed: 0,
            reachable: 0,
            state: "running".into(),
        }),
    )
        .into_response()
}
