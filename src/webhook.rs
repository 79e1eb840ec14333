//! HTTP side of webhook mode: liveness, update intake and the worker pool.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use teloxide::types::{Update, UpdateKind};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::bot::{Incoming, Router};

pub const LIVENESS_TEXT: &str = "Ultimate AI Mastermind Bot is running!";
pub const WEBHOOK_PATH: &str = "/webhook";

/// Runs message handlers in the background, at most `workers` at a time.
pub struct WorkerPool {
    router: Arc<Router>,
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(router: Arc<Router>, workers: usize) -> Self {
        Self {
            router,
            permits: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Queue an update. Only new messages are handled; other kinds are dropped.
    pub fn submit(&self, update: Update) {
        let UpdateKind::Message(msg) = update.kind else {
            debug!("Ignoring non-message update {:?}", update.id);
            return;
        };
        let incoming = Incoming::from_telegram(&msg);
        let router = self.router.clone();
        let permits = self.permits.clone();

        tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            router.handle(incoming).await;
        });
    }
}

pub fn app(pool: Arc<WorkerPool>) -> axum::Router {
    axum::Router::new()
        .route("/", get(liveness))
        .route(WEBHOOK_PATH, post(receive_update))
        .with_state(pool)
}

/// Serve the webhook app until the listener fails.
pub async fn serve(listener: TcpListener, pool: Arc<WorkerPool>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("🌐 Webhook server listening on http://{addr}");
    }
    axum::serve(listener, app(pool)).await
}

async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

async fn receive_update(State(pool): State<Arc<WorkerPool>>, headers: HeaderMap, body: Bytes) -> Response {
    if !is_json(&headers) {
        warn!("Rejected webhook call with content type {:?}", headers.get(header::CONTENT_TYPE));
        return (StatusCode::FORBIDDEN, "Invalid content type").into_response();
    }

    match serde_json::from_slice::<Update>(&body) {
        Ok(update) => {
            pool.submit(update);
            StatusCode::OK.into_response()
        }
        Err(e) => {
            warn!("Rejected malformed update: {e}");
            (StatusCode::FORBIDDEN, "Invalid update").into_response()
        }
    }
}

/// `application/json`, with or without parameters such as a charset.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}
