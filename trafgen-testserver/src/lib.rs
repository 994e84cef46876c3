//! Local HTTP target for exercising the traffic engine without touching the internet.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::{Duration, sleep};

pub const PATH_SLOW: &str = "/slow";
pub const PATH_STATUS: &str = "/status/{code}";

/// How long `/slow` holds the response.
pub const SLOW_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default)]
pub struct TestServerStats {
    requests_total: Arc<AtomicU64>,
    posts_total: Arc<AtomicU64>,
    posts_with_body: Arc<AtomicU64>,
    user_agents: Arc<Mutex<Vec<String>>>,
}

impl TestServerStats {
    fn observe(&self, method: &Method, headers: &HeaderMap, body: &[u8]) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        if method == Method::POST {
            self.posts_total.fetch_add(1, Ordering::Relaxed);
            if !body.is_empty() {
                self.posts_with_body.fetch_add(1, Ordering::Relaxed);
            }
        }
        if let Some(ua) = headers.get("user-agent").and_then(|v| v.to_str().ok()) {
            self.user_agents
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(ua.to_string());
        }
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn posts_total(&self) -> u64 {
        self.posts_total.load(Ordering::Relaxed)
    }

    pub fn posts_with_body(&self) -> u64 {
        self.posts_with_body.load(Ordering::Relaxed)
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.user_agents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

async fn handle_any(
    State(stats): State<TestServerStats>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> &'static str {
    stats.observe(&method, &headers, &body);
    "ok"
}

async fn handle_slow(
    State(stats): State<TestServerStats>,
    method: Method,
    headers: HeaderMap,
) -> &'static str {
    stats.observe(&method, &headers, &[]);
    sleep(SLOW_DELAY).await;
    "slow"
}

async fn handle_status(
    State(stats): State<TestServerStats>,
    Path(code): Path<u16>,
    method: Method,
    headers: HeaderMap,
) -> StatusCode {
    stats.observe(&method, &headers, &[]);
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

/// Every path not routed explicitly answers `200 ok`, for any method.
pub fn router(stats: TestServerStats) -> Router {
    Router::new()
        .route(PATH_SLOW, get(handle_slow).post(handle_slow))
        .route(PATH_STATUS, get(handle_status).post(handle_status))
        .fallback(handle_any)
        .with_state(stats)
}

pub struct TestServer {
    addr: SocketAddr,
    base_url: String,
    stats: TestServerStats,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let stats = TestServerStats::default();
        let app = router(stats.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = serve.await;
        });

        Ok(Self {
            addr,
            base_url: format!("http://{addr}"),
            stats,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn stats(&self) -> &TestServerStats {
        &self.stats
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if self.shutdown_tx.is_some()
            && let Some(task) = self.task.take()
        {
            task.abort();
        }
    }
}
