use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::{Duration, sleep};

pub const PATH_PURCHASE: &str = "/{base}/purchase/{store_id}/customer/{customer_id}/date/{date}";
pub const PATH_PURCHASE_NO_BASE: &str = "/purchase/{store_id}/customer/{customer_id}/date/{date}";

#[derive(Debug, Clone, Default)]
pub struct TestServerStats {
    requests_total: Arc<AtomicU64>,
    purchases: Arc<AtomicU64>,
    items: Arc<AtomicU64>,
    rejected: Arc<AtomicU64>,
    max_customer_id: Arc<AtomicU64>,
}

impl TestServerStats {
    fn inc_requests_total(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_purchases(&self, customer_id: u64, items: u64) {
        self.purchases.fetch_add(1, Ordering::Relaxed);
        self.items.fetch_add(items, Ordering::Relaxed);
        self.max_customer_id.fetch_max(customer_id, Ordering::Relaxed);
    }

    fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    /// Well-formed purchases accepted by the stub.
    pub fn purchases(&self) -> u64 {
        self.purchases.load(Ordering::Relaxed)
    }

    pub fn items(&self) -> u64 {
        self.items.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn max_customer_id(&self) -> u64 {
        self.max_customer_id.load(Ordering::Relaxed)
    }
}

/// Canned behaviour of the stub purchase service.
#[derive(Debug, Clone, Copy)]
pub struct TestServerConfig {
    /// Status returned for every well-formed purchase.
    pub status: u16,
    pub delay: Duration,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            status: 201,
            delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
struct AppState {
    stats: TestServerStats,
    config: TestServerConfig,
}

#[derive(Debug, Deserialize)]
struct PurchasePath {
    store_id: u32,
    customer_id: u64,
    date: String,
}

#[derive(Debug, Deserialize)]
struct PurchaseBody {
    items: Vec<PurchaseBodyItem>,
}

#[derive(Debug, Deserialize)]
struct PurchaseBodyItem {
    #[serde(rename = "itemID")]
    item_id: String,
    #[serde(rename = "numberOfItems")]
    number_of_items: u32,
}

fn is_valid_date(date: &str) -> bool {
    date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit())
}

fn is_valid_body(body: &PurchaseBody) -> bool {
    body.items
        .iter()
        .all(|i| i.item_id.parse::<u32>().is_ok() && i.number_of_items > 0)
}

async fn handle_purchase(
    State(state): State<AppState>,
    Path(path): Path<PurchasePath>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    state.stats.inc_requests_total();

    // Store ids are 1-based.
    if path.store_id == 0 {
        state.stats.inc_rejected();
        return (StatusCode::BAD_REQUEST, "bad store");
    }
    if !is_valid_date(&path.date) {
        state.stats.inc_rejected();
        return (StatusCode::BAD_REQUEST, "bad date");
    }

    let purchase: PurchaseBody = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => {
            state.stats.inc_rejected();
            return (StatusCode::BAD_REQUEST, "bad json");
        }
    };
    if !is_valid_body(&purchase) {
        state.stats.inc_rejected();
        return (StatusCode::BAD_REQUEST, "bad items");
    }

    if !state.config.delay.is_zero() {
        sleep(state.config.delay).await;
    }
    state
        .stats
        .inc_purchases(path.customer_id, purchase.items.len() as u64);

    let status =
        StatusCode::from_u16(state.config.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, "")
}

pub fn router(stats: TestServerStats, config: TestServerConfig) -> Router {
    Router::new()
        .route(PATH_PURCHASE, post(handle_purchase))
        .route(PATH_PURCHASE_NO_BASE, post(handle_purchase))
        .with_state(AppState { stats, config })
}

pub struct TestServer {
    addr: SocketAddr,
    stats: TestServerStats,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with(TestServerConfig::default()).await
    }

    pub async fn start_with(config: TestServerConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let stats = TestServerStats::default();
        let app = router(stats.clone(), config);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = serve.await;
        });

        Ok(Self {
            addr,
            stats,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `host:port` in the form accepted by `--target`.
    pub fn target(&self) -> String {
        format!("{}:{}", self.addr.ip(), self.addr.port())
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
