use anyhow::{bail, Result};
use connectivity::ConnectivityMonitor;
use courier_core::tracking::{Coordinates, RouteSimulation};
use courier_core::{DeliveryStatus, Order};
use queue::{OrderBook, SyncReport};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    pub sender: String,
    pub recipient: String,
    pub address: String,
    pub contact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResponse {
    pub order: OrderRow,
    pub saved_locally: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: String,
    pub client_ref: String,
    pub recipient: String,
    pub address: String,
    pub contact: String,
    pub status: DeliveryStatus,
    pub created_at: String,
    pub awaiting_sync: bool,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: if order.id.is_empty() {
                "Pending...".to_string()
            } else {
                order.id.clone()
            },
            client_ref: order.client_ref.to_string(),
            recipient: order.recipient.clone(),
            address: order.address.clone(),
            contact: order.contact.clone(),
            status: order.delivery_status,
            created_at: order.created_at.to_rfc3339(),
            awaiting_sync: order.is_offline,
        }
    }
}

fn rows(orders: &[Order]) -> Vec<OrderRow> {
    orders.iter().map(OrderRow::from).collect()
}

pub async fn create_order(book: &OrderBook, req: CreateRequest) -> Result<()> {
    let response = submit_request(book, req).await?;
    tracing::info!(
        client_ref = %response.order.client_ref,
        saved_locally = response.saved_locally,
        "Delivery request created"
    );
    print_json(&response)
}

async fn submit_request(book: &OrderBook, req: CreateRequest) -> Result<CreateResponse> {
    let order = Order::new(&req.sender, &req.recipient, &req.address, &req.contact);
    if let Err(errs) = courier_core::validation::validate(&order) {
        bail!("Invalid delivery request: {}", errs.join("; "));
    }

    let order = book.create_order(order).await?;
    let saved_locally = order.is_offline;
    let message = if saved_locally {
        "Saved locally; it will be sent once you are back online".to_string()
    } else {
        "Delivery request created".to_string()
    };
    Ok(CreateResponse {
        order: OrderRow::from(&order),
        saved_locally,
        message,
    })
}

pub async fn list_orders(book: &OrderBook) -> Result<()> {
    book.refresh().await;
    print_json(&rows(&book.all_orders()))
}

pub fn list_pending(book: &OrderBook) -> Result<()> {
    print_json(&rows(&book.pending().snapshot()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSummary {
    pub attempted: usize,
    pub synced: Vec<OrderRow>,
    pub failed: Vec<OrderRow>,
    pub still_pending: usize,
}

fn summarize(report: &SyncReport, still_pending: usize) -> SyncSummary {
    SyncSummary {
        attempted: report.attempted,
        synced: rows(&report.synced),
        failed: rows(&report.failed),
        still_pending,
    }
}

pub async fn sync_pending(book: &OrderBook) -> Result<()> {
    print_json(&run_sync(book).await?)
}

async fn run_sync(book: &OrderBook) -> Result<SyncSummary> {
    if !book.connectivity().check_connection().await {
        tracing::warn!(
            pending = book.pending().len(),
            "Remote service unreachable; skipping sync"
        );
        return Ok(summarize(&SyncReport::default(), book.pending().len()));
    }
    let report = book.sync_pending().await?;
    Ok(summarize(&report, book.pending().len()))
}

pub fn clear_pending(book: &OrderBook) -> Result<()> {
    let dropped = book.clear_pending()?;
    print_json(&serde_json::json!({ "cleared": dropped }))
}

pub async fn watch(book: &OrderBook, auto_sync: bool) -> Result<()> {
    if !auto_sync {
        tracing::warn!("Auto-sync disabled in config; watching without syncing");
    }
    let task = auto_sync.then(|| book.spawn_auto_sync());
    tracing::info!(pending = book.pending().len(), "Watching connectivity, Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;

    if let Some(task) = task {
        task.abort();
    }
    tracing::info!(pending = book.pending().len(), "Stopped");
    Ok(())
}

pub async fn track(
    from: (f64, f64),
    destination: Option<(f64, f64)>,
    ticks: usize,
    interval: Duration,
) -> Result<()> {
    let mut sim = RouteSimulation::new(Coordinates::new(from.0, from.1));
    if let Some((lat, lon)) = destination {
        sim = sim.with_destination(Coordinates::new(lat, lon));
    }

    let mut ticker = tokio::time::interval(interval);
    // First tick completes immediately.
    ticker.tick().await;
    for _ in 0..ticks {
        ticker.tick().await;
        match sim.tick() {
            Some(position) => println!("{}", serde_json::to_string(&position)?),
            None => {
                tracing::info!("Vehicle arrived");
                break;
            }
        }
    }
    Ok(())
}

pub fn set_remote(mut cfg: config::AppConfig, kind: &str, base_url: Option<String>) -> Result<()> {
    cfg.remote.kind = kind.to_string();
    if base_url.is_some() {
        cfg.remote.base_url = base_url;
    }
    cfg.validate()?;
    config::store(&cfg)?;
    tracing::info!(kind = %cfg.remote.kind, "Settings updated");
    Ok(())
}

pub fn set_token(token: &str) -> Result<()> {
    config::store_secret(config::API_TOKEN_SECRET, token)?;
    tracing::info!("API token stored in keychain");
    Ok(())
}

pub fn clear_token() -> Result<()> {
    config::delete_secret(config::API_TOKEN_SECRET)?;
    tracing::info!("API token removed from keychain");
    Ok(())
}
