mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use connectivity::{ConnectivityMonitor, ManualMonitor, ProbeMonitor};
use queue::{KeyValueStore, MemoryStore, OrderBook, SledStore, SyncOptions};
use remote::{http::HttpOrderApi, mock::MockOrderApi, OrderApi};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(about = "Delivery requests with offline-first sync")]
struct Cli {
    /// Treat the network as unavailable; creates are queued and sync is skipped
    #[arg(long, global = true)]
    offline: bool,

    /// Keep state in memory instead of the on-disk store
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a delivery request
    Create {
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        contact: String,
        #[arg(long, default_value = "Me (Current User)")]
        sender: String,
    },
    /// List orders, pending ones first
    List,
    /// Show orders waiting for sync
    Pending,
    /// Replay pending orders against the remote service
    Sync,
    /// Discard every pending order without syncing
    ClearPending,
    /// Stay running and sync whenever connectivity returns
    Watch,
    /// Simulate the delivery vehicle along a straight route
    Track {
        #[arg(long, allow_hyphen_values = true)]
        from_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        from_lon: f64,
        #[arg(long, allow_hyphen_values = true, requires = "to_lon")]
        to_lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true, requires = "to_lat")]
        to_lon: Option<f64>,
        #[arg(long, default_value_t = 10)]
        ticks: usize,
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Point the app at a remote service
    SetRemote {
        /// "mock" or "http"
        #[arg(long)]
        kind: String,
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Save the API token in the OS keychain
    SetToken { token: String },
    /// Remove the API token from the OS keychain
    ClearToken,
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn create_order_api(cfg: &config::AppConfig) -> anyhow::Result<Arc<dyn OrderApi>> {
    match cfg.remote.kind.as_str() {
        "http" => {
            let base_url = cfg
                .remote
                .base_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("remote base_url not configured"))?;

            let token = std::env::var("COURIER_API_TOKEN")
                .or_else(|_| config::get_secret(config::API_TOKEN_SECRET))
                .ok();
            if token.is_some() {
                tracing::info!("Using HTTP remote with bearer token");
            } else {
                tracing::info!("Using HTTP remote without auth");
            }

            let client: Arc<dyn OrderApi> =
                HttpOrderApi::new(base_url, token, cfg.remote.request_timeout())?;
            Ok(client)
        }
        _ => {
            tracing::info!("Using mock remote");
            let client: Arc<dyn OrderApi> =
                MockOrderApi::new(Duration::from_millis(300), cfg.remote.mock_failure_rate);
            Ok(client)
        }
    }
}

/// Returns the monitor and, for a probing monitor, its background task.
fn create_monitor(
    cfg: &config::AppConfig,
    offline: bool,
) -> anyhow::Result<(Arc<dyn ConnectivityMonitor>, Option<JoinHandle<()>>)> {
    if offline {
        tracing::info!("Offline mode forced");
        let monitor: Arc<dyn ConnectivityMonitor> = ManualMonitor::offline();
        return Ok((monitor, None));
    }

    match cfg.probe_url() {
        Some(url) => {
            let probe = ProbeMonitor::new(url, cfg.connectivity.probe_timeout())
                .context("Failed to build connectivity probe")?;
            let watcher = probe.spawn_watcher(cfg.connectivity.poll_interval());
            let monitor: Arc<dyn ConnectivityMonitor> = probe;
            Ok((monitor, Some(watcher)))
        }
        // The mock remote lives in-process and is always reachable.
        None => {
            let monitor: Arc<dyn ConnectivityMonitor> = ManualMonitor::online();
            Ok((monitor, None))
        }
    }
}

fn open_store(cfg: &config::AppConfig, ephemeral: bool) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    if ephemeral {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        return Ok(store);
    }
    let store = SledStore::open(&cfg.storage.path)
        .with_context(|| format!("Failed to open store at {}", cfg.storage.path.display()))?;
    Ok(Arc::new(store))
}

fn open_book(
    cfg: &config::AppConfig,
    cli: &Cli,
) -> anyhow::Result<(OrderBook, Option<JoinHandle<()>>)> {
    let store = open_store(cfg, cli.ephemeral)?;
    let api = create_order_api(cfg)?;
    let (monitor, watcher) = create_monitor(cfg, cli.offline)?;
    let options = SyncOptions {
        call_timeout: cfg.remote.request_timeout(),
        audit_log: cfg.sync.audit_log.clone(),
    };
    let book = OrderBook::open(store, api, monitor, options)?;
    Ok((book, watcher))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let cfg = config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Falling back to default config");
        config::AppConfig::default()
    });

    match &cli.command {
        Commands::Config { action } => {
            return match action {
                ConfigAction::Show => commands::print_json(&cfg),
                ConfigAction::SetRemote { kind, base_url } => {
                    commands::set_remote(cfg, kind, base_url.clone())
                }
                ConfigAction::SetToken { token } => commands::set_token(token),
                ConfigAction::ClearToken => commands::clear_token(),
            };
        }
        Commands::Track {
            from_lat,
            from_lon,
            to_lat,
            to_lon,
            ticks,
            interval_ms,
        } => {
            let destination = to_lat.zip(*to_lon);
            return commands::track(
                (*from_lat, *from_lon),
                destination,
                *ticks,
                Duration::from_millis(*interval_ms),
            )
            .await;
        }
        _ => {}
    }

    cfg.validate()?;
    let (book, watcher) = open_book(&cfg, &cli)?;

    let result = match cli.command {
        Commands::Create {
            recipient,
            address,
            contact,
            sender,
        } => {
            let req = commands::CreateRequest {
                sender,
                recipient,
                address,
                contact,
            };
            commands::create_order(&book, req).await
        }
        Commands::List => commands::list_orders(&book).await,
        Commands::Pending => commands::list_pending(&book),
        Commands::Sync => commands::sync_pending(&book).await,
        Commands::ClearPending => commands::clear_pending(&book),
        Commands::Watch => commands::watch(&book, cfg.sync.auto_sync).await,
        Commands::Config { .. } | Commands::Track { .. } => Ok(()),
    };

    if let Some(watcher) = watcher {
        watcher.abort();
    }
    result
}
