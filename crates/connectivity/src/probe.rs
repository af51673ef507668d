use super::{publish, ConnectivityMonitor, NetworkState};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Decides reachability by sending `HEAD` to a known URL.
///
/// Any HTTP response, whatever its status, counts as online. Connection
/// failures and timeouts count as offline; other errors leave the state
/// `Unknown`.
pub struct ProbeMonitor {
    probe_url: String,
    http_client: reqwest::Client,
    state: watch::Sender<NetworkState>,
}

impl ProbeMonitor {
    pub fn new(probe_url: String, probe_timeout: Duration) -> Result<Arc<Self>, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(probe_timeout).build()?;
        let (state, _) = watch::channel(NetworkState::Unknown);
        Ok(Arc::new(Self {
            probe_url,
            http_client,
            state,
        }))
    }

    async fn probe(&self) -> NetworkState {
        match self.http_client.head(&self.probe_url).send().await {
            Ok(resp) => {
                tracing::trace!(status = %resp.status(), url = %self.probe_url, "Probe answered");
                NetworkState::Online
            }
            Err(e) if e.is_connect() || e.is_timeout() => {
                tracing::debug!(error = %e, url = %self.probe_url, "Probe unreachable");
                NetworkState::Offline
            }
            Err(e) => {
                tracing::debug!(error = %e, url = %self.probe_url, "Probe failed");
                NetworkState::Unknown
            }
        }
    }

    /// Re-probes every `interval` for as long as the returned task runs.
    pub fn spawn_watcher(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let state = monitor.probe().await;
                publish(&monitor.state, state);
            }
        })
    }
}

#[async_trait]
impl ConnectivityMonitor for ProbeMonitor {
    fn current_state(&self) -> NetworkState {
        *self.state.borrow()
    }

    async fn check_connection(&self) -> bool {
        let state = self.probe().await;
        publish(&self.state, state);
        state.is_online()
    }

    fn subscribe(&self) -> watch::Receiver<NetworkState> {
        self.state.subscribe()
    }
}
