//! Network reachability as an injectable capability.
//!
//! A monitor answers two questions: what the last observed state was
//! (`is_online`, never blocks) and what the state is right now
//! (`check_connection`, probes and waits). Changes are pushed to
//! subscribers through a `watch` channel.

use async_trait::async_trait;
use tokio::sync::watch;

pub mod manual;
pub mod probe;

pub use manual::ManualMonitor;
pub use probe::ProbeMonitor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkState {
    Online,
    Offline,
    /// The last probe failed in a way that says nothing about reachability.
    Unknown,
}

impl NetworkState {
    /// `Unknown` counts as offline.
    pub fn is_online(self) -> bool {
        matches!(self, NetworkState::Online)
    }
}

#[async_trait]
pub trait ConnectivityMonitor: Send + Sync {
    fn current_state(&self) -> NetworkState;

    fn is_online(&self) -> bool {
        self.current_state().is_online()
    }

    /// Probes the network and returns a definitive answer.
    async fn check_connection(&self) -> bool;

    fn subscribe(&self) -> watch::Receiver<NetworkState>;
}

/// Stores `state` in the channel, returning true when it differs from the
/// previous value. Subscribers are only woken on real transitions.
pub(crate) fn publish(tx: &watch::Sender<NetworkState>, state: NetworkState) -> bool {
    let changed = tx.send_if_modified(|current| {
        if *current == state {
            false
        } else {
            *current = state;
            true
        }
    });
    if changed {
        tracing::info!(?state, "Network state changed");
    }
    changed
}
