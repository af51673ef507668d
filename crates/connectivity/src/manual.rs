use super::{publish, ConnectivityMonitor, NetworkState};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

/// Monitor whose state is set by the owner, not by the network.
pub struct ManualMonitor {
    state: watch::Sender<NetworkState>,
}

impl ManualMonitor {
    pub fn new(initial: NetworkState) -> Arc<Self> {
        let (state, _) = watch::channel(initial);
        Arc::new(Self { state })
    }

    pub fn online() -> Arc<Self> {
        Self::new(NetworkState::Online)
    }

    pub fn offline() -> Arc<Self> {
        Self::new(NetworkState::Offline)
    }

    pub fn set_state(&self, state: NetworkState) {
        publish(&self.state, state);
    }

    pub fn set_online(&self, online: bool) {
        self.set_state(if online {
            NetworkState::Online
        } else {
            NetworkState::Offline
        });
    }
}

#[async_trait]
impl ConnectivityMonitor for ManualMonitor {
    fn current_state(&self) -> NetworkState {
        *self.state.borrow()
    }

    async fn check_connection(&self) -> bool {
        self.is_online()
    }

    fn subscribe(&self) -> watch::Receiver<NetworkState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let monitor = ManualMonitor::offline();
        let mut rx = monitor.subscribe();
        assert!(!monitor.check_connection().await);

        monitor.set_online(true);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), NetworkState::Online);
        assert!(monitor.is_online());
    }
}
