use crate::error::SyncError;
use crate::reconciler::SyncReconciler;
use connectivity::ConnectivityMonitor;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Runs a sync whenever connectivity comes back, and once at start if the
/// monitor already reports online. The task ends when the monitor is
/// dropped.
pub fn spawn_auto_sync(
    reconciler: Arc<SyncReconciler>,
    monitor: Arc<dyn ConnectivityMonitor>,
) -> JoinHandle<()> {
    let mut rx = monitor.subscribe();
    drop(monitor);

    tokio::spawn(async move {
        let mut was_online = false;
        loop {
            let online = rx.borrow_and_update().is_online();
            if online && !was_online {
                run_once(&reconciler).await;
            }
            was_online = online;

            if rx.changed().await.is_err() {
                tracing::debug!("Connectivity monitor gone, stopping auto-sync");
                break;
            }
        }
    })
}

async fn run_once(reconciler: &SyncReconciler) {
    match reconciler.sync_pending().await {
        Ok(report) if report.is_noop() => {}
        Ok(report) => tracing::info!(
            synced = report.synced.len(),
            failed = report.failed.len(),
            "Auto-sync after reconnect"
        ),
        Err(SyncError::SyncInProgress) => {
            tracing::debug!("Sync already running, skipping auto-sync")
        }
        Err(e) => tracing::error!(error = %e, "Auto-sync failed"),
    }
}
