use crate::audit::{self, AuditEvent, AuditLog};
use crate::confirmed::ConfirmedOrders;
use crate::error::SyncError;
use crate::pending::PendingQueue;
use crate::repository::OrderRepository;
use courier_core::Order;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub attempted: usize,
    pub synced: Vec<Order>,
    pub failed: Vec<Order>,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.attempted == 0
    }
}

/// Replays pending orders against the remote service.
///
/// At most one sync runs at a time; a call made while another is in
/// flight is rejected with `SyncError::SyncInProgress`.
pub struct SyncReconciler {
    repository: Arc<OrderRepository>,
    pending: Arc<PendingQueue>,
    confirmed: Arc<ConfirmedOrders>,
    running: AtomicBool,
    audit: Option<AuditLog>,
}

/// Returns the reconciler to idle when dropped, including on panic or
/// cancellation of the sync future.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SyncReconciler {
    pub fn new(
        repository: Arc<OrderRepository>,
        pending: Arc<PendingQueue>,
        confirmed: Arc<ConfirmedOrders>,
    ) -> Self {
        Self {
            repository,
            pending,
            confirmed,
            running: AtomicBool::new(false),
            audit: None,
        }
    }

    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn try_start(&self) -> Option<RunningGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunningGuard(&self.running))
    }

    pub async fn sync_pending(&self) -> Result<SyncReport, SyncError> {
        let _guard = self.try_start().ok_or(SyncError::SyncInProgress)?;

        let batch = self.pending.snapshot();
        if batch.is_empty() {
            return Ok(SyncReport::default());
        }

        tracing::info!(count = batch.len(), "Syncing pending orders");
        let mut report = SyncReport {
            attempted: batch.len(),
            ..Default::default()
        };

        for order in batch {
            match self.repository.submit_remote(&order).await {
                Ok(created) => {
                    let confirmed = created.into_confirmed();
                    // The order leaves the queue on disk before it becomes
                    // confirmed. A failed write keeps it pending only; the
                    // next run resubmits it under the same client_ref.
                    self.pending.remove_then(&confirmed.client_ref, || {
                        self.confirmed.insert(confirmed.clone())
                    })?;
                    tracing::info!(
                        order_id = %confirmed.id,
                        client_ref = %confirmed.client_ref,
                        "Pending order synced"
                    );
                    audit::record(
                        self.audit.as_ref(),
                        AuditEvent::for_order("order_synced", &confirmed, "confirmed"),
                    );
                    report.synced.push(confirmed);
                }
                Err(e) => {
                    tracing::warn!(
                        order = %order.display_id(),
                        error = %e,
                        "Failed to sync order"
                    );
                    audit::record(
                        self.audit.as_ref(),
                        AuditEvent::for_order("order_sync_failed", &order, "pending")
                            .with_error(e.to_string()),
                    );
                    report.failed.push(order);
                }
            }
        }

        tracing::info!(
            synced = report.synced.len(),
            failed = report.failed.len(),
            "Sync finished"
        );
        Ok(report)
    }
}
