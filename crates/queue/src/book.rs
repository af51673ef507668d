use crate::audit::{self, AuditEvent, AuditLog};
use crate::auto_sync::spawn_auto_sync;
use crate::confirmed::ConfirmedOrders;
use crate::error::{StoreError, SyncError};
use crate::pending::PendingQueue;
use crate::reconciler::{SyncReconciler, SyncReport};
use crate::repository::{ListSource, OrderRepository, DEFAULT_CALL_TIMEOUT};
use crate::store::KeyValueStore;
use connectivity::ConnectivityMonitor;
use courier_core::Order;
use remote::OrderApi;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub call_timeout: Duration,
    pub audit_log: Option<PathBuf>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
            audit_log: None,
        }
    }
}

/// Wires the repository, both order collections and the reconciler
/// around one pending queue.
pub struct OrderBook {
    repository: Arc<OrderRepository>,
    pending: Arc<PendingQueue>,
    confirmed: Arc<ConfirmedOrders>,
    reconciler: Arc<SyncReconciler>,
    connectivity: Arc<dyn ConnectivityMonitor>,
    audit: Option<AuditLog>,
}

impl OrderBook {
    pub fn open(
        store: Arc<dyn KeyValueStore>,
        remote: Arc<dyn OrderApi>,
        connectivity: Arc<dyn ConnectivityMonitor>,
        options: SyncOptions,
    ) -> Result<Self, StoreError> {
        let audit = options.audit_log.map(AuditLog::new);
        let pending = Arc::new(PendingQueue::load(store)?);
        let confirmed = Arc::new(ConfirmedOrders::new());

        let mut repository =
            OrderRepository::new(remote, Arc::clone(&connectivity), Arc::clone(&pending))
                .with_call_timeout(options.call_timeout);
        if let Some(log) = &audit {
            repository = repository.with_audit_log(log.clone());
        }
        let repository = Arc::new(repository);

        let mut reconciler = SyncReconciler::new(
            Arc::clone(&repository),
            Arc::clone(&pending),
            Arc::clone(&confirmed),
        );
        if let Some(log) = &audit {
            reconciler = reconciler.with_audit_log(log.clone());
        }

        Ok(Self {
            repository,
            pending,
            confirmed,
            reconciler: Arc::new(reconciler),
            connectivity,
            audit,
        })
    }

    pub fn repository(&self) -> &Arc<OrderRepository> {
        &self.repository
    }

    pub fn pending(&self) -> &Arc<PendingQueue> {
        &self.pending
    }

    pub fn confirmed(&self) -> &Arc<ConfirmedOrders> {
        &self.confirmed
    }

    pub fn reconciler(&self) -> &Arc<SyncReconciler> {
        &self.reconciler
    }

    pub fn connectivity(&self) -> &Arc<dyn ConnectivityMonitor> {
        &self.connectivity
    }

    /// Creates an order; an accepted order joins the confirmed set, any
    /// other outcome leaves it pending.
    pub async fn create_order(&self, order: Order) -> Result<Order, StoreError> {
        let order = self.repository.create_order(order).await?;
        if !order.is_offline {
            self.confirmed.insert(order.clone());
        }
        Ok(order)
    }

    /// Lists orders through the repository. A successful remote listing
    /// becomes the new confirmed set.
    pub async fn refresh(&self) -> Vec<Order> {
        let listing = self.repository.fetch_orders().await;
        if listing.source == ListSource::Remote {
            self.confirmed.replace_all(listing.orders.clone());
        }
        listing.orders
    }

    /// Pending orders first, then confirmed ones. Both are read under the
    /// queue lock so an order being synced shows up exactly once.
    pub fn all_orders(&self) -> Vec<Order> {
        self.pending.with_orders(|pending| {
            let mut all = pending.to_vec();
            all.extend(self.confirmed.snapshot());
            all
        })
    }

    pub async fn sync_pending(&self) -> Result<SyncReport, SyncError> {
        self.reconciler.sync_pending().await
    }

    pub fn clear_pending(&self) -> Result<usize, StoreError> {
        let dropped = self.pending.clear()?;
        if dropped > 0 {
            tracing::warn!(dropped, "Pending orders cleared without sync");
            audit::record(
                self.audit.as_ref(),
                AuditEvent::new("pending_cleared", "*", "cleared")
                    .with_error(format!("{dropped} orders discarded")),
            );
        }
        Ok(dropped)
    }

    pub fn spawn_auto_sync(&self) -> JoinHandle<()> {
        spawn_auto_sync(
            Arc::clone(&self.reconciler),
            Arc::clone(&self.connectivity),
        )
    }
}
