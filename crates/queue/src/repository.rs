use crate::audit::{self, AuditEvent, AuditLog};
use crate::error::StoreError;
use crate::pending::PendingQueue;
use connectivity::ConnectivityMonitor;
use courier_core::Order;
use remote::{OrderApi, RemoteError};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSource {
    Remote,
    /// The remote was reachable but the listing failed.
    RemoteFailed,
    Local,
}

#[derive(Debug, Clone)]
pub struct OrderListing {
    pub source: ListSource,
    pub orders: Vec<Order>,
}

/// Picks the remote or the local path for each operation based on
/// connectivity. Remote failures never reach the caller: reads degrade to
/// an empty list and writes degrade to the pending queue.
pub struct OrderRepository {
    remote: Arc<dyn OrderApi>,
    connectivity: Arc<dyn ConnectivityMonitor>,
    pending: Arc<PendingQueue>,
    call_timeout: Duration,
    audit: Option<AuditLog>,
}

impl OrderRepository {
    pub fn new(
        remote: Arc<dyn OrderApi>,
        connectivity: Arc<dyn ConnectivityMonitor>,
        pending: Arc<PendingQueue>,
    ) -> Self {
        Self {
            remote,
            connectivity,
            pending,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            audit: None,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    pub async fn list_orders(&self) -> Vec<Order> {
        self.fetch_orders().await.orders
    }

    /// Like `list_orders`, but also says where the result came from.
    pub async fn fetch_orders(&self) -> OrderListing {
        if !self.connectivity.check_connection().await {
            return OrderListing {
                source: ListSource::Local,
                orders: self.pending.snapshot(),
            };
        }

        let result = tokio::time::timeout(self.call_timeout, self.remote.list_orders())
            .await
            .unwrap_or(Err(RemoteError::Timeout));
        match result {
            Ok(orders) => OrderListing {
                source: ListSource::Remote,
                orders,
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch remote orders");
                OrderListing {
                    source: ListSource::RemoteFailed,
                    orders: Vec::new(),
                }
            }
        }
    }

    /// Submits `order` when online. When offline, or when the submission
    /// fails, the order is queued and returned marked offline with its id
    /// left empty. Only a local storage failure is an error.
    pub async fn create_order(&self, order: Order) -> Result<Order, StoreError> {
        if self.connectivity.check_connection().await {
            match self.submit_remote(&order).await {
                Ok(created) => return Ok(created),
                Err(e) => {
                    tracing::warn!(
                        client_ref = %order.client_ref,
                        error = %e,
                        "Online creation failed, saving locally"
                    );
                }
            }
        }
        self.save_local(order)
    }

    /// The remote create path, bounded by the call timeout. Does not touch
    /// local storage.
    pub async fn submit_remote(&self, order: &Order) -> Result<Order, RemoteError> {
        let mut created = tokio::time::timeout(self.call_timeout, self.remote.create_order(order))
            .await
            .map_err(|_| RemoteError::Timeout)??;

        // The server may not echo our reference back.
        created.client_ref = order.client_ref;
        created.is_offline = false;
        Ok(created)
    }

    fn save_local(&self, order: Order) -> Result<Order, StoreError> {
        let queued = self.pending.add(order)?;
        audit::record(
            self.audit.as_ref(),
            AuditEvent::for_order("order_queued", &queued, "pending"),
        );
        Ok(queued)
    }
}
