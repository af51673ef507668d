use crate::error::StoreError;
use crate::store::KeyValueStore;
use courier_core::Order;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

pub const PENDING_ORDERS_KEY: &str = "pending_orders";

/// Orders accepted locally but not yet acknowledged by the remote service.
///
/// Every mutation writes the whole sequence through to the store while the
/// lock is held, and the in-memory copy only changes once that write has
/// succeeded. Readers never see a state that is not also on disk.
pub struct PendingQueue {
    store: Arc<dyn KeyValueStore>,
    orders: Mutex<Vec<Order>>,
}

impl PendingQueue {
    /// Restores the queue from `store`. A missing key is an empty queue;
    /// an unreadable blob is an error rather than a silent reset.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let orders: Vec<Order> = match store.get(PENDING_ORDERS_KEY)? {
            Some(blob) => serde_json::from_str(&blob)?,
            None => Vec::new(),
        };
        if !orders.is_empty() {
            tracing::info!(count = orders.len(), "Restored pending orders");
        }
        Ok(Self {
            store,
            orders: Mutex::new(orders),
        })
    }

    /// Appends `order` marked offline and returns the stored copy. Adding
    /// an order whose `client_ref` is already queued is a no-op.
    pub fn add(&self, order: Order) -> Result<Order, StoreError> {
        let order = order.mark_offline();
        let mut orders = self.orders.lock();

        if let Some(existing) = orders.iter().find(|o| o.client_ref == order.client_ref) {
            tracing::debug!(client_ref = %order.client_ref, "Order already pending");
            return Ok(existing.clone());
        }

        let mut next = orders.clone();
        next.push(order.clone());
        self.persist(&next)?;
        *orders = next;

        tracing::info!(
            client_ref = %order.client_ref,
            pending = orders.len(),
            "Order queued for sync"
        );
        Ok(order)
    }

    pub fn snapshot(&self) -> Vec<Order> {
        self.orders.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.orders.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.lock().is_empty()
    }

    /// Drops every pending order. Returns how many were discarded.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let mut orders = self.orders.lock();
        self.store.delete(PENDING_ORDERS_KEY)?;
        let dropped = orders.len();
        orders.clear();
        Ok(dropped)
    }

    /// Removes the order with `client_ref` and runs `on_removed` once the
    /// removal is on disk, still under the queue lock. Readers going through
    /// [`PendingQueue::with_orders`] therefore never see the order both here
    /// and wherever `on_removed` puts it. If the write fails the order stays
    /// queued and `on_removed` is not called.
    pub(crate) fn remove_then<F>(
        &self,
        client_ref: &Uuid,
        on_removed: F,
    ) -> Result<(), StoreError>
    where
        F: FnOnce(),
    {
        let mut orders = self.orders.lock();
        if orders.iter().any(|o| &o.client_ref == client_ref) {
            let next: Vec<Order> = orders
                .iter()
                .filter(|o| &o.client_ref != client_ref)
                .cloned()
                .collect();
            self.persist(&next)?;
            *orders = next;
        }
        on_removed();
        Ok(())
    }

    /// Runs `f` over the queued orders while holding the queue lock.
    pub fn with_orders<T>(&self, f: impl FnOnce(&[Order]) -> T) -> T {
        f(&self.orders.lock())
    }

    fn persist(&self, orders: &[Order]) -> Result<(), StoreError> {
        let blob = serde_json::to_string(orders)?;
        self.store.set(PENDING_ORDERS_KEY, &blob)
    }
}
