use courier_core::Order;
use parking_lot::RwLock;
use uuid::Uuid;

/// Orders acknowledged by the remote service, newest first. Held in
/// memory only; the remote listing is the durable copy.
#[derive(Default)]
pub struct ConfirmedOrders {
    orders: RwLock<Vec<Order>>,
}

impl ConfirmedOrders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `order`, replacing an earlier entry for the same
    /// `client_ref`.
    pub fn insert(&self, order: Order) {
        let mut orders = self.orders.write();
        orders.retain(|o| o.client_ref != order.client_ref);
        orders.insert(0, order);
    }

    pub fn replace_all(&self, orders: Vec<Order>) {
        *self.orders.write() = orders;
    }

    pub fn contains(&self, client_ref: &Uuid) -> bool {
        self.orders.read().iter().any(|o| &o.client_ref == client_ref)
    }

    pub fn snapshot(&self) -> Vec<Order> {
        self.orders.read().clone()
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}
