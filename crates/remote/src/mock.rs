use super::{OrderApi, RemoteError};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use courier_core::{DeliveryStatus, Order};
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration};

/// In-process stand-in for the orders backend.
///
/// Submissions fail with probability `failure_rate` to mimic a flaky
/// network. Use deterministic fakes in tests instead.
pub struct MockOrderApi {
    latency: Duration,
    failure_rate: f64,
    orders: RwLock<Vec<Order>>,
}

impl MockOrderApi {
    /// `failure_rate` is clamped to `0.0..=1.0`; NaN means never fail.
    pub fn new(latency: Duration, failure_rate: f64) -> Arc<Self> {
        let failure_rate = if failure_rate.is_nan() {
            0.0
        } else {
            failure_rate.clamp(0.0, 1.0)
        };
        Arc::new(Self {
            latency,
            failure_rate,
            orders: RwLock::new(seed_orders()),
        })
    }
}

fn seed_orders() -> Vec<Order> {
    let now = Utc::now();
    let seed = [
        (
            "101",
            "John Doe",
            "Alice Smith",
            "123 Main St, New York, NY",
            "+1 555-0101",
            DeliveryStatus::Pending,
            0,
        ),
        (
            "102",
            "Jane Roe",
            "Bob Jones",
            "456 Market St, San Francisco, CA",
            "+1 555-0102",
            DeliveryStatus::InTransit,
            1,
        ),
        (
            "103",
            "Company A",
            "Charlie Brown",
            "789 Broadway, Seattle, WA",
            "+1 555-0103",
            DeliveryStatus::Delivered,
            2,
        ),
    ];

    seed.into_iter()
        .map(|(id, sender, recipient, address, contact, status, days_ago)| {
            let mut order = Order::new(sender, recipient, address, contact);
            order.id = id.to_string();
            order.delivery_status = status;
            order.created_at = now - ChronoDuration::days(days_ago);
            order
        })
        .collect()
}

#[async_trait]
impl OrderApi for MockOrderApi {
    async fn list_orders(&self) -> Result<Vec<Order>, RemoteError> {
        // simulate network latency
        sleep(self.latency).await;
        Ok(self.orders.read().await.clone())
    }

    async fn create_order(&self, order: &Order) -> Result<Order, RemoteError> {
        sleep(self.latency).await;

        let fail = rand::thread_rng().gen_bool(self.failure_rate);
        if fail {
            return Err(RemoteError::Unreachable("Network error".to_string()));
        }

        let mut created = order.clone();
        created.id = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(9)
            .map(char::from)
            .collect::<String>()
            .to_lowercase();
        created.is_offline = false;

        self.orders.write().await.insert(0, created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_seed_orders() {
        let api = MockOrderApi::new(Duration::ZERO, 0.0);
        let orders = api.list_orders().await.unwrap();
        let ids: Vec<_> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["101", "102", "103"]);
    }

    #[tokio::test]
    async fn test_created_order_gets_id_and_is_listed() {
        let api = MockOrderApi::new(Duration::ZERO, 0.0);
        let order = Order::new("Me", "Dana", "1 Elm St", "+1 555-0199").mark_offline();

        let created = api.create_order(&order).await.unwrap();
        assert_eq!(created.id.len(), 9);
        assert!(!created.is_offline);
        assert_eq!(created.client_ref, order.client_ref);

        let listed = api.list_orders().await.unwrap();
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[0].id, created.id);
    }

    #[tokio::test]
    async fn test_nan_failure_rate_never_fails() {
        let api = MockOrderApi::new(Duration::ZERO, f64::NAN);
        let order = Order::new("Me", "Dana", "1 Elm St", "+1 555-0199");
        assert!(api.create_order(&order).await.is_ok());
    }

    #[tokio::test]
    async fn test_failure_rate_one_always_fails() {
        let api = MockOrderApi::new(Duration::ZERO, 1.0);
        let order = Order::new("Me", "Dana", "1 Elm St", "+1 555-0199");
        assert!(matches!(
            api.create_order(&order).await,
            Err(RemoteError::Unreachable(_))
        ));
    }
}
