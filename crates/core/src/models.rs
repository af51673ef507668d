use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeliveryStatus {
    #[default]
    Pending,
    #[serde(rename = "In Transit")]
    InTransit,
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

/// A delivery request.
///
/// `id` stays empty until the remote service assigns one. `client_ref` is
/// generated locally and never changes, so the same order submitted twice
/// carries the same idempotency key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    pub id: String,
    #[serde(default = "Uuid::new_v4")]
    pub client_ref: Uuid,
    pub sender: String,
    pub recipient: String,
    pub address: String,
    pub contact: String,
    #[serde(default)]
    pub delivery_status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_offline: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl Order {
    pub fn new(sender: &str, recipient: &str, address: &str, contact: &str) -> Self {
        Self {
            id: String::new(),
            client_ref: Uuid::new_v4(),
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            address: address.to_string(),
            contact: contact.to_string(),
            delivery_status: DeliveryStatus::Pending,
            created_at: Utc::now(),
            is_offline: false,
            items: Vec::new(),
            total: None,
        }
    }

    pub fn with_items(mut self, items: Vec<OrderItem>) -> Self {
        let total = items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum();
        self.items = items;
        self.total = Some(total);
        self
    }

    pub fn mark_offline(mut self) -> Self {
        self.is_offline = true;
        self
    }

    /// Shape of an order accepted on retry: server identity kept, status
    /// reset to the server's initial state.
    pub fn into_confirmed(mut self) -> Self {
        self.is_offline = false;
        self.delivery_status = DeliveryStatus::Pending;
        self
    }

    /// Identity used in logs: the server id when present, otherwise the
    /// client reference.
    pub fn display_id(&self) -> String {
        if self.id.is_empty() {
            format!("local:{}", self.client_ref)
        } else {
            self.id.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_uses_camel_case_and_spaced_status() {
        let mut order = Order::new("Me", "Alice", "123 Main St", "+1 555-0101");
        order.delivery_status = DeliveryStatus::InTransit;
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["deliveryStatus"], "In Transit");
        assert_eq!(json["isOffline"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("clientRef").is_some());
        assert!(json.get("items").is_none());
        assert!(json.get("total").is_none());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{
            "sender": "John Doe",
            "recipient": "Alice Smith",
            "address": "123 Main St, New York, NY",
            "contact": "+1 555-0101",
            "deliveryStatus": "Delivered",
            "createdAt": "2024-05-01T10:00:00Z"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();

        assert_eq!(order.id, "");
        assert!(!order.is_offline);
        assert_eq!(order.delivery_status, DeliveryStatus::Delivered);
        assert!(order.items.is_empty());
    }

    #[test]
    fn test_into_confirmed_resets_status_and_flag() {
        let mut order = Order::new("Me", "Bob", "456 Market St", "+1 555-0102").mark_offline();
        order.id = "srv-1".into();
        order.delivery_status = DeliveryStatus::Delivered;

        let confirmed = order.into_confirmed();
        assert!(!confirmed.is_offline);
        assert_eq!(confirmed.delivery_status, DeliveryStatus::Pending);
        assert_eq!(confirmed.id, "srv-1");
    }

    #[test]
    fn test_with_items_computes_total() {
        let order = Order::new("Me", "Bob", "456 Market St", "+1 555-0102").with_items(vec![
            OrderItem {
                id: "1".into(),
                name: "Box".into(),
                price: 2.5,
                quantity: 4,
            },
            OrderItem {
                id: "2".into(),
                name: "Envelope".into(),
                price: 1.0,
                quantity: 1,
            },
        ]);
        assert_eq!(order.total, Some(11.0));
    }

    #[test]
    fn test_display_id_prefers_server_id() {
        let mut order = Order::new("Me", "Bob", "456 Market St", "+1 555-0102");
        assert!(order.display_id().starts_with("local:"));
        order.id = "abc".into();
        assert_eq!(order.display_id(), "abc");
    }
}
