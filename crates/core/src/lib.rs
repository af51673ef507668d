pub mod models;
pub mod tracking;
pub mod validation;

pub use models::{DeliveryStatus, Order, OrderItem};
