use async_trait::async_trait;
use courier_core::Order;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote call timed out")]
    Timeout,

    #[error("remote service unreachable: {0}")]
    Unreachable(String),

    #[error("remote service rejected request: {status} - {body}")]
    ServerRejected { status: u16, body: String },

    #[error("failed to decode remote response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            RemoteError::ServerRejected {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            RemoteError::Unreachable(err.to_string())
        }
    }
}

/// The backend that owns confirmed orders.
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn list_orders(&self) -> Result<Vec<Order>, RemoteError>;
    /// Submits an order and returns it with the server-assigned `id`.
    async fn create_order(&self, order: &Order) -> Result<Order, RemoteError>;
}

pub mod http;
pub mod mock;
