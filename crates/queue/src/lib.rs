//! Offline-first order queue.
//!
//! Orders that cannot reach the remote service are kept in a
//! [`PendingQueue`] persisted in a [`KeyValueStore`], and replayed by the
//! [`SyncReconciler`] once the service is reachable again.

mod audit;
mod auto_sync;
mod book;
mod confirmed;
mod error;
mod pending;
mod reconciler;
mod repository;
mod store;

pub use audit::{AuditEvent, AuditLog};
pub use auto_sync::spawn_auto_sync;
pub use book::{OrderBook, SyncOptions};
pub use confirmed::ConfirmedOrders;
pub use error::{StoreError, SyncError};
pub use pending::{PendingQueue, PENDING_ORDERS_KEY};
pub use reconciler::{SyncReconciler, SyncReport};
pub use repository::{ListSource, OrderListing, OrderRepository, DEFAULT_CALL_TIMEOUT};
pub use store::{KeyValueStore, MemoryStore, SledStore};
