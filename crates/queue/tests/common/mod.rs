// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use async_trait::async_trait;
use connectivity::ManualMonitor;
use courier_core::Order;
use parking_lot::Mutex;
use queue::{KeyValueStore, MemoryStore, OrderBook, StoreError, SyncOptions};
use remote::{OrderApi, RemoteError};
use std::collections::HashSet;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

/// Remote fake that accepts or rejects by recipient name, deterministically.
pub struct ScriptedApi {
    rejected: Mutex<HashSet<String>>,
    listing: Mutex<Result<Vec<Order>, u16>>,
    delay: Duration,
    create_calls: AtomicUsize,
    list_calls: AtomicUsize,
    next_id: AtomicUsize,
    submitted: Mutex<Vec<Order>>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            rejected: Mutex::new(HashSet::new()),
            listing: Mutex::new(Ok(Vec::new())),
            delay,
            create_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            next_id: AtomicUsize::new(1),
            submitted: Mutex::new(Vec::new()),
        })
    }

    pub fn reject(&self, recipient: &str) {
        self.rejected.lock().insert(recipient.to_string());
    }

    pub fn accept_all(&self) {
        self.rejected.lock().clear();
    }

    pub fn set_listing(&self, listing: Result<Vec<Order>, u16>) {
        *self.listing.lock() = listing;
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<Order> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl OrderApi for ScriptedApi {
    async fn list_orders(&self) -> Result<Vec<Order>, RemoteError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.listing.lock().clone().map_err(|status| RemoteError::ServerRejected {
            status,
            body: "listing failed".to_string(),
        })
    }

    async fn create_order(&self, order: &Order) -> Result<Order, RemoteError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().push(order.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.rejected.lock().contains(&order.recipient) {
            return Err(RemoteError::ServerRejected {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        let mut created = order.clone();
        created.id = format!("srv-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        Ok(created)
    }
}

pub fn order(recipient: &str) -> Order {
    Order::new("Me (Current User)", recipient, "123 Main St", "+1 555-0101")
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub api: Arc<ScriptedApi>,
    pub monitor: Arc<ManualMonitor>,
    pub book: OrderBook,
}

pub fn harness(online: bool) -> Harness {
    harness_with(ScriptedApi::new(), online, SyncOptions::default())
}

pub fn harness_with(api: Arc<ScriptedApi>, online: bool, options: SyncOptions) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let monitor = if online {
        ManualMonitor::online()
    } else {
        ManualMonitor::offline()
    };
    let book = OrderBook::open(store.clone(), api.clone(), monitor.clone(), options).unwrap();
    Harness {
        store,
        api,
        monitor,
        book,
    }
}

/// Memory store whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Encoding {
                key: key.to_string(),
            });
        }
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key)
    }
}
