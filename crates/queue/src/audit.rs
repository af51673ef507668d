use chrono::Utc;
use courier_core::Order;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: String,
    pub event_type: String,
    pub client_ref: String,
    pub order_id: Option<String>,
    pub state: String,
    pub error: Option<String>,
    pub recipient: Option<String>,
}

impl AuditEvent {
    pub fn new(event_type: &str, client_ref: &str, state: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            event_type: event_type.to_string(),
            client_ref: client_ref.to_string(),
            order_id: None,
            state: state.to_string(),
            error: None,
            recipient: None,
        }
    }

    pub fn for_order(event_type: &str, order: &Order, state: &str) -> Self {
        let mut event = Self::new(event_type, &order.client_ref.to_string(), state)
            .with_recipient(order.recipient.clone());
        if !order.id.is_empty() {
            event = event.with_order_id(order.id.clone());
        }
        event
    }

    pub fn with_order_id(mut self, order_id: String) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_recipient(mut self, recipient: String) -> Self {
        self.recipient = Some(recipient);
        self
    }
}

/// Append-only JSON-lines trail of queue and sync events.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Failures are logged and swallowed; auditing never blocks a sync.
    pub fn record(&self, event: &AuditEvent) {
        if let Err(e) = self.append(event) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to write audit event");
        }
    }

    fn append(&self, event: &AuditEvent) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(event)?;
        writeln!(file, "{}", json)?;
        tracing::debug!(
            event_type = %event.event_type,
            client_ref = %event.client_ref,
            "Audit event written"
        );
        Ok(())
    }
}

pub(crate) fn record(log: Option<&AuditLog>, event: AuditEvent) {
    if let Some(log) = log {
        log.record(&event);
    }
}
