//! Derivation event sink
//!
//! Soft misses (unknown CFDA number, unresolvable agency) are reported as
//! structured events rather than errors. The engine only sees the
//! [`DerivationSink`] capability; the host picks where events go.

use crate::models::RecordContext;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// Message type attached to soft-miss events
pub const BROKER_ERROR: &str = "BrokerError";

/// Event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

/// One structured event raised while deriving a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationEvent {
    pub level: EventLevel,
    pub message: String,
    pub message_type: &'static str,
    pub record_id: String,
    pub job_id: String,
}

impl DerivationEvent {
    pub fn new(level: EventLevel, message: impl Into<String>, ctx: &RecordContext) -> Self {
        Self {
            level,
            message: message.into(),
            message_type: BROKER_ERROR,
            record_id: ctx.record_id.clone(),
            job_id: ctx.job_id.clone(),
        }
    }
}

/// Receives derivation events
pub trait DerivationSink: Send + Sync {
    fn emit(&self, event: DerivationEvent);
}

/// Forwards events to `tracing` with structured fields
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DerivationSink for TracingSink {
    fn emit(&self, event: DerivationEvent) {
        let DerivationEvent {
            level,
            message,
            message_type,
            record_id,
            job_id,
        } = event;
        match level {
            EventLevel::Info => info!(%record_id, %job_id, message_type, "{}", message),
            EventLevel::Warn => warn!(%record_id, %job_id, message_type, "{}", message),
            EventLevel::Error => error!(%record_id, %job_id, message_type, "{}", message),
        }
    }
}

/// Stores events in memory for inspection
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<DerivationEvent>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn events(&self) -> Vec<DerivationEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Events whose message contains `needle`
    pub fn find(&self, needle: &str) -> Vec<DerivationEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.message.contains(needle))
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl DerivationSink for CollectingSink {
    fn emit(&self, event: DerivationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
