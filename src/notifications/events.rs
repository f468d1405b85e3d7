//! Notification events
//!
//! Everything the client announces about its traffic with the hub.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::outcome::OutcomeKind;
use crate::domain::{Acknowledgement, ActionType, EvseId, EvseStatusRecord, OperatorId};

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// A status batch is about to be pushed
    EvseStatusBatchSending(EvseStatusBatchSendingEvent),
    /// A status batch push completed, successfully or not
    EvseStatusBatchSent(EvseStatusBatchSentEvent),
    /// The hub answered with a non-success HTTP status or an unreadable body
    TransportError(TransportErrorEvent),
    /// A remote operation failed before any response existed
    LocalException(LocalExceptionEvent),
}

impl Event {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::EvseStatusBatchSending(_) => "evse_status_batch_sending",
            Event::EvseStatusBatchSent(_) => "evse_status_batch_sent",
            Event::TransportError(_) => "transport_error",
            Event::LocalException(_) => "local_exception",
        }
    }

    /// Synchronization run the event belongs to, if any
    pub fn tracking_id(&self) -> Option<Uuid> {
        match self {
            Event::EvseStatusBatchSending(e) => Some(e.tracking_id),
            Event::EvseStatusBatchSent(e) => Some(e.tracking_id),
            Event::TransportError(_) | Event::LocalException(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvseStatusBatchSendingEvent {
    pub tracking_id: Uuid,
    pub action: ActionType,
    pub operator_id: OperatorId,
    pub records: Vec<EvseStatusRecord>,
    pub endpoint: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvseStatusBatchSentEvent {
    pub tracking_id: Uuid,
    pub action: ActionType,
    pub operator_id: OperatorId,
    pub evse_ids: Vec<EvseId>,
    pub endpoint: String,
    pub outcome: OutcomeKind,
    pub acknowledgement: Acknowledgement,
    pub elapsed_ms: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportErrorEvent {
    pub operation: String,
    pub endpoint: String,
    pub status_code: u16,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalExceptionEvent {
    pub operation: String,
    pub endpoint: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}
