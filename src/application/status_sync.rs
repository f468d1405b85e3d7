//! EVSE status synchronization
//!
//! Turns one [`StatusDiff`] into up to three pushes, always in the order
//! insert, update, delete. Every non-empty phase runs exactly once, whatever
//! happened to the phases before it, and is announced by a "sending" and a
//! "sent" event sharing the run's tracking id.

use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::outcome::{OutcomeKind, SYNTHESIZED_SYSTEM_ERROR_CODE};
use super::ports::SharedEvseStatusPort;
use crate::domain::{
    Acknowledgement, ActionType, EvseId, EvseStatus, EvseStatusRecord, OperatorEvseStatus,
    StatusDiff,
};
use crate::notifications::{
    Event, EvseStatusBatchSendingEvent, EvseStatusBatchSentEvent, SharedEventBus,
};
use crate::support::errors::ArgumentError;

/// Status pushed for removed EVSEs; the hub has no dedicated delete status.
pub const REMOVED_EVSE_STATUS: EvseStatus = EvseStatus::OutOfService;

/// Result of one executed phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseReport {
    pub action: ActionType,
    pub evse_ids: Vec<EvseId>,
    pub outcome: OutcomeKind,
    /// The hub's acknowledgement, or a synthesized failure.
    pub acknowledgement: Acknowledgement,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Absent when the diff was empty and nothing ran.
    pub tracking_id: Option<Uuid>,
    /// Executed phases, in execution order.
    pub phases: Vec<PhaseReport>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.phases.iter().all(|p| p.acknowledgement.result)
    }

    pub fn failed_phases(&self) -> impl Iterator<Item = &PhaseReport> {
        self.phases.iter().filter(|p| !p.acknowledgement.result)
    }
}

pub struct StatusSynchronizer {
    port: SharedEvseStatusPort,
    event_bus: SharedEventBus,
}

impl StatusSynchronizer {
    pub fn new(port: SharedEvseStatusPort, event_bus: SharedEventBus) -> Self {
        Self { port, event_bus }
    }

    /// Push `diff` to the hub.
    ///
    /// Only an invalid diff is an error. Failed pushes are reported in the
    /// phase reports and the "sent" events.
    pub async fn synchronize(
        &self,
        diff: &StatusDiff,
        timeout: Option<Duration>,
    ) -> Result<SyncReport, ArgumentError> {
        diff.validate()?;

        if diff.is_empty() {
            debug!(operator_id = %diff.operator_id, "Empty status diff, nothing to push");
            return Ok(SyncReport::default());
        }

        let tracking_id = Uuid::new_v4();
        info!(
            %tracking_id,
            operator_id = %diff.operator_id,
            added = diff.added.len(),
            changed = diff.changed.len(),
            removed = diff.removed.len(),
            "Synchronizing EVSE status"
        );

        let phases = [
            (ActionType::Insert, to_records(diff.added.iter())),
            (ActionType::Update, to_records(diff.changed.iter())),
            (
                ActionType::Delete,
                diff.removed
                    .iter()
                    .map(|id| EvseStatusRecord::new(id.clone(), REMOVED_EVSE_STATUS))
                    .collect(),
            ),
        ];

        let mut report = SyncReport {
            tracking_id: Some(tracking_id),
            phases: Vec::with_capacity(phases.len()),
        };
        for (action, records) in phases {
            if records.is_empty() {
                continue;
            }
            let phase = self
                .run_phase(diff, tracking_id, action, records, timeout)
                .await;
            report.phases.push(phase);
        }

        info!(
            %tracking_id,
            phases = report.phases.len(),
            failed = report.failed_phases().count(),
            "EVSE status synchronization finished"
        );
        Ok(report)
    }

    async fn run_phase(
        &self,
        diff: &StatusDiff,
        tracking_id: Uuid,
        action: ActionType,
        records: Vec<EvseStatusRecord>,
        timeout: Option<Duration>,
    ) -> PhaseReport {
        let endpoint = self.port.endpoint();
        let evse_ids: Vec<EvseId> = records.iter().map(|r| r.evse_id.clone()).collect();

        self.event_bus
            .publish(Event::EvseStatusBatchSending(EvseStatusBatchSendingEvent {
                tracking_id,
                action,
                operator_id: diff.operator_id.clone(),
                records: records.clone(),
                endpoint: endpoint.clone(),
                timestamp: Utc::now(),
            }));

        let start = Instant::now();
        let batch = OperatorEvseStatus {
            operator_id: diff.operator_id.clone(),
            operator_name: diff.operator_name.clone(),
            records,
        };
        let pushed = self.port.push_evse_status(batch, action, timeout).await;
        let (outcome, acknowledgement) = match pushed {
            Ok(outcome) => (outcome.kind(), outcome.into_acknowledgement()),
            // Rejected locally, nothing reached the hub
            Err(e) => (
                OutcomeKind::LocalException,
                Acknowledgement::failed(
                    SYNTHESIZED_SYSTEM_ERROR_CODE,
                    format!("Batch rejected: {}", e),
                ),
            ),
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if acknowledgement.result {
            info!(
                %tracking_id,
                action = action.as_wire_str(),
                evse_count = evse_ids.len(),
                elapsed_ms,
                "Status batch acknowledged"
            );
        } else {
            warn!(
                %tracking_id,
                action = action.as_wire_str(),
                evse_count = evse_ids.len(),
                %outcome,
                "Status batch failed: {}",
                acknowledgement.status_code
            );
        }

        self.event_bus
            .publish(Event::EvseStatusBatchSent(EvseStatusBatchSentEvent {
                tracking_id,
                action,
                operator_id: diff.operator_id.clone(),
                evse_ids: evse_ids.clone(),
                endpoint,
                outcome,
                acknowledgement: acknowledgement.clone(),
                elapsed_ms,
                timestamp: Utc::now(),
            }));

        PhaseReport {
            action,
            evse_ids,
            outcome,
            acknowledgement,
        }
    }
}

fn to_records<'a>(entries: impl Iterator<Item = (&'a EvseId, &'a EvseStatus)>) -> Vec<EvseStatusRecord> {
    entries
        .map(|(id, status)| EvseStatusRecord::new(id.clone(), *status))
        .collect()
}
