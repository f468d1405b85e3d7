//! Outbound ports
//!
//! [`EvseStatusPort`] is the contract the status synchronizer pushes
//! batches through. The production implementation is
//! [`CpoClient`](crate::application::CpoClient).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::outcome::Outcome;
use crate::domain::{Acknowledgement, ActionType, OperatorEvseStatus};
use crate::support::errors::ArgumentError;

#[async_trait]
pub trait EvseStatusPort: Send + Sync {
    /// Where batches go; reported in notifications.
    fn endpoint(&self) -> String;

    async fn push_evse_status(
        &self,
        status: OperatorEvseStatus,
        action: ActionType,
        timeout: Option<Duration>,
    ) -> Result<Outcome<Acknowledgement>, ArgumentError>;
}

pub type SharedEvseStatusPort = Arc<dyn EvseStatusPort>;
