//! CPO client facade
//!
//! One method per hub operation a charge point operator uses. Arguments are
//! checked here, before anything is encoded; the invoker takes care of the
//! rest.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use super::invoker::{HubEndpoint, SoapInvoker};
use super::outcome::Outcome;
use super::ports::EvseStatusPort;
use crate::domain::{
    Acknowledgement, ActionType, AuthenticationData, AuthorizationStart, AuthorizationStop,
    AuthorizeStartRequest, AuthorizeStopRequest, ChargeDetailRecord, EvseId, Identification,
    OperatorEvseData, OperatorEvseStatus, OperatorId,
};
use crate::infrastructure::dns::SharedDnsResolver;
use crate::notifications::SharedEventBus;
use crate::protocol::{HubService, PullAuthenticationDataRequest, PushEvseDataRequest, PushEvseStatusRequest};
use crate::support::errors::ArgumentError;

pub struct CpoClient {
    invoker: SoapInvoker,
}

impl CpoClient {
    pub fn new(endpoint: HubEndpoint, resolver: SharedDnsResolver) -> Result<Self, ArgumentError> {
        Ok(Self::from_invoker(SoapInvoker::new(endpoint, resolver)?))
    }

    pub fn from_invoker(invoker: SoapInvoker) -> Self {
        Self { invoker }
    }

    pub fn with_event_bus(self, event_bus: SharedEventBus) -> Self {
        Self {
            invoker: self.invoker.with_event_bus(event_bus),
        }
    }

    pub fn endpoint(&self) -> &HubEndpoint {
        self.invoker.endpoint()
    }

    // ── EVSE data ──────────────────────────────────────────────

    pub async fn push_evse_data(
        &self,
        data: OperatorEvseData,
        action: ActionType,
        timeout: Option<Duration>,
    ) -> Result<Outcome<Acknowledgement>, ArgumentError> {
        check_batch(action, data.records.iter().map(|r| &r.evse_id))?;
        info!(
            operator_id = %data.operator_id,
            action = action.as_wire_str(),
            evse_count = data.records.len(),
            "Pushing EVSE data"
        );

        self.invoker
            .invoke(&PushEvseDataRequest { action, data }, timeout)
            .await
    }

    // ── EVSE status ────────────────────────────────────────────

    pub async fn push_evse_status(
        &self,
        status: OperatorEvseStatus,
        action: ActionType,
        timeout: Option<Duration>,
    ) -> Result<Outcome<Acknowledgement>, ArgumentError> {
        check_batch(action, status.records.iter().map(|r| &r.evse_id))?;
        info!(
            operator_id = %status.operator_id,
            action = action.as_wire_str(),
            evse_count = status.records.len(),
            "Pushing EVSE status"
        );

        self.invoker
            .invoke(&PushEvseStatusRequest { action, status }, timeout)
            .await
    }

    // ── Authorization ──────────────────────────────────────────

    pub async fn authorize_start(
        &self,
        request: &AuthorizeStartRequest,
        timeout: Option<Duration>,
    ) -> Result<Outcome<AuthorizationStart>, ArgumentError> {
        check_identification(&request.identification)?;
        info!(
            operator_id = %request.operator_id,
            evse_id = request.evse_id.as_ref().map(|e| e.as_str()),
            "Requesting start authorization"
        );

        self.invoker.invoke(request, timeout).await
    }

    pub async fn authorize_stop(
        &self,
        request: &AuthorizeStopRequest,
        timeout: Option<Duration>,
    ) -> Result<Outcome<AuthorizationStop>, ArgumentError> {
        check_identification(&request.identification)?;
        info!(
            operator_id = %request.operator_id,
            session_id = %request.session_id,
            "Requesting stop authorization"
        );

        self.invoker.invoke(request, timeout).await
    }

    pub async fn send_charge_detail_record(
        &self,
        cdr: &ChargeDetailRecord,
        timeout: Option<Duration>,
    ) -> Result<Outcome<Acknowledgement>, ArgumentError> {
        check_identification(&cdr.identification)?;
        if cdr.session_end < cdr.session_start {
            return Err(ArgumentError::invalid(
                "session_end",
                "session ends before it starts",
            ));
        }
        if let (Some(start), Some(end)) = (cdr.charging_start, cdr.charging_end) {
            if end < start {
                return Err(ArgumentError::invalid(
                    "charging_end",
                    "charging ends before it starts",
                ));
            }
        }
        info!(session_id = %cdr.session_id, evse_id = %cdr.evse_id, "Sending charge detail record");

        self.invoker.invoke(cdr, timeout).await
    }

    // ── Authentication data ────────────────────────────────────

    pub async fn pull_authentication_data(
        &self,
        operator_id: &OperatorId,
        timeout: Option<Duration>,
    ) -> Result<Outcome<AuthenticationData>, ArgumentError> {
        info!(operator_id = %operator_id, "Pulling authentication data");
        let request = PullAuthenticationDataRequest {
            operator_id: operator_id.clone(),
        };
        self.invoker.invoke(&request, timeout).await
    }
}

#[async_trait]
impl EvseStatusPort for CpoClient {
    fn endpoint(&self) -> String {
        self.invoker.endpoint().url(HubService::EvseStatus)
    }

    async fn push_evse_status(
        &self,
        status: OperatorEvseStatus,
        action: ActionType,
        timeout: Option<Duration>,
    ) -> Result<Outcome<Acknowledgement>, ArgumentError> {
        CpoClient::push_evse_status(self, status, action, timeout).await
    }
}

/// A batch must not be empty (unless it replaces everything) and must not
/// name an EVSE twice.
fn check_batch<'a>(
    action: ActionType,
    evse_ids: impl ExactSizeIterator<Item = &'a EvseId>,
) -> Result<(), ArgumentError> {
    if evse_ids.len() == 0 && action != ActionType::FullLoad {
        return Err(ArgumentError::invalid(
            "records",
            format!("{} batch must not be empty", action.as_wire_str()),
        ));
    }
    let mut seen = HashSet::new();
    for evse_id in evse_ids {
        if !seen.insert(evse_id) {
            return Err(ArgumentError::invalid(
                "records",
                format!("EVSE {} appears more than once", evse_id),
            ));
        }
    }
    Ok(())
}

fn check_identification(identification: &Identification) -> Result<(), ArgumentError> {
    if identification.token().trim().is_empty() {
        return Err(ArgumentError::Missing("identification"));
    }
    Ok(())
}
