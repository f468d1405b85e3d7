//! Authorization, charge detail records and authentication data

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::acknowledgement::StatusCode;
use super::identifiers::{EvseId, OperatorId, PartnerSessionId, ProviderId, SessionId};

/// How a driver identified at the charge point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Identification {
    /// RFID card of the mifare family.
    RfidMifareFamily { uid: String },
    /// QR code scan with contract id and PIN.
    QrCode { evco_id: String, pin: String },
    /// ISO 15118 Plug&Charge.
    PlugAndCharge { evco_id: String },
    /// Remote start via the provider's app or backend.
    Remote { evco_id: String },
}

impl Identification {
    pub fn rfid(uid: impl Into<String>) -> Self {
        Self::RfidMifareFamily { uid: uid.into() }
    }

    /// The token used for logging: UID or EVCO id.
    pub fn token(&self) -> &str {
        match self {
            Self::RfidMifareFamily { uid } => uid,
            Self::QrCode { evco_id, .. }
            | Self::PlugAndCharge { evco_id }
            | Self::Remote { evco_id } => evco_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    Authorized,
    NotAuthorized,
}

impl AuthorizationStatus {
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Self::Authorized => "Authorized",
            Self::NotAuthorized => "NotAuthorized",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "Authorized" => Some(Self::Authorized),
            "NotAuthorized" => Some(Self::NotAuthorized),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeStartRequest {
    pub operator_id: OperatorId,
    pub identification: Identification,
    pub evse_id: Option<EvseId>,
    pub session_id: Option<SessionId>,
    pub partner_session_id: Option<PartnerSessionId>,
    pub partner_product_id: Option<String>,
}

impl AuthorizeStartRequest {
    pub fn new(operator_id: OperatorId, identification: Identification) -> Self {
        Self {
            operator_id,
            identification,
            evse_id: None,
            session_id: None,
            partner_session_id: None,
            partner_product_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeStopRequest {
    pub session_id: SessionId,
    pub operator_id: OperatorId,
    pub identification: Identification,
    pub evse_id: Option<EvseId>,
    pub partner_session_id: Option<PartnerSessionId>,
}

/// Hub answer to an authorize start request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationStart {
    pub session_id: Option<SessionId>,
    pub partner_session_id: Option<PartnerSessionId>,
    pub provider_id: Option<ProviderId>,
    pub status: AuthorizationStatus,
    pub status_code: Option<StatusCode>,
    /// Identifications that may also stop the session.
    pub stop_identifications: Vec<Identification>,
}

/// Hub answer to an authorize stop request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationStop {
    pub session_id: Option<SessionId>,
    pub partner_session_id: Option<PartnerSessionId>,
    pub provider_id: Option<ProviderId>,
    pub status: AuthorizationStatus,
    pub status_code: Option<StatusCode>,
}

/// Billing-relevant record of a finished charging session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeDetailRecord {
    pub session_id: SessionId,
    pub partner_session_id: Option<PartnerSessionId>,
    pub partner_product_id: Option<String>,
    pub evse_id: EvseId,
    pub identification: Identification,
    pub charging_start: Option<DateTime<Utc>>,
    pub charging_end: Option<DateTime<Utc>>,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    /// Meter values in kWh.
    pub meter_value_start: Option<Decimal>,
    pub meter_value_end: Option<Decimal>,
    pub meter_values_in_between: Vec<Decimal>,
    /// Consumed energy in kWh.
    pub consumed_energy: Option<Decimal>,
    pub metering_signature: Option<String>,
    pub hub_operator_id: Option<OperatorId>,
    pub hub_provider_id: Option<ProviderId>,
}

impl ChargeDetailRecord {
    pub fn new(
        session_id: SessionId,
        evse_id: EvseId,
        identification: Identification,
        session_start: DateTime<Utc>,
        session_end: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            partner_session_id: None,
            partner_product_id: None,
            evse_id,
            identification,
            charging_start: None,
            charging_end: None,
            session_start,
            session_end,
            meter_value_start: None,
            meter_value_end: None,
            meter_values_in_between: Vec::new(),
            consumed_energy: None,
            metering_signature: None,
            hub_operator_id: None,
            hub_provider_id: None,
        }
    }
}

/// Identifications a provider has released to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAuthenticationData {
    pub provider_id: ProviderId,
    pub identifications: Vec<Identification>,
}

/// Offline authentication data pulled from the hub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationData {
    pub providers: Vec<ProviderAuthenticationData>,
}

impl AuthenticationData {
    pub fn identification_count(&self) -> usize {
        self.providers.iter().map(|p| p.identifications.len()).sum()
    }
}
