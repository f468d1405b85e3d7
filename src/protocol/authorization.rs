//! `eRoamingAuthorizeStart`, `eRoamingAuthorizeStop` and
//! `eRoamingChargeDetailRecord`

use super::common_types::{
    read_acknowledgement, read_identification, read_partner_session_id, read_session_id,
    read_status_code, write_identification,
};
use super::envelope::SoapRequest;
use super::namespaces::Namespace;
use super::numeric::{format_energy, format_timestamp};
use super::operation::Operation;
use super::xml::{XmlElement, XmlWriter};
use crate::domain::{
    Acknowledgement, AuthorizationStart, AuthorizationStatus, AuthorizationStop,
    AuthorizeStartRequest, AuthorizeStopRequest, ChargeDetailRecord, ProviderId,
};
use crate::support::errors::{CodecError, CodecResult};

const NS: Namespace = Namespace::Authorization;

pub const AUTHORIZATION_START: &str = "eRoamingAuthorizationStart";
pub const AUTHORIZATION_STOP: &str = "eRoamingAuthorizationStop";

impl SoapRequest for AuthorizeStartRequest {
    type Response = AuthorizationStart;

    fn operation(&self) -> Operation {
        Operation::AuthorizeStart
    }

    fn write_content(&self, w: &mut XmlWriter) -> CodecResult<()> {
        w.optional(NS, "SessionID", self.session_id.as_ref().map(|s| s.as_str()))?;
        w.optional(
            NS,
            "PartnerSessionID",
            self.partner_session_id.as_ref().map(|s| s.as_str()),
        )?;
        w.element(NS, "OperatorID", self.operator_id.as_str())?;
        w.optional(NS, "EVSEID", self.evse_id.as_ref().map(|e| e.as_str()))?;
        write_identification(w, NS, &self.identification)?;
        w.optional(NS, "PartnerProductID", self.partner_product_id.as_deref())
    }

    fn decode_response(payload: &XmlElement) -> CodecResult<AuthorizationStart> {
        payload.expect_name(AUTHORIZATION_START)?;

        let stop_identifications = match payload.child("AuthorizationStopIdentifications") {
            Some(list) => list
                .children_named("Identification")
                .map(read_identification)
                .collect::<CodecResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(AuthorizationStart {
            session_id: read_session_id(payload)?,
            partner_session_id: read_partner_session_id(payload)?,
            provider_id: read_provider_id(payload)?,
            status: read_authorization_status(payload)?,
            status_code: payload.child("StatusCode").map(read_status_code).transpose()?,
            stop_identifications,
        })
    }
}

impl SoapRequest for AuthorizeStopRequest {
    type Response = AuthorizationStop;

    fn operation(&self) -> Operation {
        Operation::AuthorizeStop
    }

    fn write_content(&self, w: &mut XmlWriter) -> CodecResult<()> {
        w.element(NS, "SessionID", self.session_id.as_str())?;
        w.optional(
            NS,
            "PartnerSessionID",
            self.partner_session_id.as_ref().map(|s| s.as_str()),
        )?;
        w.element(NS, "OperatorID", self.operator_id.as_str())?;
        w.optional(NS, "EVSEID", self.evse_id.as_ref().map(|e| e.as_str()))?;
        write_identification(w, NS, &self.identification)
    }

    fn decode_response(payload: &XmlElement) -> CodecResult<AuthorizationStop> {
        payload.expect_name(AUTHORIZATION_STOP)?;

        Ok(AuthorizationStop {
            session_id: read_session_id(payload)?,
            partner_session_id: read_partner_session_id(payload)?,
            provider_id: read_provider_id(payload)?,
            status: read_authorization_status(payload)?,
            status_code: payload.child("StatusCode").map(read_status_code).transpose()?,
        })
    }
}

impl SoapRequest for ChargeDetailRecord {
    type Response = Acknowledgement;

    fn operation(&self) -> Operation {
        Operation::SendChargeDetailRecord
    }

    fn write_content(&self, w: &mut XmlWriter) -> CodecResult<()> {
        w.element(NS, "SessionID", self.session_id.as_str())?;
        w.optional(
            NS,
            "PartnerSessionID",
            self.partner_session_id.as_ref().map(|s| s.as_str()),
        )?;
        w.optional(NS, "PartnerProductID", self.partner_product_id.as_deref())?;
        w.element(NS, "EvseID", self.evse_id.as_str())?;
        write_identification(w, NS, &self.identification)?;
        w.optional(
            NS,
            "ChargingStart",
            self.charging_start.as_ref().map(format_timestamp).as_deref(),
        )?;
        w.optional(
            NS,
            "ChargingEnd",
            self.charging_end.as_ref().map(format_timestamp).as_deref(),
        )?;
        w.element(NS, "SessionStart", &format_timestamp(&self.session_start))?;
        w.element(NS, "SessionEnd", &format_timestamp(&self.session_end))?;
        w.optional(
            NS,
            "MeterValueStart",
            self.meter_value_start.map(format_energy).as_deref(),
        )?;
        w.optional(
            NS,
            "MeterValueEnd",
            self.meter_value_end.map(format_energy).as_deref(),
        )?;
        if !self.meter_values_in_between.is_empty() {
            w.nested(NS, "MeterValueInBetween", |w| {
                for value in &self.meter_values_in_between {
                    w.element(NS, "MeterValue", &format_energy(*value))?;
                }
                Ok(())
            })?;
        }
        w.optional(
            NS,
            "ConsumedEnergy",
            self.consumed_energy.map(format_energy).as_deref(),
        )?;
        w.optional(NS, "MeteringSignature", self.metering_signature.as_deref())?;
        w.optional(
            NS,
            "HubOperatorID",
            self.hub_operator_id.as_ref().map(|id| id.as_str()),
        )?;
        w.optional(
            NS,
            "HubProviderID",
            self.hub_provider_id.as_ref().map(|id| id.as_str()),
        )
    }

    fn decode_response(payload: &XmlElement) -> CodecResult<Acknowledgement> {
        read_acknowledgement(payload)
    }
}

fn read_authorization_status(payload: &XmlElement) -> CodecResult<AuthorizationStatus> {
    let raw = payload.required_text("AuthorizationStatus")?;
    AuthorizationStatus::from_wire(raw)
        .ok_or_else(|| CodecError::invalid_value("AuthorizationStatus", raw))
}

fn read_provider_id(payload: &XmlElement) -> CodecResult<Option<ProviderId>> {
    payload
        .child_text("ProviderID")
        .map(|s| {
            ProviderId::new(s).map_err(|e| CodecError::invalid_value("ProviderID", e.to_string()))
        })
        .transpose()
}
