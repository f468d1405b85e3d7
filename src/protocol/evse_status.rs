//! `eRoamingPushEvseStatus`

use super::common_types::read_acknowledgement;
use super::envelope::SoapRequest;
use super::namespaces::Namespace;
use super::operation::Operation;
use super::xml::{XmlElement, XmlWriter};
use crate::domain::{Acknowledgement, ActionType, OperatorEvseStatus};
use crate::support::errors::CodecResult;

const NS: Namespace = Namespace::EvseStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvseStatusRequest {
    pub action: ActionType,
    pub status: OperatorEvseStatus,
}

impl SoapRequest for PushEvseStatusRequest {
    type Response = Acknowledgement;

    fn operation(&self) -> Operation {
        Operation::PushEvseStatus
    }

    fn write_content(&self, w: &mut XmlWriter) -> CodecResult<()> {
        w.element(NS, "ActionType", self.action.as_wire_str())?;
        w.nested(NS, "OperatorEvseStatus", |w| {
            w.element(NS, "OperatorID", self.status.operator_id.as_str())?;
            w.optional(NS, "OperatorName", self.status.operator_name.as_deref())?;
            for record in &self.status.records {
                w.nested(NS, "EvseStatusRecord", |w| {
                    w.element(NS, "EvseId", record.evse_id.as_str())?;
                    w.element(NS, "EvseStatus", record.status.as_wire_str())
                })?;
            }
            Ok(())
        })
    }

    fn decode_response(payload: &XmlElement) -> CodecResult<Acknowledgement> {
        read_acknowledgement(payload)
    }
}
