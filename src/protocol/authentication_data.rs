//! `eRoamingPullAuthenticationData`

use super::common_types::read_identification;
use super::envelope::SoapRequest;
use super::namespaces::Namespace;
use super::operation::Operation;
use super::xml::{XmlElement, XmlWriter};
use crate::domain::{AuthenticationData, OperatorId, ProviderAuthenticationData, ProviderId};
use crate::support::errors::{CodecError, CodecResult};

const NS: Namespace = Namespace::AuthenticationData;

pub const AUTHENTICATION_DATA: &str = "eRoamingAuthenticationData";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullAuthenticationDataRequest {
    pub operator_id: OperatorId,
}

impl SoapRequest for PullAuthenticationDataRequest {
    type Response = AuthenticationData;

    fn operation(&self) -> Operation {
        Operation::PullAuthenticationData
    }

    fn write_content(&self, w: &mut XmlWriter) -> CodecResult<()> {
        w.element(NS, "OperatorID", self.operator_id.as_str())
    }

    fn decode_response(payload: &XmlElement) -> CodecResult<AuthenticationData> {
        payload.expect_name(AUTHENTICATION_DATA)?;

        // An empty answer carries no AuthenticationData element at all
        let Some(data) = payload.child("AuthenticationData") else {
            return Ok(AuthenticationData::default());
        };

        let providers = data
            .children_named("ProviderAuthenticationData")
            .map(read_provider)
            .collect::<CodecResult<Vec<_>>>()?;

        Ok(AuthenticationData { providers })
    }
}

fn read_provider(element: &XmlElement) -> CodecResult<ProviderAuthenticationData> {
    let raw_id = element.required_text("ProviderID")?;
    let provider_id = ProviderId::new(raw_id)
        .map_err(|e| CodecError::invalid_value("ProviderID", e.to_string()))?;

    let identifications = element
        .children_named("AuthenticationDataRecord")
        .map(|record| read_identification(record.required_child("Identification")?))
        .collect::<CodecResult<Vec<_>>>()?;

    Ok(ProviderAuthenticationData {
        provider_id,
        identifications,
    })
}
