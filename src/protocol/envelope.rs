//! SOAP 1.1 envelope encoding and response classification
//!
//! ```text
//! <soapenv:Envelope xmlns:soapenv=".." xmlns:<op-ns>=".." xmlns:CommonTypes="..">
//!   <soapenv:Header/>
//!   <soapenv:Body>
//!     <op-ns:eRoaming...> .. </op-ns:eRoaming...>
//!   </soapenv:Body>
//! </soapenv:Envelope>
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::namespaces::Namespace;
use super::operation::Operation;
use super::xml::{XmlElement, XmlWriter};
use crate::support::errors::{CodecError, CodecResult};

/// A typed request payload that can be sent to the hub.
///
/// Implementors write the *content* of the operation's root element; the
/// root element itself is emitted by [`encode_request`] from
/// [`Operation::name`], so the two can never disagree.
pub trait SoapRequest: Send + Sync {
    type Response: Send;

    fn operation(&self) -> Operation;

    fn write_content(&self, w: &mut XmlWriter) -> CodecResult<()>;

    /// Decode the payload element of a successful response.
    fn decode_response(payload: &XmlElement) -> CodecResult<Self::Response>;
}

/// Encode a request into a complete SOAP document.
pub fn encode_request<R: SoapRequest>(request: &R) -> CodecResult<String> {
    let operation = request.operation();
    encode_envelope(
        &operation.namespaces(),
        operation.namespace(),
        operation.name(),
        |w| request.write_content(w),
    )
}

/// Encode a document whose body holds the single element `root_ns:root_name`.
pub fn encode_envelope<F>(
    namespaces: &[Namespace],
    root_ns: Namespace,
    root_name: &str,
    content: F,
) -> CodecResult<String>
where
    F: FnOnce(&mut XmlWriter) -> CodecResult<()>,
{
    let soap = Namespace::SoapEnvelope;
    let mut declared = vec![soap];
    declared.extend(namespaces.iter().copied().filter(|ns| *ns != soap));

    let mut w = XmlWriter::new();
    w.declaration()?;
    w.start_declaring(soap, "Envelope", &declared)?;
    w.empty(soap, "Header")?;
    w.nested(soap, "Body", |w| w.nested(root_ns, root_name, content))?;
    w.end(soap, "Envelope")?;
    w.into_string()
}

// ── Faults ─────────────────────────────────────────────────────

/// A SOAP fault returned instead of an operation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapFault {
    pub code: String,
    pub message: String,
    pub detail: Option<String>,
}

impl SoapFault {
    /// Code used when the body could not be decoded as a fault.
    pub const UNPARSEABLE: &'static str = "Unparseable";

    fn from_element(fault: &XmlElement) -> Self {
        // SOAP 1.1 (faultcode/faultstring) with a SOAP 1.2 fallback (Code/Reason)
        let code = fault
            .child_text("faultcode")
            .or_else(|| fault.child("Code").and_then(|c| c.child_text("Value")))
            .unwrap_or_default()
            .to_string();
        let message = fault
            .child_text("faultstring")
            .or_else(|| fault.child("Reason").and_then(|r| r.child_text("Text")))
            .unwrap_or_default()
            .to_string();
        let detail = fault
            .child("detail")
            .or_else(|| fault.child("Detail"))
            .map(XmlElement::deep_text)
            .filter(|d| !d.is_empty());

        Self {
            code,
            message,
            detail,
        }
    }
}

impl fmt::Display for SoapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SOAP fault {}: {}", self.code, self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({})", detail)?;
        }
        Ok(())
    }
}

// ── Decoding ───────────────────────────────────────────────────

/// Content of a response envelope's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeBody {
    Payload(XmlElement),
    Fault(SoapFault),
}

/// Parse a response document and classify its body.
pub fn parse_envelope(raw: &str) -> CodecResult<EnvelopeBody> {
    let root = XmlElement::parse(raw)?;
    root.expect_name("Envelope")?;

    let body = root.required_child("Body")?;
    let payload = body
        .first_child()
        .ok_or_else(|| CodecError::missing("Envelope/Body payload"))?;

    if payload.name == "Fault" {
        Ok(EnvelopeBody::Fault(SoapFault::from_element(payload)))
    } else {
        Ok(EnvelopeBody::Payload(payload.clone()))
    }
}

/// Best-effort fault decoding that never fails.
///
/// A body that is not a readable fault document is returned verbatim as the
/// fault message.
pub fn decode_fault(raw: &str) -> SoapFault {
    match parse_envelope(raw) {
        Ok(EnvelopeBody::Fault(fault)) => fault,
        _ => SoapFault {
            code: SoapFault::UNPARSEABLE.to_string(),
            message: raw.to_string(),
            detail: None,
        },
    }
}

/// Decode a full response document with the request's response decoder.
pub fn decode_response<R: SoapRequest>(raw: &str) -> CodecResult<R::Response> {
    match parse_envelope(raw)? {
        EnvelopeBody::Payload(payload) => R::decode_response(&payload),
        EnvelopeBody::Fault(fault) => Err(CodecError::UnexpectedElement {
            expected: "operation response".to_string(),
            actual: fault.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAULT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
  <SOAP-ENV:Body>
    <SOAP-ENV:Fault>
      <faultcode>SOAP-ENV:Client</faultcode>
      <faultstring>Validation error</faultstring>
      <detail><ValidationError>cvc-pattern-valid: OperatorID</ValidationError></detail>
    </SOAP-ENV:Fault>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#;

    #[test]
    fn envelope_wraps_root_element() {
        let xml = encode_envelope(
            &[Namespace::EvseStatus, Namespace::CommonTypes],
            Namespace::EvseStatus,
            "eRoamingPushEvseStatus",
            |w| w.element(Namespace::EvseStatus, "ActionType", "update"),
        )
        .unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains(r#"xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/""#));
        assert!(xml.contains(
            r#"xmlns:EVSEStatus="http://www.hubject.com/b2b/services/evsestatus/v2.0""#
        ));

        match parse_envelope(&xml).unwrap() {
            EnvelopeBody::Payload(payload) => {
                assert_eq!(payload.name, "eRoamingPushEvseStatus");
                assert_eq!(payload.child_text("ActionType"), Some("update"));
            }
            other => panic!("Expected payload, got {:?}", other),
        }
    }

    #[test]
    fn parses_soap_fault() {
        match parse_envelope(FAULT).unwrap() {
            EnvelopeBody::Fault(fault) => {
                assert_eq!(fault.code, "SOAP-ENV:Client");
                assert_eq!(fault.message, "Validation error");
                assert_eq!(
                    fault.detail.as_deref(),
                    Some("cvc-pattern-valid: OperatorID")
                );
            }
            other => panic!("Expected fault, got {:?}", other),
        }
    }

    #[test]
    fn decode_fault_falls_back_to_raw_body() {
        let fault = decode_fault("<html>Bad Gateway</html>");
        assert_eq!(fault.code, SoapFault::UNPARSEABLE);
        assert_eq!(fault.message, "<html>Bad Gateway</html>");

        let fault = decode_fault("not xml at all");
        assert_eq!(fault.message, "not xml at all");

        assert_eq!(decode_fault(FAULT).message, "Validation error");
    }

    #[test]
    fn envelope_without_body_is_malformed() {
        let err = parse_envelope(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Header/></s:Envelope>"#,
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::MalformedResponse(_)));
    }

    #[test]
    fn non_envelope_root_is_rejected() {
        assert!(matches!(
            parse_envelope("<Acknowledgement/>"),
            Err(CodecError::UnexpectedElement { .. })
        ));
    }
}
