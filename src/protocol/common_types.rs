//! Shared `CommonTypes` elements: status codes, identifications and the
//! acknowledgement returned by every push operation

use tracing::warn;

use super::envelope::{encode_envelope, parse_envelope, EnvelopeBody};
use super::namespaces::Namespace;
use super::xml::{parse_bool, XmlElement, XmlWriter};
use crate::domain::{Acknowledgement, Identification, PartnerSessionId, SessionId, StatusCode};
use crate::support::errors::{CodecError, CodecResult};

const CT: Namespace = Namespace::CommonTypes;

pub const ACKNOWLEDGEMENT: &str = "eRoamingAcknowledgement";

// ── Status code ────────────────────────────────────────────────

pub fn write_status_code(w: &mut XmlWriter, ns: Namespace, code: &StatusCode) -> CodecResult<()> {
    w.nested(ns, "StatusCode", |w| {
        w.element(CT, "Code", &code.wire_code())?;
        w.optional(CT, "Description", code.description.as_deref())?;
        w.optional(CT, "AdditionalInfo", code.additional_info.as_deref())
    })
}

pub fn read_status_code(element: &XmlElement) -> CodecResult<StatusCode> {
    let raw_code = element.required_text("Code")?;
    let code = raw_code
        .parse::<u16>()
        .map_err(|_| CodecError::invalid_value("StatusCode/Code", raw_code))?;

    Ok(StatusCode {
        code,
        description: element.child_string("Description").map(String::from),
        additional_info: element.child_string("AdditionalInfo").map(String::from),
    })
}

// ── Identification ─────────────────────────────────────────────

/// Write `<ns:Identification>` with the matching `CommonTypes` choice.
pub fn write_identification(
    w: &mut XmlWriter,
    ns: Namespace,
    identification: &Identification,
) -> CodecResult<()> {
    w.nested(ns, "Identification", |w| write_identification_choice(w, identification))
}

fn write_identification_choice(w: &mut XmlWriter, identification: &Identification) -> CodecResult<()> {
    match identification {
        Identification::RfidMifareFamily { uid } => {
            w.nested(CT, "RFIDmifarefamilyIdentification", |w| w.element(CT, "UID", uid))
        }
        Identification::QrCode { evco_id, pin } => w.nested(CT, "QRCodeIdentification", |w| {
            w.element(CT, "EVCOID", evco_id)?;
            w.element(CT, "PIN", pin)
        }),
        Identification::PlugAndCharge { evco_id } => {
            w.nested(CT, "PlugAndChargeIdentification", |w| {
                w.element(CT, "EVCOID", evco_id)
            })
        }
        Identification::Remote { evco_id } => {
            w.nested(CT, "RemoteIdentification", |w| w.element(CT, "EVCOID", evco_id))
        }
    }
}

/// Read an `Identification` wrapper element.
pub fn read_identification(element: &XmlElement) -> CodecResult<Identification> {
    let choice = element
        .first_child()
        .ok_or_else(|| CodecError::missing(format!("{}/<identification>", element.name)))?;

    match choice.name.as_str() {
        "RFIDmifarefamilyIdentification" => Ok(Identification::RfidMifareFamily {
            uid: choice.required_text("UID")?.to_string(),
        }),
        "QRCodeIdentification" => Ok(Identification::QrCode {
            evco_id: choice.required_text("EVCOID")?.to_string(),
            pin: choice.child_text("PIN").unwrap_or_default().to_string(),
        }),
        "PlugAndChargeIdentification" => Ok(Identification::PlugAndCharge {
            evco_id: choice.required_text("EVCOID")?.to_string(),
        }),
        "RemoteIdentification" => Ok(Identification::Remote {
            evco_id: choice.required_text("EVCOID")?.to_string(),
        }),
        other => Err(CodecError::invalid_value("Identification", other)),
    }
}

// ── Session ids ────────────────────────────────────────────────

pub fn read_session_id(element: &XmlElement) -> CodecResult<Option<SessionId>> {
    element
        .child_text("SessionID")
        .map(|s| SessionId::new(s).map_err(|e| CodecError::invalid_value("SessionID", e.to_string())))
        .transpose()
}

pub fn read_partner_session_id(element: &XmlElement) -> CodecResult<Option<PartnerSessionId>> {
    element
        .child_text("PartnerSessionID")
        .map(|s| {
            PartnerSessionId::new(s)
                .map_err(|e| CodecError::invalid_value("PartnerSessionID", e.to_string()))
        })
        .transpose()
}

// ── Acknowledgement ────────────────────────────────────────────

pub fn read_acknowledgement(element: &XmlElement) -> CodecResult<Acknowledgement> {
    element.expect_name(ACKNOWLEDGEMENT)?;

    let result = parse_bool("Result", element.required_text("Result")?)?;
    let status_code = read_status_code(element.required_child("StatusCode")?)?;

    let ack = Acknowledgement {
        result,
        status_code,
        session_id: read_session_id(element)?,
        partner_session_id: read_partner_session_id(element)?,
    };

    if let Some(anomaly) = ack.anomaly() {
        warn!(
            %anomaly,
            description = ack.status_code.description.as_deref().unwrap_or(""),
            "Acknowledgement result and status code disagree; using Result"
        );
    }

    Ok(ack)
}

/// Decode a complete acknowledgement response document.
pub fn decode_acknowledgement(raw: &str) -> CodecResult<Acknowledgement> {
    match parse_envelope(raw)? {
        EnvelopeBody::Payload(payload) => read_acknowledgement(&payload),
        EnvelopeBody::Fault(fault) => Err(CodecError::UnexpectedElement {
            expected: ACKNOWLEDGEMENT.to_string(),
            actual: fault.to_string(),
        }),
    }
}

/// Encode an acknowledgement as a hub success response.
pub fn encode_acknowledgement(ack: &Acknowledgement) -> CodecResult<String> {
    encode_envelope(&[CT], CT, ACKNOWLEDGEMENT, |w| {
        w.boolean(CT, "Result", ack.result)?;
        write_status_code(w, CT, &ack.status_code)?;
        w.optional(CT, "SessionID", ack.session_id.as_ref().map(|s| s.as_str()))?;
        w.optional(
            CT,
            "PartnerSessionID",
            ack.partner_session_id.as_ref().map(|s| s.as_str()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ack_envelope(inner: &str) -> String {
        format!(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:cmn="http://www.hubject.com/b2b/services/commontypes/v2.0">
<soap:Body><cmn:eRoamingAcknowledgement>{}</cmn:eRoamingAcknowledgement></soap:Body></soap:Envelope>"#,
            inner
        )
    }

    #[test]
    fn acknowledgement_round_trip() {
        let mut ack = Acknowledgement::success("Success");
        ack.status_code.additional_info = Some("3 records".to_string());
        ack.session_id = Some(SessionId::new("b2bd9f32-7c2c-4a2b-8e0c-3b7a6f1d2e44").unwrap());
        ack.partner_session_id = Some(PartnerSessionId::new("P-1").unwrap());

        let xml = encode_acknowledgement(&ack).unwrap();
        assert_eq!(decode_acknowledgement(&xml).unwrap(), ack);

        let minimal = Acknowledgement::success("ok");
        let xml = encode_acknowledgement(&minimal).unwrap();
        assert!(!xml.contains("SessionID"));
        assert_eq!(decode_acknowledgement(&xml).unwrap(), minimal);
    }

    #[test]
    fn successful_acknowledgements_survive_encoding() {
        let session = || Some(SessionId::new("b2bd9f32-7c2c-4a2b-8e0c-3b7a6f1d2e44").unwrap());
        let partner = || Some(PartnerSessionId::new("P&<1>").unwrap());
        let cases = [
            (Some(""), None, None, None),
            (Some(""), Some(""), session(), None),
            (Some("  padded "), Some("\ttab\n"), None, partner()),
            (Some("a & b < c"), Some("<x/>"), session(), partner()),
            (None, Some("  "), None, None),
            (None, None, session(), partner()),
        ];

        for (description, additional_info, session_id, partner_session_id) in cases {
            let ack = Acknowledgement {
                result: true,
                status_code: StatusCode {
                    code: 0,
                    description: description.map(String::from),
                    additional_info: additional_info.map(String::from),
                },
                session_id,
                partner_session_id,
            };
            let xml = encode_acknowledgement(&ack).unwrap();
            assert_eq!(decode_acknowledgement(&xml).unwrap(), ack, "{}", xml);
        }
    }

    #[test]
    fn decodes_hub_acknowledgement() {
        let raw = ack_envelope(
            "<cmn:Result>false</cmn:Result><cmn:StatusCode><cmn:Code>017</cmn:Code>\
             <cmn:Description>Unauthorized Access</cmn:Description></cmn:StatusCode>",
        );
        let ack = decode_acknowledgement(&raw).unwrap();
        assert!(!ack.result);
        assert_eq!(ack.status_code.code, 17);
        assert_eq!(
            ack.status_code.description.as_deref(),
            Some("Unauthorized Access")
        );
        assert_eq!(ack.session_id, None);
    }

    #[test]
    fn missing_result_is_malformed() {
        let raw = ack_envelope("<cmn:StatusCode><cmn:Code>000</cmn:Code></cmn:StatusCode>");
        assert!(matches!(
            decode_acknowledgement(&raw),
            Err(CodecError::MalformedResponse(_))
        ));
    }

    #[test]
    fn missing_code_is_malformed() {
        let raw = ack_envelope("<cmn:Result>true</cmn:Result><cmn:StatusCode/>");
        assert!(matches!(
            decode_acknowledgement(&raw),
            Err(CodecError::MalformedResponse(_))
        ));
    }

    #[test]
    fn non_numeric_code_is_invalid() {
        let raw = ack_envelope(
            "<cmn:Result>true</cmn:Result><cmn:StatusCode><cmn:Code>OK</cmn:Code></cmn:StatusCode>",
        );
        assert!(matches!(
            decode_acknowledgement(&raw),
            Err(CodecError::InvalidValue { .. })
        ));
    }

    #[test]
    fn result_wins_over_code() {
        let raw = ack_envelope(
            "<cmn:Result>true</cmn:Result><cmn:StatusCode><cmn:Code>009</cmn:Code></cmn:StatusCode>",
        );
        let ack = decode_acknowledgement(&raw).unwrap();
        assert!(ack.is_success());
        assert!(ack.anomaly().is_some());
    }

    #[test]
    fn identification_choices() {
        let cases = [
            Identification::rfid("08152305F8A4B1"),
            Identification::QrCode {
                evco_id: "DE*ICE*C12345678*9".to_string(),
                pin: "1234".to_string(),
            },
            Identification::PlugAndCharge {
                evco_id: "DE*ICE*C87654321*0".to_string(),
            },
            Identification::Remote {
                evco_id: "DE*ICE*C11111111*1".to_string(),
            },
        ];

        for identification in cases {
            let mut w = XmlWriter::new();
            write_identification(&mut w, Namespace::Authorization, &identification).unwrap();
            let xml = w.into_string().unwrap();
            let parsed = XmlElement::parse(&xml).unwrap();
            assert_eq!(parsed.name, "Identification");
            assert_eq!(read_identification(&parsed).unwrap(), identification);
        }
    }

    #[test]
    fn unknown_identification_is_rejected() {
        let element = XmlElement::parse("<Identification><Fingerprint/></Identification>").unwrap();
        assert!(read_identification(&element).is_err());
    }
}
