//! Result model of a single remote operation

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::Acknowledgement;
use crate::protocol::SoapFault;

/// Status code of a synthesized acknowledgement for a SOAP fault.
pub const SYNTHESIZED_FAULT_CODE: u16 = 22;
/// Status code of a synthesized acknowledgement for transport and local failures.
pub const SYNTHESIZED_SYSTEM_ERROR_CODE: u16 = 21;

/// What the transport saw for a call that produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportMetadata {
    pub status_code: u16,
    pub content_type: Option<String>,
    pub soap_action: String,
    pub url: String,
    pub elapsed: Duration,
}

/// Classification of one remote operation. Exactly one variant per call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Well-formed operation response, decoded.
    Success {
        payload: T,
        transport: TransportMetadata,
    },
    /// The hub answered with a SOAP fault.
    ProtocolFault {
        fault: SoapFault,
        raw_body: String,
        transport: TransportMetadata,
    },
    /// Non-success HTTP status, or a success status with an unreadable body.
    TransportError { status_code: u16, raw_body: String },
    /// Failure before any response existed.
    LocalException { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    ProtocolFault,
    TransportError,
    LocalException,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ProtocolFault => "protocol_fault",
            Self::TransportError => "transport_error",
            Self::LocalException => "local_exception",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T> Outcome<T> {
    pub fn local(message: impl Into<String>) -> Self {
        Self::LocalException {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success { .. } => OutcomeKind::Success,
            Self::ProtocolFault { .. } => OutcomeKind::ProtocolFault,
            Self::TransportError { .. } => OutcomeKind::TransportError,
            Self::LocalException { .. } => OutcomeKind::LocalException,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            Self::Success { payload, .. } => Some(payload),
            _ => None,
        }
    }

    pub fn into_payload(self) -> Option<T> {
        match self {
            Self::Success { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Transport metadata, present whenever a response was classified by
    /// content.
    pub fn transport(&self) -> Option<&TransportMetadata> {
        match self {
            Self::Success { transport, .. } | Self::ProtocolFault { transport, .. } => {
                Some(transport)
            }
            Self::TransportError { .. } | Self::LocalException { .. } => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success { payload, transport } => Outcome::Success {
                payload: f(payload),
                transport,
            },
            Self::ProtocolFault {
                fault,
                raw_body,
                transport,
            } => Outcome::ProtocolFault {
                fault,
                raw_body,
                transport,
            },
            Self::TransportError {
                status_code,
                raw_body,
            } => Outcome::TransportError {
                status_code,
                raw_body,
            },
            Self::LocalException { message } => Outcome::LocalException { message },
        }
    }

    /// One-line diagnostic of a non-success outcome.
    pub fn describe(&self) -> String {
        match self {
            Self::Success { transport, .. } => format!("HTTP {}", transport.status_code),
            Self::ProtocolFault { fault, .. } => fault.to_string(),
            Self::TransportError {
                status_code,
                raw_body,
            } => {
                if raw_body.trim().is_empty() {
                    format!("HTTP {} with empty body", status_code)
                } else {
                    format!("HTTP {}: {}", status_code, truncate(raw_body, 200))
                }
            }
            Self::LocalException { message } => message.clone(),
        }
    }
}

impl Outcome<Acknowledgement> {
    /// The hub's acknowledgement, or a failed one synthesized from the
    /// outcome when the hub did not provide one.
    pub fn into_acknowledgement(self) -> Acknowledgement {
        let code = match self {
            Self::Success { payload, .. } => return payload,
            Self::ProtocolFault { .. } => SYNTHESIZED_FAULT_CODE,
            Self::TransportError { .. } | Self::LocalException { .. } => {
                SYNTHESIZED_SYSTEM_ERROR_CODE
            }
        };
        let mut ack = Acknowledgement::failed(code, self.describe());
        ack.status_code.additional_info = Some(self.kind().to_string());
        ack
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
