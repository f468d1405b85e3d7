//! Hub acknowledgement of a write operation

use std::fmt;

use serde::{Deserialize, Serialize};

use super::identifiers::{PartnerSessionId, SessionId};

/// Hub status code: numeric code plus optional diagnostics.
///
/// Diagnostic only. Success is decided by [`Acknowledgement::result`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCode {
    pub code: u16,
    pub description: Option<String>,
    pub additional_info: Option<String>,
}

impl StatusCode {
    pub const SUCCESS: u16 = 0;

    pub fn new(code: u16) -> Self {
        Self {
            code,
            description: None,
            additional_info: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_additional_info(mut self, info: impl Into<String>) -> Self {
        self.additional_info = Some(info.into());
        self
    }

    /// Three-digit wire representation, e.g. `000`, `017`.
    pub fn wire_code(&self) -> String {
        format!("{:03}", self.code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_code())?;
        if let Some(description) = &self.description {
            write!(f, " {}", description)?;
        }
        if let Some(info) = &self.additional_info {
            write!(f, " ({})", info)?;
        }
        Ok(())
    }
}

/// Disagreement between `Result` and the status code of an acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckAnomaly {
    /// `Result=true` but a non-zero status code.
    SuccessWithErrorCode(u16),
    /// `Result=false` but status code `000`.
    FailureWithSuccessCode,
}

impl fmt::Display for AckAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuccessWithErrorCode(code) => {
                write!(f, "Result=true with status code {:03}", code)
            }
            Self::FailureWithSuccessCode => write!(f, "Result=false with status code 000"),
        }
    }
}

/// Structured response of the hub to a push or CDR operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// The authoritative success flag.
    pub result: bool,
    pub status_code: StatusCode,
    pub session_id: Option<SessionId>,
    pub partner_session_id: Option<PartnerSessionId>,
}

impl Acknowledgement {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            result: true,
            status_code: StatusCode::new(StatusCode::SUCCESS).with_description(description),
            session_id: None,
            partner_session_id: None,
        }
    }

    /// A client-side acknowledgement for a call that never produced one.
    pub fn failed(code: u16, description: impl Into<String>) -> Self {
        Self {
            result: false,
            status_code: StatusCode::new(code).with_description(description),
            session_id: None,
            partner_session_id: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result
    }

    pub fn anomaly(&self) -> Option<AckAnomaly> {
        match (self.result, self.status_code.code) {
            (true, StatusCode::SUCCESS) => None,
            (true, code) => Some(AckAnomaly::SuccessWithErrorCode(code)),
            (false, StatusCode::SUCCESS) => Some(AckAnomaly::FailureWithSuccessCode),
            (false, _) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_is_authoritative() {
        let mut ack = Acknowledgement::success("Success");
        ack.status_code.code = 17;
        assert!(ack.is_success());
        assert_eq!(ack.anomaly(), Some(AckAnomaly::SuccessWithErrorCode(17)));
    }

    #[test]
    fn failure_with_success_code_is_flagged() {
        let ack = Acknowledgement::failed(0, "odd");
        assert!(!ack.is_success());
        assert_eq!(ack.anomaly(), Some(AckAnomaly::FailureWithSuccessCode));
    }

    #[test]
    fn consistent_acknowledgements_have_no_anomaly() {
        assert_eq!(Acknowledgement::success("ok").anomaly(), None);
        assert_eq!(Acknowledgement::failed(22, "bad operator").anomaly(), None);
    }

    #[test]
    fn status_code_display() {
        let code = StatusCode::new(9)
            .with_description("Hub error")
            .with_additional_info("retry later");
        assert_eq!(code.to_string(), "009 Hub error (retry later)");
    }
}
