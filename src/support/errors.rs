use thiserror::Error;

/// Rejected call arguments, detected before any network attempt.
///
/// This is the only error the invoker, the CPO client and the status
/// synchronizer return as `Err`; everything the remote side does is
/// reported as an [`Outcome`](crate::application::Outcome) value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Missing required argument: {0}")]
    Missing(&'static str),

    #[error("Invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },

    #[error("EVSE {0} appears in more than one collection of the status diff")]
    OverlappingDiff(String),

    #[error("Invalid endpoint: {0}")]
    Endpoint(String),
}

impl ArgumentError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Failures of the SOAP/XML codec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("XML write error: {0}")]
    Write(String),

    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Malformed response: missing {0}")]
    MalformedResponse(String),

    #[error("Invalid value for {element}: {value}")]
    InvalidValue { element: String, value: String },

    #[error("Unexpected response element: expected {expected}, got {actual}")]
    UnexpectedElement { expected: String, actual: String },
}

impl CodecError {
    pub fn missing(element: impl Into<String>) -> Self {
        Self::MalformedResponse(element.into())
    }

    pub fn invalid_value(element: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            element: element.into(),
            value: value.into(),
        }
    }
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Host name resolution failed; nothing was sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Failed to resolve host {host}: {reason}")]
pub struct ResolveError {
    pub host: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}
