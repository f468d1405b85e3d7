//! Protocol identifiers
//!
//! Opaque, validated string newtypes. The hub defines formats for each of
//! them (e.g. `DE*ABC*E123456` for an EVSE id), but format checking is the
//! mapping layer's job; here we only reject empty and padded values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::support::errors::ArgumentError;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, ArgumentError> {
                let value = value.into();
                if value.is_empty() {
                    return Err(ArgumentError::Missing($field));
                }
                if value.trim() != value {
                    return Err(ArgumentError::invalid(
                        $field,
                        format!("'{}' has leading or trailing whitespace", value),
                    ));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ArgumentError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ArgumentError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier!(
    /// Globally unique identifier of a single charge point (EVSE).
    EvseId,
    "evse_id"
);

identifier!(
    /// Identifier of the charge point operator (CPO).
    OperatorId,
    "operator_id"
);

identifier!(
    /// Identifier of an e-mobility provider (EMP).
    ProviderId,
    "provider_id"
);

identifier!(
    /// Hub-issued charging session identifier.
    SessionId,
    "session_id"
);

identifier!(
    /// Partner (CPO side) charging session identifier.
    PartnerSessionId,
    "partner_session_id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifier() {
        let id = EvseId::new("DE*ABC*E1").unwrap();
        assert_eq!(id.as_str(), "DE*ABC*E1");
        assert_eq!(id.to_string(), "DE*ABC*E1");
    }

    #[test]
    fn rejects_empty_identifier() {
        assert_eq!(OperatorId::new(""), Err(ArgumentError::Missing("operator_id")));
    }

    #[test]
    fn rejects_padded_identifier() {
        assert!(matches!(
            EvseId::new(" DE*ABC*E1"),
            Err(ArgumentError::Invalid { field: "evse_id", .. })
        ));
    }

    #[test]
    fn deserializes_through_validation() {
        let id: EvseId = serde_json::from_str("\"DE*ABC*E2\"").unwrap();
        assert_eq!(id.as_str(), "DE*ABC*E2");
        assert!(serde_json::from_str::<EvseId>("\"\"").is_err());
    }
}
