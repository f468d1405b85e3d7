//! Domain model of the CPO side of the roaming protocol

pub mod acknowledgement;
pub mod authorization;
pub mod evse_data;
pub mod evse_status;
pub mod identifiers;

pub use acknowledgement::{AckAnomaly, Acknowledgement, StatusCode};
pub use authorization::{
    AuthenticationData, AuthorizationStart, AuthorizationStatus, AuthorizationStop,
    AuthorizeStartRequest, AuthorizeStopRequest, ChargeDetailRecord, Identification,
    ProviderAuthenticationData,
};
pub use evse_data::{Address, DynamicInfoAvailable, EvseDataRecord, GeoCoordinates, OperatorEvseData};
pub use evse_status::{
    ActionType, EvseStatus, EvseStatusRecord, OperatorEvseStatus, StatusDiff, StatusSnapshot,
};
pub use identifiers::{EvseId, OperatorId, PartnerSessionId, ProviderId, SessionId};
