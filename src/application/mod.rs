//! Application layer
//!
//! - [`invoker`] sends one SOAP request and classifies the [`Outcome`]
//! - [`cpo_client`] exposes the hub operations of a charge point operator
//! - [`status_sync`] pushes a status diff as ordered insert/update/delete batches

pub mod cpo_client;
pub mod invoker;
pub mod outcome;
pub mod ports;
pub mod status_sync;

pub use cpo_client::CpoClient;
pub use invoker::{HubEndpoint, ServicePaths, SoapInvoker, DEFAULT_REQUEST_TIMEOUT};
pub use outcome::{Outcome, OutcomeKind, TransportMetadata};
pub use ports::{EvseStatusPort, SharedEvseStatusPort};
pub use status_sync::{PhaseReport, StatusSynchronizer, SyncReport, REMOVED_EVSE_STATUS};
