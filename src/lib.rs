//! # OICP CPO client
//!
//! Charge point operator side of the OICP v2.0 roaming protocol: SOAP/XML
//! over HTTPS towards the roaming hub.
//!
//! ## Architecture
//!
//! - **domain**: identifiers, EVSE status and data records, authorization
//!   and charge detail record types, acknowledgements
//! - **protocol**: the envelope codec, pure SOAP/XML encoding and decoding
//! - **application**: the remote operation invoker, the CPO client facade
//!   and the EVSE status synchronizer
//! - **infrastructure**: host name resolution
//! - **notifications**: events published while talking to the hub
//!
//! ```ignore
//! use std::sync::Arc;
//! use oicp_cpo::{create_event_bus, CpoClient, HubEndpoint, StatusSynchronizer, SystemResolver};
//!
//! let client = CpoClient::new(HubEndpoint::new("service.hubject.com"), Arc::new(SystemResolver))?;
//! let sync = StatusSynchronizer::new(Arc::new(client), create_event_bus());
//! let report = sync.synchronize(&diff, None).await?;
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod notifications;
pub mod protocol;
pub mod support;
pub mod telemetry;

pub use application::{
    CpoClient, EvseStatusPort, HubEndpoint, Outcome, OutcomeKind, PhaseReport, SoapInvoker,
    StatusSynchronizer, SyncReport,
};
pub use config::{default_config_path, AppConfig};
pub use infrastructure::dns::{DnsResolver, StaticResolver, SystemResolver};
pub use notifications::{create_event_bus, Event, EventBus, SharedEventBus};
pub use support::errors::{ArgumentError, CodecError, ConfigError};
pub use telemetry::init_tracing;
