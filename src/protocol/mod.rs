//! Envelope codec
//!
//! Pure transformations between typed payloads and SOAP/XML documents.
//! Nothing in here performs I/O.
//!
//! - [`envelope`]: SOAP envelope, faults and the [`SoapRequest`] contract
//! - [`common_types`]: acknowledgement, status codes, identifications
//! - one module per sub-protocol with its request/response codecs

pub mod authentication_data;
pub mod authorization;
pub mod common_types;
pub mod envelope;
pub mod evse_data;
pub mod evse_status;
pub mod namespaces;
pub mod numeric;
pub mod operation;
pub mod xml;

pub use authentication_data::PullAuthenticationDataRequest;
pub use common_types::{decode_acknowledgement, encode_acknowledgement};
pub use envelope::{
    decode_fault, decode_response, encode_request, parse_envelope, EnvelopeBody, SoapFault,
    SoapRequest,
};
pub use evse_data::PushEvseDataRequest;
pub use evse_status::PushEvseStatusRequest;
pub use namespaces::Namespace;
pub use operation::{HubService, Operation};
pub use xml::{XmlElement, XmlWriter};
