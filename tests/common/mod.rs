//! Shared fixtures: a mock hub behind a virtual host name.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use oicp_cpo::domain::{Acknowledgement, OperatorId};
use oicp_cpo::protocol::encode_acknowledgement;
use oicp_cpo::{CpoClient, HubEndpoint, SharedEventBus, StaticResolver};

pub const HUB_HOST: &str = "hub.test";
pub const EVSE_STATUS_PATH: &str = "/ibis/ws/eRoamingEvseStatus_V2.0";
pub const AUTHORIZATION_PATH: &str = "/ibis/ws/eRoamingAuthorization_V2.0";
pub const AUTHENTICATION_DATA_PATH: &str = "/ibis/ws/eRoamingAuthenticationData_V2.0";
pub const SOAP_XML: &str = "text/xml; charset=utf-8";

pub fn operator() -> OperatorId {
    OperatorId::new("DE*ABC").unwrap()
}

/// Endpoint addressing `hub.test` on the mock server's port, plain HTTP.
pub fn endpoint(server: &MockServer) -> HubEndpoint {
    HubEndpoint::new(HUB_HOST)
        .with_port(server.address().port())
        .with_tls(false)
        .with_default_timeout(Duration::from_secs(5))
}

pub fn resolver(server: &MockServer) -> Arc<StaticResolver> {
    Arc::new(StaticResolver::new().with_entry(HUB_HOST, server.address().ip()))
}

pub fn client(server: &MockServer) -> CpoClient {
    CpoClient::new(endpoint(server), resolver(server)).unwrap()
}

pub fn client_with_bus(server: &MockServer, bus: SharedEventBus) -> CpoClient {
    client(server).with_event_bus(bus)
}

pub fn ack_body(ack: &Acknowledgement) -> String {
    encode_acknowledgement(ack).unwrap()
}

pub fn fault_body(message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <soapenv:Fault>
      <faultcode>soapenv:Client</faultcode>
      <faultstring>{}</faultstring>
    </soapenv:Fault>
  </soapenv:Body>
</soapenv:Envelope>"#,
        message
    )
}

pub fn soap_response(status: u16, body: String) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body, SOAP_XML)
}

/// Mount a status-push handler answering every request with `response`.
pub async fn mount_status_push(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(EVSE_STATUS_PATH))
        .and(header("SOAPAction", "eRoamingPushEvseStatus"))
        .respond_with(response)
        .mount(server)
        .await;
}
