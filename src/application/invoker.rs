//! Remote operation invoker
//!
//! Sends exactly one encoded request to the hub and classifies the single
//! resulting outcome. Every call owns its own HTTP client and connection;
//! nothing is pooled or shared between calls, and nothing is retried.
//!
//! Per call: `Connecting → Sending → AwaitingResponse → classified`. Only a
//! failure while connecting or sending skips `AwaitingResponse`, and that
//! is always a [`Outcome::LocalException`].

use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::outcome::{Outcome, OutcomeKind, TransportMetadata};
use crate::infrastructure::dns::SharedDnsResolver;
use crate::notifications::{Event, LocalExceptionEvent, SharedEventBus, TransportErrorEvent};
use crate::protocol::{encode_request, parse_envelope, EnvelopeBody, HubService, Operation, SoapRequest};
use crate::support::errors::ArgumentError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_PORT: u16 = 443;
pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Endpoint paths of the hub's web services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePaths {
    pub evse_data: String,
    pub evse_status: String,
    pub authorization: String,
    pub authentication_data: String,
}

impl ServicePaths {
    pub fn path(&self, service: HubService) -> &str {
        match service {
            HubService::EvseData => &self.evse_data,
            HubService::EvseStatus => &self.evse_status,
            HubService::Authorization => &self.authorization,
            HubService::AuthenticationData => &self.authentication_data,
        }
    }
}

impl Default for ServicePaths {
    fn default() -> Self {
        Self {
            evse_data: "/ibis/ws/eRoamingEvseData_V2.0".to_string(),
            evse_status: "/ibis/ws/eRoamingEvseStatus_V2.0".to_string(),
            authorization: "/ibis/ws/eRoamingAuthorization_V2.0".to_string(),
            authentication_data: "/ibis/ws/eRoamingAuthenticationData_V2.0".to_string(),
        }
    }
}

/// Where and how to reach the hub. Immutable once handed to the invoker.
///
/// `hostname` is what gets resolved; `virtual_host` is what the request
/// addresses (URL, `Host` header, TLS server name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubEndpoint {
    pub hostname: String,
    pub virtual_host: String,
    pub port: u16,
    pub use_tls: bool,
    pub user_agent: String,
    pub default_timeout: Duration,
    pub paths: ServicePaths,
}

impl HubEndpoint {
    pub fn new(hostname: impl Into<String>) -> Self {
        let hostname = hostname.into();
        Self {
            virtual_host: hostname.clone(),
            hostname,
            port: DEFAULT_PORT,
            use_tls: true,
            user_agent: default_user_agent(),
            default_timeout: DEFAULT_REQUEST_TIMEOUT,
            paths: ServicePaths::default(),
        }
    }

    pub fn with_virtual_host(mut self, virtual_host: impl Into<String>) -> Self {
        self.virtual_host = virtual_host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn url(&self, service: HubService) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!(
            "{}://{}:{}{}",
            scheme,
            self.virtual_host,
            self.port,
            self.paths.path(service)
        )
    }

    pub fn validate(&self) -> Result<(), ArgumentError> {
        if self.hostname.trim().is_empty() {
            return Err(ArgumentError::Endpoint("hostname is empty".to_string()));
        }
        if self.virtual_host.trim().is_empty() {
            return Err(ArgumentError::Endpoint("virtual host is empty".to_string()));
        }
        if self.port == 0 {
            return Err(ArgumentError::Endpoint("port must not be 0".to_string()));
        }
        if self.default_timeout.is_zero() {
            return Err(ArgumentError::Endpoint(
                "default timeout must be greater than zero".to_string(),
            ));
        }
        for service in [
            HubService::EvseData,
            HubService::EvseStatus,
            HubService::Authorization,
            HubService::AuthenticationData,
        ] {
            if !self.paths.path(service).starts_with('/') {
                return Err(ArgumentError::Endpoint(format!(
                    "path of {} service must start with '/'",
                    service
                )));
            }
        }
        Ok(())
    }
}

pub fn default_user_agent() -> String {
    format!("oicp-cpo/{}", env!("CARGO_PKG_VERSION"))
}

/// Record request count and latency.
fn record_request(operation: Operation, outcome: OutcomeKind, start: Instant) {
    let duration = start.elapsed().as_secs_f64();
    metrics::counter!(
        "oicp_requests_total",
        "operation" => operation.name(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    metrics::histogram!("oicp_request_duration_seconds", "operation" => operation.name())
        .record(duration);
}

pub struct SoapInvoker {
    endpoint: HubEndpoint,
    resolver: SharedDnsResolver,
    event_bus: Option<SharedEventBus>,
}

impl SoapInvoker {
    pub fn new(endpoint: HubEndpoint, resolver: SharedDnsResolver) -> Result<Self, ArgumentError> {
        endpoint.validate()?;
        Ok(Self {
            endpoint,
            resolver,
            event_bus: None,
        })
    }

    /// Publish transport errors and local exceptions on `event_bus`.
    pub fn with_event_bus(mut self, event_bus: SharedEventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn endpoint(&self) -> &HubEndpoint {
        &self.endpoint
    }

    /// Send `request` and classify the result.
    ///
    /// `timeout` bounds the whole exchange, host resolution included;
    /// `None` uses the endpoint's default. Only a zero timeout is rejected; everything else ends up in
    /// the returned [`Outcome`].
    pub async fn invoke<R: SoapRequest>(
        &self,
        request: &R,
        timeout: Option<Duration>,
    ) -> Result<Outcome<R::Response>, ArgumentError> {
        if timeout.is_some_and(|t| t.is_zero()) {
            return Err(ArgumentError::invalid("timeout", "must be greater than zero"));
        }
        let timeout = timeout.unwrap_or(self.endpoint.default_timeout);
        let operation = request.operation();
        let url = self.endpoint.url(operation.service());
        let start = Instant::now();

        let outcome = self.execute(request, operation, &url, timeout).await;

        let kind = outcome.kind();
        record_request(operation, kind, start);
        match &outcome {
            Outcome::Success { transport, .. } => {
                info!(
                    operation = operation.name(),
                    status = transport.status_code,
                    elapsed_ms = transport.elapsed.as_millis() as u64,
                    "Hub request succeeded"
                );
            }
            Outcome::ProtocolFault { fault, transport, .. } => {
                warn!(
                    operation = operation.name(),
                    status = transport.status_code,
                    fault_code = %fault.code,
                    "Hub answered with a SOAP fault: {}",
                    fault.message
                );
            }
            Outcome::TransportError {
                status_code,
                raw_body,
            } => {
                warn!(operation = operation.name(), status = status_code, url = %url, "Hub request failed: {}", outcome.describe());
                self.publish(Event::TransportError(TransportErrorEvent {
                    operation: operation.name().to_string(),
                    endpoint: url.clone(),
                    status_code: *status_code,
                    body: raw_body.clone(),
                    timestamp: Utc::now(),
                }));
            }
            Outcome::LocalException { message } => {
                warn!(operation = operation.name(), url = %url, "Hub request not completed: {}", message);
                self.publish(Event::LocalException(LocalExceptionEvent {
                    operation: operation.name().to_string(),
                    endpoint: url.clone(),
                    message: message.clone(),
                    timestamp: Utc::now(),
                }));
            }
        }

        Ok(outcome)
    }

    async fn execute<R: SoapRequest>(
        &self,
        request: &R,
        operation: Operation,
        url: &str,
        timeout: Duration,
    ) -> Outcome<R::Response> {
        let start = Instant::now();

        // ── Connecting ──────────────────────────────────────────
        let document = match encode_request(request) {
            Ok(document) => document,
            Err(e) => return Outcome::local(format!("Failed to encode {}: {}", operation.name(), e)),
        };

        let resolution = tokio::time::timeout(
            timeout,
            self.resolver
                .resolve(&self.endpoint.hostname, self.endpoint.port),
        )
        .await;
        let addrs = match resolution {
            Ok(Ok(addrs)) => addrs,
            Ok(Err(e)) => return Outcome::local(e.to_string()),
            Err(_) => {
                return Outcome::local(format!(
                    "Resolving {} took longer than {:?}",
                    self.endpoint.hostname, timeout
                ))
            }
        };

        // Resolution already spent part of the budget
        let remaining = timeout.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            return Outcome::local(format!("No response within {:?}", timeout));
        }

        let client = match Client::builder()
            .user_agent(self.endpoint.user_agent.as_str())
            .timeout(remaining)
            .pool_max_idle_per_host(0)
            .no_proxy()
            .resolve_to_addrs(&self.endpoint.virtual_host, &addrs)
            .build()
        {
            Ok(client) => client,
            Err(e) => return Outcome::local(format!("Failed to create HTTP client: {}", e)),
        };

        // ── Sending ─────────────────────────────────────────────
        debug!(
            operation = operation.name(),
            url,
            bytes = document.len(),
            "Sending SOAP request"
        );
        let response = match client
            .post(url)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header("SOAPAction", operation.name())
            .body(document)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Outcome::local(format!("No response within {:?}: {}", timeout, e))
            }
            Err(e) => return Outcome::local(format!("Request failed: {}", e)),
        };

        // ── AwaitingResponse ────────────────────────────────────
        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let raw_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(operation = operation.name(), status = status_code, "Failed to read response body: {}", e);
                return Outcome::TransportError {
                    status_code,
                    raw_body: String::new(),
                };
            }
        };

        let transport = TransportMetadata {
            status_code,
            content_type,
            soap_action: operation.name().to_string(),
            url: url.to_string(),
            elapsed: start.elapsed(),
        };

        classify(transport, raw_body, R::decode_response)
    }

    fn publish(&self, event: Event) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

/// Classify a received response by status and content.
///
/// A fault document wins over the HTTP status; a success status alone is
/// not enough for [`Outcome::Success`], the payload must decode too.
pub(crate) fn classify<T, D>(transport: TransportMetadata, raw_body: String, decode: D) -> Outcome<T>
where
    D: FnOnce(&crate::protocol::XmlElement) -> crate::support::errors::CodecResult<T>,
{
    let status_code = transport.status_code;
    let success_status = (200..300).contains(&status_code);

    match parse_envelope(&raw_body) {
        Ok(EnvelopeBody::Fault(fault)) => Outcome::ProtocolFault {
            fault,
            raw_body,
            transport,
        },
        Ok(EnvelopeBody::Payload(payload)) if success_status => match decode(&payload) {
            Ok(payload) => Outcome::Success { payload, transport },
            Err(e) => {
                warn!(status = status_code, "Undecodable response payload: {}", e);
                Outcome::TransportError {
                    status_code,
                    raw_body,
                }
            }
        },
        Ok(EnvelopeBody::Payload(_)) => Outcome::TransportError {
            status_code,
            raw_body,
        },
        Err(e) => {
            if success_status {
                warn!(status = status_code, "Unparseable response body: {}", e);
            }
            Outcome::TransportError {
                status_code,
                raw_body,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Acknowledgement, ActionType, EvseId, EvseStatus, EvseStatusRecord, OperatorEvseStatus,
        OperatorId,
    };
    use crate::infrastructure::dns::{DnsResolver, StaticResolver};
    use crate::protocol::PushEvseStatusRequest;
    use crate::support::errors::ResolveError;
    use std::net::SocketAddr;
    use crate::protocol::common_types::{encode_acknowledgement, read_acknowledgement};
    use std::sync::Arc;

    fn transport(status_code: u16) -> TransportMetadata {
        TransportMetadata {
            status_code,
            content_type: Some(SOAP_CONTENT_TYPE.to_string()),
            soap_action: "eRoamingPushEvseStatus".to_string(),
            url: "https://hub.test:443/ibis/ws/eRoamingEvseStatus_V2.0".to_string(),
            elapsed: Duration::from_millis(5),
        }
    }

    const FAULT: &str = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <soapenv:Fault>
      <faultcode>soapenv:Server</faultcode>
      <faultstring>Push already in progress</faultstring>
    </soapenv:Fault>
  </soapenv:Body>
</soapenv:Envelope>"#;

    #[test]
    fn success_requires_decodable_payload() {
        let body = encode_acknowledgement(&Acknowledgement::success("Success")).unwrap();
        let outcome = classify(transport(200), body, read_acknowledgement);
        assert!(outcome.is_success());
        assert!(outcome.payload().unwrap().result);
    }

    #[test]
    fn fault_with_ok_status_is_protocol_fault() {
        let outcome = classify(transport(200), FAULT.to_string(), read_acknowledgement);
        match outcome {
            Outcome::ProtocolFault { fault, .. } => {
                assert_eq!(fault.message, "Push already in progress")
            }
            other => panic!("Expected ProtocolFault, got {:?}", other.kind()),
        }
    }

    #[test]
    fn fault_with_server_error_status_is_protocol_fault() {
        let outcome = classify(transport(500), FAULT.to_string(), read_acknowledgement);
        assert_eq!(outcome.kind(), OutcomeKind::ProtocolFault);
    }

    #[test]
    fn non_success_status_without_fault_is_transport_error() {
        let outcome = classify(transport(503), "Service Unavailable".to_string(), read_acknowledgement);
        assert_eq!(
            outcome,
            Outcome::TransportError {
                status_code: 503,
                raw_body: "Service Unavailable".to_string()
            }
        );
    }

    #[test]
    fn garbage_with_ok_status_is_transport_error() {
        let outcome = classify(transport(200), "<html>oops".to_string(), read_acknowledgement);
        assert_eq!(outcome.kind(), OutcomeKind::TransportError);
    }

    #[test]
    fn undecodable_payload_is_transport_error() {
        let body = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body><Something/></soapenv:Body>
</soapenv:Envelope>"#;
        let outcome = classify(transport(200), body.to_string(), read_acknowledgement);
        assert_eq!(outcome.kind(), OutcomeKind::TransportError);
    }

    #[test]
    fn endpoint_url_uses_virtual_host() {
        let endpoint = HubEndpoint::new("10.0.0.5")
            .with_virtual_host("service.hubject.com")
            .with_port(8443);
        assert_eq!(
            endpoint.url(HubService::EvseStatus),
            "https://service.hubject.com:8443/ibis/ws/eRoamingEvseStatus_V2.0"
        );
        assert_eq!(
            endpoint.with_tls(false).url(HubService::Authorization),
            "http://service.hubject.com:8443/ibis/ws/eRoamingAuthorization_V2.0"
        );
    }

    #[test]
    fn invalid_endpoints_are_rejected() {
        let resolver = Arc::new(StaticResolver::new());
        assert!(matches!(
            SoapInvoker::new(HubEndpoint::new(" "), resolver.clone()),
            Err(ArgumentError::Endpoint(_))
        ));
        assert!(SoapInvoker::new(HubEndpoint::new("hub.test").with_port(0), resolver.clone()).is_err());
        assert!(SoapInvoker::new(
            HubEndpoint::new("hub.test").with_default_timeout(Duration::ZERO),
            resolver.clone()
        )
        .is_err());

        let mut endpoint = HubEndpoint::new("hub.test");
        endpoint.paths.evse_status = "ibis/ws".to_string();
        assert!(SoapInvoker::new(endpoint, resolver).is_err());
    }

    struct HangingResolver;

    #[async_trait::async_trait]
    impl DnsResolver for HangingResolver {
        async fn resolve(&self, _host: &str, _port: u16) -> Result<Vec<SocketAddr>, ResolveError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec![SocketAddr::from(([127, 0, 0, 1], 443))])
        }
    }

    fn status_push() -> PushEvseStatusRequest {
        PushEvseStatusRequest {
            action: ActionType::Update,
            status: OperatorEvseStatus {
                operator_id: OperatorId::new("DE*ABC").unwrap(),
                operator_name: None,
                records: vec![EvseStatusRecord::new(
                    EvseId::new("DE*ABC*E1").unwrap(),
                    EvseStatus::Available,
                )],
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_bounds_host_resolution() {
        let bus = crate::notifications::create_event_bus();
        let mut subscriber = bus.subscribe();
        let invoker = SoapInvoker::new(HubEndpoint::new("hub.test"), Arc::new(HangingResolver))
            .unwrap()
            .with_event_bus(bus);

        let started = tokio::time::Instant::now();
        let outcome = invoker
            .invoke(&status_push(), Some(Duration::from_millis(100)))
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        match outcome {
            Outcome::LocalException { message } => assert!(message.contains("hub.test")),
            other => panic!("Expected LocalException, got {:?}", other),
        }
        assert!(matches!(
            subscriber.try_recv().map(|m| m.event),
            Some(Event::LocalException(_))
        ));
    }

    #[test]
    fn default_user_agent_carries_version() {
        assert!(default_user_agent().starts_with("oicp-cpo/"));
    }
}
