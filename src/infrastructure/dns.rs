//! Host name resolution
//!
//! The invoker resolves the hub host itself before opening a connection, so
//! a resolution failure is reported without a single byte on the wire.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::support::errors::ResolveError;

#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// All socket addresses for `host`, never empty on success.
    async fn resolve(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>, ResolveError>;
}

pub type SharedDnsResolver = Arc<dyn DnsResolver>;

/// Resolver backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl DnsResolver for SystemResolver {
    async fn resolve(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>, ResolveError> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| ResolveError {
                host: host.to_string(),
                reason: e.to_string(),
            })?
            .collect();

        if addrs.is_empty() {
            return Err(ResolveError {
                host: host.to_string(),
                reason: "no addresses".to_string(),
            });
        }

        debug!(host, count = addrs.len(), "Resolved hub host");
        Ok(addrs)
    }
}

/// Fixed host table. Unknown hosts fail to resolve.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    entries: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, host: impl Into<String>, addr: IpAddr) -> Self {
        self.entries.entry(host.into()).or_default().push(addr);
        self
    }
}

#[async_trait]
impl DnsResolver for StaticResolver {
    async fn resolve(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>, ResolveError> {
        match self.entries.get(host) {
            Some(ips) if !ips.is_empty() => {
                Ok(ips.iter().map(|ip| SocketAddr::new(*ip, port)).collect())
            }
            _ => Err(ResolveError {
                host: host.to_string(),
                reason: "unknown host".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn static_resolver_uses_requested_port() {
        let resolver = StaticResolver::new().with_entry("hub.test", IpAddr::V4(Ipv4Addr::LOCALHOST));
        let addrs = resolver.resolve("hub.test", 8443).await.unwrap();
        assert_eq!(addrs, vec!["127.0.0.1:8443".parse::<SocketAddr>().unwrap()]);
    }

    #[tokio::test]
    async fn static_resolver_rejects_unknown_host() {
        let err = StaticResolver::new().resolve("nowhere.test", 443).await.unwrap_err();
        assert_eq!(err.host, "nowhere.test");
    }

    #[tokio::test]
    async fn system_resolver_handles_ip_literals() {
        let addrs = SystemResolver.resolve("127.0.0.1", 80).await.unwrap();
        assert!(addrs.iter().all(|a| a.port() == 80));
    }
}
