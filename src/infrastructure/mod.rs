//! Infrastructure layer - external concerns

pub mod dns;

pub use dns::{DnsResolver, SharedDnsResolver, StaticResolver, SystemResolver};
