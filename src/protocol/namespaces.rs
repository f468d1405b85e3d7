//! XML namespaces of the SOAP envelope and the OICP v2.0 sub-protocols

/// A namespace together with the prefix we emit for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    SoapEnvelope,
    EvseData,
    EvseStatus,
    Authorization,
    AuthenticationData,
    CommonTypes,
}

impl Namespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::SoapEnvelope => "soapenv",
            Self::EvseData => "EVSEData",
            Self::EvseStatus => "EVSEStatus",
            Self::Authorization => "Authorization",
            Self::AuthenticationData => "AuthenticationData",
            Self::CommonTypes => "CommonTypes",
        }
    }

    pub fn uri(&self) -> &'static str {
        match self {
            Self::SoapEnvelope => "http://schemas.xmlsoap.org/soap/envelope/",
            Self::EvseData => "http://www.hubject.com/b2b/services/evsedata/v2.0",
            Self::EvseStatus => "http://www.hubject.com/b2b/services/evsestatus/v2.0",
            Self::Authorization => "http://www.hubject.com/b2b/services/authorization/v2.0",
            Self::AuthenticationData => {
                "http://www.hubject.com/b2b/services/authenticationdata/v2.0"
            }
            Self::CommonTypes => "http://www.hubject.com/b2b/services/commontypes/v2.0",
        }
    }

    /// `xmlns:<prefix>` attribute name.
    pub fn xmlns_attribute(&self) -> String {
        format!("xmlns:{}", self.prefix())
    }

    /// Qualified element name `<prefix>:<local>`.
    pub fn qualify(&self, local: &str) -> String {
        format!("{}:{}", self.prefix(), local)
    }
}
