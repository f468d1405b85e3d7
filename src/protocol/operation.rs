//! Remote operations offered by the hub to a CPO

use std::fmt;

use super::namespaces::Namespace;

/// Hub web service an operation is addressed to. Each one has its own
/// endpoint path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HubService {
    EvseData,
    EvseStatus,
    Authorization,
    AuthenticationData,
}

impl fmt::Display for HubService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EvseData => "EvseData",
            Self::EvseStatus => "EvseStatus",
            Self::Authorization => "Authorization",
            Self::AuthenticationData => "AuthenticationData",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    PushEvseData,
    PushEvseStatus,
    AuthorizeStart,
    AuthorizeStop,
    SendChargeDetailRecord,
    PullAuthenticationData,
}

impl Operation {
    /// Operation name; used both as `SOAPAction` and as the local name of
    /// the body's root element.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PushEvseData => "eRoamingPushEvseData",
            Self::PushEvseStatus => "eRoamingPushEvseStatus",
            Self::AuthorizeStart => "eRoamingAuthorizeStart",
            Self::AuthorizeStop => "eRoamingAuthorizeStop",
            Self::SendChargeDetailRecord => "eRoamingChargeDetailRecord",
            Self::PullAuthenticationData => "eRoamingPullAuthenticationData",
        }
    }

    pub fn namespace(&self) -> Namespace {
        match self {
            Self::PushEvseData => Namespace::EvseData,
            Self::PushEvseStatus => Namespace::EvseStatus,
            Self::AuthorizeStart | Self::AuthorizeStop | Self::SendChargeDetailRecord => {
                Namespace::Authorization
            }
            Self::PullAuthenticationData => Namespace::AuthenticationData,
        }
    }

    pub fn service(&self) -> HubService {
        match self {
            Self::PushEvseData => HubService::EvseData,
            Self::PushEvseStatus => HubService::EvseStatus,
            Self::AuthorizeStart | Self::AuthorizeStop | Self::SendChargeDetailRecord => {
                HubService::Authorization
            }
            Self::PullAuthenticationData => HubService::AuthenticationData,
        }
    }

    /// Namespaces declared on the envelope of a request.
    pub fn namespaces(&self) -> [Namespace; 2] {
        [self.namespace(), Namespace::CommonTypes]
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
