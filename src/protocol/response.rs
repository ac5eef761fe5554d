//! Response message types

use serde::{Deserialize, Serialize};

use crate::core::types::{DeviceIdentity, InterfaceStatus, ProxyAccess, WifiNetworkEntry};

/// Response messages from server to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Response {
    /// Status response
    Status(StatusResponse),

    /// Network list response
    Networks(NetworksResponse),

    /// Setup response
    Setup(SetupResponse),

    /// Connect response
    Connect(ConnectResponse),

    /// Proxy started response
    ProxyStarted(ProxyStartedResponse),

    /// Proxy stopped response
    ProxyStopped(ProxyStoppedResponse),

    /// Device identity response, cached shape passed through as-is
    Device(DeviceIdentity),
}

/// Response for get_status request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
    #[serde(flatten)]
    pub interfaces: InterfaceStatus,
}

/// Response for list_networks request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworksResponse {
    pub status: String,
    pub networks: Vec<WifiNetworkEntry>,
}

/// Response for setup_network request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetupResponse {
    pub status: String,
    pub message: String,
}

/// Response for connect request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectResponse {
    pub status: String,
    pub message: String,
}

/// Response for start_proxy request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyStartedResponse {
    pub status: String,
    #[serde(flatten)]
    pub access: ProxyAccess,
}

/// Response for stop_proxy request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyStoppedResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok(interfaces: InterfaceStatus) -> Self {
        Self {
            status: "ok".to_string(),
            interfaces,
        }
    }
}

impl NetworksResponse {
    pub fn ok(networks: Vec<WifiNetworkEntry>) -> Self {
        Self {
            status: "ok".to_string(),
            networks,
        }
    }
}

impl SetupResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Configuration saved".to_string(),
        }
    }
}

impl ConnectResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Wifi connected".to_string(),
        }
    }
}

impl ProxyStartedResponse {
    pub fn ok(access: ProxyAccess) -> Self {
        Self {
            status: "ok".to_string(),
            access,
        }
    }
}

impl ProxyStoppedResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
