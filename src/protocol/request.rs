//! Request message types

use serde::{Deserialize, Serialize};

/// Request messages from client to server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", content = "params")]
#[serde(rename_all = "snake_case")]
pub enum Request {
    /// Get interface and internet status
    GetStatus,

    /// Scan and list joinable WiFi networks
    ListNetworks,

    /// Commit WiFi credentials to the supplicant store
    SetupNetwork(SetupNetworkParams),

    /// Reconnect the uplink with the committed credentials
    Connect,

    /// Start (or replace) the proxy session
    StartProxy,

    /// Stop the proxy session
    StopProxy,

    /// Resolve the device identity for a capture token
    GetDevice(GetDeviceParams),
}

/// Parameters for setup_network request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetupNetworkParams {
    /// Network SSID
    pub ssid: String,

    /// WPA passphrase (8 characters minimum)
    pub password: String,
}

/// Parameters for get_device request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetDeviceParams {
    /// Capture token (8 uppercase hex characters)
    pub token: String,

    /// Proxy port the device is parked behind
    pub port: u16,
}
