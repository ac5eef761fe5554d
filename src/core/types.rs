//! Domain types for the tap control service

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Raw scan result row as reported by the supplicant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanEntry {
    /// Network SSID, may be empty for hidden networks
    pub ssid: String,
    /// Encryption family (`WPA2`, `WPA`, ...), `None` for open networks
    pub encryption: Option<String>,
}

/// A joinable network offered to callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WifiNetworkEntry {
    /// Network SSID
    pub ssid: String,
    /// Encryption family the network advertises
    pub encryption_type: String,
}

/// Name and in-use IPv4 address of one interface
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkAddress {
    /// Interface name
    pub name: String,
    /// Routable address, `None` when absent or unusable
    pub address: Option<Ipv4Addr>,
}

/// Snapshot of both managed interfaces plus internet reachability
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterfaceStatus {
    /// Wireless uplink
    pub uplink: LinkAddress,
    /// Wired interface
    pub wired: LinkAddress,
    /// Whether the reference URL answered
    pub internet: bool,
}

/// Address and port of the single live proxy session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyAccess {
    /// Address clients should point their proxy settings at
    pub ip: String,
    /// Reserved TCP port
    pub port: u16,
}

/// Resolved identity of the device behind a capture session.
///
/// Serializes to the same shape it is cached in, so a cache file read
/// back from disk is indistinguishable from a fresh resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DeviceIdentity {
    Known(KnownDevice),
    Unknown(UnknownDevice),
}

/// Identity of a device that was found on the capture network
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnownDevice {
    /// Always `true`
    pub status: bool,
    /// Device hostname
    pub name: String,
    /// Device IPv4 address as text
    pub ip_address: String,
    /// Device MAC address
    pub mac_address: String,
    /// Unix timestamp of the resolution
    pub timestamp: i64,
}

/// Placeholder returned when no device is connected
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnknownDevice {
    /// Always `false`
    pub status: bool,
    /// Human readable reason
    pub message: String,
}

impl DeviceIdentity {
    pub fn known(name: String, ip_address: String, mac_address: String, timestamp: i64) -> Self {
        DeviceIdentity::Known(KnownDevice {
            status: true,
            name,
            ip_address,
            mac_address,
            timestamp,
        })
    }

    pub fn unknown(message: &str) -> Self {
        DeviceIdentity::Unknown(UnknownDevice {
            status: false,
            message: message.to_string(),
        })
    }

    /// Whether the resolution produced a real device
    pub fn is_known(&self) -> bool {
        matches!(self, DeviceIdentity::Known(_))
    }
}

/// Session identifier for transport connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
