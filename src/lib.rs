//! Tap Control Service
//!
//! On-device control plane for a portable network-interception
//! appliance: uplink and interface management, WiFi commissioning,
//! proxy session brokering and connected-device identity resolution,
//! exposed over a Unix domain socket (JSON-RPC 2.0).

pub mod backend;
pub mod config;
pub mod core;
pub mod protocol;
pub mod store;
pub mod transport;
pub mod util;

pub use crate::core::{
    error::{NetError, ServiceError, TransportError},
    types::{DeviceIdentity, InterfaceStatus, ProxyAccess, WifiNetworkEntry},
};
