//! Network backend trait definition

use std::net::Ipv4Addr;
use std::time::Duration;

use trait_variant::make;

use crate::core::error::NetResult;
use crate::core::types::ScanEntry;

/// Abstraction over the host network plumbing (ip tooling,
/// wpa_supplicant and outbound HTTP probes)
///
/// This trait enables testing by allowing mock implementations
/// while providing a standard interface for host operations.
#[make(Send)]
pub trait NetBackend: Sync + 'static {
    /// Ensure `interface` exists and its link is administratively up,
    /// raising it if necessary
    async fn link_up(&self, interface: &str) -> NetResult<()>;

    /// First IPv4 address assigned to `interface`, unfiltered
    ///
    /// Fails when the interface is not present; returns `None` when it
    /// exists but carries no address.
    async fn ipv4_address(&self, interface: &str) -> NetResult<Option<Ipv4Addr>>;

    /// Issue a GET against `url` and report whether anything answered.
    ///
    /// Any HTTP response counts as reachability, including error codes.
    async fn probe_url(&self, url: &str, timeout: Duration) -> NetResult<()>;

    /// Ask `url` for the publicly visible address of this host
    async fn public_ip(&self, url: &str) -> NetResult<String>;

    /// Scan for nearby WiFi networks
    ///
    /// This triggers a scan and returns the discovered networks.
    /// The scan operation may take several seconds.
    async fn scan(&self) -> NetResult<Vec<ScanEntry>>;

    /// Kill any running wpa_supplicant and relaunch it against the
    /// credential store, picking up newly committed credentials
    async fn restart_supplicant(&self) -> NetResult<()>;
}
