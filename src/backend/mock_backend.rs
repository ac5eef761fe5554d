//! Mock network backend for testing

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::backend::NetBackend;
use crate::core::error::{NetError, NetResult};
use crate::core::types::ScanEntry;

/// Internal state for the mock backend
#[derive(Debug, Clone)]
struct MockState {
    missing_interfaces: Vec<String>,
    addresses: HashMap<String, Ipv4Addr>,
    internet: bool,
    public_ip: String,
    should_fail_public_ip: bool,
    scan_results: Vec<ScanEntry>,
    should_fail_scan: bool,
    should_fail_supplicant: bool,
    supplicant_restarts: usize,
    link_up_calls: usize,
}

/// Mock network backend for testing
///
/// Allows configuring behavior for tests without requiring actual hardware.
#[derive(Debug, Clone)]
pub struct MockNetBackend {
    inner: Arc<Mutex<MockState>>,
}

impl MockNetBackend {
    /// Create a new mock backend with default state
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState {
                missing_interfaces: vec![],
                addresses: HashMap::new(),
                internet: false,
                public_ip: "203.0.113.7".to_string(),
                should_fail_public_ip: false,
                scan_results: vec![],
                should_fail_scan: false,
                should_fail_supplicant: false,
                supplicant_restarts: 0,
                link_up_calls: 0,
            })),
        }
    }

    /// Make an interface report as absent
    pub async fn set_interface_missing(&self, interface: &str) {
        self.inner
            .lock()
            .await
            .missing_interfaces
            .push(interface.to_string());
    }

    /// Assign an IPv4 address to an interface
    pub async fn set_address(&self, interface: &str, address: Ipv4Addr) {
        self.inner
            .lock()
            .await
            .addresses
            .insert(interface.to_string(), address);
    }

    /// Configure whether connectivity probes succeed
    pub async fn set_internet(&self, reachable: bool) {
        self.inner.lock().await.internet = reachable;
    }

    /// Configure the address returned by the external lookup
    pub async fn set_public_ip(&self, ip: &str) {
        self.inner.lock().await.public_ip = ip.to_string();
    }

    /// Configure mock to fail external address lookups
    pub async fn set_public_ip_failure(&self, should_fail: bool) {
        self.inner.lock().await.should_fail_public_ip = should_fail;
    }

    /// Configure mock to return specific networks on scan
    pub async fn set_scan_results(&self, entries: Vec<ScanEntry>) {
        self.inner.lock().await.scan_results = entries;
    }

    /// Configure mock to fail scan operations
    pub async fn set_scan_failure(&self, should_fail: bool) {
        self.inner.lock().await.should_fail_scan = should_fail;
    }

    /// Configure mock to fail supplicant restarts
    pub async fn set_supplicant_failure(&self, should_fail: bool) {
        self.inner.lock().await.should_fail_supplicant = should_fail;
    }

    /// Number of supplicant restarts performed so far
    pub async fn supplicant_restarts(&self) -> usize {
        self.inner.lock().await.supplicant_restarts
    }

    /// Number of link-up requests performed so far
    pub async fn link_up_calls(&self) -> usize {
        self.inner.lock().await.link_up_calls
    }
}

impl Default for MockNetBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NetBackend for MockNetBackend {
    async fn link_up(&self, interface: &str) -> NetResult<()> {
        let mut state = self.inner.lock().await;
        if state.missing_interfaces.iter().any(|i| i == interface) {
            Err(NetError::InterfaceMissing(interface.to_string()))
        } else {
            state.link_up_calls += 1;
            Ok(())
        }
    }

    async fn ipv4_address(&self, interface: &str) -> NetResult<Option<Ipv4Addr>> {
        let state = self.inner.lock().await;
        if state.missing_interfaces.iter().any(|i| i == interface) {
            Err(NetError::InterfaceMissing(interface.to_string()))
        } else {
            Ok(state.addresses.get(interface).copied())
        }
    }

    async fn probe_url(&self, _url: &str, _timeout: Duration) -> NetResult<()> {
        let state = self.inner.lock().await;
        if state.internet {
            Ok(())
        } else {
            Err(NetError::ProbeFailed("Mock probe failure".into()))
        }
    }

    async fn public_ip(&self, _url: &str) -> NetResult<String> {
        let state = self.inner.lock().await;
        if state.should_fail_public_ip {
            Err(NetError::PublicIpLookup("Mock lookup failure".into()))
        } else {
            Ok(state.public_ip.clone())
        }
    }

    async fn scan(&self) -> NetResult<Vec<ScanEntry>> {
        let state = self.inner.lock().await;
        if state.should_fail_scan {
            Err(NetError::ScanFailed("Mock scan failure".into()))
        } else {
            Ok(state.scan_results.clone())
        }
    }

    async fn restart_supplicant(&self) -> NetResult<()> {
        let mut state = self.inner.lock().await;
        if state.should_fail_supplicant {
            Err(NetError::Supplicant("Mock supplicant failure".into()))
        } else {
            state.supplicant_restarts += 1;
            Ok(())
        }
    }
}
