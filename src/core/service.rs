//! Main tap control service facade

use std::sync::Arc;
use std::time::Duration;

use crate::{
    backend::NetBackend,
    config::Settings,
    core::{
        error::ServiceResult,
        identity::{DeviceIdentityResolver, IdentitySource},
        interface::InterfaceController,
        proxy::ProxySessionManager,
        types::{DeviceIdentity, InterfaceStatus, ProxyAccess, WifiNetworkEntry},
        wifi::WifiManager,
    },
};

/// Main tap control service facade
///
/// Orchestrates all service components (interfaces, wifi, proxy
/// sessions, device identity)
pub struct ControlService<B: NetBackend, S: IdentitySource> {
    pub interfaces: Arc<InterfaceController<B>>,
    pub wifi: Arc<WifiManager<B>>,
    pub proxy: Arc<ProxySessionManager<B>>,
    pub identity: Arc<DeviceIdentityResolver<S>>,
    connect_timeout: Duration,
}

impl<B: NetBackend, S: IdentitySource> ControlService<B, S> {
    /// Create a new tap control service
    pub fn new(backend: Arc<B>, source: S, settings: Settings) -> Self {
        let interfaces = Arc::new(InterfaceController::new(backend.clone(), settings.clone()));
        let wifi = Arc::new(WifiManager::new(backend.clone(), settings.clone()));
        let proxy = Arc::new(ProxySessionManager::new(backend, settings.clone()));
        let identity = Arc::new(DeviceIdentityResolver::new(
            source,
            settings.paths.identity_cache_root.clone(),
        ));

        Self {
            interfaces,
            wifi,
            proxy,
            identity,
            connect_timeout: settings.connect_timeout(),
        }
    }

    /// Raise the wireless uplink
    pub async fn enable_interface(&self) -> ServiceResult<()> {
        self.interfaces.enable_interface().await
    }

    /// Snapshot interface addresses and internet reachability
    pub async fn check_status(&self) -> InterfaceStatus {
        self.interfaces.check_status().await
    }

    /// List joinable WiFi networks
    pub async fn list_networks(&self) -> Vec<WifiNetworkEntry> {
        self.wifi.list_networks().await
    }

    /// Commit WiFi credentials to the supplicant store
    pub async fn configure_network(&self, ssid: &str, password: &str) -> ServiceResult<()> {
        self.wifi.configure_network(ssid, password).await
    }

    /// Reconnect the uplink using the committed credentials
    pub async fn connect(&self) -> ServiceResult<()> {
        self.wifi.connect(self.connect_timeout).await
    }

    /// Start (or replace) the proxy session
    pub async fn start_proxy(&self) -> ServiceResult<ProxyAccess> {
        self.proxy.start_proxy().await
    }

    /// Stop the proxy session if one is live
    pub async fn stop_proxy(&self) {
        self.proxy.stop_proxy().await
    }

    /// Resolve the device identity for a capture token
    pub async fn device_identity(&self, token: &str, port: u16) -> ServiceResult<DeviceIdentity> {
        self.identity.identity(token, port).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockNetBackend;
    use crate::core::identity::StubSource;
    use crate::core::types::ScanEntry;

    fn service(
        backend: &Arc<MockNetBackend>,
        settings: Settings,
    ) -> ControlService<MockNetBackend, StubSource> {
        ControlService::new(backend.clone(), StubSource, settings)
    }

    #[tokio::test]
    async fn test_service_status_and_networks() {
        let backend = Arc::new(MockNetBackend::new());
        backend.set_internet(true).await;
        backend
            .set_scan_results(vec![ScanEntry {
                ssid: "HomeNet".to_string(),
                encryption: Some("WPA2".to_string()),
            }])
            .await;
        let service = service(&backend, Settings::default());

        let status = service.check_status().await;
        assert!(status.internet);

        let networks = service.list_networks().await;
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].ssid, "HomeNet");
    }

    #[tokio::test]
    async fn test_service_proxy_and_identity_flow() {
        let backend = Arc::new(MockNetBackend::new());
        backend.set_public_ip("198.51.100.4").await;
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.network.port_bounds_low = 40000;
        settings.network.port_bounds_high = 49000;
        settings.paths.identity_cache_root = dir.path().to_path_buf();
        let service = service(&backend, settings);

        let access = service.start_proxy().await.unwrap();
        let identity = service
            .device_identity("00F3AB91", access.port)
            .await
            .unwrap();

        assert!(identity.is_known());
        service.stop_proxy().await;
        assert!(service.proxy.current_session().await.is_none());
    }
}
