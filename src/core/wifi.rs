//! WiFi commissioning: scanning, credential edits, reconnecting

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::fs;
use tracing::{info, warn};

use crate::{
    backend::NetBackend,
    config::Settings,
    core::{
        error::{ServiceError, ServiceResult},
        types::WifiNetworkEntry,
    },
    store::supplicant::CredentialStore,
    util::write_atomic,
};

/// Interval between connectivity probes while waiting for a reconnect
const CONNECT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Minimum WPA passphrase length
const MIN_PASSPHRASE_CHARS: usize = 8;

/// Commissions the wireless uplink onto new networks
pub struct WifiManager<B: NetBackend> {
    backend: Arc<B>,
    settings: Settings,
}

impl<B: NetBackend> WifiManager<B> {
    pub fn new(backend: Arc<B>, settings: Settings) -> Self {
        Self { backend, settings }
    }

    /// Scan and return the joinable networks: encrypted, named, one
    /// entry per SSID with the first sighting winning.
    ///
    /// A failed scan yields an empty list so callers can keep their
    /// pick-a-network flow alive and retry.
    pub async fn list_networks(&self) -> Vec<WifiNetworkEntry> {
        let entries = match self.backend.scan().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("WiFi scan failed: {}", e);
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let mut networks = Vec::new();
        for entry in entries {
            let Some(encryption_type) = entry.encryption else {
                continue;
            };
            if entry.ssid.is_empty() || !seen.insert(entry.ssid.clone()) {
                continue;
            }
            networks.push(WifiNetworkEntry {
                ssid: entry.ssid,
                encryption_type,
            });
        }
        networks
    }

    /// Validate the credentials and commit them to the supplicant
    /// credential store. The store on disk is only touched after
    /// validation passes, and the rewrite goes through a temp file.
    pub async fn configure_network(&self, ssid: &str, password: &str) -> ServiceResult<()> {
        if ssid.is_empty() {
            return Err(ServiceError::EmptySsid);
        }
        let chars = password.chars().count();
        if chars < MIN_PASSPHRASE_CHARS {
            return Err(ServiceError::PassphraseTooShort(chars));
        }

        let path = &self.settings.paths.supplicant_conf;
        let content = fs::read_to_string(path)
            .await
            .map_err(|source| ServiceError::Persistence {
                path: path.clone(),
                source,
            })?;

        let mut store = CredentialStore::parse(&content);
        store.upsert(ssid, password);

        write_atomic(path, store.serialize().as_bytes())
            .await
            .map_err(|source| ServiceError::Persistence {
                path: path.clone(),
                source,
            })?;

        info!("Credential store updated for SSID: {}", ssid);
        Ok(())
    }

    /// Restart the supplicant so it picks up the credential store,
    /// then poll connectivity once a second until `timeout` runs out.
    pub async fn connect(&self, timeout: Duration) -> ServiceResult<()> {
        self.backend.restart_supplicant().await?;
        info!("Supplicant restarted, waiting for connectivity");

        match tokio::time::timeout(timeout, self.wait_for_internet()).await {
            Ok(()) => {
                info!("Uplink is connected");
                Ok(())
            }
            Err(_) => Err(ServiceError::ConnectTimeout(timeout)),
        }
    }

    async fn wait_for_internet(&self) {
        loop {
            if self
                .backend
                .probe_url(&self.settings.network.internet_check, CONNECT_POLL_INTERVAL)
                .await
                .is_ok()
            {
                return;
            }
            tokio::time::sleep(CONNECT_POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockNetBackend;
    use crate::core::types::ScanEntry;

    fn manager_with_settings(
        backend: &Arc<MockNetBackend>,
        settings: Settings,
    ) -> WifiManager<MockNetBackend> {
        WifiManager::new(backend.clone(), settings)
    }

    fn manager(backend: &Arc<MockNetBackend>) -> WifiManager<MockNetBackend> {
        manager_with_settings(backend, Settings::default())
    }

    fn entry(ssid: &str, encryption: Option<&str>) -> ScanEntry {
        ScanEntry {
            ssid: ssid.to_string(),
            encryption: encryption.map(|e| e.to_string()),
        }
    }

    #[tokio::test]
    async fn test_list_networks_filters_and_dedupes() {
        let backend = Arc::new(MockNetBackend::new());
        backend
            .set_scan_results(vec![
                entry("HomeNet", Some("WPA2")),
                entry("", Some("WPA2")),
                entry("FreeWifi", None),
                entry("HomeNet", Some("WPA")),
                entry("Office", Some("WPA2")),
            ])
            .await;

        let networks = manager(&backend).list_networks().await;

        assert_eq!(networks.len(), 2);
        assert_eq!(networks[0].ssid, "HomeNet");
        // first sighting wins, the weaker duplicate is dropped
        assert_eq!(networks[0].encryption_type, "WPA2");
        assert_eq!(networks[1].ssid, "Office");
    }

    #[tokio::test]
    async fn test_list_networks_empty_on_scan_failure() {
        let backend = Arc::new(MockNetBackend::new());
        backend.set_scan_failure(true).await;

        let networks = manager(&backend).list_networks().await;

        assert!(networks.is_empty());
    }

    async fn settings_with_store(content: &str) -> (tempfile::TempDir, Settings) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wpa_supplicant.conf");
        fs::write(&path, content).await.unwrap();
        let mut settings = Settings::default();
        settings.paths.supplicant_conf = path;
        (dir, settings)
    }

    #[tokio::test]
    async fn test_configure_network_commits_credentials() {
        let backend = Arc::new(MockNetBackend::new());
        let (_dir, settings) = settings_with_store("update_config=1\n\n").await;
        let path = settings.paths.supplicant_conf.clone();

        manager_with_settings(&backend, settings)
            .configure_network("HomeNet", "s3cret pass")
            .await
            .unwrap();

        let store = CredentialStore::parse(&fs::read_to_string(&path).await.unwrap());
        let record = store.record("HomeNet").expect("record written");
        assert_eq!(record.get("psk"), Some("s3cret pass"));
        assert_eq!(record.get("priority"), Some("10"));
        assert!(store.header().starts_with("update_config=1"));
    }

    #[tokio::test]
    async fn test_configure_network_rejects_empty_ssid() {
        let backend = Arc::new(MockNetBackend::new());
        let (_dir, settings) = settings_with_store("update_config=1\n").await;

        let result = manager_with_settings(&backend, settings)
            .configure_network("", "longenough")
            .await;

        assert!(matches!(result, Err(ServiceError::EmptySsid)));
    }

    #[tokio::test]
    async fn test_configure_network_rejects_short_passphrase() {
        let backend = Arc::new(MockNetBackend::new());
        let (_dir, settings) = settings_with_store("update_config=1\n").await;

        let result = manager_with_settings(&backend, settings)
            .configure_network("HomeNet", "short")
            .await;

        assert!(matches!(result, Err(ServiceError::PassphraseTooShort(5))));
    }

    #[tokio::test]
    async fn test_validation_failure_leaves_store_untouched() {
        let backend = Arc::new(MockNetBackend::new());
        let original = "update_config=1\n\nnetwork={\n    ssid=\"Old\"\n    psk=\"oldpass99\"\n}\n\n";
        let (_dir, settings) = settings_with_store(original).await;
        let path = settings.paths.supplicant_conf.clone();

        let result = manager_with_settings(&backend, settings)
            .configure_network("HomeNet", "short")
            .await;

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_configure_network_fails_without_store() {
        let backend = Arc::new(MockNetBackend::new());
        let mut settings = Settings::default();
        settings.paths.supplicant_conf = "/nonexistent/wpa_supplicant.conf".into();

        let result = manager_with_settings(&backend, settings)
            .configure_network("HomeNet", "longenough")
            .await;

        assert!(matches!(result, Err(ServiceError::Persistence { .. })));
    }

    #[tokio::test]
    async fn test_connect_restarts_supplicant_and_waits() {
        let backend = Arc::new(MockNetBackend::new());
        backend.set_internet(true).await;

        manager(&backend)
            .connect(Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(backend.supplicant_restarts().await, 1);
    }

    #[tokio::test]
    async fn test_connect_times_out_without_connectivity() {
        let backend = Arc::new(MockNetBackend::new());

        let result = manager(&backend).connect(Duration::from_millis(50)).await;

        assert!(matches!(result, Err(ServiceError::ConnectTimeout(_))));
    }

    #[tokio::test]
    async fn test_connect_surfaces_supplicant_failure() {
        let backend = Arc::new(MockNetBackend::new());
        backend.set_supplicant_failure(true).await;

        let result = manager(&backend).connect(Duration::from_secs(1)).await;

        assert!(matches!(result, Err(ServiceError::Backend(_))));
    }
}
