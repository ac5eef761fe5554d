//! Device identity resolution
//!
//! Capture sessions are keyed by an 8-character uppercase-hex token.
//! The first successful resolution for a token is cached on disk and
//! replayed for the session's lifetime, so the reported identity never
//! drifts while a capture is running.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tracing::debug;
use trait_variant::make;

use crate::{
    core::{
        error::{ServiceError, ServiceResult},
        types::DeviceIdentity,
    },
    store::leases::parse_first_lease,
    util::write_atomic,
};

/// Message carried by the placeholder identity
const DEVICE_NOT_CONNECTED: &str = "Device not connected";

/// Strategy for deriving the identity behind a capture session
#[make(Send)]
pub trait IdentitySource: Sync + 'static {
    /// Derive the identity of the device behind `port`
    async fn derive(&self, port: u16) -> ServiceResult<DeviceIdentity>;
}

/// Resolution from the first entry of the dnsmasq lease table.
///
/// The capture network hands out exactly one address, so the first
/// lease is the connected device. An empty table is a valid outcome
/// and maps to the "not connected" placeholder.
pub struct LeaseFileSource {
    lease_file: PathBuf,
}

impl LeaseFileSource {
    pub fn new(lease_file: PathBuf) -> Self {
        Self { lease_file }
    }
}

impl IdentitySource for LeaseFileSource {
    async fn derive(&self, _port: u16) -> ServiceResult<DeviceIdentity> {
        let content =
            fs::read_to_string(&self.lease_file)
                .await
                .map_err(|source| ServiceError::LeaseTable {
                    path: self.lease_file.clone(),
                    source,
                })?;

        Ok(match parse_first_lease(&content) {
            Some(lease) => {
                DeviceIdentity::known(lease.name, lease.ip_address, lease.mac_address, lease.timestamp)
            }
            None => DeviceIdentity::unknown(DEVICE_NOT_CONNECTED),
        })
    }
}

/// Placeholder identities for development boxes without a capture
/// network behind them
pub struct StubSource;

impl IdentitySource for StubSource {
    async fn derive(&self, port: u16) -> ServiceResult<DeviceIdentity> {
        Ok(DeviceIdentity::known(
            format!("Dummy - {}", port),
            "0.0.0.0".to_string(),
            "AA:AA:AA:AA:AA:AA".to_string(),
            Utc::now().timestamp(),
        ))
    }
}

/// Identity source selected by the settings file
pub enum ConfiguredSource {
    Stub(StubSource),
    Leases(LeaseFileSource),
}

impl IdentitySource for ConfiguredSource {
    async fn derive(&self, port: u16) -> ServiceResult<DeviceIdentity> {
        match self {
            ConfiguredSource::Stub(source) => source.derive(port).await,
            ConfiguredSource::Leases(source) => source.derive(port).await,
        }
    }
}

/// Resolves and caches per-token device identities
pub struct DeviceIdentityResolver<S: IdentitySource> {
    source: S,
    cache_root: PathBuf,
}

impl<S: IdentitySource> DeviceIdentityResolver<S> {
    pub fn new(source: S, cache_root: PathBuf) -> Self {
        Self { source, cache_root }
    }

    /// Resolve the identity for `token`, consulting the cache first.
    ///
    /// Only real identities are cached; placeholders are re-derived on
    /// every call so a device that shows up later is not masked by an
    /// earlier miss.
    pub async fn identity(&self, token: &str, port: u16) -> ServiceResult<DeviceIdentity> {
        if !valid_token(token) {
            return Err(ServiceError::InvalidToken(token.to_string()));
        }

        let path = self.cache_path(token);
        match fs::read(&path).await {
            Ok(bytes) => {
                debug!("Identity cache hit for token {}", token);
                return Ok(serde_json::from_slice(&bytes)?);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(ServiceError::Persistence { path, source }),
        }

        let identity = self.source.derive(port).await?;
        if identity.is_known() {
            self.cache(&path, &identity).await?;
            debug!("Identity cached for token {}", token);
        }
        Ok(identity)
    }

    async fn cache(&self, path: &Path, identity: &DeviceIdentity) -> ServiceResult<()> {
        let persist = |source| ServiceError::Persistence {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(persist)?;
        }
        let json = serde_json::to_vec(identity)?;
        write_atomic(path, &json).await.map_err(persist)
    }

    fn cache_path(&self, token: &str) -> PathBuf {
        self.cache_root.join(token).join("assets").join("device.json")
    }
}

/// Tokens are exactly 8 characters of uppercase hex
fn valid_token(token: &str) -> bool {
    token.len() == 8 && token.chars().all(|c| matches!(c, '0'..='9' | 'A'..='F'))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Source that counts derivations and serves a fixed identity
    #[derive(Clone)]
    struct FixedSource {
        identity: DeviceIdentity,
        derivations: std::sync::Arc<AtomicUsize>,
    }

    impl FixedSource {
        fn new(identity: DeviceIdentity) -> Self {
            Self {
                identity,
                derivations: std::sync::Arc::new(AtomicUsize::new(0)),
            }
        }

        fn derivations(&self) -> usize {
            self.derivations.load(Ordering::SeqCst)
        }
    }

    impl IdentitySource for FixedSource {
        async fn derive(&self, _port: u16) -> ServiceResult<DeviceIdentity> {
            self.derivations.fetch_add(1, Ordering::SeqCst);
            Ok(self.identity.clone())
        }
    }

    #[test]
    fn test_valid_token() {
        assert!(valid_token("00F3AB91"));
        assert!(valid_token("12345678"));
        assert!(valid_token("ABCDEF00"));

        assert!(!valid_token(""));
        assert!(!valid_token("00f3ab91")); // lowercase
        assert!(!valid_token("00F3AB9")); // too short
        assert!(!valid_token("00F3AB911")); // too long
        assert!(!valid_token("00F3AB9G")); // not hex
        assert!(!valid_token("../SECRET")); // traversal attempt
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected_before_any_io() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = DeviceIdentityResolver::new(StubSource, dir.path().to_path_buf());

        let result = resolver.identity("../escape", 4000).await;

        assert!(matches!(result, Err(ServiceError::InvalidToken(_))));
        assert!(!dir.path().join("../escape").exists());
    }

    #[tokio::test]
    async fn test_stub_identity_is_cached_and_replayed() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = DeviceIdentityResolver::new(StubSource, dir.path().to_path_buf());

        let first = resolver.identity("00F3AB91", 4125).await.unwrap();
        let second = resolver.identity("00F3AB91", 9999).await.unwrap();

        // the second call replays the cache, port change and all
        assert_eq!(first, second);
        match first {
            DeviceIdentity::Known(device) => {
                assert_eq!(device.name, "Dummy - 4125");
                assert_eq!(device.ip_address, "0.0.0.0");
            }
            DeviceIdentity::Unknown(_) => panic!("stub identity must be known"),
        }
    }

    #[tokio::test]
    async fn test_lease_resolution_writes_cache_file() {
        let dir = tempfile::tempdir().unwrap();
        let lease_file = dir.path().join("dnsmasq.leases");
        fs::write(
            &lease_file,
            "1700000000 AA:BB:CC:DD:EE:FF 192.168.1.50 phone1 *\n",
        )
        .await
        .unwrap();
        let resolver = DeviceIdentityResolver::new(
            LeaseFileSource::new(lease_file),
            dir.path().to_path_buf(),
        );

        let identity = resolver.identity("00F3AB91", 4125).await.unwrap();

        assert_eq!(
            identity,
            DeviceIdentity::known(
                "phone1".to_string(),
                "192.168.1.50".to_string(),
                "AA:BB:CC:DD:EE:FF".to_string(),
                1700000000,
            )
        );
        let cached: serde_json::Value = serde_json::from_slice(
            &fs::read(dir.path().join("00F3AB91/assets/device.json"))
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(
            cached,
            serde_json::json!({
                "status": true,
                "name": "phone1",
                "ip_address": "192.168.1.50",
                "mac_address": "AA:BB:CC:DD:EE:FF",
                "timestamp": 1700000000,
            })
        );
    }

    #[tokio::test]
    async fn test_empty_lease_table_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let lease_file = dir.path().join("dnsmasq.leases");
        fs::write(&lease_file, "").await.unwrap();
        let resolver = DeviceIdentityResolver::new(
            LeaseFileSource::new(lease_file),
            dir.path().to_path_buf(),
        );

        let identity = resolver.identity("00F3AB91", 4125).await.unwrap();

        assert_eq!(identity, DeviceIdentity::unknown("Device not connected"));
        assert!(!dir.path().join("00F3AB91/assets/device.json").exists());
    }

    #[tokio::test]
    async fn test_missing_lease_table_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = DeviceIdentityResolver::new(
            LeaseFileSource::new(dir.path().join("no-such-file")),
            dir.path().to_path_buf(),
        );

        let result = resolver.identity("00F3AB91", 4125).await;

        assert!(matches!(result, Err(ServiceError::LeaseTable { .. })));
    }

    #[tokio::test]
    async fn test_cache_stops_rederivation() {
        let source = FixedSource::new(DeviceIdentity::known(
            "phone1".to_string(),
            "192.168.1.50".to_string(),
            "AA:BB:CC:DD:EE:FF".to_string(),
            1700000000,
        ));
        let dir = tempfile::tempdir().unwrap();
        let resolver = DeviceIdentityResolver::new(source.clone(), dir.path().to_path_buf());

        resolver.identity("00F3AB91", 4125).await.unwrap();
        resolver.identity("00F3AB91", 4125).await.unwrap();
        resolver.identity("00F3AB91", 4125).await.unwrap();

        assert_eq!(source.derivations(), 1);
    }

    #[tokio::test]
    async fn test_unknown_identity_is_rederived() {
        let source = FixedSource::new(DeviceIdentity::unknown("Device not connected"));
        let dir = tempfile::tempdir().unwrap();
        let resolver = DeviceIdentityResolver::new(source.clone(), dir.path().to_path_buf());

        resolver.identity("00F3AB91", 4125).await.unwrap();
        resolver.identity("00F3AB91", 4125).await.unwrap();

        assert_eq!(source.derivations(), 2);
    }

    #[tokio::test]
    async fn test_tokens_do_not_share_caches() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = DeviceIdentityResolver::new(StubSource, dir.path().to_path_buf());

        let first = resolver.identity("00F3AB91", 1111).await.unwrap();
        let second = resolver.identity("00F3AB92", 2222).await.unwrap();

        assert_ne!(first, second);
    }
}
