//! Runtime settings
//!
//! Settings live in a TOML file with defaults for every key, so a
//! stock appliance image runs without one. A handful of command-line
//! flags override the file.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::CliArgs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("port_bounds_low ({low}) exceeds port_bounds_high ({high})")]
    InvalidPortBounds { low: u32, high: u32 },
}

/// Runtime configuration settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub network: NetworkSettings,
    pub paths: PathSettings,
    pub service: ServiceSettings,
}

/// `[network]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Wireless uplink interface
    pub out: String,
    /// Wired interface reported in status
    pub wired: String,
    /// Advertised proxy address; empty means ask `external_ip`
    pub override_ip: String,
    /// Inclusive lower bound for proxy port sampling
    pub port_bounds_low: u32,
    /// Inclusive upper bound for proxy port sampling
    pub port_bounds_high: u32,
    /// URL probed to decide internet reachability
    pub internet_check: String,
    /// URL answering with the publicly visible address of this host
    pub external_ip: String,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            out: "wlan0".to_string(),
            wired: "eth0".to_string(),
            override_ip: String::new(),
            port_bounds_low: 1024,
            port_bounds_high: 65535,
            internet_check: "https://api.ipify.org".to_string(),
            external_ip: "https://api.ipify.org".to_string(),
        }
    }
}

/// `[paths]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// wpa_supplicant credential store
    pub supplicant_conf: PathBuf,
    /// dnsmasq lease table of the capture network
    pub lease_file: PathBuf,
    /// Root under which per-token identity caches live
    pub identity_cache_root: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            supplicant_conf: PathBuf::from("/etc/wpa_supplicant/wpa_supplicant.conf"),
            lease_file: PathBuf::from("/var/lib/misc/dnsmasq.leases"),
            identity_cache_root: PathBuf::from("/tmp"),
        }
    }
}

/// `[service]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Path for the control Unix socket
    pub socket_path: String,
    /// How long `connect` waits for connectivity before giving up
    pub connect_timeout_secs: u64,
    /// Where device identities come from
    pub identity_source: IdentitySourceKind,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            socket_path: "/run/tap-control.sock".to_string(),
            connect_timeout_secs: 40,
            identity_source: IdentitySourceKind::Stub,
        }
    }
}

/// Selectable identity resolution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySourceKind {
    /// Deterministic placeholder identities
    Stub,
    /// Resolution from the dnsmasq lease table
    Leases,
}

impl Settings {
    /// Load settings for the given command line. A missing settings
    /// file falls back to defaults; a malformed one is an error.
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut settings = match std::fs::read_to_string(&args.config) {
            Ok(content) => {
                toml::from_str(&content).map_err(|source| ConfigError::Parse {
                    path: args.config.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "No settings file at {}, using defaults",
                    args.config.display()
                );
                Settings::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: args.config.clone(),
                    source,
                });
            }
        };

        if let Some(interface) = &args.interface {
            settings.network.out = interface.clone();
        }
        if let Some(socket_path) = &args.socket_path {
            settings.service.socket_path = socket_path.clone();
        }

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.network.port_bounds_low > self.network.port_bounds_high {
            return Err(ConfigError::InvalidPortBounds {
                low: self.network.port_bounds_low,
                high: self.network.port_bounds_high,
            });
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.service.connect_timeout_secs)
    }
}
