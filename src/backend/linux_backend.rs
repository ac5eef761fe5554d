//! Host network backend implementation
//!
//! Drives the real machinery: the `ip` tool for link and address
//! handling, wpa_supplicant through its control socket for scanning,
//! process management for supplicant restarts, and plain HTTP requests
//! for reachability checks.

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};
use wpactrl::Client;

use crate::{
    backend::NetBackend,
    core::{
        error::{NetError, NetResult},
        types::ScanEntry,
    },
};

/// Settle time between triggering a scan and collecting results
const SCAN_SETTLE: Duration = Duration::from_secs(3);

/// Timeout for the external address lookup
const PUBLIC_IP_TIMEOUT: Duration = Duration::from_secs(10);

/// Real host backend
pub struct LinuxNetBackend {
    interface: String,
    ctrl_socket: String,
    supplicant_conf: PathBuf,
    http: reqwest::Client,
}

impl LinuxNetBackend {
    /// Create a backend bound to the wireless uplink `interface` and
    /// the given wpa_supplicant credential store
    pub fn new(interface: String, supplicant_conf: PathBuf) -> NetResult<Self> {
        let ctrl_socket = format!("/var/run/wpa_supplicant/{}", interface);
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| NetError::HttpClient(e.to_string()))?;
        Ok(Self {
            interface,
            ctrl_socket,
            supplicant_conf,
            http,
        })
    }

    /// Parse scan results from wpa_supplicant output
    fn parse_scan_results(output: &str) -> Vec<ScanEntry> {
        let mut entries = Vec::new();

        for line in output.lines().skip(1) {
            // Skip header line
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() >= 5 {
                entries.push(ScanEntry {
                    ssid: parts[4].to_string(),
                    encryption: Self::encryption_from_flags(parts[3]),
                });
            }
        }

        entries
    }

    /// Map a supplicant flag list like `[WPA2-PSK-CCMP][ESS]` to an
    /// encryption family, `None` for open networks
    fn encryption_from_flags(flags: &str) -> Option<String> {
        // WPA3 and WPA2 must win over the bare WPA substring
        for family in ["WPA3", "WPA2", "WPA", "WEP"] {
            if flags.contains(family) {
                return Some(family.to_string());
            }
        }
        None
    }

    /// First `inet` address in `ip -4 addr show` output
    fn parse_ipv4_output(stdout: &str) -> Option<Ipv4Addr> {
        for line in stdout.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("inet ") {
                let addr = rest.split_whitespace().next()?.split('/').next()?;
                return addr.parse().ok();
            }
        }
        None
    }

    /// Whether `ip link show` output carries the UP flag, i.e. the
    /// first line looks like `3: wlan0: <BROADCAST,MULTICAST,UP,...>`
    fn link_is_up(stdout: &str) -> bool {
        stdout
            .lines()
            .next()
            .and_then(|line| line.split('<').nth(1))
            .and_then(|flags| flags.split('>').next())
            .map(|flags| flags.split(',').any(|f| f == "UP"))
            .unwrap_or(false)
    }
}

async fn run(program: &str, args: &[&str]) -> NetResult<std::process::Output> {
    Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| NetError::CommandFailed(format!("{}: {}", program, e)))
}

impl NetBackend for LinuxNetBackend {
    async fn link_up(&self, interface: &str) -> NetResult<()> {
        let show = run("ip", &["link", "show", "dev", interface]).await?;
        if !show.status.success() {
            return Err(NetError::InterfaceMissing(interface.to_string()));
        }
        if Self::link_is_up(&String::from_utf8_lossy(&show.stdout)) {
            return Ok(());
        }

        debug!("Raising link on interface: {}", interface);
        let set = run("ip", &["link", "set", interface, "up"]).await?;
        if set.status.success() {
            Ok(())
        } else {
            Err(NetError::CommandFailed(format!(
                "ip link set {} up: {}",
                interface,
                String::from_utf8_lossy(&set.stderr).trim()
            )))
        }
    }

    async fn ipv4_address(&self, interface: &str) -> NetResult<Option<Ipv4Addr>> {
        let output = run("ip", &["-4", "addr", "show", interface]).await?;
        if !output.status.success() {
            return Err(NetError::InterfaceMissing(interface.to_string()));
        }
        Ok(Self::parse_ipv4_output(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    async fn probe_url(&self, url: &str, timeout: Duration) -> NetResult<()> {
        // any HTTP response proves the path out, status codes included
        self.http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| NetError::ProbeFailed(format!("{}: {}", url, e)))
    }

    async fn public_ip(&self, url: &str) -> NetResult<String> {
        let response = self
            .http
            .get(url)
            .timeout(PUBLIC_IP_TIMEOUT)
            .send()
            .await
            .map_err(|e| NetError::PublicIpLookup(format!("{}: {}", url, e)))?;
        let body = response
            .text()
            .await
            .map_err(|e| NetError::PublicIpLookup(format!("{}: {}", url, e)))?;

        let ip = body.trim().to_string();
        if ip.is_empty() {
            return Err(NetError::PublicIpLookup(format!(
                "{}: empty response",
                url
            )));
        }
        Ok(ip)
    }

    async fn scan(&self) -> NetResult<Vec<ScanEntry>> {
        debug!("Starting WiFi scan on interface: {}", self.interface);

        // Check if socket exists
        if !Path::new(&self.ctrl_socket).exists() {
            return Err(NetError::Supplicant(format!(
                "wpa_supplicant control socket not found: {}",
                self.ctrl_socket
            )));
        }

        let ctrl_socket = self.ctrl_socket.clone();

        // Trigger scan in blocking thread
        tokio::task::spawn_blocking(move || {
            let mut ctrl = Client::builder().ctrl_path(&ctrl_socket).open().map_err(|e| {
                NetError::Supplicant(format!("Failed to connect to wpa_supplicant: {}", e))
            })?;

            ctrl.request("SCAN")
                .map_err(|e| NetError::ScanFailed(format!("Failed to start scan: {}", e)))
        })
        .await
        .map_err(|e| NetError::Supplicant(format!("Task join error: {}", e)))??;

        // Wait for scan to complete
        tokio::time::sleep(SCAN_SETTLE).await;

        let ctrl_socket = self.ctrl_socket.clone();

        // Get scan results in blocking thread
        let results = tokio::task::spawn_blocking(move || {
            let mut ctrl = Client::builder().ctrl_path(&ctrl_socket).open().map_err(|e| {
                NetError::Supplicant(format!("Failed to connect to wpa_supplicant: {}", e))
            })?;

            ctrl.request("SCAN_RESULTS")
                .map_err(|e| NetError::ScanFailed(format!("Failed to get scan results: {}", e)))
        })
        .await
        .map_err(|e| NetError::Supplicant(format!("Task join error: {}", e)))??;

        let entries = Self::parse_scan_results(&results);
        debug!("Scan complete, found {} networks", entries.len());

        Ok(entries)
    }

    async fn restart_supplicant(&self) -> NetResult<()> {
        debug!("Restarting wpa_supplicant on interface: {}", self.interface);

        // exit code 1 just means nothing matched
        if let Err(e) = Command::new("pkill")
            .args(["-x", "wpa_supplicant"])
            .status()
            .await
        {
            warn!("Failed to run pkill: {}", e);
        }

        let conf = self.supplicant_conf.to_string_lossy();
        let output = run("wpa_supplicant", &["-B", "-i", &self.interface, "-c", &conf]).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(NetError::Supplicant(format!(
                "wpa_supplicant exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}
