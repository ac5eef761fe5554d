//! Uplink and wired interface management

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::{
    backend::NetBackend,
    config::Settings,
    core::{
        error::ServiceResult,
        types::{InterfaceStatus, LinkAddress},
    },
};

/// Timeout for a single internet reachability probe
const INTERNET_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Manages the two interfaces the appliance fronts: the wireless
/// uplink carrying intercepted traffic out, and the wired interface.
pub struct InterfaceController<B: NetBackend> {
    backend: Arc<B>,
    settings: Settings,
}

impl<B: NetBackend> InterfaceController<B> {
    pub fn new(backend: Arc<B>, settings: Settings) -> Self {
        Self { backend, settings }
    }

    /// Make sure the wireless uplink exists and its link is raised
    pub async fn enable_interface(&self) -> ServiceResult<()> {
        self.backend.link_up(&self.settings.network.out).await?;
        Ok(())
    }

    /// Snapshot both interfaces and internet reachability.
    ///
    /// Lookup failures degrade to "no address" instead of failing the
    /// whole snapshot; status must stay answerable on a box with a
    /// missing or unconfigured interface.
    pub async fn check_status(&self) -> InterfaceStatus {
        InterfaceStatus {
            uplink: self.link_address(&self.settings.network.out).await,
            wired: self.link_address(&self.settings.network.wired).await,
            internet: self.check_internet().await,
        }
    }

    /// Whether the reference URL currently answers
    pub async fn check_internet(&self) -> bool {
        self.backend
            .probe_url(&self.settings.network.internet_check, INTERNET_PROBE_TIMEOUT)
            .await
            .is_ok()
    }

    async fn link_address(&self, name: &str) -> LinkAddress {
        let address = match self.backend.ipv4_address(name).await {
            Ok(Some(ip)) if is_reportable(ip) => Some(ip),
            Ok(Some(ip)) => {
                debug!("Ignoring unusable address {} on {}", ip, name);
                None
            }
            Ok(None) => None,
            Err(e) => {
                debug!("Address lookup failed on {}: {}", name, e);
                None
            }
        };
        LinkAddress {
            name: name.to_string(),
            address,
        }
    }
}

/// Loopback and link-local addresses mean "no usable address"
fn is_reportable(ip: Ipv4Addr) -> bool {
    !(ip.is_loopback() || ip.is_link_local())
}
