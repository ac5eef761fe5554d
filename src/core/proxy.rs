//! Proxy session brokering
//!
//! At most one proxy session is live at a time. A session is the pair
//! of an advertised address and a reserved TCP port; the reservation
//! is a bound listener held for the session's lifetime, so nothing
//! else on the box can grab the port between handing it out and the
//! capture proxy taking over.

use std::sync::Arc;

use rand::Rng;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    backend::NetBackend,
    config::Settings,
    core::{
        error::{ServiceError, ServiceResult},
        types::ProxyAccess,
    },
};

/// How many random ports to try before giving up
const BIND_ATTEMPTS: u32 = 100;

struct ProxySession {
    access: ProxyAccess,
    // held, not accepted on; dropping it releases the port
    _listener: TcpListener,
}

/// Hands out the single live proxy session
pub struct ProxySessionManager<B: NetBackend> {
    backend: Arc<B>,
    settings: Settings,
    session: Mutex<Option<ProxySession>>,
}

impl<B: NetBackend> ProxySessionManager<B> {
    pub fn new(backend: Arc<B>, settings: Settings) -> Self {
        Self {
            backend,
            settings,
            session: Mutex::new(None),
        }
    }

    /// Start a fresh session: re-assert the uplink, retire any live
    /// session, resolve the advertised address and reserve a port.
    ///
    /// The whole transaction runs under the session lock, so two
    /// concurrent starts serialize instead of interleaving.
    pub async fn start_proxy(&self) -> ServiceResult<ProxyAccess> {
        let mut session = self.session.lock().await;

        self.backend.link_up(&self.settings.network.out).await?;

        if let Some(old) = session.take() {
            // release before sampling, the old port may be drawn again
            debug!("Releasing previous proxy session on port {}", old.access.port);
            drop(old);
        }

        let ip = self.advertised_ip().await?;
        let (port, listener) = self.reserve_port().await?;
        info!("Proxy session started on {}:{}", ip, port);

        let access = ProxyAccess { ip, port };
        *session = Some(ProxySession {
            access: access.clone(),
            _listener: listener,
        });
        Ok(access)
    }

    /// Retire the live session if there is one. Idempotent.
    pub async fn stop_proxy(&self) {
        let mut session = self.session.lock().await;
        match session.take() {
            Some(old) => info!("Proxy session stopped on port {}", old.access.port),
            None => debug!("No proxy session to stop"),
        }
    }

    /// Access data of the live session, if any
    pub async fn current_session(&self) -> Option<ProxyAccess> {
        self.session.lock().await.as_ref().map(|s| s.access.clone())
    }

    async fn advertised_ip(&self) -> ServiceResult<String> {
        let override_ip = &self.settings.network.override_ip;
        if !override_ip.is_empty() {
            return Ok(override_ip.clone());
        }
        let ip = self
            .backend
            .public_ip(&self.settings.network.external_ip)
            .await?;
        Ok(ip)
    }

    /// Sample random ports within the configured bounds until one
    /// binds. Bounds may reach past the valid port space; such draws
    /// are skipped without costing a bind.
    async fn reserve_port(&self) -> ServiceResult<(u16, TcpListener)> {
        let low = self.settings.network.port_bounds_low;
        let high = self.settings.network.port_bounds_high;

        for _ in 0..BIND_ATTEMPTS {
            let candidate = rand::thread_rng().gen_range(low..=high);
            let Ok(port) = u16::try_from(candidate) else {
                continue;
            };
            match TcpListener::bind(("0.0.0.0", port)).await {
                Ok(listener) => return Ok((port, listener)),
                Err(e) => debug!("Port {} not bindable: {}", port, e),
            }
        }

        Err(ServiceError::NoPortAvailable {
            low,
            high,
            attempts: BIND_ATTEMPTS,
        })
    }
}
