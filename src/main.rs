//! Tap Control Service - Main Entry Point

use std::sync::Arc;

use clap::Parser;
use tap_control_service::{
    backend::LinuxNetBackend,
    config::{CliArgs, IdentitySourceKind, Settings},
    core::{
        identity::{ConfiguredSource, LeaseFileSource, StubSource},
        service::ControlService,
    },
    transport::unix_socket::UnixSocketServer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tap_control_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments and load settings
    let args = CliArgs::parse();
    info!(?args, "Starting tap control service");

    let settings = Settings::load(&args)?;

    // Create the host network backend
    let backend = Arc::new(LinuxNetBackend::new(
        settings.network.out.clone(),
        settings.paths.supplicant_conf.clone(),
    )?);
    info!(
        "Network backend initialized for interface: {}",
        settings.network.out
    );

    // Select the identity resolution strategy
    let source = match settings.service.identity_source {
        IdentitySourceKind::Stub => ConfiguredSource::Stub(StubSource),
        IdentitySourceKind::Leases => ConfiguredSource::Leases(LeaseFileSource::new(
            settings.paths.lease_file.clone(),
        )),
    };

    let service = Arc::new(ControlService::new(backend, source, settings.clone()));
    info!("Tap control service created");

    // Raise the uplink once at startup; a missing interface is not
    // fatal here, status queries must still be answerable
    if let Err(e) = service.enable_interface().await {
        warn!("Could not raise uplink at startup: {}", e);
    }

    // Start the Unix socket transport
    let socket_path = settings.service.socket_path.clone();
    info!("Starting Unix socket transport on {}", socket_path);

    let server = UnixSocketServer::new(socket_path, service);
    let server_task = tokio::spawn(async move {
        if let Err(e) = server.start().await {
            error!("Unix socket server error: {}", e);
        }
    });

    info!("Service started successfully");

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully");
        }
        _ = shutdown_signal() => {
            info!("Received SIGTERM, shutting down gracefully");
        }
        _ = server_task => {
            info!("Unix socket server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");

    sigterm.recv().await;
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    // On non-Unix platforms, just wait forever
    std::future::pending::<()>().await
}
