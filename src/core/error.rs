//! Error types for the tap control service

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for network backend operations
pub type NetResult<T> = Result<T, NetError>;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors related to network backend operations
#[derive(Error, Debug, Clone)]
pub enum NetError {
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Interface {0} not connected or present")]
    InterfaceMissing(String),

    #[error("wpa_supplicant error: {0}")]
    Supplicant(String),

    #[error("WiFi scan failed: {0}")]
    ScanFailed(String),

    #[error("Connectivity probe failed: {0}")]
    ProbeFailed(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("External address lookup failed: {0}")]
    PublicIpLookup(String),
}

/// Errors related to core service operations
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Empty SSID")]
    EmptySsid,

    #[error("Passphrase too short: expected at least 8 characters, got {0}")]
    PassphraseTooShort(usize),

    #[error("Invalid capture token: {0:?}")]
    InvalidToken(String),

    #[error("No free port in {low}..={high} after {attempts} attempts")]
    NoPortAvailable { low: u32, high: u32, attempts: u32 },

    #[error("No connectivity within {0:?}")]
    ConnectTimeout(Duration),

    #[error("Lease table unavailable: {}: {source}", path.display())]
    LeaseTable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Persistence failure: {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(#[from] NetError),
}

/// Errors related to transport layer
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
