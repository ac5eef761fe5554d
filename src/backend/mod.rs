//! Network backend abstraction layer

pub mod linux_backend;
pub mod mock_backend;
pub mod net_backend;

pub use linux_backend::LinuxNetBackend;
pub use net_backend::NetBackend;

#[cfg(test)]
pub use mock_backend::MockNetBackend;
