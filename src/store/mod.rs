//! On-disk stores the service reads and rewrites

pub mod leases;
pub mod supplicant;
