//! Core business logic module

pub mod error;
pub mod identity;
pub mod interface;
pub mod proxy;
pub mod service;
pub mod types;
pub mod wifi;
