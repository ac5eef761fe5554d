//! Transport layers exposing the control plane

pub mod unix_socket;
