//! Port traits between the domain and its adapters.

pub mod config_port;
pub mod reference_port;
pub mod store_port;
