// retrievos-api: Async Rust client for the retrievos dashboard HTTP API

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::DashboardClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
