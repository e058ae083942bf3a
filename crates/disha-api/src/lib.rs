// disha-api: Async Rust client for the Disha traffic incident backend

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{ACTIVE_STATUS, DishaClient};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
