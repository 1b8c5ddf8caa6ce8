//! Core module containing shared infrastructure components.
//!
//! Configuration and command line, the injected clock, the generic entity
//! store, the unified error type, the server facade and the transports.

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod transport;

pub use cli::Cli;
pub use clock::{SharedClock, system_clock};
pub use config::{Config, StorageBackend};
pub use error::{Error, Result};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
