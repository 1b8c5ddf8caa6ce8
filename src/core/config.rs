//! Configuration management for the MCP server.
//!
//! Sources, later overriding earlier: defaults, `.env` and `MCP_*`
//! environment variables ([`Config::from_env`]), then command-line flags
//! ([`Cli::apply`](super::cli::Cli::apply)).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

use super::error::{Error, Result};
use super::transport::TransportConfig;

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Entity storage configuration.
    pub storage: StorageConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Entity storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Connection string: `memory://`, `file://<path>` or `json://<path>`.
    pub database_url: String,
}

/// Storage backend selected by the connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Volatile in-memory stores.
    Memory,

    /// A JSON snapshot file, one table per entity type.
    JsonFile(PathBuf),
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() || url == "memory" || url == "memory://" {
            return Ok(Self::Memory);
        }

        let path = url.strip_prefix("file://").or_else(|| url.strip_prefix("json://"));
        match path {
            Some(path) if !path.is_empty() => Ok(Self::JsonFile(PathBuf::from(path))),
            Some(_) => Err(Error::config(format!("Database URL '{}' has no file path", url))),
            None => Err(Error::config(format!(
                "Unsupported database URL '{}': expected memory:// or file://<path>",
                url
            ))),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::JsonFile(path) => write!(f, "json://{}", path.display()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "vienna-live-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            storage: StorageConfig {
                database_url: "memory://".to_string(),
            },
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `.env` and `MCP_*` environment variables.
    ///
    /// Recognised: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`, `MCP_TRANSPORT`,
    /// `MCP_HTTP_HOST`, `MCP_HTTP_PORT`, `MCP_HTTP_PATH`, `MCP_HTTP_CORS` and
    /// `MCP_DATABASE_URL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();

        if let Ok(url) = std::env::var("MCP_DATABASE_URL") {
            info!("Database URL loaded from environment");
            config.storage.database_url = url;
        }

        config
    }

    /// Parse the configured storage connection string.
    pub fn storage_backend(&self) -> Result<StorageBackend> {
        self.storage.database_url.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_storage_urls() {
        assert_eq!("memory://".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!(
            "file:///var/lib/vienna.json".parse::<StorageBackend>().unwrap(),
            StorageBackend::JsonFile(PathBuf::from("/var/lib/vienna.json"))
        );
        assert_eq!(
            "json://data.json".parse::<StorageBackend>().unwrap(),
            StorageBackend::JsonFile(PathBuf::from("data.json"))
        );
    }

    #[test]
    fn test_unsupported_storage_url_is_a_config_error() {
        let err = "postgres://localhost/vienna".parse::<StorageBackend>().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!("file://".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.name, "vienna-live-mcp");
        assert_eq!(config.logging.level, "info");
        assert!(config.transport.is_stdio());
        assert_eq!(config.storage_backend().unwrap(), StorageBackend::Memory);
    }

    #[test]
    fn test_database_url_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_DATABASE_URL", "file://vienna.json");
        }
        let config = Config::from_env();
        assert_eq!(
            config.storage_backend().unwrap(),
            StorageBackend::JsonFile(PathBuf::from("vienna.json"))
        );
        unsafe {
            std::env::remove_var("MCP_DATABASE_URL");
        }
    }

    #[test]
    fn test_backend_display() {
        assert_eq!(StorageBackend::Memory.to_string(), "memory");
        assert_eq!(
            StorageBackend::JsonFile(PathBuf::from("data.json")).to_string(),
            "json://data.json"
        );
    }
}
