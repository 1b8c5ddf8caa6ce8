//! Transport configuration types.

use serde::{Deserialize, Serialize};

/// Transport configuration options.
///
/// Chosen once at startup; the server never switches transport at runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport (default for MCP).
    #[default]
    Stdio,

    /// HTTP transport with JSON-RPC over POST.
    #[cfg(feature = "http")]
    Http(HttpConfig),
}

/// HTTP transport configuration.
#[cfg(feature = "http")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path for JSON-RPC endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

#[cfg(feature = "http")]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[cfg(feature = "http")]
fn default_port() -> u16 {
    8000
}

#[cfg(feature = "http")]
fn default_rpc_path() -> String {
    "/mcp".to_string()
}

#[cfg(feature = "http")]
fn default_cors() -> bool {
    true
}

#[cfg(feature = "http")]
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
        }
    }
}

impl TransportConfig {
    /// Create a STDIO transport config.
    pub fn stdio() -> Self {
        Self::Stdio
    }

    /// Create an HTTP transport config.
    #[cfg(feature = "http")]
    pub fn http(port: u16, host: impl Into<String>) -> Self {
        Self::Http(HttpConfig {
            port,
            host: host.into(),
            ..Default::default()
        })
    }

    /// Load transport config from `MCP_TRANSPORT` and the `MCP_HTTP_*`
    /// variables. Unknown transports fall back to STDIO.
    pub fn from_env() -> Self {
        let transport = std::env::var("MCP_TRANSPORT").unwrap_or_default().to_lowercase();

        match transport.as_str() {
            #[cfg(feature = "http")]
            "http" => {
                let mut http = HttpConfig::default();
                http.apply_env();
                Self::Http(http)
            }
            _ => Self::Stdio,
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
            #[cfg(feature = "http")]
            Self::Http(cfg) => format!("HTTP on {}:{}{}", cfg.host, cfg.port, cfg.rpc_path),
        }
    }

    /// Check if this transport is the standard STDIO mode.
    pub fn is_stdio(&self) -> bool {
        matches!(self, Self::Stdio)
    }
}

#[cfg(feature = "http")]
impl HttpConfig {
    /// Override fields from `MCP_HTTP_HOST`, `MCP_HTTP_PORT`, `MCP_HTTP_PATH`
    /// and `MCP_HTTP_CORS`.
    pub fn apply_env(&mut self) {
        if let Some(port) = std::env::var("MCP_HTTP_PORT").ok().and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Ok(host) = std::env::var("MCP_HTTP_HOST") {
            self.host = host;
        }
        if let Ok(path) = std::env::var("MCP_HTTP_PATH") {
            self.rpc_path = path;
        }
        if let Ok(cors) = std::env::var("MCP_HTTP_CORS") {
            self.enable_cors = cors.to_lowercase() != "false" && cors != "0";
        }
    }
}
