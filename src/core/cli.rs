//! Command-line interface.
//!
//! Flags override values loaded from the environment.

use clap::{Parser, ValueEnum};
use tracing::warn;

use super::config::Config;
use super::transport::TransportConfig;

#[cfg(feature = "http")]
use super::transport::HttpConfig;

/// Transport selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportKind {
    /// JSON-RPC over stdin/stdout
    Stdio,
    /// JSON-RPC over HTTP POST
    #[cfg(feature = "http")]
    Http,
}

#[derive(Parser, Debug, Default)]
#[command(name = "vienna-live-mcp")]
#[command(version)]
#[command(about = "MCP server with shopping, travel, expenses, media and planning tools")]
pub struct Cli {
    /// Transport to serve on
    #[arg(long, value_enum)]
    pub transport: Option<TransportKind>,

    /// HTTP bind address
    #[arg(long)]
    pub host: Option<String>,

    /// HTTP port
    #[arg(long)]
    pub port: Option<u16>,

    /// Storage connection string (memory://, file://<path>)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Override `config` with every flag that was given.
    pub fn apply(self, config: &mut Config) {
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(url) = self.database_url {
            config.storage.database_url = url;
        }

        match self.transport {
            Some(TransportKind::Stdio) => config.transport = TransportConfig::Stdio,
            #[cfg(feature = "http")]
            Some(TransportKind::Http) if config.transport.is_stdio() => {
                let mut http = HttpConfig::default();
                http.apply_env();
                config.transport = TransportConfig::Http(http);
            }
            _ => {}
        }

        match &mut config.transport {
            #[cfg(feature = "http")]
            TransportConfig::Http(http) => {
                if let Some(host) = self.host {
                    http.host = host;
                }
                if let Some(port) = self.port {
                    http.port = port;
                }
            }
            _ => {
                if self.host.is_some() || self.port.is_some() {
                    warn!("--host and --port only apply to the HTTP transport; ignoring");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vienna-live-mcp").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        parse(&["--database-url", "file://vienna.json", "--log-level", "debug"]).apply(&mut config);
        assert_eq!(config.storage.database_url, "file://vienna.json");
        assert_eq!(config.logging.level, "debug");
        assert!(config.transport.is_stdio());
    }

    #[test]
    fn test_no_flags_leave_config_untouched() {
        let mut config = Config::default();
        Cli::default().apply(&mut config);
        assert_eq!(config.storage.database_url, "memory://");
        assert!(config.transport.is_stdio());
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_transport_with_host_and_port() {
        let mut config = Config::default();
        parse(&["--transport", "http", "--host", "0.0.0.0", "--port", "9100"]).apply(&mut config);
        assert_eq!(config.transport.description(), "HTTP on 0.0.0.0:9100/mcp");
    }

    #[test]
    fn test_unknown_transport_is_rejected() {
        let result = Cli::try_parse_from(["vienna-live-mcp", "--transport", "tcp"]);
        assert!(result.is_err());
    }
}
