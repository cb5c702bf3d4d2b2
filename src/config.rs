use std::fmt;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use url::Url;

/// Default upstream base URL (CityCatalyst Global API).
pub const DEFAULT_BASE_URL: &str = "https://ccglobal.openearth.dev";

/// Default timeout for a single upstream request (10 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL {value:?}: {reason}")]
    InvalidBaseUrl { value: String, reason: String },
    #[error("upstream timeout must be a positive number of seconds")]
    InvalidTimeout,
    #[error("listen host must not be empty")]
    EmptyHost,
    #[error("listen path {0:?} must start with '/'")]
    InvalidPath(String),
}

/// Transport the MCP server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout.
    #[default]
    Stdio,
    /// JSON-RPC over HTTP POST on the configured host/port/path.
    Http,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => f.write_str("stdio"),
            Self::Http => f.write_str("http"),
        }
    }
}

/// Command line surface. Every flag falls back to an environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "citycatalyst-mcp-server", version, about = "MCP server for the CityCatalyst Global API")]
pub struct Cli {
    /// Transport mode
    #[arg(long, value_enum, env = "MCP_TRANSPORT", default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Base URL of the CityCatalyst Global API
    #[arg(long, env = "GLOBALAPI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Upstream request timeout in seconds
    #[arg(long, env = "GLOBALAPI_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Host to bind (http transport)
    #[arg(long, env = "MCP_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind (http transport)
    #[arg(long, env = "MCP_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Path the MCP endpoint is mounted on (http transport)
    #[arg(long, env = "MCP_PATH", default_value = "/mcp")]
    pub path: String,
}

/// Upstream API settings shared read-only by every tool call.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl UpstreamConfig {
    /// Parse and normalize a base URL (trailing slashes are dropped).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        let trimmed = base_url.trim().trim_end_matches('/');
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            value: base_url.to_string(),
            reason,
        };
        let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot be used as a base".into()));
        }
        Ok(Self { base_url: url, timeout })
    }
}

/// Listen settings for the http transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl ListenConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Immutable process configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub transport: Transport,
    pub upstream: UpstreamConfig,
    pub listen: ListenConfig,
}

impl ServerConfig {
    /// Load configuration from command line arguments and environment.
    pub fn from_args() -> Result<Self, ConfigError> {
        Cli::parse().try_into()
    }
}

impl TryFrom<Cli> for ServerConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let upstream = UpstreamConfig::new(&cli.base_url, Duration::from_secs(cli.timeout_secs))?;

        let host = cli.host.trim().to_string();
        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if !cli.path.starts_with('/') {
            return Err(ConfigError::InvalidPath(cli.path));
        }

        Ok(Self {
            transport: cli.transport,
            upstream,
            listen: ListenConfig {
                host,
                port: cli.port,
                path: cli.path,
            },
        })
    }
}
