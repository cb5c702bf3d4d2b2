use std::sync::Arc;

use crate::client::{GlobalApiClient, GlobalApiError};
use crate::config::{ServerConfig, Transport};
use crate::handlers::{RegistryError, ToolRegistry};
use crate::transport;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to create upstream client: {0}")]
    Client(#[from] GlobalApiError),
    #[error("failed to register tools: {0}")]
    Registry(#[from] RegistryError),
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// MCP server exposing the Global API tools over the configured transport.
#[derive(Debug)]
pub struct McpServer {
    config: ServerConfig,
    registry: Arc<ToolRegistry>,
}

impl McpServer {
    /// Build the upstream client and tool registry from `config`.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let client = GlobalApiClient::new(&config.upstream)?;
        let registry = ToolRegistry::global_api(Arc::new(client))?;
        Ok(Self {
            config,
            registry: Arc::new(registry),
        })
    }

    /// Serve until the peer goes away or the process is asked to stop.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!(
            transport = %self.config.transport,
            base_url = %self.config.upstream.base_url,
            tools = ?self.registry.descriptors().map(|d| d.name).collect::<Vec<_>>(),
            "MCP server starting"
        );

        match self.config.transport {
            Transport::Stdio => {
                let stdin = tokio::io::stdin();
                let stdout = tokio::io::stdout();
                tokio::select! {
                    result = transport::stdio::serve(self.registry, stdin, stdout) => result?,
                    () = shutdown_signal() => {}
                }
            }
            Transport::Http => {
                transport::http::serve(&self.config.listen, self.registry, shutdown_signal())
                    .await?;
            }
        }

        tracing::info!("MCP server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
