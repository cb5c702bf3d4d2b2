use std::process::ExitCode;

use citycatalyst_mcp_server::config::ServerConfig;
use citycatalyst_mcp_server::observability::init_tracing;
use citycatalyst_mcp_server::server::McpServer;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match ServerConfig::from_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("citycatalyst-mcp-server: configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let server = match McpServer::new(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("citycatalyst-mcp-server: startup error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run().await {
        eprintln!("citycatalyst-mcp-server: fatal error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
