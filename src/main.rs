/// MCP Server Entry Point
///
/// Resolves configuration from `mcpdemo.yaml` (or `MCP_CONFIG`) and the
/// environment, then starts the selected transport.
///
/// Environment Variables:
/// - MCP_PROFILE: "directory", "math", "weather", "minimal" or "all" (default: "directory")
/// - SERVER_NAME / SERVER_VERSION: identity reported to clients
/// - TRANSPORT: "stdio", "http", "streamable-http" or "both" (default depends on profile)
/// - HOST: Bind address for HTTP mode (default: "0.0.0.0")
/// - PORT: Port number for HTTP mode (default: 8000, 8001 for weather)
/// - WORKER_THREADS: HTTP worker count
/// - RUST_LOG: log filter (logs always go to stderr)

use mcpdemo::core::{config::Config, error::ServerError, logging, server};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    dotenvy::dotenv().ok();
    logging::init_logging("info");

    let config = Config::load().inspect_err(|e| tracing::error!(error = %e, "invalid configuration"))?;
    if let Some(path) = &config.source {
        tracing::info!(path = %path.display(), "loaded config file");
    }

    server::run(config).await
}
