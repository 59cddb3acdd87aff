/// MCP Server Transports
///
/// This module wires an `McpService` to its transports:
/// - HTTP server setup with Actix Web (POST /mcp, health and metrics routes)
/// - STDIO server reading line-delimited JSON-RPC from stdin
/// - `run`, which starts whichever transports the configuration selects

use actix_web::{
    App, HttpResponse, HttpServer, Result,
    middleware::{Compress, DefaultHeaders, Logger},
    web,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use crate::core::config::{Config, Transport};
use crate::core::error::ServerError;
use crate::core::protocol::{McpService, ServerInfo, parse_error};
use crate::tools;

/// Largest accepted HTTP request body. `write_file` content travels inline.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build the service for a configuration: server identity plus the
/// profile's tool registry.
pub fn build_service(config: &Config) -> Arc<McpService> {
    let info = ServerInfo {
        name: config.name.clone(),
        version: config.version.clone(),
    };
    Arc::new(McpService::new(info, tools::registry_for(config)))
}

/// Start the transports selected by `config.transport`.
///
/// In `both` mode STDIO runs in a background task and HTTP in the
/// foreground; when the HTTP server exits the STDIO task is aborted.
pub async fn run(config: Config) -> Result<(), ServerError> {
    let service = build_service(&config);

    tracing::info!(
        name = %config.name,
        version = %config.version,
        profile = %config.profile,
        transport = %config.transport,
        tools = ?service.registry().names(),
        "MCP server starting"
    );

    match config.transport {
        Transport::Stdio => run_server_stdio(service).await?,
        Transport::Http => run_server_http(service, &config).await?,
        Transport::Both => {
            let stdio_service = Arc::clone(&service);
            let stdio_handle = tokio::spawn(async move {
                if let Err(e) = run_server_stdio(stdio_service).await {
                    tracing::error!(error = %e, "STDIO server error");
                }
            });

            let http_result = run_server_http(service, &config).await;
            stdio_handle.abort();
            http_result?;
        }
    }
    Ok(())
}

/// Health check endpoint handler.
async fn health(service: web::Data<McpService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": service.info().name
    })))
}

/// Metrics endpoint: total JSON-RPC messages processed since start.
async fn metrics_handler(service: web::Data<McpService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "requests_total": service.requests_total(),
        "status": "ok"
    })))
}

/// MCP JSON-RPC request handler.
///
/// Tool calls touch the filesystem, so processing runs on the blocking
/// thread pool. Notifications are acknowledged with 202 and no body.
async fn mcp_handler(service: web::Data<McpService>, body: String) -> Result<HttpResponse> {
    let service = service.into_inner();
    let response = web::block(move || service.handle_message(&body)).await?;

    Ok(match response {
        Some(response) => HttpResponse::Ok().json(response),
        None => HttpResponse::Accepted().finish(),
    })
}

/// Register all HTTP routes and the body size limit. Shared by the server
/// and the route tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        .route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics_handler))
        .route("/mcp", web::post().to(mcp_handler))
        .route("/", web::post().to(mcp_handler))
        .route("/", web::get().to(health));
}

/// Run the MCP server in HTTP mode.
///
/// The server is configured with:
/// - Worker threads: from configuration (CPU count capped at 16 by default)
/// - Max connections: 10,000 concurrent connections
/// - Connection rate limit: 1,000 connections per second
/// - Keep-alive and request timeout: 30 seconds
/// - Shutdown timeout: 10 seconds
pub async fn run_server_http(service: Arc<McpService>, config: &Config) -> std::io::Result<()> {
    let bind_addr = config.bind_addr();
    let data = web::Data::from(service);

    tracing::info!(
        bind = %bind_addr,
        workers = config.workers,
        "HTTP transport listening"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY")),
            )
            // %r = request line, %s = status, %D = duration in milliseconds
            .wrap(Logger::new("%r %s %Dms"))
            .configure(configure_routes)
    })
    .workers(config.workers)
    .max_connections(10000)
    .max_connection_rate(1000)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await
}

/// Run the MCP server in STDIO mode until stdin closes.
pub async fn run_server_stdio(service: Arc<McpService>) -> std::io::Result<()> {
    tracing::info!("STDIO transport ready");

    let stdin = BufReader::with_capacity(8192, tokio::io::stdin());
    let stdout = BufWriter::with_capacity(8192, tokio::io::stdout());
    serve_lines(&service, stdin, stdout).await
}

/// Line-delimited JSON-RPC loop.
///
/// Reads one request per line, writes one response per line, and flushes
/// after each response. Blank lines and notifications produce no output.
/// A line that is not valid UTF-8 is answered with a parse error and the
/// loop carries on.
pub async fn serve_lines<R, W>(service: &McpService, mut reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::with_capacity(8192);

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => service.handle_message(line.trim_end_matches(['\r', '\n'])),
            Err(e) => {
                tracing::warn!(error = %e, "non UTF-8 input on stdin");
                Some(parse_error(&e))
            }
        };
        let Some(response) = response else {
            continue;
        };

        let response_json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response");
                continue;
            }
        };

        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}
