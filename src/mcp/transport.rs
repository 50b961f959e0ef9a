//! Transports for the MCP server.
//!
//! - stdio: newline-delimited JSON on stdin/stdout. Nothing else may be
//!   written to stdout; logs go to stderr.
//! - HTTP: JSON-RPC bodies posted to a single path.

use std::io::{BufRead, Write};
use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use super::handler::McpHandler;
use super::protocol::{JsonRpcResponse, error_codes};

/// Serves requests read line by line from `reader`, writing replies to `writer`.
///
/// Returns when `reader` reaches EOF.
pub fn run_stdio<R: BufRead, W: Write>(handler: &McpHandler, reader: R, mut writer: W) -> Result<()> {
    info!("MCP server listening on stdio");

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!("Received: {}", trimmed);
        let Some(response) = handler.handle_line(trimmed) else {
            debug!("Notification handled, no response needed");
            continue;
        };

        let response_json = serde_json::to_string(&response)?;
        debug!("Sending: {}", response_json);
        writer.write_all(response_json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    info!("stdin closed (EOF), shutting down");
    Ok(())
}

/// Builds the router for the HTTP transport, mounted at `path`.
pub fn create_mcp_router(handler: McpHandler, path: &str) -> Router {
    Router::new()
        .route(path, post(handle_http))
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

async fn handle_http(State(handler): State<McpHandler>, body: Bytes) -> Response {
    let input = match String::from_utf8(body.to_vec()) {
        Ok(s) => s,
        Err(e) => {
            let resp = JsonRpcResponse::error(None, error_codes::PARSE_ERROR, e.to_string());
            return (StatusCode::OK, Json(resp)).into_response();
        }
    };

    let reply = tokio::task::spawn_blocking(move || handler.handle_line(&input)).await;
    match reply {
        Ok(Some(response)) => Json(response).into_response(),
        Ok(None) => StatusCode::ACCEPTED.into_response(),
        Err(e) => {
            error!(error = %e, "MCP request task failed");
            let resp = JsonRpcResponse::error(None, error_codes::INTERNAL_ERROR, e.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(resp)).into_response()
        }
    }
}

/// Runs the HTTP transport until Ctrl-C.
pub async fn serve_http(handler: McpHandler, host: &str, port: u16, path: &str) -> Result<()> {
    let app = create_mcp_router(handler, path);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting MCP server at http://{}{}", addr, path);

    axum::serve(listener, app)
        .with_graceful_shutdown(crate::server::shutdown_signal())
        .await?;

    Ok(())
}
