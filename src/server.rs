//! HTTP API over the annotation service.
//!
//! Routes:
//! - `GET /` health check
//! - `GET /list`, `GET /annotators`, `GET /models`
//! - `POST /annotate` (JSON body) and `GET /annotate` (query string)

mod handlers;
mod routes;
mod types;

pub use routes::create_router;
pub use types::{
    AnnotateRequest, AnnotatorsResponse, ApiError, HealthResponse, ListResponse, ModelsResponse,
};

use std::net::SocketAddr;

use crate::service::AnnotationService;

/// Shared state for the HTTP API.
#[derive(Clone)]
pub struct AppState {
    pub service: AnnotationService,
}

impl AppState {
    pub fn new(service: AnnotationService) -> Self {
        Self { service }
    }
}

/// Start the HTTP API and run until Ctrl-C.
pub async fn serve(service: AnnotationService, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(AppState::new(service));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting server at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
