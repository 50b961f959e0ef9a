//! HTTP handlers. Each one is a thin adapter over `AnnotationService`.

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::error;

use super::AppState;
use super::types::{
    AnnotateRequest, AnnotatorsResponse, ApiError, HealthResponse, ListResponse, ModelsResponse,
};
use crate::annotation::AnnotationResponse;

/// Health check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn list_all(State(state): State<AppState>) -> Json<ListResponse> {
    Json(ListResponse {
        annotators: state.service.list_annotators(),
        models: state.service.list_models(),
    })
}

pub async fn list_annotators(State(state): State<AppState>) -> Json<AnnotatorsResponse> {
    Json(AnnotatorsResponse {
        annotators: state.service.list_annotators(),
    })
}

pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.service.list_models(),
    })
}

pub async fn annotate_post(
    State(state): State<AppState>,
    Json(request): Json<AnnotateRequest>,
) -> Result<Json<AnnotationResponse>, ApiError> {
    run_annotation(state, request).await
}

pub async fn annotate_get(
    State(state): State<AppState>,
    Query(request): Query<AnnotateRequest>,
) -> Result<Json<AnnotationResponse>, ApiError> {
    run_annotation(state, request).await
}

/// Runs the blocking pipeline off the async workers.
async fn run_annotation(
    state: AppState,
    request: AnnotateRequest,
) -> Result<Json<AnnotationResponse>, ApiError> {
    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || {
        service.annotate(
            &request.context,
            request.annotator.as_deref(),
            request.model.as_deref(),
        )
    })
    .await
    .map_err(|e| {
        error!(error = %e, "annotation task failed");
        ApiError::internal(e.to_string())
    })?;

    match result {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!(error = %e, "annotation request failed");
            Err(e.into())
        }
    }
}
