use axum::{extract::rejection::JsonRejection, extract::State, Json};
use ns_core::{HealthStatus, ServiceInfo, SummarizeRequest, SummarizeResponse};
use std::sync::Arc;

use crate::error::{ApiError, ErrorBody};
use crate::AppState;

/// Static service descriptor
#[utoipa::path(get, path = "/", responses((status = 200, body = ServiceInfo)))]
pub async fn root(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(state.info.clone())
}

/// Service and model readiness
#[utoipa::path(get, path = "/health", responses((status = 200, body = HealthStatus)))]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(state.service.health_check())
}

/// Summarize a Russian news text
#[utoipa::path(
    post,
    path = "/summarize",
    request_body = SummarizeRequest,
    responses(
        (status = 200, body = SummarizeResponse),
        (status = 422, description = "Text or max_length out of range", body = ErrorBody),
        (status = 500, description = "Inference failed", body = ErrorBody),
        (status = 503, description = "Model not loaded", body = ErrorBody),
    )
)]
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let Json(request) = payload?;
    let response = state.service.summarize(&request).await?;
    Ok(Json(response))
}
