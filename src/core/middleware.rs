//! Outcome logging around every handler

use crate::core::error::{ApiError, FailureDetail, INTERNAL_ERROR_MESSAGE};
use crate::core::state::AppState;
use crate::handlers::health::{self, HEALTH_PATH};
use crate::models::response::ApiResponse;
use axum::{
    extract::{MatchedPath, Request},
    http::{StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Json, Response},
    BoxError,
};
use std::any::Any;
use std::time::Instant;
use tower::timeout::error::Elapsed;
use tracing::{error, info, warn};

/// Log entry and outcome of a request
///
/// Entry is logged at INFO. Completion is INFO for success, WARN for 4xx and
/// ERROR for 5xx, with the failure message and internal detail that the error
/// response carried in its extensions.
pub async fn log_outcome(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    info!(method = %method, endpoint = %endpoint, uri = %uri, "Request received");

    let response = next.run(req).await;

    let status = response.status();
    let latency_ms = start.elapsed().as_millis() as u64;
    let failure = response.extensions().get::<FailureDetail>();
    let message = failure.map(|f| f.message.as_str()).unwrap_or("");
    let detail = failure.and_then(|f| f.detail.as_deref()).unwrap_or("");

    if status.is_server_error() {
        error!(
            method = %method,
            endpoint = %endpoint,
            uri = %uri,
            status = status.as_u16(),
            latency_ms,
            error = %detail,
            "Request failed"
        );
    } else if status.is_client_error() {
        warn!(
            method = %method,
            endpoint = %endpoint,
            uri = %uri,
            status = status.as_u16(),
            latency_ms,
            error = %message,
            "Request rejected"
        );
    } else {
        info!(
            method = %method,
            endpoint = %endpoint,
            status = status.as_u16(),
            latency_ms,
            "Request completed"
        );
    }

    response
}

/// Turn a handler panic into the generic 500 envelope
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(INTERNAL_ERROR_MESSAGE)),
    )
        .into_response();
    response.extensions_mut().insert(FailureDetail {
        message: INTERNAL_ERROR_MESSAGE.to_string(),
        detail: Some(format!("handler panicked: {}", detail)),
    });
    response
}

/// Turn an error raised by the service stack into a response
///
/// The only such error in practice is the request deadline. API routes get
/// the generic 500 envelope; `/health` keeps its report shape with a 503.
pub fn service_error_response(state: &AppState, uri: &Uri, err: BoxError) -> Response {
    let detail = if err.is::<Elapsed>() {
        format!(
            "request timed out after {}s",
            state.config.server.request_timeout_secs
        )
    } else {
        format!("unhandled service error: {}", err)
    };

    if uri.path() == HEALTH_PATH {
        health::unavailable_response(&state.config.app.version, detail)
    } else {
        ApiError::Internal(detail).into_response()
    }
}
