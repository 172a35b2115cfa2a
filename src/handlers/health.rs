use crate::core::error::FailureDetail;
use crate::core::state::AppState;
use crate::utils::time::rfc3339_now;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

pub const HEALTH_PATH: &str = "/health";
pub const STATUS_OK: &str = "OK";
pub const STATUS_ERROR: &str = "ERROR";
pub const DATABASE_OK_MESSAGE: &str = "Connexion réussie";
pub const DATABASE_UNAVAILABLE_MESSAGE: &str = "Base de données indisponible";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub services: ServicesStatus,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServicesStatus {
    pub api: String,
    pub database: DatabaseStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseStatus {
    pub status: String,
    pub message: String,
}

/// Health check handler
///
/// GET /health
///
/// 200 when the store answers a ping, 503 otherwise. The ping error is logged
/// but never returned.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Response {
    let version = &state.config.app.version;

    match state.store.ping().await {
        Ok(()) => {
            info!(status = STATUS_OK, http_status = 200, "Health check completed");
            report(StatusCode::OK, STATUS_OK, DATABASE_OK_MESSAGE, version)
        }
        Err(e) => {
            error!(error = %e, "Database health check failed");
            unavailable_response(version, e.to_string())
        }
    }
}

/// 503 health report. `detail` goes to the outcome log only.
pub fn unavailable_response(version: &str, detail: String) -> Response {
    let mut response = report(
        StatusCode::SERVICE_UNAVAILABLE,
        STATUS_ERROR,
        DATABASE_UNAVAILABLE_MESSAGE,
        version,
    );
    response.extensions_mut().insert(FailureDetail {
        message: DATABASE_UNAVAILABLE_MESSAGE.to_string(),
        detail: Some(detail),
    });
    response
}

fn report(status_code: StatusCode, db_status: &str, db_message: &str, version: &str) -> Response {
    (
        status_code,
        Json(HealthResponse {
            status: db_status.to_string(),
            timestamp: rfc3339_now(),
            services: ServicesStatus {
                api: STATUS_OK.to_string(),
                database: DatabaseStatus {
                    status: db_status.to_string(),
                    message: db_message.to_string(),
                },
            },
            version: version.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::test_support::create_test_state;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_health(response: Response) -> (StatusCode, HealthResponse, String) {
        let (parts, body) = response.into_parts();
        let body = Body::new(body);
        let bytes = body.collect().await.unwrap().to_bytes();
        let raw = String::from_utf8(bytes.to_vec()).unwrap();
        let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
        (parts.status, health, raw)
    }

    #[tokio::test]
    async fn test_health_ok_when_store_reachable() {
        let (state, _store) = create_test_state();

        let response = health_handler(State(state)).await;
        let (status, health, _) = read_health(response).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(health.status, "OK");
        assert_eq!(health.services.api, "OK");
        assert_eq!(health.services.database.status, "OK");
        assert_eq!(health.services.database.message, DATABASE_OK_MESSAGE);
        assert_eq!(health.version, "9.9.9-test");
        assert!(chrono::DateTime::parse_from_rfc3339(&health.timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_health_error_when_store_unreachable() {
        let (state, store) = create_test_state();
        store.set_reachable(false);

        let response = health_handler(State(state)).await;
        let (status, health, raw) = read_health(response).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(health.status, "ERROR");
        assert_eq!(health.services.api, "OK");
        assert_eq!(health.services.database.status, "ERROR");
        assert_eq!(health.services.database.message, DATABASE_UNAVAILABLE_MESSAGE);
        assert!(!raw.contains("ECONNREFUSED"));
    }

    #[tokio::test]
    async fn test_unavailable_keeps_cause_for_the_log_only() {
        let (state, store) = create_test_state();
        store.set_reachable(false);

        let response = health_handler(State(state)).await;
        let failure = response.extensions().get::<FailureDetail>().cloned().unwrap();
        assert_eq!(failure.message, DATABASE_UNAVAILABLE_MESSAGE);
        assert!(failure.detail.unwrap().contains("ECONNREFUSED"));

        let (_, health, raw) = read_health(response).await;
        assert_eq!(health.version, "9.9.9-test");
        assert!(!raw.contains("ECONNREFUSED"));
    }

    #[tokio::test]
    async fn test_health_recovers_when_store_returns() {
        let (state, store) = create_test_state();

        store.set_reachable(false);
        let response = health_handler(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        store.set_reachable(true);
        let response = health_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
