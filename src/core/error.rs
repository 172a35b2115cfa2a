// Centralized error handling for the user service

use crate::models::response::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

pub const INTERNAL_ERROR_MESSAGE: &str = "Erreur interne du serveur";
pub const NOT_FOUND_MESSAGE: &str = "Utilisateur non trouvé";
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Route non trouvée";
pub const INVALID_BODY_MESSAGE: &str = "Corps de requête JSON invalide";

/// Field rule violations, in the order the validator checks them
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Les champs fullname, study_level et age sont requis")]
    MissingFields,

    #[error("Le champ fullname doit être une chaîne non vide")]
    InvalidFullname,

    #[error("Le champ study_level doit être une chaîne non vide")]
    InvalidStudyLevel,

    #[error("Le champ age doit être un nombre entier positif")]
    InvalidAge,

    #[error("L'âge doit être inférieur à 150 ans")]
    AgeOutOfRange,
}

/// Failures of the relational store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to obtain a database connection: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Database query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Database liveness check failed: {0}")]
    Liveness(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Connection(err),
            other => StoreError::Query(other),
        }
    }
}

/// Errors surfaced by request handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure detail attached to error responses for the logging middleware.
///
/// `message` is what the client saw; `detail` is the internal cause and
/// never leaves the process.
#[derive(Debug, Clone)]
pub struct FailureDetail {
    pub message: String,
    pub detail: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to send to the client
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Validation(e) => e.to_string(),
            ApiError::InvalidBody(_) => INVALID_BODY_MESSAGE.to_string(),
            ApiError::NotFound(_) => NOT_FOUND_MESSAGE.to_string(),
            ApiError::Store(_) | ApiError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.public_message();

        let detail = match &self {
            ApiError::Validation(_) => None,
            other => Some(other.to_string()),
        };

        let mut response = (status, Json(ApiResponse::<()>::error(message.clone()))).into_response();
        response
            .extensions_mut()
            .insert(FailureDetail { message, detail });
        response
    }
}

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Database unreachable after {attempts} attempts: {last_error}")]
    Unreachable { attempts: u32, last_error: String },

    #[error("Schema operation failed: {0}")]
    Schema(#[from] StoreError),

    #[error("Table '{0}' missing after creation")]
    VerificationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = Body::new(response.into_body());
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_is_bad_request_with_reason() {
        let response = ApiError::from(ValidationError::AgeOutOfRange).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "L'âge doit être inférieur à 150 ans");
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let response = ApiError::NotFound("abc".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["error"], NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn test_store_error_does_not_leak_detail() {
        let err = ApiError::Store(StoreError::Liveness("connect ECONNREFUSED 10.0.0.5:3306".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let detail = response.extensions().get::<FailureDetail>().cloned().unwrap();
        assert!(detail.detail.unwrap().contains("ECONNREFUSED"));

        let json = body_json(response).await;
        assert_eq!(json["error"], INTERNAL_ERROR_MESSAGE);
        assert!(!json.to_string().contains("ECONNREFUSED"));
    }

    #[test]
    fn test_pool_timeout_classified_as_connection_error() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Connection(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Query(_)
        ));
    }
}
