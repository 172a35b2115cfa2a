use crate::core::error::{FailureDetail, ROUTE_NOT_FOUND_MESSAGE};
use crate::models::response::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

/// 404 for any unmatched route or method
pub async fn fallback_handler() -> Response {
    let mut response = (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error(ROUTE_NOT_FOUND_MESSAGE)),
    )
        .into_response();
    response.extensions_mut().insert(FailureDetail {
        message: ROUTE_NOT_FOUND_MESSAGE.to_string(),
        detail: None,
    });
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_fallback_envelope() {
        let response = fallback_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = Body::new(response.into_body());
        let bytes = body.collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Route non trouvée");
    }
}
