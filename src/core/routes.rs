// HTTP routes configuration

use crate::core::middleware::{log_outcome, panic_response, service_error_response};
use crate::core::state::AppState;
use crate::handlers::health::{self, HEALTH_PATH};
use crate::handlers::{fallback, users};
use axum::{
    error_handling::HandleErrorLayer, http::Uri, middleware, routing::get, BoxError, Router,
};
use std::sync::Arc;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub fn build_router(state: Arc<AppState>) -> Router {
    let request_timeout = state.config.server.request_timeout();
    let error_state = state.clone();

    Router::new()
        .route(
            "/api/users",
            get(users::list_users_handler).post(users::create_user_handler),
        )
        .route(
            "/api/users/{id}",
            get(users::get_user_handler)
                .put(users::update_user_handler)
                .delete(users::delete_user_handler),
        )
        .route(HEALTH_PATH, get(health::health_handler))

        // 404 fallback for all unmatched routes and methods
        .fallback(fallback::fallback_handler)
        .method_not_allowed_fallback(fallback::fallback_handler)

        // Innermost first: panics and timeouts become responses the
        // outcome logger can see
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(move |uri: Uri, err: BoxError| {
                    let state = error_state.clone();
                    async move { service_error_response(&state, &uri, err) }
                }))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(middleware::from_fn(log_outcome))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .with_state(state)
}
