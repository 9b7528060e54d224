//! Route table and middleware stack

use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer, http::StatusCode, middleware, routing::get, BoxError,
    Router,
};
use serde_json::{json, Value};
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{error, warn};

use super::auth;
use super::middleware::{logging_middleware, require_session};
use super::profile;
use super::state::AppState;
use super::types::{ApiError, ApiErrorType, Json};

/// Directory holding the static API description served under `/swagger`
pub const DOCS_DIR: &str = "docs";

/// Create the full router with application state
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let protected = profile::create_profile_router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_session,
    ));

    let router = Router::new()
        .route("/", get(hello))
        .nest("/api/auth", auth::create_auth_router())
        .nest("/api", protected)
        .nest_service(
            "/swagger",
            ServeDir::new(DOCS_DIR).fallback(ServeFile::new(format!("{}/index.html", DOCS_DIR))),
        )
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware));

    with_request_timeout(router, request_timeout).layer(TraceLayer::new_for_http())
}

/// Cancel requests that run past `timeout`, answering in the error envelope
fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_middleware_error))
            .layer(TimeoutLayer::new(timeout)),
    )
}

async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        warn!("Request timed out");
        ApiError::new(
            StatusCode::REQUEST_TIMEOUT,
            ApiErrorType::TimeoutError,
            "request timed out",
        )
        .with_code("request_timeout")
    } else {
        error!(error = %err, "Unhandled middleware error");
        ApiError::internal("internal server error")
    }
}

async fn hello() -> Json<Value> {
    Json(json!({ "message": "hello world" }))
}
