//! HTTP API for the Trusty Wallet service
//!
//! Provides:
//! - Wallet and validator endpoints (balance, staking, fines, rewards, validation)
//! - JSON success and error envelopes
//! - Request guards (auth, rate limiting, body size, headers, logging)

pub mod middleware;
pub mod response;
pub mod wallet;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

pub use middleware::{
    GuardConfig, GuardState, RateDecision, RateLimiter, auth_middleware, body_size_middleware,
    logging_middleware, mask_for_log, rate_limit_middleware, security_headers_middleware,
};
pub use response::{ApiError, internal_error_body, require_amount};
pub use wallet::{WalletApiState, create_router as create_wallet_router};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "success": true }))
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("Request handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(internal_error_body())).into_response()
}

/// Full application: wallet routes under `base_path`, `/health`, and the guard
/// layers. Must be served with `ConnectInfo<SocketAddr>`.
pub fn create_app(base_path: &str, wallet_state: WalletApiState, guards: GuardState) -> Router {
    Router::new()
        .nest(base_path, create_wallet_router(wallet_state))
        .route("/health", get(health))
        // Innermost first
        .layer(axum::middleware::from_fn_with_state(
            guards.clone(),
            body_size_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            guards.clone(),
            auth_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            guards.clone(),
            rate_limit_middleware,
        ))
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn_with_state(
            guards,
            logging_middleware,
        ))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}
