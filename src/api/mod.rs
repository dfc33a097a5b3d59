pub mod error;
pub mod forecast;
pub mod health;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{config::Config, controller::AppState};

/// Requests running past `secs` are answered with 408 Request Timeout
pub fn timeout_layer(secs: u64) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(secs))
}

pub fn router(state: AppState, cfg: &Config) -> Router {
    let api = Router::new()
        .route("/upload_csv", post(forecast::upload_csv))
        .route("/tick", post(forecast::tick))
        .route("/predict", post(forecast::predict))
        .route("/models", get(health::models));

    let mut router = Router::new()
        .route("/healthz", get(health::healthz))
        .nest("/api", api)
        .with_state(state);

    if cfg.server.enable_cors {
        use tower_http::cors::Any;
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE]);
        router = router.layer(cors);
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(axum::extract::DefaultBodyLimit::max(cfg.server.max_upload_bytes))
                .layer(timeout_layer(cfg.server.request_timeout_secs)),
        )
        .layer(TraceLayer::new_for_http())
}
