//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: storage wiring (tour and user collections)
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request extractors and JSON response helpers
//! - `errors.rs`: the error pipeline every failed request goes through
//! - `render.rs`: error response bodies per mode

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Extension, Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use natours_observability::{FaultSink, TracingFaultSink};

use crate::config::{AppConfig, Mode};
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod render;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &AppConfig) -> Router {
    build_app_with_faults(config, Arc::new(TracingFaultSink))
}

/// Same as [`build_app`], recording production faults into `faults`.
pub fn build_app_with_faults(config: &AppConfig, faults: Arc<dyn FaultSink>) -> Router {
    let services = Arc::new(services::build_services());
    let pipeline = errors::ErrorPipeline::new(config.mode, faults);
    let limiter = middleware::RateLimitState::new(&config.rate_limit);

    let api = routes::router().layer(from_fn_with_state(limiter, middleware::rate_limit));

    // Anything that is neither a route nor a file under `public_dir` is a 404.
    let statics = ServeDir::new(&config.public_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(routes::system::not_found.into_service());

    let mut app = Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", api)
        .fallback_service(statics)
        .layer(Extension(services))
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(from_fn(middleware::stamp_request_time))
        .layer(from_fn_with_state(pipeline, errors::error_pipeline));

    if config.mode == Mode::Development {
        app = app.layer(TraceLayer::new_for_http());
    }

    tracing::info!(mode = config.mode.as_str(), "application built");
    middleware::with_security_headers(app)
}
