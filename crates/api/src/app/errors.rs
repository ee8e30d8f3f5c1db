//! Error pipeline: every error surfaced while handling a request ends here.
//!
//! Handlers and extractors return [`AppError`]. Its `IntoResponse` impl only
//! tags a placeholder response; [`error_pipeline`] (the outermost error layer)
//! takes the error back out and hands it to [`ErrorPipeline::handle`] exactly
//! once, which fills defaults, classifies (production only) and renders.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use natours_core::{classify, OperationalError, RawError, Status};
use natours_observability::FaultSink;

use crate::app::render;
use crate::config::Mode;

/// An error raised while handling a request, plus where it was raised.
#[derive(Debug, Clone, Error)]
#[error("{error}")]
pub struct AppError {
    error: RawError,
    stack: String,
}

impl AppError {
    pub fn new(error: RawError) -> Self {
        let stack = capture_stack(&error);
        Self { error, stack }
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    /// Fill in the status code (500) and status (`Error`) when the error
    /// does not carry its own.
    pub fn resolve(self) -> ResolvedError {
        ResolvedError {
            status_code: self.error.status_code().unwrap_or(500),
            status: self.error.status().unwrap_or(Status::Error),
            error: self.error,
            stack: self.stack,
        }
    }
}

impl From<RawError> for AppError {
    fn from(error: RawError) -> Self {
        Self::new(error)
    }
}

impl From<OperationalError> for AppError {
    fn from(error: OperationalError) -> Self {
        Self::new(RawError::Operational(error))
    }
}

/// `<name>: <message>`, followed by the captured backtrace when backtraces
/// are enabled (`RUST_BACKTRACE`).
fn capture_stack(error: &RawError) -> String {
    let header = format!("{}: {}", error.name(), error);
    let backtrace = Backtrace::capture();
    match backtrace.status() {
        BacktraceStatus::Captured => format!("{header}\n{backtrace}"),
        _ => header,
    }
}

/// An error with its status code and status guaranteed present.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedError {
    pub status_code: u16,
    pub status: Status,
    pub error: RawError,
    pub stack: String,
}

impl ResolvedError {
    fn from_operational(error: OperationalError, stack: String) -> Self {
        Self {
            status_code: error.status_code(),
            status: error.status(),
            error: RawError::Operational(error),
            stack,
        }
    }

    pub fn is_operational(&self) -> bool {
        self.error.is_operational()
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

/// Marker carried from [`AppError::into_response`] to [`error_pipeline`].
#[derive(Debug, Clone)]
struct PendingError(AppError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        res.extensions_mut().insert(PendingError(self));
        res
    }
}

/// Terminal error handler, configured once at startup.
#[derive(Clone)]
pub struct ErrorPipeline {
    mode: Mode,
    faults: Arc<dyn FaultSink>,
}

impl ErrorPipeline {
    pub fn new(mode: Mode, faults: Arc<dyn FaultSink>) -> Self {
        Self { mode, faults }
    }

    /// Turn an error into the final response for the request.
    pub fn handle(&self, err: AppError, method: &Method, uri: &Uri) -> Response {
        let resolved = err.resolve();
        tracing::debug!(
            %method,
            %uri,
            status_code = resolved.status_code,
            name = resolved.error.name(),
            "request failed"
        );

        match self.mode {
            Mode::Development => render::development(&resolved),
            Mode::Production => {
                let classified = match classify(&resolved.error) {
                    Some(op) => ResolvedError::from_operational(op, resolved.stack),
                    None => resolved,
                };
                render::production(&classified, self.faults.as_ref())
            }
        }
    }
}

/// Middleware routing every [`AppError`] response through the pipeline.
pub async fn error_pipeline(
    State(pipeline): State<ErrorPipeline>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    let mut res = next.run(req).await;
    match res.extensions_mut().remove::<PendingError>() {
        Some(PendingError(err)) => pipeline.handle(err, &method, &uri),
        None => res,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use natours_core::{FieldError, DUPLICATE_KEY_CODE};
    use natours_observability::MemoryFaultSink;
    use serde_json::{json, Value};

    fn pipeline(mode: Mode) -> (ErrorPipeline, Arc<MemoryFaultSink>) {
        let sink = Arc::new(MemoryFaultSink::new());
        (ErrorPipeline::new(mode, sink.clone()), sink)
    }

    async fn run(pipeline: &ErrorPipeline, err: impl Into<AppError>) -> (StatusCode, Value) {
        let uri: Uri = "/api/v1/tours".parse().unwrap();
        let res = pipeline.handle(err.into(), &Method::GET, &uri);
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn resolve_fills_defaults() {
        let resolved = AppError::from(RawError::fault("x is not defined")).resolve();
        assert_eq!(resolved.status_code, 500);
        assert_eq!(resolved.status, Status::Error);

        let resolved = AppError::from(OperationalError::not_found("gone")).resolve();
        assert_eq!(resolved.status_code, 404);
        assert_eq!(resolved.status, Status::Fail);

        let resolved = AppError::from(RawError::fault_with_status("bad json", 400)).resolve();
        assert_eq!(resolved.status_code, 400);
        assert_eq!(resolved.status, Status::Error);
    }

    #[test]
    fn stack_starts_with_name_and_message() {
        let err = AppError::from(RawError::cast("_id", "abc", "ObjectId"));
        assert!(err
            .stack()
            .starts_with("CastError: Cast to ObjectId failed for value \"abc\" at path \"_id\""));
    }

    #[tokio::test]
    async fn production_operational_error_shows_message() {
        let (p, sink) = pipeline(Mode::Production);
        let (status, body) = run(&p, OperationalError::not_found("can't find /x in this server!")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "status": "fail", "messsage": "can't find /x in this server!" }));
        assert!(sink.recorded().is_empty());
    }

    #[tokio::test]
    async fn production_classifies_cast_errors() {
        let (p, _) = pipeline(Mode::Production);
        let (status, body) = run(&p, RawError::cast("_id", "wwwww", "ObjectId")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "status": "fail", "messsage": "invalid _id: wwwww" }));
    }

    #[tokio::test]
    async fn production_classifies_duplicate_keys() {
        let (p, _) = pipeline(Mode::Production);
        let raw = RawError::store(
            DUPLICATE_KEY_CODE,
            r#"E11000 duplicate key error collection: natours.tours index: name_1 dup key: { name: "The Forest Hiker" }"#,
        );
        let (status, body) = run(&p, raw).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "status": "fail",
                "messsage": "Duplicate field value \"The Forest Hiker\". Try different value!"
            })
        );
    }

    #[tokio::test]
    async fn production_classifies_validation_errors() {
        let (p, _) = pipeline(Mode::Production);
        let raw = RawError::validation(
            "Tour",
            vec![
                FieldError::new("a", "required", "m1"),
                FieldError::new("b", "required", "m2"),
            ],
        );
        let (status, body) = run(&p, raw).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["messsage"], "Invalid input data! m1. m2");
    }

    #[tokio::test]
    async fn production_hides_unknown_faults_and_records_them() {
        let (p, sink) = pipeline(Mode::Production);
        for raw in [
            RawError::fault("secret internal detail"),
            RawError::fault_with_status("Unexpected token } in JSON", 400),
            RawError::store(13, "not authorized on admin"),
        ] {
            let (status, body) = run(&p, raw).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, json!({ "status": "Error", "message": "Something went very wrong!" }));
        }
        assert_eq!(sink.recorded().len(), 3);
        assert_eq!(sink.recorded()[0], RawError::fault("secret internal detail"));
    }

    #[tokio::test]
    async fn development_renders_raw_error_with_stack() {
        let (p, sink) = pipeline(Mode::Development);
        let err = AppError::from(RawError::cast("_id", "wwwww", "ObjectId"));
        let stack = err.stack().to_string();
        let (status, body) = run(&p, err).await;

        // No classification in development: defaults apply.
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "Error");
        assert_eq!(body["messsage"], "Cast to ObjectId failed for value \"wwwww\" at path \"_id\"");
        assert_eq!(body["stack"], stack);
        assert_eq!(body["error"]["name"], "CastError");
        assert_eq!(body["error"]["path"], "_id");
        assert_eq!(body["error"]["statusCode"], 500);
        assert!(sink.recorded().is_empty());
    }

    #[tokio::test]
    async fn development_shows_faults_verbatim() {
        let (p, _) = pipeline(Mode::Development);
        let (status, body) = run(&p, RawError::fault_with_status("Unexpected end of JSON input", 400)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["messsage"], "Unexpected end of JSON input");
        assert!(body["stack"].as_str().unwrap().starts_with("Error: Unexpected end of JSON input"));
    }

    #[tokio::test]
    async fn development_operational_error_keeps_its_status() {
        let (p, _) = pipeline(Mode::Development);
        let (status, body) = run(&p, OperationalError::not_found("No tour found with that ID")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "fail");
        assert_eq!(body["error"]["isOperational"], true);
        assert!(body["stack"].as_str().unwrap().starts_with("Error: No tour found with that ID"));
    }
}
