//! Error response bodies, per mode.
//!
//! The `messsage` key is part of the public response contract and is spelled
//! that way on purpose; only the generic production body uses `message`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use natours_core::Status;
use natours_observability::FaultSink;

use crate::app::errors::ResolvedError;

pub const GENERIC_MESSAGE: &str = "Something went very wrong!";

#[derive(Debug, Serialize)]
struct DevelopmentBody<'a> {
    status: Status,
    error: Map<String, Value>,
    messsage: String,
    stack: &'a str,
}

#[derive(Debug, Serialize)]
struct OperationalBody {
    status: Status,
    messsage: String,
}

#[derive(Debug, Serialize)]
struct GenericBody {
    status: Status,
    message: &'static str,
}

/// Everything: the serialized error object, its message and stack.
pub fn development(err: &ResolvedError) -> Response {
    let mut error = err.error.details();
    error.insert("name".into(), json!(err.error.name()));
    error.insert("statusCode".into(), json!(err.status_code));
    error.insert("status".into(), json!(err.status));

    let body = DevelopmentBody {
        status: err.status,
        error,
        messsage: err.message(),
        stack: &err.stack,
    };
    (status_line(err.status_code), Json(body)).into_response()
}

/// Operational errors show their message; anything else is recorded through
/// `faults` and replaced by a generic 500.
pub fn production(err: &ResolvedError, faults: &dyn FaultSink) -> Response {
    if err.is_operational() {
        let body = OperationalBody {
            status: err.status,
            messsage: err.message(),
        };
        return (status_line(err.status_code), Json(body)).into_response();
    }

    faults.record(&err.error, &err.stack);
    let body = GenericBody {
        status: Status::Error,
        message: GENERIC_MESSAGE,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Codes outside 100..=999 cannot go on a status line; they become 500.
fn status_line(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use natours_core::{OperationalError, RawError};
    use natours_observability::MemoryFaultSink;

    fn resolved(error: RawError, status_code: u16, status: Status) -> ResolvedError {
        ResolvedError {
            status_code,
            status,
            error,
            stack: "Error: test".to_string(),
        }
    }

    async fn body_of(res: Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn production_forces_500_for_non_operational_regardless_of_status() {
        let sink = MemoryFaultSink::new();
        let err = resolved(RawError::fault_with_status("teapot", 418), 418, Status::Fail);
        let res = production(&err, &sink);
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_of(res).await,
            json!({ "status": "Error", "message": "Something went very wrong!" })
        );
        assert_eq!(sink.recorded(), vec![RawError::fault_with_status("teapot", 418)]);
    }

    #[tokio::test]
    async fn production_operational_body_has_only_status_and_message() {
        let sink = MemoryFaultSink::new();
        let err = resolved(
            OperationalError::bad_request("invalid _id: x").into(),
            400,
            Status::Fail,
        );
        let res = production(&err, &sink);
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_of(res).await,
            json!({ "status": "fail", "messsage": "invalid _id: x" })
        );
    }

    #[tokio::test]
    async fn development_body_includes_error_object_and_stack() {
        let err = resolved(RawError::fault("boom"), 500, Status::Error);
        let res = development(&err);
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_of(res).await,
            json!({
                "status": "Error",
                "error": { "name": "Error", "statusCode": 500, "status": "Error" },
                "messsage": "boom",
                "stack": "Error: test"
            })
        );
    }

    #[test]
    fn out_of_range_status_codes_become_500() {
        assert_eq!(status_line(42), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_line(404), StatusCode::NOT_FOUND);
    }
}
