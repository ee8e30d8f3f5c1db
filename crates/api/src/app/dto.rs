use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, Request,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use natours_core::{FieldError, OperationalError, RawError};

use crate::app::errors::AppError;
use crate::context::RequestTime;
use crate::sanitize;

// -------------------------
// Request DTOs
// -------------------------

/// JSON body, sanitized before it is deserialized into `T`.
///
/// Unreadable bodies (bad syntax, wrong content type, over the size limit)
/// become non-operational faults carrying the parser's status code; bodies
/// whose shape does not fit `T` become validation failures.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(json_rejection)?;

        serde_json::from_value(sanitize::clean(value))
            .map(JsonBody)
            .map_err(|e| {
                RawError::validation(
                    "Request body",
                    vec![FieldError::new("body", "cast", format!("Invalid request body: {e}"))],
                )
                .into()
            })
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    RawError::fault_with_status(rejection.body_text(), rejection.status().as_u16()).into()
}

/// Query-string rejections are operational: the client sent a bad parameter.
pub fn query_rejection(rejection: QueryRejection) -> AppError {
    OperationalError::bad_request(rejection.body_text()).into()
}

/// Path segments that cannot be decoded are not operational: they never
/// reach a handler, so they surface like a body-parser failure.
pub fn path_rejection(rejection: PathRejection) -> AppError {
    RawError::fault_with_status(rejection.body_text(), rejection.status().as_u16()).into()
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub difficulty: Option<String>,
    pub role: Option<String>,
}

impl ListQuery {
    const DEFAULT_LIMIT: usize = 100;

    /// Slice `items` to the requested page (1-based, default limit 100).
    ///
    /// Asking for a page past the end is a 404.
    pub fn paginate<T>(&self, items: Vec<T>) -> Result<Vec<T>, OperationalError> {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.filter(|l| *l > 0).unwrap_or(Self::DEFAULT_LIMIT);
        let skip = (page - 1).saturating_mul(limit);

        if page > 1 && skip >= items.len() {
            return Err(OperationalError::not_found("This page does not exist"));
        }

        Ok(items.into_iter().skip(skip).take(limit).collect())
    }
}

// -------------------------
// Response helpers
// -------------------------

/// `{ "status": "success", "data": { <key>: <value> } }`
pub fn success<T: Serialize>(status: StatusCode, key: &str, value: T) -> Response {
    (
        status,
        Json(json!({
            "status": "success",
            "data": { key: value },
        })),
    )
        .into_response()
}

/// `{ "status": "success", "requestedAt", "results", "data": { <key>: [..] } }`
pub fn success_list<T: Serialize>(requested_at: RequestTime, key: &str, items: Vec<T>) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "requestedAt": requested_at.to_rfc3339(),
            "results": items.len(),
            "data": { key: items },
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginates_with_defaults() {
        let query = ListQuery::default();
        assert_eq!(query.paginate((1..=5).collect()).unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn paginates_pages() {
        let query = ListQuery {
            page: Some(2),
            limit: Some(2),
            ..ListQuery::default()
        };
        assert_eq!(query.paginate((1..=5).collect()).unwrap(), vec![3, 4]);
    }

    #[test]
    fn page_past_the_end_is_not_found() {
        let query = ListQuery {
            page: Some(4),
            limit: Some(2),
            ..ListQuery::default()
        };
        let err = query.paginate((1..=5).collect::<Vec<i32>>()).unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "This page does not exist");
    }

    #[test]
    fn first_page_of_empty_collection_is_empty() {
        let query = ListQuery::default();
        assert!(query.paginate(Vec::<i32>::new()).unwrap().is_empty());
    }
}
