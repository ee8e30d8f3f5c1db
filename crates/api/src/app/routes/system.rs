use axum::extract::OriginalUri;
use axum::http::StatusCode;

use natours_core::OperationalError;

use crate::app::errors::AppError;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Fallback for any unmatched route or missing static file.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    OperationalError::not_found(format!("can't find {path} in this server!")).into()
}
