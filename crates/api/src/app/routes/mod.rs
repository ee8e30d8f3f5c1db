use axum::Router;

pub mod system;
pub mod tours;
pub mod users;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .nest("/v1/tours", tours::router())
        .nest("/v1/users", users::router())
        .fallback(system::not_found)
}
