use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;

use natours_core::{OperationalError, UserId};
use natours_users::{Role, User, UserInput};

use crate::app::dto::{self, JsonBody, ListQuery};
use crate::app::errors::AppError;
use crate::app::routes::system;
use crate::app::services::AppServices;
use crate::context::RequestTime;

const NOT_FOUND: &str = "No user found with that ID";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user).fallback(system::not_found))
        .route(
            "/:id",
            get(get_user)
                .patch(update_user)
                .delete(delete_user)
                .fallback(system::not_found),
        )
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requested_at): Extension<RequestTime>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query.map_err(dto::query_rejection)?;

    let role = match query.role.as_deref() {
        None => None,
        Some(raw) => Some(
            Role::parse(raw)
                .ok_or_else(|| OperationalError::bad_request(format!("invalid role: {raw}")))?,
        ),
    };

    let users: Vec<User> = services
        .users
        .list()?
        .into_iter()
        .filter(|u| role.is_none_or(|r| u.role == r))
        .collect();

    let page = query.paginate(users)?;
    Ok(dto::success_list(requested_at, "users", page))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = id.map_err(dto::path_rejection)?;
    let id: UserId = id.parse()?;

    let user = services
        .users
        .find(id)?
        .ok_or_else(|| OperationalError::not_found(NOT_FOUND))?;

    Ok(dto::success(StatusCode::OK, "user", user))
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<UserInput>,
) -> Result<Response, AppError> {
    let user = User::create(UserId::new(), body, Utc::now())?;
    let user = services.users.insert(user)?;

    tracing::info!(user_id = %user.id, "user created");
    Ok(dto::success(StatusCode::CREATED, "user", user))
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    id: Result<Path<String>, PathRejection>,
    JsonBody(patch): JsonBody<UserInput>,
) -> Result<Response, AppError> {
    let Path(id) = id.map_err(dto::path_rejection)?;
    let id: UserId = id.parse()?;

    let current = services
        .users
        .find(id)?
        .ok_or_else(|| OperationalError::not_found(NOT_FOUND))?;

    let updated = services
        .users
        .replace(current.update(patch)?)?
        .ok_or_else(|| OperationalError::not_found(NOT_FOUND))?;

    Ok(dto::success(StatusCode::OK, "user", updated))
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = id.map_err(dto::path_rejection)?;
    let id: UserId = id.parse()?;

    services
        .users
        .remove(id)?
        .ok_or_else(|| OperationalError::not_found(NOT_FOUND))?;

    tracing::info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}
