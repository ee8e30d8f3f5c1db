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

use natours_core::{OperationalError, TourId};
use natours_tours::{Difficulty, Tour, TourInput};

use crate::app::dto::{self, JsonBody, ListQuery};
use crate::app::errors::AppError;
use crate::app::routes::system;
use crate::app::services::AppServices;
use crate::context::RequestTime;

const NOT_FOUND: &str = "No tour found with that ID";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_tours).post(create_tour).fallback(system::not_found))
        .route(
            "/:id",
            get(get_tour)
                .patch(update_tour)
                .delete(delete_tour)
                .fallback(system::not_found),
        )
}

pub async fn list_tours(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requested_at): Extension<RequestTime>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query.map_err(dto::query_rejection)?;

    let difficulty = match query.difficulty.as_deref() {
        None => None,
        Some(raw) => Some(Difficulty::parse(raw).ok_or_else(|| {
            OperationalError::bad_request(format!("invalid difficulty: {raw}"))
        })?),
    };

    let tours: Vec<Tour> = services
        .tours
        .list()?
        .into_iter()
        .filter(|t| !t.secret_tour)
        .filter(|t| difficulty.is_none_or(|d| t.difficulty == d))
        .collect();

    let page = query.paginate(tours)?;
    Ok(dto::success_list(requested_at, "tours", page))
}

pub async fn get_tour(
    Extension(services): Extension<Arc<AppServices>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = id.map_err(dto::path_rejection)?;
    let id: TourId = id.parse()?;

    let tour = services
        .tours
        .find(id)?
        .filter(|t| !t.secret_tour)
        .ok_or_else(|| OperationalError::not_found(NOT_FOUND))?;

    Ok(dto::success(StatusCode::OK, "tour", tour))
}

pub async fn create_tour(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<TourInput>,
) -> Result<Response, AppError> {
    let tour = Tour::create(TourId::new(), body, Utc::now())?;
    let tour = services.tours.insert(tour)?;

    tracing::info!(tour_id = %tour.id, name = %tour.name, "tour created");
    Ok(dto::success(StatusCode::CREATED, "tour", tour))
}

pub async fn update_tour(
    Extension(services): Extension<Arc<AppServices>>,
    id: Result<Path<String>, PathRejection>,
    JsonBody(patch): JsonBody<TourInput>,
) -> Result<Response, AppError> {
    let Path(id) = id.map_err(dto::path_rejection)?;
    let id: TourId = id.parse()?;

    let current = services
        .tours
        .find(id)?
        .ok_or_else(|| OperationalError::not_found(NOT_FOUND))?;

    let updated = services
        .tours
        .replace(current.update(patch)?)?
        .ok_or_else(|| OperationalError::not_found(NOT_FOUND))?;

    Ok(dto::success(StatusCode::OK, "tour", updated))
}

pub async fn delete_tour(
    Extension(services): Extension<Arc<AppServices>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = id.map_err(dto::path_rejection)?;
    let id: TourId = id.parse()?;

    services
        .tours
        .remove(id)?
        .ok_or_else(|| OperationalError::not_found(NOT_FOUND))?;

    tracing::info!(tour_id = %id, "tour deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}
