use crate::AppState;
use crate::error::{AppError, StatusResponse};
use crate::params::parse_key;
use crate::routes::InsertedResponse;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_macros::debug_handler;
use golf_db::{Course, Document, Filter, ID_FIELD, Keyed, NewCourse};
use std::sync::Arc;

fn by_key(id: &str) -> Filter {
    Filter::eq(Course::KEY, parse_key(id))
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("No golf course with id {id}"))
}

// GET /api/courses
pub(crate) async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Document>>, AppError> {
    let courses = state
        .db
        .collection_for::<Course>()
        .find(&Filter::All)
        .await?;

    Ok(Json(courses))
}

// GET /api/course/{id}
pub(crate) async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    state
        .db
        .collection_for::<Course>()
        .find_one(&by_key(&id))
        .await?
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

// POST /api/courses
#[debug_handler]
pub(crate) async fn create_course(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewCourse>,
) -> Result<impl IntoResponse, AppError> {
    let result = state
        .db
        .collection_for::<Course>()
        .insert_one(payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(InsertedResponse::from(result))))
}

// PUT /api/courses/{id}
pub(crate) async fn update_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(mut course): Json<Document>,
) -> Result<Json<StatusResponse>, AppError> {
    // _id cannot be updated
    course.remove(ID_FIELD);

    let result = state
        .db
        .collection_for::<Course>()
        .update_one(&by_key(&id), course)
        .await?;

    if result.matched_count == 0 {
        return Err(not_found(&id));
    }

    Ok(Json(StatusResponse::new(format!(
        "Golf course with id {id} has been updated."
    ))))
}

// DELETE /api/courses/{id}
pub(crate) async fn delete_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let result = state
        .db
        .collection_for::<Course>()
        .delete_one(&by_key(&id))
        .await?;

    if result.deleted_count == 0 {
        return Err(not_found(&id));
    }

    Ok(Json(StatusResponse::new(format!(
        "Golf course with id {id} has been successfully deleted."
    ))))
}
