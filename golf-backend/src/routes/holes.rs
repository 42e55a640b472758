use crate::AppState;
use crate::error::AppError;
use crate::params::parse_key;

use axum::{
    Json,
    extract::{Path, State},
};
use golf_db::{Document, Filter, Hole};
use std::sync::Arc;

// GET /api/holes/{id}
// Holes are read-only through the API; an empty list is still a 200.
pub(crate) async fn holes_for_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Document>>, AppError> {
    let holes = state
        .db
        .collection_for::<Hole>()
        .find(&Filter::eq(Hole::COURSE_FK, parse_key(&id)))
        .await?;

    Ok(Json(holes))
}
