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
use golf_db::{Document, Filter, ID_FIELD, Keyed, NewPlayer, Player};
use std::sync::Arc;

fn by_key(id: &str) -> Filter {
    Filter::eq(Player::KEY, parse_key(id))
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("No player with id {id}"))
}

// GET /api/players
pub(crate) async fn list_players(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Document>>, AppError> {
    let players = state
        .db
        .collection_for::<Player>()
        .find(&Filter::All)
        .await?;

    Ok(Json(players))
}

// GET /api/player/{id}
pub(crate) async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    state
        .db
        .collection_for::<Player>()
        .find_one(&by_key(&id))
        .await?
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

// GET /api/playersforcourse/{id}
// An empty list is still a 200.
pub(crate) async fn players_for_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Document>>, AppError> {
    let players = state
        .db
        .collection_for::<Player>()
        .find(&Filter::eq(Player::COURSE_REF_PATH, parse_key(&id)))
        .await?;

    Ok(Json(players))
}

// POST /api/players
#[debug_handler]
pub(crate) async fn create_player(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewPlayer>,
) -> Result<impl IntoResponse, AppError> {
    let result = state
        .db
        .collection_for::<Player>()
        .insert_one(payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(InsertedResponse::from(result))))
}

// PUT /api/players/{id}
pub(crate) async fn update_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(mut player): Json<Document>,
) -> Result<Json<StatusResponse>, AppError> {
    // _id cannot be updated
    player.remove(ID_FIELD);

    let result = state
        .db
        .collection_for::<Player>()
        .update_one(&by_key(&id), player)
        .await?;

    if result.matched_count == 0 {
        return Err(not_found(&id));
    }

    Ok(Json(StatusResponse::new(format!(
        "Player with id {id} has been updated."
    ))))
}

// DELETE /api/players/{id}
pub(crate) async fn delete_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let result = state
        .db
        .collection_for::<Player>()
        .delete_one(&by_key(&id))
        .await?;

    if result.deleted_count == 0 {
        return Err(not_found(&id));
    }

    Ok(Json(StatusResponse::new(format!(
        "Player with id {id} has been successfully deleted."
    ))))
}
