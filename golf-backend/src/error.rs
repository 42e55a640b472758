use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

/// Body returned when a store operation fails.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
  pub error: String,
}

impl ErrorResponse {
  pub fn new(error: impl Into<String>) -> Self {
    Self {
      error: error.into(),
    }
  }
}

/// Body carrying a human-readable outcome, used for updates, deletes and
/// missing documents.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
  pub status: String,
}

impl StatusResponse {
  pub fn new(status: impl Into<String>) -> Self {
    Self {
      status: status.into(),
    }
  }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
  DatabaseError(golf_db::DbError),
  NotFound(String),
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    match self {
      AppError::DatabaseError(db_err) => {
        tracing::error!(?db_err, "Database error occurred");

        // The store message goes back to the caller as is
        let error_response = ErrorResponse::new(db_err.to_string());
        (StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)).into_response()
      }
      AppError::NotFound(status) => {
        tracing::debug!(%status, "Document not found");
        (StatusCode::NOT_FOUND, Json(StatusResponse::new(status))).into_response()
      }
    }
  }
}

impl From<golf_db::DbError> for AppError {
  fn from(err: golf_db::DbError) -> Self {
    AppError::DatabaseError(err)
  }
}
