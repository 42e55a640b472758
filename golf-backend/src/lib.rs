pub mod config;
mod error;
mod params;
mod routes;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, put},
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use routes::WELCOME_MESSAGE;

pub struct AppState {
    pub db: golf_db::Database,
}

/// Create the application router with the given database and configuration
pub fn create_app(
    db: golf_db::Database,
    static_dir: impl AsRef<Path>,
    request_body_limit: usize,
    request_timeout: Duration,
) -> Router {
    let state = Arc::new(AppState { db });

    let course_routes = Router::new()
        .route(
            routes::COURSES,
            get(routes::courses::list_courses).post(routes::courses::create_course),
        )
        .route(routes::COURSE, get(routes::courses::get_course))
        .route(
            routes::COURSE_ITEM,
            put(routes::courses::update_course).delete(routes::courses::delete_course),
        );

    let player_routes = Router::new()
        .route(
            routes::PLAYERS,
            get(routes::players::list_players).post(routes::players::create_player),
        )
        .route(routes::PLAYER, get(routes::players::get_player))
        .route(
            routes::PLAYER_ITEM,
            put(routes::players::update_player).delete(routes::players::delete_player),
        )
        .route(
            routes::PLAYERS_FOR_COURSE,
            get(routes::players::players_for_course),
        );

    let hole_routes =
        Router::new().route(routes::HOLES_FOR_COURSE, get(routes::holes::holes_for_course));

    Router::new()
        .route(routes::WELCOME, get(routes::welcome))
        .merge(course_routes)
        .merge(player_routes)
        .merge(hole_routes)
        .fallback_service(ServeDir::new(static_dir))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(RequestBodyLimitLayer::new(request_body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
