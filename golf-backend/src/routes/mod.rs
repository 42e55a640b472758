pub(crate) mod courses;
pub(crate) mod holes;
pub(crate) mod players;

use serde::Serialize;

// Route paths
pub(crate) const WELCOME: &str = "/api";
pub(crate) const COURSES: &str = "/api/courses";
pub(crate) const COURSE: &str = "/api/course/{id}";
pub(crate) const COURSE_ITEM: &str = "/api/courses/{id}";
pub(crate) const PLAYERS: &str = "/api/players";
pub(crate) const PLAYER: &str = "/api/player/{id}";
pub(crate) const PLAYER_ITEM: &str = "/api/players/{id}";
pub(crate) const PLAYERS_FOR_COURSE: &str = "/api/playersforcourse/{id}";
pub(crate) const HOLES_FOR_COURSE: &str = "/api/holes/{id}";

pub const WELCOME_MESSAGE: &str = "Welcome to the Golf Course Database API";

/// Response to a successful insert.
#[derive(Debug, Serialize)]
pub(crate) struct InsertedResponse {
    #[serde(rename = "_id")]
    id: String,
}

impl From<golf_db::InsertOneResult> for InsertedResponse {
    fn from(result: golf_db::InsertOneResult) -> Self {
        Self {
            id: result.inserted_id,
        }
    }
}

pub(crate) async fn welcome() -> &'static str {
    WELCOME_MESSAGE
}
