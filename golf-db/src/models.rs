use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// A schemaless stored document.
pub type Document = Map<String, Value>;

/// Name of the logical database every collection lives in.
pub const DATABASE_NAME: &str = "golf";

/// Field holding the store-assigned object identifier.
pub const ID_FIELD: &str = "_id";

/// Where an entity is stored.
pub trait Entity {
  const COLLECTION: &'static str;
}

/// An entity addressed by an integer business key.
pub trait Keyed: Entity {
  const KEY: &'static str;
}

/// A golf course, keyed by `golf_course_id`.
pub struct Course;

impl Entity for Course {
  const COLLECTION: &'static str = "golf_course";
}

impl Keyed for Course {
  const KEY: &'static str = "golf_course_id";
}

/// A player, keyed by `id`.
pub struct Player;

impl Entity for Player {
  const COLLECTION: &'static str = "player";
}

impl Keyed for Player {
  const KEY: &'static str = "id";
}

impl Player {
  /// Path to the course ids embedded in a player's `golf_courses` list.
  pub const COURSE_REF_PATH: &'static str = "golf_courses.golf_course_id";
}

/// A hole. Holes have no business key and are looked up by the course they
/// belong to.
pub struct Hole;

impl Entity for Hole {
  const COLLECTION: &'static str = "holes";
}

impl Hole {
  pub const COURSE_FK: &'static str = "golf_course_fk";
}

/// Body accepted when creating a course. Absent fields are stored as null;
/// only the key is typed, everything else is kept as sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCourse {
  #[serde(default)]
  pub golf_course_id: Option<i64>,
  #[serde(default)]
  pub location: Option<Value>,
  #[serde(default)]
  pub size: Option<Value>,
}

impl From<NewCourse> for Document {
  fn from(course: NewCourse) -> Self {
    let mut doc = Document::new();
    doc.insert(Course::KEY.to_string(), nullable(course.golf_course_id));
    doc.insert("location".to_string(), nullable(course.location));
    doc.insert("size".to_string(), course.size.unwrap_or(Value::Null));
    doc
  }
}

/// Body accepted when creating a player.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPlayer {
  #[serde(default)]
  pub id: Option<i64>,
  #[serde(default)]
  pub name: Option<Value>,
  #[serde(default)]
  pub handicap: Option<Number>,
  #[serde(default)]
  pub golf_courses: Option<Vec<CourseRef>>,
}

impl From<NewPlayer> for Document {
  fn from(player: NewPlayer) -> Self {
    let golf_courses = player.golf_courses.map(|refs| {
      refs
        .into_iter()
        .map(|course_ref| Value::Object(course_ref.into()))
        .collect::<Vec<_>>()
    });

    let mut doc = Document::new();
    doc.insert(Player::KEY.to_string(), nullable(player.id));
    doc.insert("name".to_string(), nullable(player.name));
    doc.insert("handicap".to_string(), nullable(player.handicap));
    doc.insert("golf_courses".to_string(), nullable(golf_courses));
    doc
  }
}

/// A course reference embedded in a player. Extra fields are kept as sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseRef {
  #[serde(default)]
  pub golf_course_id: Option<i64>,
  #[serde(flatten)]
  pub extra: Document,
}

impl From<CourseRef> for Document {
  fn from(course_ref: CourseRef) -> Self {
    let mut doc = course_ref.extra;
    doc.insert(Course::KEY.to_string(), nullable(course_ref.golf_course_id));
    doc
  }
}

fn nullable<T: Into<Value>>(value: Option<T>) -> Value {
  value.map_or(Value::Null, Into::into)
}

/// Outcome of `insert_one`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOneResult {
  pub inserted_id: String,
}

/// Outcome of `update_one`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateResult {
  pub matched_count: u64,
  pub modified_count: u64,
}

/// Outcome of `delete_one`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
  pub deleted_count: u64,
}
