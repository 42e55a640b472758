use thiserror::Error;
use tokio_rusqlite::rusqlite;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database connection error: {0}")]
    Connection(#[from] tokio_rusqlite::Error),

    #[error("stored document {object_id} is not a JSON object: {source}")]
    Corrupt {
        object_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate key error: _id {0} already exists")]
    DuplicateKey(String),

    #[error("performing an update on the path '_id' would modify the immutable field '_id'")]
    ImmutableField,

    /// `parent` is the field (or array index) whose value blocks the path.
    #[error("cannot create field '{field}' in element '{parent}'")]
    PathConflict { field: String, parent: String },

    #[error("the update path '{0}' contains an empty field name")]
    EmptyFieldName(String),
}

pub type Result<T> = std::result::Result<T, DbError>;
