mod error;
mod models;
mod object_id;
mod query;

pub use error::{DbError, Result};
pub use models::{
  Course, CourseRef, DATABASE_NAME, DeleteResult, Document, Entity, Hole, ID_FIELD,
  InsertOneResult, Keyed, NewCourse, NewPlayer, Player, UpdateResult,
};
pub use query::Filter;

use serde_json::Value;
use std::path::Path;
use tokio_rusqlite::Connection;
use tokio_rusqlite::rusqlite::{self, params};
use tracing::{debug, info};

/// Document store holding every collection in a single SQLite database.
#[derive(Clone)]
pub struct Database {
  conn: Connection,
}

impl Database {
  /// Open or create a database at the given path.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path).await.map_err(DbError::Sqlite)?;
    let db = Self { conn };
    db.initialize().await?;
    Ok(db)
  }

  /// Create an in-memory database (useful for testing).
  pub async fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .await
      .map_err(DbError::Sqlite)?;
    let db = Self { conn };
    db.initialize().await?;
    Ok(db)
  }

  async fn initialize(&self) -> Result<()> {
    self
      .conn
      .call(|conn| -> rusqlite::Result<()> {
        conn.pragma_update(None, "journal_mode", "WAL")?;

        conn.execute_batch(
          r#"
                    -- One row per document; seq keeps insertion order
                    CREATE TABLE IF NOT EXISTS documents (
                        seq INTEGER PRIMARY KEY AUTOINCREMENT,
                        collection TEXT NOT NULL,
                        object_id TEXT NOT NULL,
                        body TEXT NOT NULL,
                        UNIQUE(collection, object_id)
                    );

                    CREATE INDEX IF NOT EXISTS idx_documents_collection
                        ON documents(collection, seq);
                    "#,
        )?;
        Ok(())
      })
      .await?;

    info!(database = DATABASE_NAME, "database initialized");
    Ok(())
  }

  /// Handle to the collection an entity is stored in.
  pub fn collection_for<E: Entity>(&self) -> Collection {
    self.collection(E::COLLECTION)
  }

  /// Handle to a named collection. Collections exist implicitly.
  pub fn collection(&self, name: &str) -> Collection {
    Collection {
      conn: self.conn.clone(),
      name: name.to_string(),
    }
  }
}

/// A named set of documents inside a [`Database`].
#[derive(Clone)]
pub struct Collection {
  conn: Connection,
  name: String,
}

impl Collection {
  /// All documents matching the filter, in insertion order.
  ///
  /// Every stored row of the collection is decoded before matching, so a
  /// corrupt document fails the whole call with [`DbError::Corrupt`].
  pub async fn find(&self, filter: &Filter) -> Result<Vec<Document>> {
    let rows = self.rows().await?;

    let mut docs = Vec::new();
    for (object_id, body) in rows {
      let doc = decode(object_id, &body)?;
      if filter.matches(&doc) {
        docs.push(doc);
      }
    }
    Ok(docs)
  }

  /// The first document matching the filter.
  ///
  /// Rows are decoded in insertion order until one matches. A corrupt
  /// document stored before the match fails the lookup with
  /// [`DbError::Corrupt`], even when its key differs from the one asked for.
  pub async fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
    let rows = self.rows().await?;

    for (object_id, body) in rows {
      let doc = decode(object_id, &body)?;
      if filter.matches(&doc) {
        return Ok(Some(doc));
      }
    }
    Ok(None)
  }

  /// Number of documents matching the filter.
  pub async fn count(&self, filter: &Filter) -> Result<u64> {
    Ok(self.find(filter).await?.len() as u64)
  }

  /// Insert a document. A string `_id` in the document is kept, otherwise
  /// a fresh object id is generated.
  pub async fn insert_one(&self, mut doc: Document) -> Result<InsertOneResult> {
    let object_id = match doc.remove(ID_FIELD) {
      Some(Value::String(id)) => id,
      _ => object_id::generate(object_id::now()),
    };
    let body = Value::Object(doc).to_string();
    let collection = self.name.clone();

    let inserted_id = self
      .conn
      .call(move |conn| -> rusqlite::Result<Result<String>> {
        let tx = conn.transaction()?;

        let exists: bool = tx
          .prepare_cached(
            "SELECT EXISTS(SELECT 1 FROM documents WHERE collection = ?1 AND object_id = ?2)",
          )?
          .query_row(params![&collection, &object_id], |row| row.get(0))?;

        if exists {
          return Ok(Err(DbError::DuplicateKey(object_id)));
        }

        tx.prepare_cached("INSERT INTO documents (collection, object_id, body) VALUES (?1, ?2, ?3)")?
          .execute(params![&collection, &object_id, &body])?;

        tx.commit()?;
        Ok(Ok(object_id))
      })
      .await??;

    debug!(collection = %self.name, %inserted_id, "inserted document");
    Ok(InsertOneResult { inserted_id })
  }

  /// Apply a `$set` document to the first match. Never inserts.
  pub async fn update_one(&self, filter: &Filter, set: Document) -> Result<UpdateResult> {
    let filter = filter.clone();
    let collection = self.name.clone();

    let result = self
      .conn
      .call(move |conn| -> rusqlite::Result<Result<UpdateResult>> {
        let tx = conn.transaction()?;

        for (object_id, body) in load_rows(&tx, &collection)? {
          let mut doc = match decode(object_id.clone(), &body) {
            Ok(doc) => doc,
            Err(err) => return Ok(Err(err)),
          };
          if !filter.matches(&doc) {
            continue;
          }

          let modified = match query::apply_set(&mut doc, set) {
            Ok(modified) => modified,
            Err(err) => return Ok(Err(err)),
          };

          if modified {
            doc.remove(ID_FIELD);
            tx.prepare_cached(
              "UPDATE documents SET body = ?1 WHERE collection = ?2 AND object_id = ?3",
            )?
            .execute(params![
              Value::Object(doc).to_string(),
              &collection,
              &object_id
            ])?;
            tx.commit()?;
          }

          return Ok(Ok(UpdateResult {
            matched_count: 1,
            modified_count: u64::from(modified),
          }));
        }

        Ok(Ok(UpdateResult {
          matched_count: 0,
          modified_count: 0,
        }))
      })
      .await??;

    debug!(
      collection = %self.name,
      matched = result.matched_count,
      modified = result.modified_count,
      "updated document"
    );
    Ok(result)
  }

  /// Delete the first match.
  pub async fn delete_one(&self, filter: &Filter) -> Result<DeleteResult> {
    let filter = filter.clone();
    let collection = self.name.clone();

    let result = self
      .conn
      .call(move |conn| -> rusqlite::Result<Result<DeleteResult>> {
        let tx = conn.transaction()?;

        for (object_id, body) in load_rows(&tx, &collection)? {
          let doc = match decode(object_id.clone(), &body) {
            Ok(doc) => doc,
            Err(err) => return Ok(Err(err)),
          };
          if !filter.matches(&doc) {
            continue;
          }

          tx.prepare_cached("DELETE FROM documents WHERE collection = ?1 AND object_id = ?2")?
            .execute(params![&collection, &object_id])?;
          tx.commit()?;
          return Ok(Ok(DeleteResult { deleted_count: 1 }));
        }

        Ok(Ok(DeleteResult { deleted_count: 0 }))
      })
      .await??;

    debug!(collection = %self.name, deleted = result.deleted_count, "deleted document");
    Ok(result)
  }

  async fn rows(&self) -> Result<Vec<(String, String)>> {
    let collection = self.name.clone();
    let rows = self
      .conn
      .call(move |conn| load_rows(conn, &collection))
      .await?;
    Ok(rows)
  }
}

fn load_rows(conn: &rusqlite::Connection, collection: &str) -> rusqlite::Result<Vec<(String, String)>> {
  let mut stmt = conn
    .prepare_cached("SELECT object_id, body FROM documents WHERE collection = ?1 ORDER BY seq")?;

  let rows = stmt
    .query_map(params![collection], |row| Ok((row.get(0)?, row.get(1)?)))?
    .collect::<std::result::Result<Vec<_>, _>>()?;

  Ok(rows)
}

/// Parse a stored body and attach its object id.
fn decode(object_id: String, body: &str) -> Result<Document> {
  let mut doc: Document = match serde_json::from_str(body) {
    Ok(doc) => doc,
    Err(source) => return Err(DbError::Corrupt { object_id, source }),
  };
  doc.insert(ID_FIELD.to_string(), Value::String(object_id));
  Ok(doc)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn doc(value: Value) -> Document {
    match value {
      Value::Object(map) => map,
      _ => panic!("test document must be an object"),
    }
  }

  #[tokio::test]
  async fn test_insert_and_find_one() {
    let db = Database::open_in_memory().await.unwrap();
    let courses = db.collection_for::<Course>();

    let inserted = courses
      .insert_one(doc(json!({ "golf_course_id": 1, "location": "Dunes", "size": 18 })))
      .await
      .unwrap();
    assert_eq!(inserted.inserted_id.len(), 24);

    let found = courses
      .find_one(&Filter::eq(Course::KEY, Some(1)))
      .await
      .unwrap()
      .unwrap();
    assert_eq!(found["_id"], json!(inserted.inserted_id));
    assert_eq!(found["location"], json!("Dunes"));
    assert_eq!(found["size"], json!(18));

    let missing = courses
      .find_one(&Filter::eq(Course::KEY, Some(2)))
      .await
      .unwrap();
    assert!(missing.is_none());
  }

  #[tokio::test]
  async fn test_find_keeps_insertion_order() {
    let db = Database::open_in_memory().await.unwrap();
    let players = db.collection(Player::COLLECTION);

    for id in [3, 1, 2] {
      players.insert_one(doc(json!({ "id": id }))).await.unwrap();
    }

    let ids: Vec<Value> = players
      .find(&Filter::All)
      .await
      .unwrap()
      .into_iter()
      .map(|player| player["id"].clone())
      .collect();
    assert_eq!(ids, vec![json!(3), json!(1), json!(2)]);
  }

  #[tokio::test]
  async fn test_collections_are_isolated() {
    let db = Database::open_in_memory().await.unwrap();
    db.collection(Course::COLLECTION)
      .insert_one(doc(json!({ "id": 1 })))
      .await
      .unwrap();

    let players = db
      .collection(Player::COLLECTION)
      .find(&Filter::All)
      .await
      .unwrap();
    assert!(players.is_empty());
  }

  #[tokio::test]
  async fn test_insert_keeps_supplied_id() {
    let db = Database::open_in_memory().await.unwrap();
    let holes = db.collection(Hole::COLLECTION);

    let inserted = holes
      .insert_one(doc(json!({ "_id": "hole-1", "golf_course_fk": 1 })))
      .await
      .unwrap();
    assert_eq!(inserted.inserted_id, "hole-1");

    let err = holes
      .insert_one(doc(json!({ "_id": "hole-1", "golf_course_fk": 2 })))
      .await
      .unwrap_err();
    assert!(matches!(err, DbError::DuplicateKey(id) if id == "hole-1"));
  }

  #[tokio::test]
  async fn test_update_one_sets_fields_on_first_match() {
    let db = Database::open_in_memory().await.unwrap();
    let players = db.collection(Player::COLLECTION);
    players
      .insert_one(doc(json!({ "id": 1, "name": "Ada", "handicap": 10 })))
      .await
      .unwrap();
    players
      .insert_one(doc(json!({ "id": 1, "name": "Bo", "handicap": 20 })))
      .await
      .unwrap();

    let result = players
      .update_one(&Filter::eq(Player::KEY, Some(1)), doc(json!({ "handicap": 8 })))
      .await
      .unwrap();
    assert_eq!(
      result,
      UpdateResult {
        matched_count: 1,
        modified_count: 1
      }
    );

    let all = players.find(&Filter::All).await.unwrap();
    assert_eq!(all[0]["handicap"], json!(8));
    assert_eq!(all[0]["name"], json!("Ada"));
    assert_eq!(all[1]["handicap"], json!(20));
  }

  #[tokio::test]
  async fn test_update_one_without_match_does_not_insert() {
    let db = Database::open_in_memory().await.unwrap();
    let courses = db.collection(Course::COLLECTION);

    let result = courses
      .update_one(&Filter::eq(Course::KEY, Some(9)), doc(json!({ "location": "Moor" })))
      .await
      .unwrap();
    assert_eq!(result.matched_count, 0);
    assert_eq!(courses.count(&Filter::All).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_update_one_unchanged_reports_match_only() {
    let db = Database::open_in_memory().await.unwrap();
    let courses = db.collection(Course::COLLECTION);
    courses
      .insert_one(doc(json!({ "golf_course_id": 1, "location": "Dunes" })))
      .await
      .unwrap();

    let result = courses
      .update_one(&Filter::eq(Course::KEY, Some(1)), doc(json!({ "location": "Dunes" })))
      .await
      .unwrap();
    assert_eq!(
      result,
      UpdateResult {
        matched_count: 1,
        modified_count: 0
      }
    );
  }

  #[tokio::test]
  async fn test_update_one_rejects_id_change() {
    let db = Database::open_in_memory().await.unwrap();
    let courses = db.collection(Course::COLLECTION);
    courses
      .insert_one(doc(json!({ "golf_course_id": 1 })))
      .await
      .unwrap();

    let err = courses
      .update_one(&Filter::eq(Course::KEY, Some(1)), doc(json!({ "_id": "x" })))
      .await
      .unwrap_err();
    assert!(matches!(err, DbError::ImmutableField));
  }

  #[tokio::test]
  async fn test_delete_one_removes_single_document() {
    let db = Database::open_in_memory().await.unwrap();
    let courses = db.collection(Course::COLLECTION);
    for _ in 0..2 {
      courses
        .insert_one(doc(json!({ "golf_course_id": 5 })))
        .await
        .unwrap();
    }

    let filter = Filter::eq(Course::KEY, Some(5));
    assert_eq!(courses.delete_one(&filter).await.unwrap().deleted_count, 1);
    assert_eq!(courses.count(&filter).await.unwrap(), 1);
    assert_eq!(courses.delete_one(&filter).await.unwrap().deleted_count, 1);
    assert_eq!(courses.delete_one(&filter).await.unwrap().deleted_count, 0);
  }

  #[tokio::test]
  async fn test_find_by_embedded_course_reference() {
    let db = Database::open_in_memory().await.unwrap();
    let players = db.collection(Player::COLLECTION);
    players
      .insert_one(doc(json!({ "id": 1, "golf_courses": [{ "golf_course_id": 7 }] })))
      .await
      .unwrap();
    players
      .insert_one(doc(json!({ "id": 2, "golf_courses": [{ "golf_course_id": 8 }] })))
      .await
      .unwrap();

    let found = players
      .find(&Filter::eq(Player::COURSE_REF_PATH, Some(7)))
      .await
      .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], json!(1));
  }

  #[tokio::test]
  async fn test_corrupt_row_fails_lookups_past_it() {
    let db = Database::open_in_memory().await.unwrap();
    let courses = db.collection(Course::COLLECTION);
    courses
      .insert_one(doc(json!({ "golf_course_id": 1 })))
      .await
      .unwrap();
    db.conn
      .call(|conn| {
        conn.execute(
          "INSERT INTO documents (collection, object_id, body) VALUES ('golf_course', 'bad', '[1]')",
          [],
        )
      })
      .await
      .unwrap();
    courses
      .insert_one(doc(json!({ "golf_course_id": 2 })))
      .await
      .unwrap();

    let found = courses
      .find_one(&Filter::eq(Course::KEY, Some(1)))
      .await
      .unwrap();
    assert!(found.is_some());

    let err = courses
      .find_one(&Filter::eq(Course::KEY, Some(2)))
      .await
      .unwrap_err();
    assert!(matches!(err, DbError::Corrupt { object_id, .. } if object_id == "bad"));
  }

  #[tokio::test]
  async fn test_persists_across_reopen() {
    let path = std::env::temp_dir().join(format!("golf-db-test-{}.db", object_id::generate(0)));

    {
      let db = Database::open(&path).await.unwrap();
      db.collection(Hole::COLLECTION)
        .insert_one(doc(json!({ "golf_course_fk": 3, "par": 4 })))
        .await
        .unwrap();
    }

    let db = Database::open(&path).await.unwrap();
    let holes = db
      .collection(Hole::COLLECTION)
      .find(&Filter::eq(Hole::COURSE_FK, Some(3)))
      .await
      .unwrap();
    assert_eq!(holes.len(), 1);
    assert_eq!(holes[0]["par"], json!(4));

    drop(db);
    for suffix in ["", "-wal", "-shm"] {
      let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
  }
}
