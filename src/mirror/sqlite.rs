//! SQLite-backed mirror storage.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

use crate::content::Record;

use super::store::{MirrorStore, Snapshot};

/// SQLite-based mirror storage.
pub struct SqliteMirror {
  conn: Mutex<Connection>,
}

impl SqliteMirror {
  /// Open the mirror database at the default location.
  pub fn open() -> Result<Self> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open the mirror database at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create mirror directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open mirror database at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// Open an in-memory mirror that lives only as long as the process.
  #[allow(dead_code)]
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory mirror database: {}", e))?;

    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    let mirror = Self {
      conn: Mutex::new(conn),
    };
    mirror.run_migrations()?;

    Ok(mirror)
  }

  /// Get the default database path.
  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("folio").join("mirror.db"))
  }

  /// Run database migrations for the mirror table.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(MIRROR_SCHEMA)
      .map_err(|e| eyre!("Failed to run mirror migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for the mirror table. One row per collection key holding the
/// serialized record sequence, replaced wholesale on every save.
const MIRROR_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS mirror_snapshots (
    collection TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    saved_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl MirrorStore for SqliteMirror {
  fn load<T: Record>(&self, key: &str) -> Option<Snapshot<T>> {
    let conn = match self.conn.lock() {
      Ok(conn) => conn,
      Err(e) => {
        warn!("Mirror lock poisoned, treating snapshot for {} as absent: {}", key, e);
        return None;
      }
    };

    let row: Option<(Vec<u8>, String)> = conn
      .query_row(
        "SELECT data, saved_at FROM mirror_snapshots WHERE collection = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .unwrap_or_else(|e| {
        warn!("Failed to read mirror snapshot for {}: {}", key, e);
        None
      });

    let (data, saved_at_str) = row?;

    // A snapshot that no longer parses is a miss, not an error.
    let records: Vec<T> = match serde_json::from_slice(&data) {
      Ok(records) => records,
      Err(e) => {
        warn!("Discarding unparsable mirror snapshot for {}: {}", key, e);
        return None;
      }
    };

    let saved_at = match parse_datetime(&saved_at_str) {
      Ok(saved_at) => saved_at,
      Err(e) => {
        warn!("Discarding mirror snapshot for {} with bad timestamp: {}", key, e);
        return None;
      }
    };

    Some(Snapshot { records, saved_at })
  }

  fn save<T: Record>(&self, key: &str, records: &[T]) {
    let data = match serde_json::to_vec(records) {
      Ok(data) => data,
      Err(e) => {
        warn!("Failed to serialize mirror snapshot for {}: {}", key, e);
        return;
      }
    };

    let conn = match self.conn.lock() {
      Ok(conn) => conn,
      Err(e) => {
        warn!("Mirror lock poisoned, dropping snapshot for {}: {}", key, e);
        return;
      }
    };

    if let Err(e) = conn.execute(
      "INSERT OR REPLACE INTO mirror_snapshots (collection, data, saved_at)
       VALUES (?, ?, datetime('now'))",
      params![key, data],
    ) {
      warn!("Failed to save mirror snapshot for {}: {}", key, e);
    }
  }

  fn clear(&self, key: &str) {
    let conn = match self.conn.lock() {
      Ok(conn) => conn,
      Err(e) => {
        warn!("Mirror lock poisoned, cannot clear snapshot for {}: {}", key, e);
        return;
      }
    };

    if let Err(e) = conn.execute(
      "DELETE FROM mirror_snapshots WHERE collection = ?",
      params![key],
    ) {
      warn!("Failed to clear mirror snapshot for {}: {}", key, e);
    }
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::{status, Post};

  fn post(id: &str, slug: &str) -> Post {
    Post {
      id: id.to_string(),
      slug: slug.to_string(),
      title: slug.to_uppercase(),
      content: "body".to_string(),
      excerpt: None,
      tags: vec!["rust".to_string()],
      status: status::PUBLISHED.to_string(),
      featured: false,
      owner: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  fn ids(snapshot: &Snapshot<Post>) -> Vec<&str> {
    snapshot.records.iter().map(|r| r.id.as_str()).collect()
  }

  #[test]
  fn test_load_absent_returns_none() {
    let mirror = SqliteMirror::open_in_memory().unwrap();

    assert!(mirror.load::<Post>("posts").is_none());
  }

  #[test]
  fn test_save_load_preserves_order() {
    let mirror = SqliteMirror::open_in_memory().unwrap();
    let records = vec![post("3", "newest"), post("2", "middle"), post("1", "oldest")];

    mirror.save("posts", &records);

    let snapshot = mirror.load::<Post>("posts").unwrap();
    assert_eq!(ids(&snapshot), ["3", "2", "1"]);
  }

  #[test]
  fn test_save_replaces_wholesale() {
    let mirror = SqliteMirror::open_in_memory().unwrap();

    mirror.save("posts", &[post("1", "a"), post("2", "b"), post("3", "c")]);
    mirror.save("posts", &[post("4", "d")]);

    let snapshot = mirror.load::<Post>("posts").unwrap();
    assert_eq!(ids(&snapshot), ["4"]);
  }

  #[test]
  fn test_clear_removes_snapshot() {
    let mirror = SqliteMirror::open_in_memory().unwrap();

    mirror.save("posts", &[post("1", "a")]);
    mirror.clear("posts");

    assert!(mirror.load::<Post>("posts").is_none());
  }

  #[test]
  fn test_clear_absent_is_noop() {
    let mirror = SqliteMirror::open_in_memory().unwrap();

    mirror.clear("posts");

    assert!(mirror.load::<Post>("posts").is_none());
  }

  #[test]
  fn test_keys_are_independent() {
    let mirror = SqliteMirror::open_in_memory().unwrap();

    mirror.save("posts", &[post("1", "a")]);
    mirror.save("projects", &[post("2", "b")]);
    mirror.clear("posts");

    assert!(mirror.load::<Post>("posts").is_none());
    assert_eq!(ids(&mirror.load::<Post>("projects").unwrap()), ["2"]);
  }

  #[test]
  fn test_corrupt_snapshot_treated_as_absent() {
    let mirror = SqliteMirror::open_in_memory().unwrap();

    {
      let conn = mirror.conn.lock().unwrap();
      conn
        .execute(
          "INSERT INTO mirror_snapshots (collection, data) VALUES (?, ?)",
          params!["posts", b"not json".to_vec()],
        )
        .unwrap();
    }

    assert!(mirror.load::<Post>("posts").is_none());
  }
}
