//! Mirror storage trait and the no-op implementation.

use chrono::{DateTime, Utc};

use crate::content::Record;

/// A mirrored collection: the records of the last successful remote list
/// in their original order, plus the time they were saved.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
  pub records: Vec<T>,
  pub saved_at: DateTime<Utc>,
}

/// Trait for mirror storage backends.
///
/// The mirror is a cache, never a source of truth, so every operation is
/// best-effort: a corrupt or unreadable snapshot loads as absent, and a
/// failed save or clear is logged and swallowed rather than propagated.
pub trait MirrorStore: Send + Sync {
  /// Load the snapshot for a collection key, if one exists.
  fn load<T: Record>(&self, key: &str) -> Option<Snapshot<T>>;

  /// Replace the snapshot for a collection key wholesale.
  fn save<T: Record>(&self, key: &str, records: &[T]);

  /// Remove the snapshot for a collection key. No-op if absent.
  fn clear(&self, key: &str);
}

/// Mirror that stores nothing.
/// Used when mirroring is disabled - reads always miss, writes are discarded.
pub struct NoopMirror;

impl MirrorStore for NoopMirror {
  fn load<T: Record>(&self, _key: &str) -> Option<Snapshot<T>> {
    None // Always miss
  }

  fn save<T: Record>(&self, _key: &str, _records: &[T]) {
    // Discard
  }

  fn clear(&self, _key: &str) {}
}
