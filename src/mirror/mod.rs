//! Local mirror of remote collections for offline and degraded reads.
//!
//! The mirror holds the last successful remote list result per collection,
//! wholesale: a snapshot is either absent or a verbatim copy of a remote
//! state observed at some past time. It is replaced in full on refresh and
//! deleted in full on invalidation, never updated in place.

mod sqlite;
mod store;

pub use sqlite::SqliteMirror;
pub use store::{MirrorStore, NoopMirror, Snapshot};
