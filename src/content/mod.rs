//! Domain records for the portfolio content set.

mod filter;
mod types;

pub use filter::visible;
pub use types::{status, NewPost, NewProject, Post, PostPatch, Project, ProjectPatch};

use serde::{de::DeserializeOwned, Serialize};

/// Trait for domain records managed by a repository.
///
/// Implementors tie a record type to its backend collection and to the
/// shapes used for creation and partial update.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Creation input: caller-supplied fields only. The id and timestamps
  /// are assigned by the remote gateway.
  type Draft: Serialize + DeserializeOwned + Send + Sync;

  /// Partial update input. Absent fields are left untouched.
  type Patch: Serialize + DeserializeOwned + Send + Sync;

  /// Opaque unique identifier, assigned by the gateway on creation.
  fn id(&self) -> &str;

  /// Human-readable unique identifier, immutable after creation.
  fn slug(&self) -> &str;

  /// Display title.
  fn title(&self) -> &str;

  /// Workflow status token, compared by equality.
  fn status(&self) -> &str;

  /// Collection name on the backend, also the default mirror key.
  fn collection() -> &'static str;
}
