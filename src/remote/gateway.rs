//! Gateway trait and the identity stamp for writes.

use async_trait::async_trait;

use crate::content::Record;
use crate::error::GatewayError;

/// Maintainer identity supplied by the external auth layer.
///
/// The data layer treats it as opaque: it is stamped onto created and
/// updated records as their owner and never interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
  pub subject: String,
}

impl Identity {
  pub fn new(subject: impl Into<String>) -> Self {
    Self {
      subject: subject.into(),
    }
  }
}

/// CRUD operations against one remote collection.
///
/// Implementations perform no retries; retry policy belongs to the
/// repository. A timeout is reported as `Connectivity`.
#[async_trait]
pub trait RecordGateway<T: Record>: Send + Sync {
  /// List all records, newest-created first.
  async fn list(&self) -> Result<Vec<T>, GatewayError>;

  /// Fetch a single record by id. Absence is `NotFound`.
  async fn get(&self, id: &str) -> Result<T, GatewayError>;

  /// Create a record. The gateway assigns the id and timestamps; `actor`
  /// is stamped onto the record as its owner when present.
  async fn create(&self, draft: &T::Draft, actor: Option<&Identity>) -> Result<T, GatewayError>;

  /// Apply a partial update. The gateway reassigns `updated_at`.
  async fn update(
    &self,
    id: &str,
    patch: &T::Patch,
    actor: Option<&Identity>,
  ) -> Result<T, GatewayError>;

  /// Delete by id. Idempotent: deleting an absent id returns `Ok(false)`.
  async fn delete(&self, id: &str) -> Result<bool, GatewayError>;
}
