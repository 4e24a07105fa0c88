//! Error types for the data layer.
//!
//! Gateway failures are tagged variants rather than opaque reports, so the
//! repository's mirror-fallback decision is an explicit branch on the tag.

use thiserror::Error;

/// Failure reported by the remote CRUD gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
  /// Backend unreachable, timed out, or unable to answer usefully.
  #[error("backend unreachable: {0}")]
  Connectivity(String),

  /// The caller lacks rights for the operation.
  #[error("not authorized: {0}")]
  Authorization(String),

  /// A write input was rejected as malformed or incomplete.
  #[error("invalid record: {0}")]
  Validation(String),

  /// No record with the requested id exists. An expected outcome for
  /// `get`/`update`/`delete`, not a systemic failure.
  #[error("record not found: {0}")]
  NotFound(String),
}

impl From<reqwest::Error> for GatewayError {
  fn from(err: reqwest::Error) -> Self {
    GatewayError::Connectivity(err.to_string())
  }
}

/// Failure surfaced by a repository to its consumers.
///
/// Reads never surface connectivity or authorization failures (the mirror
/// masks them); writes surface everything, with connectivity reported as
/// `Unavailable` since there is no offline write buffering.
#[derive(Debug, Error)]
pub enum StoreError {
  /// No record with the requested id exists.
  #[error("record not found: {0}")]
  NotFound(String),

  /// A write input was rejected as malformed or incomplete.
  #[error("invalid record: {0}")]
  Validation(String),

  /// The caller lacks rights for the operation.
  #[error("not authorized: {0}")]
  Authorization(String),

  /// A write was attempted with no reachable backend.
  #[error("backend unavailable: {0}")]
  Unavailable(String),
}

impl From<GatewayError> for StoreError {
  fn from(err: GatewayError) -> Self {
    match err {
      GatewayError::Connectivity(reason) => StoreError::Unavailable(reason),
      GatewayError::Authorization(reason) => StoreError::Authorization(reason),
      GatewayError::Validation(reason) => StoreError::Validation(reason),
      GatewayError::NotFound(id) => StoreError::NotFound(id),
    }
  }
}
