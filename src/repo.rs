//! The entity repository: cache-coherent access to one remote collection.
//!
//! Reads are remote-first with a mirror fallback, so they degrade to
//! last-known data when the backend is unreachable or unconfigured. Writes
//! are remote-only and invalidate the mirror before returning, so a read
//! that follows a successful write can never be served pre-write data.

use chrono::{DateTime, Utc};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::content::Record;
use crate::error::{GatewayError, StoreError};
use crate::mirror::MirrorStore;
use crate::remote::{Identity, RecordGateway};

/// Where a listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSource {
  /// Fresh data from the remote gateway.
  Remote,
  /// Last-known data from the local mirror, possibly stale.
  Mirror,
  /// Gateway unusable and no mirror snapshot. An empty listing with this
  /// source means "no data available", not "zero records exist".
  Unavailable,
}

/// A list result plus where it came from.
#[derive(Debug, Clone)]
pub struct Listing<T> {
  pub records: Vec<T>,
  pub source: ListSource,
  /// When the snapshot was saved, for mirror-sourced listings.
  pub saved_at: Option<DateTime<Utc>>,
}

impl<T> Listing<T> {
  fn remote(records: Vec<T>) -> Self {
    Self {
      records,
      source: ListSource::Remote,
      saved_at: None,
    }
  }

  fn mirror(records: Vec<T>, saved_at: DateTime<Utc>) -> Self {
    Self {
      records,
      source: ListSource::Mirror,
      saved_at: Some(saved_at),
    }
  }

  fn unavailable() -> Self {
    Self {
      records: Vec::new(),
      source: ListSource::Unavailable,
      saved_at: None,
    }
  }
}

/// Typed repository over one remote collection with a local mirror.
///
/// `gateway` is `None` when the backend is unconfigured; the repository
/// then serves reads from the mirror alone and refuses writes. The mirror
/// key defaults to the record type's collection name, so repositories for
/// different record types never collide.
pub struct Repository<T, G, M>
where
  T: Record,
  G: RecordGateway<T>,
  M: MirrorStore,
{
  gateway: Option<G>,
  mirror: Arc<M>,
  key: String,
  actor: Option<Identity>,
  _record: PhantomData<T>,
}

impl<T, G, M> Repository<T, G, M>
where
  T: Record,
  G: RecordGateway<T>,
  M: MirrorStore,
{
  pub fn new(gateway: Option<G>, mirror: M) -> Self {
    Self {
      gateway,
      mirror: Arc::new(mirror),
      key: T::collection().to_string(),
      actor: None,
      _record: PhantomData,
    }
  }

  /// Use a mirror key other than the collection name. Lets two
  /// repositories of the same record type coexist without collisions.
  #[allow(dead_code)]
  pub fn with_mirror_key(mut self, key: impl Into<String>) -> Self {
    self.key = key.into();
    self
  }

  /// Stamp subsequent writes with the given maintainer identity.
  pub fn with_actor(mut self, actor: Identity) -> Self {
    self.actor = Some(actor);
    self
  }

  /// The mirror backing this repository.
  #[allow(dead_code)]
  pub fn mirror(&self) -> &M {
    self.mirror.as_ref()
  }

  /// List the collection, newest-created first.
  ///
  /// A successful gateway list replaces the mirror snapshot wholesale. A
  /// failed or unconfigured gateway falls back to the mirror, so reads
  /// never surface connectivity or authorization failures.
  pub async fn list(&self) -> Listing<T> {
    if let Some(gateway) = &self.gateway {
      match gateway.list().await {
        Ok(records) => {
          self.mirror.save(&self.key, &records);
          return Listing::remote(records);
        }
        Err(GatewayError::Connectivity(reason)) => {
          warn!("Backend unreachable, falling back to mirror for {}: {}", self.key, reason);
        }
        Err(GatewayError::Authorization(reason)) => {
          warn!("Backend refused read, falling back to mirror for {}: {}", self.key, reason);
        }
        Err(err) => {
          warn!("Unexpected gateway failure, falling back to mirror for {}: {}", self.key, err);
        }
      }
    } else {
      debug!("No gateway configured, reading mirror for {}", self.key);
    }

    match self.mirror.load::<T>(&self.key) {
      Some(snapshot) => Listing::mirror(snapshot.records, snapshot.saved_at),
      None => Listing::unavailable(),
    }
  }

  /// Fetch one record by id.
  ///
  /// An unreachable or unconfigured gateway falls back to scanning the
  /// mirror snapshot; a miss there is `NotFound`.
  pub async fn get(&self, id: &str) -> Result<T, StoreError> {
    match &self.gateway {
      Some(gateway) => match gateway.get(id).await {
        Ok(record) => Ok(record),
        Err(GatewayError::Connectivity(reason)) => {
          warn!("Backend unreachable, scanning mirror for {}: {}", id, reason);
          self.get_mirrored(id)
        }
        Err(err) => Err(err.into()),
      },
      None => self.get_mirrored(id),
    }
  }

  fn get_mirrored(&self, id: &str) -> Result<T, StoreError> {
    self
      .mirror
      .load::<T>(&self.key)
      .and_then(|snapshot| snapshot.records.into_iter().find(|r| r.id() == id))
      .ok_or_else(|| StoreError::NotFound(id.to_string()))
  }

  /// Create a record.
  ///
  /// Remote-only: with no reachable gateway the operation fails with
  /// `Unavailable`. On success the mirror snapshot is invalidated before
  /// the record is returned, forcing the next list to re-fetch.
  pub async fn create(&self, draft: &T::Draft) -> Result<T, StoreError> {
    let gateway = self.require_gateway()?;
    let record = gateway.create(draft, self.actor.as_ref()).await?;
    self.mirror.clear(&self.key);
    Ok(record)
  }

  /// Apply a partial update to a record. Invalidates the mirror on success.
  pub async fn update(&self, id: &str, patch: &T::Patch) -> Result<T, StoreError> {
    let gateway = self.require_gateway()?;
    let record = gateway.update(id, patch, self.actor.as_ref()).await?;
    self.mirror.clear(&self.key);
    Ok(record)
  }

  /// Delete a record by id. Idempotent: an absent id returns `Ok(false)`.
  /// The mirror is invalidated once the gateway answers, deleted row or not.
  pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
    let gateway = self.require_gateway()?;
    let deleted = gateway.delete(id).await?;
    self.mirror.clear(&self.key);
    Ok(deleted)
  }

  fn require_gateway(&self) -> Result<&G, StoreError> {
    self
      .gateway
      .as_ref()
      .ok_or_else(|| StoreError::Unavailable("no backend configured".to_string()))
  }
}

impl<T, G, M> Clone for Repository<T, G, M>
where
  T: Record,
  G: RecordGateway<T> + Clone,
  M: MirrorStore,
{
  fn clone(&self) -> Self {
    Self {
      gateway: self.gateway.clone(),
      mirror: Arc::clone(&self.mirror),
      key: self.key.clone(),
      actor: self.actor.clone(),
      _record: PhantomData,
    }
  }
}
