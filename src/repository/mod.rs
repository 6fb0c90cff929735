//! Persistence seam for bins.
//!
//! Handlers only see [`BinRepository`]; `main` picks the MongoDB-backed
//! implementation or the in-memory one and shares it behind an `Arc`.

pub mod memory;
pub mod mongo;

use crate::models::bin::{Bin, BinPatch, NewBin};
use async_trait::async_trait;
use bson::oid::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
    #[error("stored bin could not be decoded: {0}")]
    Decode(#[from] bson::de::Error),
    #[error("store returned a non-ObjectId identifier: {0}")]
    UnexpectedId(bson::Bson),
    #[error("stored bin has no `_id`")]
    MissingId,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait BinRepository: Send + Sync + 'static {
    /// All bins, most recently collected first.
    async fn list_all(&self) -> RepositoryResult<Vec<Bin>>;

    /// Store a new bin and return it with its assigned identifier.
    async fn insert(&self, bin: NewBin) -> RepositoryResult<Bin>;

    /// Merge `patch` into the bin with `id`.
    /// Returns `None` if no bin has that identifier.
    async fn update_by_id(&self, id: ObjectId, patch: BinPatch) -> RepositoryResult<Option<Bin>>;

    /// Cheap round-trip used by the readiness probe.
    async fn ping(&self) -> RepositoryResult<()>;
}
