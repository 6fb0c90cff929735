//! BinService — the bin operations the HTTP layer exposes.
//!
//! Owns the rules that sit between validated input and the repository:
//! stamping `lastCollected` on create, deriving status, and turning a missing
//! record into a not-found error. Cloning is cheap; every handler gets a copy
//! sharing the same repository handle.

use crate::{
    models::bin::{Bin, BinPatch, CreateBin, NewBin},
    repository::{BinRepository, RepositoryError},
};
use bson::oid::ObjectId;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum BinServiceError {
    #[error("Bin not found")]
    NotFound(ObjectId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type BinServiceResult<T> = Result<T, BinServiceError>;

#[derive(Clone)]
pub struct BinService {
    repo: Arc<dyn BinRepository>,
}

impl BinService {
    pub fn new(repo: Arc<dyn BinRepository>) -> Self {
        Self { repo }
    }

    /// All bins, most recently collected first.
    pub async fn list_bins(&self) -> BinServiceResult<Vec<Bin>> {
        Ok(self.repo.list_all().await?)
    }

    /// Create a bin collected "now" with its status derived from fullness.
    pub async fn create_bin(&self, request: CreateBin) -> BinServiceResult<Bin> {
        let new = NewBin::new(request, Utc::now());
        let bin = self.repo.insert(new).await?;
        debug!("created bin {} ({})", bin.id, bin.status);
        Ok(bin)
    }

    /// Merge `patch` into an existing bin.
    pub async fn update_bin(&self, id: ObjectId, patch: BinPatch) -> BinServiceResult<Bin> {
        self.repo
            .update_by_id(id, patch)
            .await?
            .ok_or(BinServiceError::NotFound(id))
    }

    /// Used by `/readyz`.
    pub async fn check_store(&self) -> BinServiceResult<()> {
        Ok(self.repo.ping().await?)
    }
}
