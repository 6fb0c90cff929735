//! In-process bin repository for local runs (`--in-memory`) and tests.

use super::{BinRepository, RepositoryResult};
use crate::models::bin::{Bin, BinPatch, NewBin};
use async_trait::async_trait;
use bson::oid::ObjectId;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A single lock over the whole map gives each update the same per-record
/// atomicity the document store provides.
#[derive(Default)]
pub struct InMemoryBinRepository {
    bins: RwLock<HashMap<ObjectId, Bin>>,
}

impl InMemoryBinRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BinRepository for InMemoryBinRepository {
    async fn list_all(&self) -> RepositoryResult<Vec<Bin>> {
        let mut bins: Vec<Bin> = self.bins.read().await.values().cloned().collect();
        bins.sort_by(|a, b| {
            b.last_collected
                .cmp(&a.last_collected)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(bins)
    }

    async fn insert(&self, bin: NewBin) -> RepositoryResult<Bin> {
        let stored = Bin::from_new(ObjectId::new(), bin);
        self.bins.write().await.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_by_id(&self, id: ObjectId, patch: BinPatch) -> RepositoryResult<Option<Bin>> {
        let mut bins = self.bins.write().await;
        Ok(bins.get_mut(&id).map(|bin| {
            bin.apply(&patch);
            bin.clone()
        }))
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bin::BinStatus;
    use chrono::{Duration, Utc};

    fn new_bin(location: &str, fullness: f64, age_minutes: i64) -> NewBin {
        NewBin {
            location: Some(location.into()),
            fullness_percentage: fullness,
            status: BinStatus::from_fullness(fullness),
            last_collected: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn lists_most_recently_collected_first() {
        let repo = InMemoryBinRepository::new();
        repo.insert(new_bin("old", 10.0, 60)).await.unwrap();
        repo.insert(new_bin("new", 20.0, 1)).await.unwrap();
        repo.insert(new_bin("mid", 30.0, 30)).await.unwrap();

        let locations: Vec<_> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.location.unwrap())
            .collect();
        assert_eq!(locations, ["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn update_merges_only_supplied_fields() {
        let repo = InMemoryBinRepository::new();
        let bin = repo.insert(new_bin("Lobby", 10.0, 0)).await.unwrap();

        let updated = repo
            .update_by_id(
                bin.id,
                BinPatch {
                    fullness_percentage: Some(0.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.location.as_deref(), Some("Lobby"));
        assert_eq!(updated.status, BinStatus::Empty);
        assert_eq!(updated.last_collected, bin.last_collected);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_none() {
        let repo = InMemoryBinRepository::new();
        let result = repo
            .update_by_id(ObjectId::new(), BinPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
