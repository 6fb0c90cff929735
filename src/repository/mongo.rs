//! MongoDB-backed bin repository.
//!
//! Documents are stored as
//! `{ _id, location, fullnessPercentage, status, lastCollected }` with
//! `lastCollected` as a BSON date so the collection sorts natively.
//!
//! The stored `status` is never trusted on read; it is re-derived from
//! `fullnessPercentage`. Listing skips documents that do not decode at all.

use super::{BinRepository, RepositoryError, RepositoryResult};
use crate::models::bin::{Bin, BinPatch, BinStatus, NewBin};
use async_trait::async_trait;
use bson::{Bson, Document, doc, oid::ObjectId};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{Client, Collection, Database, options::ReturnDocument};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// On-disk shape of a bin.
#[derive(Debug, Serialize, Deserialize)]
struct BinDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(rename = "fullnessPercentage")]
    fullness_percentage: f64,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    status: Option<BinStatus>,
    #[serde(
        rename = "lastCollected",
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    last_collected: DateTime<Utc>,
}

impl From<&NewBin> for BinDocument {
    fn from(bin: &NewBin) -> Self {
        Self {
            id: None,
            location: bin.location.clone(),
            fullness_percentage: bin.fullness_percentage,
            status: Some(bin.status),
            last_collected: bin.last_collected,
        }
    }
}

impl TryFrom<BinDocument> for Bin {
    type Error = RepositoryError;

    fn try_from(doc: BinDocument) -> RepositoryResult<Self> {
        Ok(Bin {
            id: doc.id.ok_or(RepositoryError::MissingId)?,
            location: doc.location,
            fullness_percentage: doc.fullness_percentage,
            status: BinStatus::from_fullness(doc.fullness_percentage),
            last_collected: doc.last_collected,
        })
    }
}

#[derive(Clone)]
pub struct MongoBinRepository {
    db: Database,
    bins: Collection<BinDocument>,
}

impl MongoBinRepository {
    /// Connect and ping, so an unreachable store fails at startup rather
    /// than on the first request.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> RepositoryResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await?;
        info!("Connected to MongoDB database {}", database);

        Ok(Self {
            bins: db.collection(collection),
            db,
        })
    }
}

/// `$set` body for a patch. Status is written only alongside fullness.
fn set_document(patch: &BinPatch) -> Document {
    let mut set = Document::new();
    if let Some(location) = &patch.location {
        set.insert("location", location.as_str());
    }
    if let Some(fullness) = patch.fullness_percentage {
        set.insert("fullnessPercentage", fullness);
    }
    if let Some(status) = patch.status() {
        set.insert("status", status.as_str());
    }
    if let Some(last_collected) = patch.last_collected {
        set.insert("lastCollected", bson::DateTime::from_chrono(last_collected));
    }
    set
}

/// Decode one listed document, logging and dropping it if it is not a bin.
fn decode_listed(raw: Document) -> Option<Bin> {
    let id = raw.get("_id").cloned();
    let decoded = bson::from_document::<BinDocument>(raw)
        .map_err(RepositoryError::from)
        .and_then(Bin::try_from);
    match decoded {
        Ok(bin) => Some(bin),
        Err(err) => {
            warn!("skipping undecodable bin document {:?}: {}", id, err);
            None
        }
    }
}

#[async_trait]
impl BinRepository for MongoBinRepository {
    async fn list_all(&self) -> RepositoryResult<Vec<Bin>> {
        let docs: Vec<Document> = self
            .bins
            .clone_with_type::<Document>()
            .find(doc! {})
            .sort(doc! { "lastCollected": -1 })
            .await?
            .try_collect()
            .await?;

        Ok(docs.into_iter().filter_map(decode_listed).collect())
    }

    async fn insert(&self, bin: NewBin) -> RepositoryResult<Bin> {
        let result = self.bins.insert_one(BinDocument::from(&bin)).await?;
        let id = match result.inserted_id {
            Bson::ObjectId(id) => id,
            other => return Err(RepositoryError::UnexpectedId(other)),
        };
        debug!("inserted bin {}", id);

        Ok(Bin::from_new(id, bin))
    }

    async fn update_by_id(&self, id: ObjectId, patch: BinPatch) -> RepositoryResult<Option<Bin>> {
        let filter = doc! { "_id": id };
        let updated = if patch.is_empty() {
            self.bins.find_one(filter).await?
        } else {
            self.bins
                .find_one_and_update(filter, doc! { "$set": set_document(&patch) })
                .return_document(ReturnDocument::After)
                .await?
        };

        updated.map(Bin::try_from).transpose()
    }

    async fn ping(&self) -> RepositoryResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn set_document_writes_derived_status_with_fullness() {
        let patch = BinPatch {
            fullness_percentage: Some(0.0),
            ..Default::default()
        };
        let set = set_document(&patch);
        assert_eq!(set.get_f64("fullnessPercentage").unwrap(), 0.0);
        assert_eq!(set.get_str("status").unwrap(), "empty");
        assert!(!set.contains_key("location"));
    }

    #[test]
    fn set_document_leaves_status_alone_without_fullness() {
        let at = Utc.with_ymd_and_hms(2026, 10, 15, 8, 0, 0).unwrap();
        let patch = BinPatch {
            location: Some("Dock".into()),
            last_collected: Some(at),
            ..Default::default()
        };
        let set = set_document(&patch);
        assert_eq!(set.get_str("location").unwrap(), "Dock");
        assert_eq!(
            set.get_datetime("lastCollected").unwrap(),
            &bson::DateTime::from_chrono(at)
        );
        assert!(!set.contains_key("status"));
    }

    #[test]
    fn document_round_trips_through_bson() {
        let new = NewBin {
            location: Some("Lobby".into()),
            fullness_percentage: 55.0,
            status: BinStatus::Partial,
            last_collected: Utc.with_ymd_and_hms(2026, 10, 15, 8, 0, 0).unwrap(),
        };
        let mut raw = bson::to_document(&BinDocument::from(&new)).unwrap();
        assert!(!raw.contains_key("_id"));
        let id = ObjectId::new();
        raw.insert("_id", id);

        let doc: BinDocument = bson::from_document(raw).unwrap();
        assert_eq!(Bin::try_from(doc).unwrap(), Bin::from_new(id, new));
    }

    #[test]
    fn integer_fullness_from_legacy_documents_is_accepted() {
        let raw = doc! {
            "_id": ObjectId::new(),
            "location": "Ward 3",
            "fullnessPercentage": 100_i32,
            "status": "full",
            "lastCollected": bson::DateTime::now(),
        };
        let doc: BinDocument = bson::from_document(raw).unwrap();
        assert_eq!(doc.fullness_percentage, 100.0);
    }

    #[test]
    fn listed_status_is_rederived_from_fullness() {
        let raw = doc! {
            "_id": ObjectId::new(),
            "location": "Ward 3",
            "fullnessPercentage": 0_i32,
            "status": "overflowing",
            "lastCollected": bson::DateTime::now(),
        };
        let bin = decode_listed(raw).unwrap();
        assert_eq!(bin.status, BinStatus::Empty);
    }

    #[test]
    fn listing_skips_documents_that_are_not_bins() {
        let missing_fullness = doc! {
            "_id": ObjectId::new(),
            "location": "Ward 3",
            "lastCollected": bson::DateTime::now(),
        };
        assert!(decode_listed(missing_fullness).is_none());

        let text_timestamp = doc! {
            "_id": ObjectId::new(),
            "fullnessPercentage": 10.0,
            "lastCollected": "last tuesday",
        };
        assert!(decode_listed(text_timestamp).is_none());
    }
}
