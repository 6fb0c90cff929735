//! Represents a monitored waste bin and the values used to create and patch it.

use bson::oid::ObjectId;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Fullness category of a bin, always derived from `fullnessPercentage`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BinStatus {
    Empty,
    Partial,
    Full,
}

impl BinStatus {
    /// `empty` at exactly 0, `full` at 100 or above, `partial` otherwise.
    pub fn from_fullness(fullness: f64) -> Self {
        if fullness == 0.0 {
            BinStatus::Empty
        } else if fullness >= 100.0 {
            BinStatus::Full
        } else {
            BinStatus::Partial
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinStatus::Empty => "empty",
            BinStatus::Partial => "partial",
            BinStatus::Full => "full",
        }
    }
}

impl fmt::Display for BinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored bin record.
#[derive(Clone, Debug, PartialEq)]
pub struct Bin {
    /// Store-assigned identifier, immutable after creation.
    pub id: ObjectId,

    /// Free-form description of where the bin is placed.
    pub location: Option<String>,

    /// Fill level in the inclusive range [0, 100].
    pub fullness_percentage: f64,

    /// Category derived from `fullness_percentage`.
    pub status: BinStatus,

    /// When the bin was last emptied. Defaults to creation time.
    pub last_collected: DateTime<Utc>,
}

impl Bin {
    /// Build the stored record for a freshly inserted bin.
    pub fn from_new(id: ObjectId, new: NewBin) -> Self {
        Self {
            id,
            location: new.location,
            fullness_percentage: new.fullness_percentage,
            status: new.status,
            last_collected: new.last_collected,
        }
    }

    /// Merge the supplied fields of `patch` into this record.
    pub fn apply(&mut self, patch: &BinPatch) {
        if let Some(location) = &patch.location {
            self.location = Some(location.clone());
        }
        if let Some(fullness) = patch.fullness_percentage {
            self.fullness_percentage = fullness;
            self.status = BinStatus::from_fullness(fullness);
        }
        if let Some(last_collected) = patch.last_collected {
            self.last_collected = last_collected;
        }
    }
}

/// JSON view of a bin: the identifier is exposed both as the store-native
/// `_id` and as the `id` string the frontend keys on.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BinJson<'a> {
    #[serde(rename = "_id")]
    store_id: String,
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    fullness_percentage: f64,
    status: BinStatus,
    last_collected: String,
}

impl Serialize for Bin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let hex = self.id.to_hex();
        BinJson {
            store_id: hex.clone(),
            id: hex,
            location: self.location.as_deref(),
            fullness_percentage: self.fullness_percentage,
            status: self.status,
            last_collected: self
                .last_collected
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
        .serialize(serializer)
    }
}

/// Validated fields of a create request.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateBin {
    pub location: Option<String>,
    pub fullness_percentage: f64,
}

/// A bin ready for insertion: status derived, timestamp stamped.
#[derive(Clone, Debug, PartialEq)]
pub struct NewBin {
    pub location: Option<String>,
    pub fullness_percentage: f64,
    pub status: BinStatus,
    pub last_collected: DateTime<Utc>,
}

impl NewBin {
    /// `collected_at` is truncated to milliseconds, the precision the store keeps.
    pub fn new(request: CreateBin, collected_at: DateTime<Utc>) -> Self {
        Self {
            status: BinStatus::from_fullness(request.fullness_percentage),
            location: request.location,
            fullness_percentage: request.fullness_percentage,
            last_collected: collected_at.trunc_subsecs(3),
        }
    }
}

/// Typed partial update. Only `Some` fields are written.
///
/// There is no status field: whenever fullness is patched the status is
/// recomputed from it, so a patch can never leave the two inconsistent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BinPatch {
    pub location: Option<String>,
    pub fullness_percentage: Option<f64>,
    pub last_collected: Option<DateTime<Utc>>,
}

impl BinPatch {
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.fullness_percentage.is_none()
            && self.last_collected.is_none()
    }

    /// Status to write alongside the patch, if fullness changes.
    pub fn status(&self) -> Option<BinStatus> {
        self.fullness_percentage.map(BinStatus::from_fullness)
    }
}
