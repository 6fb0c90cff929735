//! Request validation, run before anything reaches the repository.
//!
//! Bodies arrive as untyped JSON so that a wrong type (e.g. a string where a
//! number is expected) yields the API's own error message rather than a
//! generic deserialization failure.

use crate::models::bin::{BinPatch, CreateBin};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

pub const MIN_FULLNESS: f64 = 0.0;
pub const MAX_FULLNESS: f64 = 100.0;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Fullness must be a number between 0 and 100")]
    InvalidFullness,
    /// Same rule as `InvalidFullness`, worded the way the update route reports it.
    #[error("Fullness must be 0-100")]
    FullnessOutOfRange,
    #[error("Invalid ID format")]
    InvalidId,
    #[error("Invalid JSON body")]
    MalformedBody,
    #[error("Request body must be a JSON object")]
    NotAnObject,
    #[error("Location must be a string")]
    InvalidLocation,
    #[error("lastCollected must be an RFC 3339 timestamp")]
    InvalidLastCollected,
    #[error("Bin id cannot be changed")]
    ImmutableId,
    #[error("Unknown field `{0}`")]
    UnknownField(String),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Accept a JSON number in `[0, 100]`.
pub fn validate_fullness(value: &Value) -> ValidationResult<f64> {
    let fullness = value.as_f64().ok_or(ValidationError::InvalidFullness)?;
    if !(MIN_FULLNESS..=MAX_FULLNESS).contains(&fullness) {
        return Err(ValidationError::InvalidFullness);
    }
    Ok(fullness)
}

/// Coerce a path segment into an ObjectId (24 hex characters).
pub fn validate_id(raw: &str) -> ValidationResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| ValidationError::InvalidId)
}

/// Validate a create body. A missing fullness is reported like an invalid one.
pub fn parse_new_bin(body: &Value) -> ValidationResult<CreateBin> {
    let fields = body.as_object().ok_or(ValidationError::InvalidFullness)?;

    let fullness_percentage = fields
        .get("fullnessPercentage")
        .ok_or(ValidationError::InvalidFullness)
        .and_then(validate_fullness)?;

    Ok(CreateBin {
        location: parse_location(fields)?,
        fullness_percentage,
    })
}

/// Validate an update body field by field into a [`BinPatch`].
///
/// A caller-supplied `status` is accepted but dropped: status is only ever
/// written as the value derived from a patched fullness.
pub fn parse_patch(body: &Value) -> ValidationResult<BinPatch> {
    let fields = body.as_object().ok_or(ValidationError::NotAnObject)?;
    let mut patch = BinPatch::default();

    for (key, value) in fields {
        match key.as_str() {
            "location" | "status" => {}
            "fullnessPercentage" => {
                let fullness =
                    validate_fullness(value).map_err(|_| ValidationError::FullnessOutOfRange)?;
                patch.fullness_percentage = Some(fullness);
            }
            "lastCollected" => {
                let raw = value
                    .as_str()
                    .ok_or(ValidationError::InvalidLastCollected)?;
                let parsed = DateTime::parse_from_rfc3339(raw)
                    .map_err(|_| ValidationError::InvalidLastCollected)?;
                patch.last_collected = Some(parsed.with_timezone(&Utc));
            }
            "id" | "_id" => return Err(ValidationError::ImmutableId),
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
    }
    patch.location = parse_location(fields)?;

    Ok(patch)
}

fn parse_location(fields: &Map<String, Value>) -> ValidationResult<Option<String>> {
    match fields.get("location") {
        None => Ok(None),
        Some(Value::String(location)) => Ok(Some(location.clone())),
        Some(_) => Err(ValidationError::InvalidLocation),
    }
}
