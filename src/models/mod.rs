//! Core data models for the bin-tracking service.
//!
//! `Bin` is the only entity. It serializes as the JSON the HTTP API returns;
//! the MongoDB document shape lives next to the repository that owns it.

pub mod bin;
