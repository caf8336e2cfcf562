//! Brussels open-data integration.
//!
//! The Villo availability dataset has been served under two response
//! shapes over the years:
//! - the explore-API shape, a top-level `results` array of records
//!   with canonical field names
//! - the legacy shape, a top-level `records` array where each record
//!   nests its data under a `fields` object
//!
//! Field names also drift between deployments (`available_bikes` vs
//! `available_bike`, `adresse` vs `address`), and geo-coordinates come
//! either as scalar fields or as a composite point. This module fetches
//! a raw payload from whichever source answers first and normalizes it
//! into canonical [`Station`](crate::domain::Station) records.

mod client;
mod error;
mod normalize;
mod orchestrator;

pub use client::{SourceClient, SourceClientConfig};
pub use error::{FetchError, SourceError};
pub use normalize::{Schema, detect_schema, normalize, normalize_within};
pub use orchestrator::{FetchOrchestrator, OrchestratorConfig, RawPayload, Source};
