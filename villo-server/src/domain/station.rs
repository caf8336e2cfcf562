//! Canonical station record.

use std::fmt;

use super::LocaleText;

/// Identifier for one station within a fetch result.
///
/// Derived from the source `id`/`number`/`station_id` field when one is
/// present, or a generated per-batch token otherwise. Generated ids are
/// unique within a batch but **not stable across fetch cycles** —
/// callers must not persist them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        StationId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One bike-share dock: location, capacity, current availability.
///
/// Stations are constructed fresh on every fetch cycle and replaced
/// wholesale; they are never mutated in place. The favorite flag lives
/// in web-layer state keyed by [`StationId`], not here.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: LocaleText,
    pub address: LocaleText,
    pub bikes_available: u32,
    pub slots_available: u32,
    /// Total dock count; 0 when the source does not report it.
    pub capacity: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub status: String,
    /// RFC 3339 timestamp of the source record, or of normalization
    /// when the source omits it.
    pub last_update: String,
}
