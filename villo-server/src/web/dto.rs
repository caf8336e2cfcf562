//! Wire formats for the web layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Locale, Station};

/// Query string for the action-dispatch proxy endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiQuery {
    pub action: Option<String>,
}

/// Successful proxy response, wrapping the raw upstream payload.
#[derive(Debug, Serialize)]
pub struct ProxySuccess<'a> {
    pub success: bool,
    pub data: &'a Value,
    pub timestamp: String,
    pub total_results: usize,
}

/// Failed proxy response; `available_actions` only on bad requests.
#[derive(Debug, Serialize)]
pub struct ProxyFailure {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_actions: Option<&'static [&'static str]>,
}

/// Health-check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: String,
}

/// Query string for the normalized stations endpoint.
#[derive(Debug, Deserialize)]
pub struct StationsQuery {
    pub locale: Option<String>,
}

/// Normalized station list response.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub stations: Vec<StationView>,
    pub count: usize,
}

/// One station as served to the presentation layer, with the text
/// already resolved to the requested locale.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationView {
    pub id: String,
    pub name: String,
    pub address: String,
    pub bikes_available: u32,
    pub slots_available: u32,
    pub capacity: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub status: String,
    pub last_update: String,
    pub favorite: bool,
}

impl StationView {
    pub fn from_station(station: &Station, locale: Locale, favorite: bool) -> Self {
        Self {
            id: station.id.to_string(),
            name: station.name.get(locale).to_string(),
            address: station.address.get(locale).to_string(),
            bikes_available: station.bikes_available,
            slots_available: station.slots_available,
            capacity: station.capacity,
            latitude: station.latitude,
            longitude: station.longitude,
            status: station.status.clone(),
            last_update: station.last_update.clone(),
            favorite,
        }
    }
}

/// Manual-refresh response: how many stations the fresh cycle yielded.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub count: usize,
}

/// Favorite-toggle response.
#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub id: String,
    pub favorite: bool,
}

/// Generic error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
