//! Schema detection and station normalization.
//!
//! Converts one raw payload into canonical [`Station`] records for a
//! single fetch cycle. Extraction is per-record and infallible: a
//! malformed field yields its default, and only the geographic sanity
//! filter can drop a record. A bad record never sinks the batch.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde_json::Value;
use tracing::debug;

use crate::domain::{BoundingBox, LocaleText, Station, StationId};

/// Fallback chains, most specific name first. The legacy feed mixes
/// French and English field names; the explore feed appends locale
/// suffixes.
const NAME_FR: &[&str] = &["name_fr", "nom", "name"];
const NAME_NL: &[&str] = &["name_nl", "name", "nom"];
const ADDRESS_FR: &[&str] = &["address_fr", "adresse", "address"];
const ADDRESS_NL: &[&str] = &["address_nl", "address", "adresse"];
const BIKES: &[&str] = &["available_bikes", "available_bike"];
const SLOTS: &[&str] = &["available_bike_stands", "available_bike_stand"];
const CAPACITY: &[&str] = &["bike_stands", "capacity"];
const LATITUDE: &[&str] = &["latitude", "lat"];
const LONGITUDE: &[&str] = &["longitude", "lon", "lng"];
const GEO_POINT: &[&str] = &["geo_point_2d", "position", "coordinates"];
const ID: &[&str] = &["id", "number", "station_id"];
const LAST_UPDATE: &[&str] = &["last_update", "lastupdate", "record_timestamp"];

const NAME_PLACEHOLDER: &str = "Unknown station";
const ADDRESS_PLACEHOLDER: &str = "No address";

/// Detected top-level payload shape, carrying the record array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Schema<'a> {
    /// Explore-API shape: `{results: [...]}`, canonical field names.
    New(&'a [Value]),
    /// Legacy shape: `{records: [{fields: {...}}, ...]}`.
    Legacy(&'a [Value]),
    /// Anything else; normalization yields an empty batch rather than
    /// guessing.
    Unrecognized,
}

/// Inspect the top-level shape of a payload.
pub fn detect_schema(payload: &Value) -> Schema<'_> {
    if let Some(results) = payload.get("results").and_then(Value::as_array) {
        Schema::New(results)
    } else if let Some(records) = payload.get("records").and_then(Value::as_array) {
        Schema::Legacy(records)
    } else {
        Schema::Unrecognized
    }
}

/// Normalize a payload against the Brussels service region.
///
/// `now` becomes the `last_update` of records that omit a timestamp;
/// passing it explicitly keeps the function deterministic (only the
/// fallback-generated ids of id-less records differ across runs).
pub fn normalize(payload: &Value, now: DateTime<Utc>) -> Vec<Station> {
    normalize_within(payload, &BoundingBox::brussels(), now)
}

/// Normalize a payload against an explicit bounding box.
///
/// Output order follows input order after filtering. Pure: no I/O, no
/// shared state.
pub fn normalize_within(payload: &Value, bounds: &BoundingBox, now: DateTime<Utc>) -> Vec<Station> {
    // The application proxy wraps the upstream payload in a
    // `{success, data, ...}` envelope; unwrap it before detection.
    let payload = match payload.get("data") {
        Some(data) if data.is_object() => data,
        _ => payload,
    };

    let (records, legacy) = match detect_schema(payload) {
        Schema::New(records) => (records, false),
        Schema::Legacy(records) => (records, true),
        Schema::Unrecognized => {
            debug!("unrecognized payload shape, yielding empty batch");
            return Vec::new();
        }
    };

    let mut seen_ids: HashSet<String> = HashSet::with_capacity(records.len());
    let mut stations = Vec::with_capacity(records.len());

    for record in records {
        // Legacy records nest their data under `fields`; fall back to
        // the record itself when that wrapper is absent.
        let fields = if legacy {
            match record.get("fields") {
                Some(f) if f.is_object() => f,
                _ => record,
            }
        } else {
            record
        };

        if let Some(station) = normalize_record(fields, bounds, now, &mut seen_ids) {
            stations.push(station);
        }
    }

    stations
}

/// Normalize one record; `None` means the geo filter dropped it.
fn normalize_record(
    fields: &Value,
    bounds: &BoundingBox,
    now: DateTime<Utc>,
    seen_ids: &mut HashSet<String>,
) -> Option<Station> {
    let (latitude, longitude) = extract_coords(fields).unwrap_or((0.0, 0.0));

    // (0,0) is the upstream placeholder for missing coordinates; the
    // box catches everything else malformed.
    if (latitude == 0.0 && longitude == 0.0) || !bounds.contains(latitude, longitude) {
        debug!(latitude, longitude, "dropping station outside service region");
        return None;
    }

    let id = derive_id(fields).unwrap_or_else(|| generated_id(seen_ids));
    seen_ids.insert(id.clone());

    Some(Station {
        id: StationId::new(id),
        name: LocaleText::new(
            text_field(fields, NAME_FR),
            text_field(fields, NAME_NL),
            NAME_PLACEHOLDER,
        ),
        address: LocaleText::new(
            text_field(fields, ADDRESS_FR),
            text_field(fields, ADDRESS_NL),
            ADDRESS_PLACEHOLDER,
        ),
        bikes_available: count_field(fields, BIKES),
        slots_available: count_field(fields, SLOTS),
        capacity: count_field(fields, CAPACITY),
        latitude,
        longitude,
        status: text_field(fields, &["status"]).unwrap_or_else(|| "OPEN".to_string()),
        last_update: text_field(fields, LAST_UPDATE).unwrap_or_else(|| now.to_rfc3339()),
    })
}

/// First non-null value along a fallback chain.
fn first_field<'a>(fields: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| fields.get(*name))
        .find(|v| !v.is_null())
}

/// First non-blank string along a fallback chain.
fn text_field(fields: &Value, names: &[&str]) -> Option<String> {
    first_field(fields, names)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Non-negative count along a fallback chain; 0 on missing/invalid.
fn count_field(fields: &Value, names: &[&str]) -> u32 {
    first_field(fields, names).and_then(as_u32).unwrap_or(0)
}

/// Coerce a JSON number or numeric string to a non-negative count.
fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u32::try_from(u).ok()
            } else {
                // Tolerate "12.0"-style floats; negatives stay invalid.
                n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u32)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f.trunc() as u32))
        }
        _ => None,
    }
}

/// Coerce a JSON number or numeric string to a float.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Extract coordinates: scalar fields first, then a composite point
/// (object with named components, or a `[lat, lon]` pair).
fn extract_coords(fields: &Value) -> Option<(f64, f64)> {
    let lat = first_field(fields, LATITUDE).and_then(as_f64);
    let lon = first_field(fields, LONGITUDE).and_then(as_f64);
    if let (Some(lat), Some(lon)) = (lat, lon) {
        return Some((lat, lon));
    }

    first_field(fields, GEO_POINT).and_then(point_components)
}

fn point_components(point: &Value) -> Option<(f64, f64)> {
    match point {
        Value::Object(_) => {
            let lat = first_field(point, LATITUDE).and_then(as_f64)?;
            let lon = first_field(point, LONGITUDE).and_then(as_f64)?;
            Some((lat, lon))
        }
        Value::Array(parts) if parts.len() == 2 => {
            Some((as_f64(&parts[0])?, as_f64(&parts[1])?))
        }
        _ => None,
    }
}

/// Source id when one exists: `id` → `number` → `station_id`.
fn derive_id(fields: &Value) -> Option<String> {
    first_field(fields, ID).and_then(|value| match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Fresh random token for an id-less record, unique within the batch
/// but not stable across fetch cycles.
fn generated_id(seen_ids: &HashSet<String>) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let token: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();
        let id = format!("gen-{token}");
        if !seen_ids.contains(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::Locale;

    fn at_noon() -> DateTime<Utc> {
        "2024-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn detect_new_schema() {
        let payload = json!({"results": [{"id": "1"}]});
        assert!(matches!(detect_schema(&payload), Schema::New(r) if r.len() == 1));
    }

    #[test]
    fn detect_legacy_schema() {
        let payload = json!({"records": [{"fields": {}}]});
        assert!(matches!(detect_schema(&payload), Schema::Legacy(r) if r.len() == 1));
    }

    #[test]
    fn detect_unrecognized_schema() {
        assert!(matches!(detect_schema(&json!({"foo": 1})), Schema::Unrecognized));
        assert!(matches!(detect_schema(&json!([1, 2])), Schema::Unrecognized));
        assert!(matches!(
            detect_schema(&json!({"results": "not an array"})),
            Schema::Unrecognized
        ));
    }

    #[test]
    fn new_schema_end_to_end() {
        let payload = json!({"results": [{
            "id": "1",
            "name_nl": "Gare",
            "available_bikes": "12",
            "available_bike_stands": "3",
            "bike_stands": "15",
            "geo_point_2d": {"lat": 50.85, "lon": 4.35},
        }]});

        let stations = normalize(&payload, at_noon());
        assert_eq!(stations.len(), 1);
        let station = &stations[0];
        assert_eq!(station.id.as_str(), "1");
        assert_eq!(station.name.get(Locale::Nl), "Gare");
        assert_eq!(station.bikes_available, 12);
        assert_eq!(station.slots_available, 3);
        assert_eq!(station.capacity, 15);
        assert_eq!(station.latitude, 50.85);
        assert_eq!(station.longitude, 4.35);
    }

    #[test]
    fn legacy_schema_end_to_end() {
        let payload = json!({"records": [{"fields": {
            "nom": "Gare Sud",
            "adresse": "Rue X",
            "available_bike": "4",
            "position": {"lat": 50.84, "lon": 4.34},
        }}]});

        let stations = normalize(&payload, at_noon());
        assert_eq!(stations.len(), 1);
        let station = &stations[0];
        assert_eq!(station.name.get(Locale::Fr), "Gare Sud");
        assert_eq!(station.address.get(Locale::Fr), "Rue X");
        assert_eq!(station.bikes_available, 4);
    }

    #[test]
    fn legacy_record_without_fields_wrapper() {
        let payload = json!({"records": [{
            "name": "Sainctelette",
            "number": 23,
            "lat": 50.86,
            "lon": 4.35,
        }]});

        let stations = normalize(&payload, at_noon());
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id.as_str(), "23");
        assert_eq!(stations[0].name.get(Locale::Nl), "Sainctelette");
    }

    #[test]
    fn unrecognized_shape_yields_empty_batch() {
        assert!(normalize(&json!({"foo": 1}), at_noon()).is_empty());
        assert!(normalize(&json!(null), at_noon()).is_empty());
    }

    #[test]
    fn proxy_envelope_is_unwrapped() {
        let payload = json!({
            "success": true,
            "data": {"results": [{"id": "9", "lat": 50.85, "lon": 4.35}]},
            "total_results": 1,
        });

        let stations = normalize(&payload, at_noon());
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id.as_str(), "9");
    }

    #[test]
    fn origin_coordinates_are_dropped() {
        let payload = json!({"results": [{"id": "1", "lat": 0.0, "lon": 0.0}]});
        assert!(normalize(&payload, at_noon()).is_empty());
    }

    #[test]
    fn out_of_box_station_is_dropped_not_corrected() {
        let payload = json!({"results": [
            {"id": "in", "lat": 50.85, "lon": 4.35},
            {"id": "out", "lat": 60.0, "lon": 4.35},
        ]});

        let stations = normalize(&payload, at_noon());
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id.as_str(), "in");
    }

    #[test]
    fn missing_coordinates_drop_the_record_only() {
        let payload = json!({"results": [
            {"id": "no-geo", "name": "Nowhere"},
            {"id": "ok", "lat": 50.85, "lon": 4.35},
        ]});

        let stations = normalize(&payload, at_noon());
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id.as_str(), "ok");
    }

    #[test]
    fn scalar_coordinates_take_precedence_over_composite() {
        let payload = json!({"results": [{
            "id": "1",
            "latitude": 50.80,
            "longitude": 4.40,
            "geo_point_2d": {"lat": 50.90, "lon": 4.30},
        }]});

        let stations = normalize(&payload, at_noon());
        assert_eq!(stations[0].latitude, 50.80);
        assert_eq!(stations[0].longitude, 4.40);
    }

    #[test]
    fn composite_point_as_ordered_pair() {
        let payload = json!({"results": [{"id": "1", "coordinates": [50.85, 4.35]}]});

        let stations = normalize(&payload, at_noon());
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].latitude, 50.85);
        assert_eq!(stations[0].longitude, 4.35);
    }

    #[test]
    fn malformed_counts_default_to_zero() {
        let payload = json!({"results": [{
            "id": "1",
            "lat": 50.85,
            "lon": 4.35,
            "available_bikes": "a lot",
            "available_bike_stands": -3,
            "bike_stands": null,
        }]});

        let stations = normalize(&payload, at_noon());
        let station = &stations[0];
        assert_eq!(station.bikes_available, 0);
        assert_eq!(station.slots_available, 0);
        assert_eq!(station.capacity, 0);
    }

    #[test]
    fn null_fields_fall_through_the_chain() {
        let payload = json!({"results": [{
            "id": "1",
            "lat": 50.85,
            "lon": 4.35,
            "available_bikes": null,
            "available_bike": 7,
        }]});

        assert_eq!(normalize(&payload, at_noon())[0].bikes_available, 7);
    }

    #[test]
    fn status_and_last_update_defaults() {
        let payload = json!({"results": [{"id": "1", "lat": 50.85, "lon": 4.35}]});

        let now = at_noon();
        let station = &normalize(&payload, now)[0];
        assert_eq!(station.status, "OPEN");
        assert_eq!(station.last_update, now.to_rfc3339());
    }

    #[test]
    fn source_status_and_timestamp_are_kept() {
        let payload = json!({"results": [{
            "id": "1",
            "lat": 50.85,
            "lon": 4.35,
            "status": "CLOSED",
            "last_update": "2024-05-31T09:00:00Z",
        }]});

        let station = &normalize(&payload, at_noon())[0];
        assert_eq!(station.status, "CLOSED");
        assert_eq!(station.last_update, "2024-05-31T09:00:00Z");
    }

    #[test]
    fn id_derivation_order() {
        let fields = json!({"id": "a", "number": 7, "station_id": "z"});
        assert_eq!(derive_id(&fields).unwrap(), "a");

        let fields = json!({"number": 7, "station_id": "z"});
        assert_eq!(derive_id(&fields).unwrap(), "7");

        let fields = json!({"station_id": "z"});
        assert_eq!(derive_id(&fields).unwrap(), "z");

        assert!(derive_id(&json!({"name": "x"})).is_none());
    }

    #[test]
    fn id_less_records_get_unique_generated_ids() {
        let payload = json!({"records": [
            {"fields": {"nom": "A", "position": {"lat": 50.85, "lon": 4.35}}},
            {"fields": {"nom": "B", "position": {"lat": 50.86, "lon": 4.36}}},
        ]});

        let stations = normalize(&payload, at_noon());
        assert_eq!(stations.len(), 2);
        assert_ne!(stations[0].id, stations[1].id);
        assert!(stations[0].id.as_str().starts_with("gen-"));
    }

    #[test]
    fn non_random_fields_are_idempotent() {
        let payload = json!({"results": [{
            "name_fr": "Bourse",
            "available_bikes": 5,
            "geo_point_2d": {"lat": 50.85, "lon": 4.35},
        }]});

        let now = at_noon();
        let first = normalize(&payload, now);
        let second = normalize(&payload, now);
        assert_eq!(first[0].name, second[0].name);
        assert_eq!(first[0].bikes_available, second[0].bikes_available);
        assert_eq!(first[0].latitude, second[0].latitude);
        assert_eq!(first[0].last_update, second[0].last_update);
        // Only the fallback-generated id may differ across runs.
    }

    #[test]
    fn order_follows_input_after_filtering() {
        let payload = json!({"results": [
            {"id": "1", "lat": 50.85, "lon": 4.35},
            {"id": "dropped", "lat": 0.0, "lon": 0.0},
            {"id": "2", "lat": 50.86, "lon": 4.36},
        ]});

        let ids: Vec<_> = normalize(&payload, at_noon())
            .iter()
            .map(|s| s.id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
