//! Geographic sanity bounds for the service region.

/// A latitude/longitude bounding box.
///
/// The upstream feed occasionally carries placeholder or malformed
/// coordinates (most commonly exactly (0,0)). Stations outside the
/// configured box are dropped during normalization, never corrected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// The Brussels-Capital Region, with margin for edge stations.
    pub fn brussels() -> Self {
        Self {
            min_lat: 50.5,
            max_lat: 51.1,
            min_lon: 4.05,
            max_lon: 4.65,
        }
    }

    /// Whether a coordinate pair lies inside the box (inclusive edges).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}
