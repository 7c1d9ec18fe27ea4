//! Geographic points

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
///
/// Values are not range-checked; out-of-range coordinates simply end up far
/// from every zone.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Planar distance in degree space, `sqrt(dlat^2 + dlon^2)`
    pub fn degree_distance(&self, other: &GeoPoint) -> f64 {
        let dlat = self.latitude - other.latitude;
        let dlon = self.longitude - other.longitude;
        (dlat * dlat + dlon * dlon).sqrt()
    }
}

/// A caller-supplied location where either coordinate may be missing
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Fill missing coordinates from `default`
    pub fn or(&self, default: GeoPoint) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude.unwrap_or(default.latitude),
            longitude: self.longitude.unwrap_or(default.longitude),
        }
    }

    /// Fill missing coordinates with zero
    pub fn resolve(&self) -> GeoPoint {
        self.or(GeoPoint::default())
    }
}

impl From<GeoPoint> for Location {
    fn from(point: GeoPoint) -> Self {
        Self::new(point.latitude, point.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_distance_is_planar() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(3.0, 4.0);
        assert_eq!(a.degree_distance(&b), 5.0);
    }

    #[test]
    fn test_location_defaults() {
        let partial: Location = serde_json::from_str(r#"{"longitude": 12.5}"#).unwrap();
        assert_eq!(partial.resolve(), GeoPoint::new(0.0, 12.5));
        assert_eq!(partial.or(GeoPoint::new(15.0, 0.0)), GeoPoint::new(15.0, 12.5));
    }

    #[test]
    fn test_out_of_range_is_accepted() {
        let far = Location::new(500.0, -900.0).resolve();
        assert_eq!(far.latitude, 500.0);
        assert!(far.degree_distance(&GeoPoint::default()) > 900.0);
    }
}
