//! Static hazard zone tables and proximity scoring

use super::point::GeoPoint;
use serde::Serialize;

/// A named reference point with a base risk weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HazardZone {
    pub name: &'static str,
    pub center: GeoPoint,
    pub risk_base: f64,
    /// Typical elevation in metres, recorded for flood basins
    pub elevation_m: Option<f64>,
}

impl HazardZone {
    pub const fn new(name: &'static str, latitude: f64, longitude: f64, risk_base: f64) -> Self {
        Self {
            name,
            center: GeoPoint::new(latitude, longitude),
            risk_base,
            elevation_m: None,
        }
    }

    pub const fn with_elevation(mut self, elevation_m: f64) -> Self {
        self.elevation_m = Some(elevation_m);
        self
    }
}

/// Non-empty, immutable list of zones for one hazard family
#[derive(Debug, Clone, Copy)]
pub struct ZoneTable {
    zones: &'static [HazardZone],
}

impl ZoneTable {
    /// Panics (at compile time for `const` tables) if `zones` is empty
    pub const fn new(zones: &'static [HazardZone]) -> Self {
        assert!(!zones.is_empty(), "zone table must not be empty");
        Self { zones }
    }

    pub fn zones(&self) -> &'static [HazardZone] {
        self.zones
    }

    /// Zone with the smallest degree-space distance to `point`.
    ///
    /// Exact ties keep the zone listed first.
    pub fn nearest_zone(&self, point: &GeoPoint) -> (&'static HazardZone, f64) {
        let zones: &'static [HazardZone] = self.zones;
        let mut best = &zones[0];
        let mut best_distance = point.degree_distance(&best.center);
        for zone in &zones[1..] {
            let distance = point.degree_distance(&zone.center);
            if distance < best_distance {
                best = zone;
                best_distance = distance;
            }
        }
        (best, best_distance)
    }

    /// Distance to the nearest zone
    pub fn min_distance(&self, point: &GeoPoint) -> f64 {
        self.nearest_zone(point).1
    }

    /// `clamp(1 - distance / radius, 0, 1)` against the nearest zone
    pub fn proximity_score(&self, point: &GeoPoint, normalization_radius: f64) -> f64 {
        proximity_from_distance(self.min_distance(point), normalization_radius)
    }
}

/// Linear falloff from 1 at distance zero to 0 at `normalization_radius`
pub fn proximity_from_distance(distance: f64, normalization_radius: f64) -> f64 {
    (1.0 - distance / normalization_radius).clamp(0.0, 1.0)
}

/// Known tectonic plate boundaries / fault systems
pub const SEISMIC_ZONES: ZoneTable = ZoneTable::new(&[
    HazardZone::new("Pacific Ring of Fire", 35.0, 139.0, 0.7),
    HazardZone::new("Himalayan Belt", 28.0, 84.0, 0.65),
    HazardZone::new("San Andreas Fault", 37.0, -122.0, 0.6),
    HazardZone::new("Indonesian Arc", -5.0, 110.0, 0.7),
    HazardZone::new("Philippine Fault", 14.0, 121.0, 0.55),
    HazardZone::new("Alpine-Himalayan Belt", 38.0, 46.0, 0.5),
    HazardZone::new("Mid-Atlantic Ridge", 30.0, -30.0, 0.4),
    HazardZone::new("East African Rift", -2.0, 36.0, 0.35),
]);

/// Flood-prone river basins and deltas
pub const FLOOD_ZONES: ZoneTable = ZoneTable::new(&[
    HazardZone::new("Ganges-Brahmaputra Delta", 23.5, 89.0, 0.8).with_elevation(5.0),
    HazardZone::new("Mekong Delta", 10.0, 106.0, 0.75).with_elevation(3.0),
    HazardZone::new("Mississippi Basin", 30.0, -90.0, 0.6).with_elevation(15.0),
    HazardZone::new("Rhine Valley", 51.0, 7.0, 0.5).with_elevation(25.0),
    HazardZone::new("Yellow River Basin", 35.0, 110.0, 0.65).with_elevation(20.0),
    HazardZone::new("Nile Delta", 31.0, 31.0, 0.55).with_elevation(8.0),
    HazardZone::new("Amazon Basin", -3.0, -60.0, 0.7).with_elevation(10.0),
    HazardZone::new("Indus Valley", 26.0, 68.0, 0.7).with_elevation(12.0),
]);

/// Tropical cyclone basins
pub const CYCLONE_ZONES: ZoneTable = ZoneTable::new(&[
    HazardZone::new("Bay of Bengal", 15.0, 87.0, 0.7),
    HazardZone::new("Arabian Sea", 15.0, 65.0, 0.5),
    HazardZone::new("Western Pacific", 20.0, 140.0, 0.75),
    HazardZone::new("Caribbean Sea", 18.0, -75.0, 0.65),
    HazardZone::new("Gulf of Mexico", 25.0, -90.0, 0.6),
    HazardZone::new("South Indian Ocean", -15.0, 70.0, 0.55),
]);

/// Heatwave belts
pub const HEATWAVE_ZONES: ZoneTable = ZoneTable::new(&[
    HazardZone::new("Thar Desert", 27.0, 71.0, 0.8),
    HazardZone::new("Sahara Region", 25.0, 10.0, 0.7),
    HazardZone::new("Australian Outback", -25.0, 135.0, 0.65),
    HazardZone::new("Middle East", 30.0, 45.0, 0.7),
    HazardZone::new("Indo-Gangetic Plain", 28.0, 80.0, 0.75),
]);
