//! Geospatial module
//!
//! Points, the static hazard zone tables, and degree-space proximity scoring.

mod point;
mod zones;

pub use point::{GeoPoint, Location};
pub use zones::{
    proximity_from_distance, HazardZone, ZoneTable, CYCLONE_ZONES, FLOOD_ZONES, HEATWAVE_ZONES,
    SEISMIC_ZONES,
};
