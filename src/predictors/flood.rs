//! Flood prediction
//!
//! Gradient boosting over hydrological readings. The location only matters
//! for the nearest-basin factor and the proximity assessment.

use super::{classified_result, predicted_time, RiskAssessor, BASIN_RADIUS};
use crate::config::{BoostingSettings, EngineConfig};
use crate::data::Features;
use crate::geo::{proximity_from_distance, Location, ZoneTable, FLOOD_ZONES};
use crate::models::{classify_or_fallback, ClassPrediction, GbmClassifier};
use crate::risk::{
    round3, Clock, DisasterType, HazardKind, PredictionResult, RiskAssessment, RiskLevel, Severity,
    SystemClock,
};
use crate::training::{FloodTrainer, SyntheticTrainer};
use chrono::Datelike;
use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{debug, warn};

/// Months (1-based) during which flood scores get the seasonal bump
pub const MONSOON_MONTHS: RangeInclusive<u32> = 6..=9;

/// Added to the flood score during the monsoon months
pub const MONSOON_ADJUSTMENT: f64 = 0.1;

/// (feature, default) in training order
const FLOOD_DEFAULTS: [(&str, f64); 6] = [
    ("rainfall", 20.0),
    ("water_level", 2.0),
    ("elevation", 50.0),
    ("soil_moisture", 0.5),
    ("river_proximity", 10.0),
    ("days_since_rain", 3.0),
];

/// Hydrological risk predictor
#[derive(Debug)]
pub struct FloodPredictor {
    model: Option<GbmClassifier>,
    zones: ZoneTable,
    clock: Arc<dyn Clock>,
}

impl FloodPredictor {
    pub const MODEL_NAME: &'static str = "flood-gradient-boosting";
    pub const MODEL_VERSION: &'static str = "3.0";

    pub fn new(settings: BoostingSettings, seed: u64) -> Self {
        Self::with_model(FloodTrainer::new(settings, seed).train())
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.flood.clone(), config.seed)
    }

    pub fn with_model(model: Option<GbmClassifier>) -> Self {
        Self {
            model,
            zones: FLOOD_ZONES,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn feature_vector(&self, features: &Features) -> [f64; 6] {
        FLOOD_DEFAULTS.map(|(name, default)| features.get_or(name, default))
    }

    pub fn classify(&self, features: &Features) -> ClassPrediction {
        if self.model.is_none() {
            warn!("Flood model unavailable, serving fallback distribution");
        }
        classify_or_fallback(self.model.as_ref(), &self.feature_vector(features))
    }

    pub fn predict(&self, location: &Location, features: &Features) -> PredictionResult {
        self.predict_with_rng(location, features, &mut rand::thread_rng())
    }

    pub fn predict_with_rng<R: Rng + ?Sized>(
        &self,
        location: &Location,
        features: &Features,
        rng: &mut R,
    ) -> PredictionResult {
        let [rainfall, water_level, elevation, soil_moisture, river_proximity, _] =
            self.feature_vector(features);
        let prediction = self.classify(features);
        let (zone, _) = self.zones.nearest_zone(&location.resolve());

        debug!(class = prediction.class, zone = zone.name, "Flood prediction");

        classified_result(
            DisasterType::Flood,
            &prediction,
            Self::MODEL_NAME,
            Self::MODEL_VERSION,
            predicted_time(self.clock.now(), 6..48, rng),
            vec![
                format!("Rainfall: {:.1} mm", rainfall),
                format!("Water level: {:.1} m", water_level),
                format!("Elevation: {:.0} m", elevation),
                format!("Soil moisture: {:.0}%", soil_moisture * 100.0),
                format!("River proximity: {:.1} km", river_proximity),
                format!("Nearest flood basin: {}", zone.name),
            ],
        )
    }

    /// Proximity score against the flood basins.
    ///
    /// The level is bucketed from the proximity score alone; the monsoon
    /// adjustment only raises the reported score.
    pub fn assess_risk(&self, location: &Location) -> RiskAssessment {
        let point = location.resolve();
        let (zone, distance) = self.zones.nearest_zone(&point);
        let proximity = proximity_from_distance(distance, BASIN_RADIUS);

        let mut factors = vec![format!("Proximity to {}", zone.name)];
        if let Some(elevation) = zone.elevation_m {
            factors.push(format!("Typical elevation: {}m", elevation));
        }

        let mut score = proximity;
        if MONSOON_MONTHS.contains(&self.clock.now().month()) {
            factors.push("Monsoon season active".to_string());
            score = (score + MONSOON_ADJUSTMENT).min(1.0);
        }

        let level = RiskLevel {
            level: Severity::from_hazard_score(proximity),
            score: round3(score),
            factors,
        };
        debug!(score = level.score, level = %level.level, "Flood assessment");

        RiskAssessment::from([(HazardKind::Flood, level)])
    }
}

impl RiskAssessor for FloodPredictor {
    fn assess_risk(&self, location: &Location) -> RiskAssessment {
        FloodPredictor::assess_risk(self, location)
    }

    fn is_ready(&self) -> bool {
        FloodPredictor::is_ready(self)
    }
}
