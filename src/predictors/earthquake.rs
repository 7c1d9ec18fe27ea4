//! Earthquake prediction
//!
//! Random forest over location, depth, fault distance, historical frequency
//! and recent magnitude, plus a fault-proximity risk assessment.

use super::{
    classified_result, predicted_time, RiskAssessor, SEISMIC_AMPLIFICATION, SEISMIC_RADIUS,
};
use crate::config::{EngineConfig, ForestSettings};
use crate::data::Features;
use crate::geo::{proximity_from_distance, GeoPoint, Location, ZoneTable, SEISMIC_ZONES};
use crate::models::{classify_or_fallback, ClassPrediction, RandomForest};
use crate::risk::{Clock, DisasterType, HazardKind, PredictionResult, RiskAssessment, RiskLevel, SystemClock};
use crate::training::{EarthquakeTrainer, SyntheticTrainer};
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, warn};

const DEFAULT_DEPTH: f64 = 30.0;
const DEFAULT_HISTORICAL_FREQUENCY: f64 = 3.0;
const DEFAULT_RECENT_MAGNITUDE: f64 = 2.5;

/// Seismic risk predictor
#[derive(Debug)]
pub struct EarthquakePredictor {
    model: Option<RandomForest>,
    zones: ZoneTable,
    clock: Arc<dyn Clock>,
}

impl EarthquakePredictor {
    pub const MODEL_NAME: &'static str = "seismic-random-forest";
    pub const MODEL_VERSION: &'static str = "2.0";

    /// Train on synthetic data; a failed fit leaves the predictor unready
    pub fn new(settings: ForestSettings, seed: u64) -> Self {
        Self::with_model(EarthquakeTrainer::new(settings, seed).train())
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.earthquake.clone(), config.seed)
    }

    /// Wrap an already fitted model, or none at all
    pub fn with_model(model: Option<RandomForest>) -> Self {
        Self {
            model,
            zones: SEISMIC_ZONES,
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

    /// Feature row in training order, with defaults for absent keys
    pub fn feature_vector(&self, point: &GeoPoint, features: &Features) -> [f64; 6] {
        [
            point.latitude,
            point.longitude,
            features.get_or("depth", DEFAULT_DEPTH),
            self.zones.min_distance(point),
            features.get_or("historical_frequency", DEFAULT_HISTORICAL_FREQUENCY),
            features.get_or("recent_magnitude", DEFAULT_RECENT_MAGNITUDE),
        ]
    }

    /// Class and class probabilities for a request, without the random parts
    pub fn classify(&self, location: &Location, features: &Features) -> ClassPrediction {
        let x = self.feature_vector(&location.resolve(), features);
        if self.model.is_none() {
            warn!("Earthquake model unavailable, serving fallback distribution");
        }
        classify_or_fallback(self.model.as_ref(), &x)
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
        let point = location.resolve();
        let x = self.feature_vector(&point, features);
        let prediction = self.classify(location, features);
        let (zone, fault_distance) = self.zones.nearest_zone(&point);

        debug!(
            class = prediction.class,
            zone = zone.name,
            "Earthquake prediction"
        );

        classified_result(
            DisasterType::Earthquake,
            &prediction,
            Self::MODEL_NAME,
            Self::MODEL_VERSION,
            predicted_time(self.clock.now(), 1..72, rng),
            vec![
                format!("Distance to {}: {:.1}°", zone.name, fault_distance),
                format!("Depth: {:.1} km", x[2]),
                format!("Historical frequency: {} events", x[4]),
                format!("Recent max magnitude: {:.1}", x[5]),
            ],
        )
    }

    pub fn assess_risk(&self, location: &Location) -> RiskAssessment {
        let point = location.resolve();
        let (zone, fault_distance) = self.zones.nearest_zone(&point);

        let score = (proximity_from_distance(fault_distance, SEISMIC_RADIUS)
            * SEISMIC_AMPLIFICATION)
            .min(1.0);

        let level = RiskLevel::from_score(
            score,
            vec![
                format!("Proximity to {}", zone.name),
                "Historical seismic activity in region".to_string(),
                format!(
                    "Fault distance: {:.1}° (~{:.0} km)",
                    fault_distance,
                    fault_distance * 111.0
                ),
            ],
        );
        debug!(score = level.score, level = %level.level, "Earthquake assessment");

        RiskAssessment::from([(HazardKind::Earthquake, level)])
    }
}

impl RiskAssessor for EarthquakePredictor {
    fn assess_risk(&self, location: &Location) -> RiskAssessment {
        EarthquakePredictor::assess_risk(self, location)
    }

    fn is_ready(&self) -> bool {
        EarthquakePredictor::is_ready(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::Severity;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_feature_defaults() {
        let predictor = EarthquakePredictor::with_model(None);
        let x = predictor.feature_vector(&GeoPoint::new(35.0, 139.0), &Features::new());
        assert_eq!(x, [35.0, 139.0, 30.0, 0.0, 3.0, 2.5]);
    }

    #[test]
    fn test_fallback_prediction() {
        let predictor = EarthquakePredictor::with_model(None);
        assert!(!predictor.is_ready());

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let result = predictor.predict_with_rng(&Location::new(10.0, 10.0), &Features::new(), &mut rng);
        assert_eq!(result.severity, Severity::Medium);
        assert_eq!(result.probability, 0.4);
        assert_eq!(result.confidence, 0.4);
        assert_eq!(result.model_used, "seismic-random-forest");
    }

    #[test]
    fn test_risk_factor_wording() {
        let predictor = EarthquakePredictor::with_model(None);
        let features = Features::new().with("depth", 12.34);
        let result = predictor.predict(&Location::new(35.0, 139.0), &features);
        assert_eq!(
            result.risk_factors,
            vec![
                "Distance to Pacific Ring of Fire: 0.0°".to_string(),
                "Depth: 12.3 km".to_string(),
                "Historical frequency: 3 events".to_string(),
                "Recent max magnitude: 2.5".to_string(),
            ]
        );
    }

    #[test]
    fn test_assess_risk_on_fault() {
        let predictor = EarthquakePredictor::with_model(None);
        let assessment = predictor.assess_risk(&Location::new(37.0, -122.0));
        let level = &assessment[&HazardKind::Earthquake];
        assert_eq!(level.score, 1.0);
        assert_eq!(level.level, Severity::Critical);
        assert_eq!(level.factors[0], "Proximity to San Andreas Fault");
        assert_eq!(level.factors[2], "Fault distance: 0.0° (~0 km)");
    }

    #[test]
    fn test_assess_risk_amplifies_then_clamps() {
        let predictor = EarthquakePredictor::with_model(None);
        // 25 degrees due south of the East African Rift
        let assessment = predictor.assess_risk(&Location::new(-27.0, 36.0));
        let level = &assessment[&HazardKind::Earthquake];
        assert_eq!(level.score, 0.6);
        assert_eq!(level.level, Severity::High);
    }
}
