//! Weather prediction
//!
//! Cyclones and storms go through a random forest. Heatwaves use a closed-form
//! heat index, and every other weather event gets a coarse random estimate.

use super::{classified_result, predicted_time, RiskAssessor, BASIN_RADIUS};
use crate::config::{EngineConfig, ForestSettings};
use crate::data::Features;
use crate::geo::{
    proximity_from_distance, GeoPoint, Location, ZoneTable, CYCLONE_ZONES, HEATWAVE_ZONES,
};
use crate::models::{classify_or_fallback, ClassPrediction, RandomForest};
use crate::risk::{
    round3, Clock, DisasterType, HazardKind, PredictionResult, RiskAssessment, RiskLevel, Severity,
    SystemClock,
};
use crate::training::{CycloneTrainer, SyntheticTrainer};
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, warn};

/// Latitude used for cyclone features when the request has none
const DEFAULT_CYCLONE_LATITUDE: f64 = 15.0;

/// (feature, default) for the first five cyclone features, in training order
const CYCLONE_DEFAULTS: [(&str, f64); 5] = [
    ("temperature", 28.0),
    ("pressure", 1010.0),
    ("humidity", 70.0),
    ("wind_speed", 20.0),
    ("sea_surface_temp", 28.0),
];

const DEFAULT_HEAT_TEMPERATURE: f64 = 35.0;
const DEFAULT_HEAT_HUMIDITY: f64 = 30.0;

/// Raw ensemble draws at or above this are reported as medium
const EXTREME_MEDIUM_THRESHOLD: f64 = 0.5;

/// Weather sub-model selected by a prediction request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherEvent {
    /// Cyclones and storms
    Cyclone,
    Heatwave,
    /// Anything else, served by the ensemble estimate
    Other,
}

impl WeatherEvent {
    /// Map a free-form weather tag; unknown tags fall through to `Other`
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "cyclone" | "storm" => WeatherEvent::Cyclone,
            "heatwave" => WeatherEvent::Heatwave,
            _ => WeatherEvent::Other,
        }
    }
}

impl From<DisasterType> for WeatherEvent {
    fn from(disaster_type: DisasterType) -> Self {
        match disaster_type {
            DisasterType::Cyclone | DisasterType::Storm => WeatherEvent::Cyclone,
            DisasterType::Heatwave => WeatherEvent::Heatwave,
            _ => WeatherEvent::Other,
        }
    }
}

/// `temperature + 0.1 * humidity`
pub fn heat_index(temperature: f64, humidity: f64) -> f64 {
    temperature + 0.1 * humidity
}

/// Heat index mapped linearly from [35, 55] onto [0, 1]
pub fn heatwave_probability(heat_index: f64) -> f64 {
    ((heat_index - 35.0) / 20.0).clamp(0.0, 1.0)
}

/// Ensemble severity, bucketed on the unrounded draw
fn extreme_severity(probability: f64) -> Severity {
    if probability >= EXTREME_MEDIUM_THRESHOLD {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Cyclone, heatwave and general weather predictor
#[derive(Debug)]
pub struct WeatherPredictor {
    cyclone_model: Option<RandomForest>,
    cyclone_zones: ZoneTable,
    heatwave_zones: ZoneTable,
    clock: Arc<dyn Clock>,
}

impl WeatherPredictor {
    pub const CYCLONE_MODEL_NAME: &'static str = "cyclone-random-forest";
    pub const HEATWAVE_MODEL_NAME: &'static str = "heatwave-index-model";
    pub const ENSEMBLE_MODEL_NAME: &'static str = "weather-ensemble";
    pub const MODEL_VERSION: &'static str = "1.5";

    pub fn new(settings: ForestSettings, seed: u64) -> Self {
        Self::with_model(CycloneTrainer::new(settings, seed).train())
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.cyclone.clone(), config.seed)
    }

    pub fn with_model(cyclone_model: Option<RandomForest>) -> Self {
        Self {
            cyclone_model,
            cyclone_zones: CYCLONE_ZONES,
            heatwave_zones: HEATWAVE_ZONES,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// True once the cyclone forest is fit; heatwave and ensemble need no model
    pub fn is_ready(&self) -> bool {
        self.cyclone_model.is_some()
    }

    pub fn cyclone_feature_vector(&self, location: &Location, features: &Features) -> [f64; 6] {
        let [t, p, h, w, sst] = CYCLONE_DEFAULTS.map(|(name, default)| features.get_or(name, default));
        let latitude = location.latitude.unwrap_or(DEFAULT_CYCLONE_LATITUDE);
        [t, p, h, w, sst, latitude]
    }

    pub fn classify_cyclone(&self, location: &Location, features: &Features) -> ClassPrediction {
        if self.cyclone_model.is_none() {
            warn!("Cyclone model unavailable, serving fallback distribution");
        }
        classify_or_fallback(
            self.cyclone_model.as_ref(),
            &self.cyclone_feature_vector(location, features),
        )
    }

    pub fn predict(
        &self,
        event: WeatherEvent,
        location: &Location,
        features: &Features,
    ) -> PredictionResult {
        self.predict_with_rng(event, location, features, &mut rand::thread_rng())
    }

    pub fn predict_with_rng<R: Rng + ?Sized>(
        &self,
        event: WeatherEvent,
        location: &Location,
        features: &Features,
        rng: &mut R,
    ) -> PredictionResult {
        match event {
            WeatherEvent::Cyclone => self.predict_cyclone(location, features, rng),
            WeatherEvent::Heatwave => self.predict_heatwave(location, features, rng),
            WeatherEvent::Other => self.predict_extreme(rng),
        }
    }

    fn predict_cyclone<R: Rng + ?Sized>(
        &self,
        location: &Location,
        features: &Features,
        rng: &mut R,
    ) -> PredictionResult {
        let [_, pressure, humidity, wind_speed, sea_surface_temp, _] =
            self.cyclone_feature_vector(location, features);
        let prediction = self.classify_cyclone(location, features);
        let point = location.or(GeoPoint::new(DEFAULT_CYCLONE_LATITUDE, 0.0));
        let (basin, _) = self.cyclone_zones.nearest_zone(&point);

        debug!(class = prediction.class, basin = basin.name, "Cyclone prediction");

        classified_result(
            DisasterType::Cyclone,
            &prediction,
            Self::CYCLONE_MODEL_NAME,
            Self::MODEL_VERSION,
            predicted_time(self.clock.now(), 12..72, rng),
            vec![
                format!("Pressure: {:.0} hPa", pressure),
                format!("Sea surface temperature: {:.1}°C", sea_surface_temp),
                format!("Humidity: {:.0}%", humidity),
                format!("Wind speed: {:.0} km/h", wind_speed),
                format!("Nearest cyclone basin: {}", basin.name),
            ],
        )
    }

    fn predict_heatwave<R: Rng + ?Sized>(
        &self,
        location: &Location,
        features: &Features,
        rng: &mut R,
    ) -> PredictionResult {
        let temperature = features.get_or("temperature", DEFAULT_HEAT_TEMPERATURE);
        let humidity = features.get_or("humidity", DEFAULT_HEAT_HUMIDITY);
        let index = heat_index(temperature, humidity);
        let probability = heatwave_probability(index);
        let (belt, _) = self.heatwave_zones.nearest_zone(&location.resolve());

        debug!(heat_index = index, probability, "Heatwave prediction");

        PredictionResult {
            disaster_type: DisasterType::Heatwave,
            probability: round3(probability),
            confidence: round3(0.7 + rng.gen_range(0.0..0.2)),
            severity: Severity::from_hazard_score(probability),
            predicted_time: predicted_time(self.clock.now(), 6..24, rng),
            model_used: Self::HEATWAVE_MODEL_NAME.to_string(),
            model_version: Self::MODEL_VERSION.to_string(),
            risk_factors: vec![
                format!("Temperature: {:.1}°C", temperature),
                format!("Humidity: {:.0}%", humidity),
                format!("Heat index: {:.1}", index),
                format!("Nearest heatwave belt: {}", belt.name),
            ],
        }
    }

    fn predict_extreme<R: Rng + ?Sized>(&self, rng: &mut R) -> PredictionResult {
        let probability = 0.3 + rng.gen_range(0.0..0.4);
        let severity = extreme_severity(probability);

        PredictionResult {
            disaster_type: DisasterType::ExtremeWeather,
            probability: round3(probability),
            confidence: round3(0.6 + rng.gen_range(0.0..0.2)),
            severity,
            predicted_time: predicted_time(self.clock.now(), 6..48, rng),
            model_used: Self::ENSEMBLE_MODEL_NAME.to_string(),
            model_version: Self::MODEL_VERSION.to_string(),
            risk_factors: vec!["Multiple weather parameters analyzed".to_string()],
        }
    }

    pub fn assess_risk(&self, location: &Location) -> RiskAssessment {
        let point = location.resolve();
        let (basin, basin_distance) = self.cyclone_zones.nearest_zone(&point);
        let (belt, belt_distance) = self.heatwave_zones.nearest_zone(&point);

        let cyclone = RiskLevel::from_score(
            proximity_from_distance(basin_distance, BASIN_RADIUS),
            vec![
                format!("Proximity to {}", basin.name),
                "Sea surface temperature patterns".to_string(),
                "Seasonal cyclone frequency".to_string(),
            ],
        );
        let heatwave = RiskLevel::from_score(
            proximity_from_distance(belt_distance, BASIN_RADIUS),
            vec![
                format!("Proximity to {}", belt.name),
                "Historical temperature extremes".to_string(),
                "Urban heat island effect".to_string(),
            ],
        );
        debug!(
            cyclone = cyclone.score,
            heatwave = heatwave.score,
            "Weather assessment"
        );

        RiskAssessment::from([
            (HazardKind::Cyclone, cyclone),
            (HazardKind::Heatwave, heatwave),
        ])
    }
}

impl RiskAssessor for WeatherPredictor {
    fn assess_risk(&self, location: &Location) -> RiskAssessment {
        WeatherPredictor::assess_risk(self, location)
    }

    fn is_ready(&self) -> bool {
        WeatherPredictor::is_ready(self)
    }
}
