//! Hazard engine
//!
//! Owns the three predictors and the aggregator, dispatches prediction
//! requests by disaster type and reports service health.

use crate::aggregate::{AggregateRisk, RiskAggregator};
use crate::config::EngineConfig;
use crate::data::Features;
use crate::error::Result;
use crate::geo::{GeoPoint, Location};
use crate::predictors::{EarthquakePredictor, FloodPredictor, RiskAssessor, WeatherPredictor};
use crate::risk::{Clock, DisasterType, PredictionResult, SystemClock};
use crate::training::{CYCLONE_FEATURES, EARTHQUAKE_FEATURES, FLOOD_FEATURES};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Location used by aggregate queries that name none
pub const DEFAULT_LOCATION: GeoPoint = GeoPoint::new(28.6, 77.2);

/// Readiness report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    /// Predictor family to readiness
    pub models: BTreeMap<String, bool>,
    pub timestamp: DateTime<Utc>,
}

/// Catalog entry describing one model family
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub name: &'static str,
    pub hazard: &'static str,
    pub algorithm: &'static str,
    pub version: &'static str,
    /// Reported accuracy of the family
    pub accuracy: f64,
    pub features: Vec<&'static str>,
}

/// Fitted predictors behind a single dispatch surface
pub struct HazardEngine {
    earthquake: Arc<EarthquakePredictor>,
    flood: Arc<FloodPredictor>,
    weather: Arc<WeatherPredictor>,
    aggregator: RiskAggregator,
    clock: Arc<dyn Clock>,
}

impl HazardEngine {
    /// Validate `config` and train every model on the system clock
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Validate `config` and train every model, reading time from `clock`
    pub fn with_clock(config: &EngineConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let start = Instant::now();
        let (earthquake, (flood, weather)) = rayon::join(
            || EarthquakePredictor::from_config(config),
            || {
                rayon::join(
                    || FloodPredictor::from_config(config),
                    || WeatherPredictor::from_config(config),
                )
            },
        );

        let engine = Self::from_predictors(earthquake, flood, weather, clock);
        info!(
            seed = config.seed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            earthquake = engine.earthquake.is_ready(),
            flood = engine.flood.is_ready(),
            weather = engine.weather.is_ready(),
            "Hazard engine ready"
        );
        Ok(engine)
    }

    /// Assemble an engine from already built predictors
    pub fn from_predictors(
        earthquake: EarthquakePredictor,
        flood: FloodPredictor,
        weather: WeatherPredictor,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let earthquake = Arc::new(earthquake.with_clock(clock.clone()));
        let flood = Arc::new(flood.with_clock(clock.clone()));
        let weather = Arc::new(weather.with_clock(clock.clone()));

        let assessors: Vec<Arc<dyn RiskAssessor>> =
            vec![earthquake.clone(), flood.clone(), weather.clone()];
        let aggregator = RiskAggregator::new(assessors).with_clock(clock.clone());

        Self {
            earthquake,
            flood,
            weather,
            aggregator,
            clock,
        }
    }

    pub fn earthquake(&self) -> &EarthquakePredictor {
        &self.earthquake
    }

    pub fn flood(&self) -> &FloodPredictor {
        &self.flood
    }

    pub fn weather(&self) -> &WeatherPredictor {
        &self.weather
    }

    /// Dispatch on a disaster type name; unknown names are an error
    pub fn predict(
        &self,
        disaster_type: &str,
        location: &Location,
        features: &Features,
    ) -> Result<PredictionResult> {
        let disaster_type: DisasterType = disaster_type.parse()?;
        Ok(self.predict_type(disaster_type, location, features))
    }

    pub fn predict_type(
        &self,
        disaster_type: DisasterType,
        location: &Location,
        features: &Features,
    ) -> PredictionResult {
        self.predict_with_rng(disaster_type, location, features, &mut rand::thread_rng())
    }

    pub fn predict_with_rng<R: Rng + ?Sized>(
        &self,
        disaster_type: DisasterType,
        location: &Location,
        features: &Features,
        rng: &mut R,
    ) -> PredictionResult {
        match disaster_type {
            DisasterType::Earthquake => self.earthquake.predict_with_rng(location, features, rng),
            DisasterType::Flood => self.flood.predict_with_rng(location, features, rng),
            DisasterType::Cyclone
            | DisasterType::Storm
            | DisasterType::Heatwave
            | DisasterType::ExtremeWeather => {
                self.weather
                    .predict_with_rng(disaster_type.into(), location, features, rng)
            }
        }
    }

    pub fn assess_risk(&self, point: GeoPoint) -> AggregateRisk {
        self.aggregator.assess(point)
    }

    pub fn health(&self) -> HealthStatus {
        let models = BTreeMap::from([
            ("earthquake".to_string(), self.earthquake.is_ready()),
            ("flood".to_string(), self.flood.is_ready()),
            ("weather".to_string(), self.weather.is_ready()),
        ]);

        HealthStatus {
            status: "ok".to_string(),
            service: "ml-prediction".to_string(),
            models,
            timestamp: self.clock.now(),
        }
    }

    pub fn model_info(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                name: "Seismic Activity Predictor",
                hazard: "earthquake",
                algorithm: "Random Forest",
                version: EarthquakePredictor::MODEL_VERSION,
                accuracy: 0.78,
                features: EARTHQUAKE_FEATURES.to_vec(),
            },
            ModelInfo {
                name: "Flood Risk Predictor",
                hazard: "flood",
                algorithm: "Gradient Boosting",
                version: FloodPredictor::MODEL_VERSION,
                accuracy: 0.85,
                features: FLOOD_FEATURES.to_vec(),
            },
            ModelInfo {
                name: "Extreme Weather Predictor",
                hazard: "weather",
                algorithm: "Random Forest + Heat Index",
                version: WeatherPredictor::MODEL_VERSION,
                accuracy: 0.82,
                features: CYCLONE_FEATURES.to_vec(),
            },
        ]
    }
}
