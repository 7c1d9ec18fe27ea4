//! # Disaster Risk - Multi-Hazard Prediction Engine
//!
//! This library trains earthquake, flood and cyclone classifiers on synthetic
//! data at startup and serves per-hazard predictions and location-level risk
//! assessments from them.
//!
//! ## Modules
//!
//! - `geo` - Coordinates, hazard zone tables and proximity scoring
//! - `data` - Datasets and caller-supplied feature maps
//! - `models` - Decision Tree, Random Forest and Gradient Boosting classifiers
//! - `training` - Synthetic dataset generators and model fitting
//! - `risk` - Severity tiers, disaster types, result types and clocks
//! - `predictors` - Earthquake, flood and weather predictors
//! - `aggregate` - Cross-hazard risk aggregation
//! - `engine` - Dispatch, health and model catalog
//! - `config` - Training and logging configuration

pub mod aggregate;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod geo;
pub mod models;
pub mod predictors;
pub mod risk;
pub mod training;

pub use aggregate::{AggregateRisk, RiskAggregator};
pub use config::{load_config, EngineConfig};
pub use engine::{HazardEngine, HealthStatus, ModelInfo};
pub use error::{ConfigError, EngineError, ModelError, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::aggregate::{AggregateRisk, RiskAggregator};
    pub use crate::config::{load_config, EngineConfig};
    pub use crate::data::{Dataset, Features};
    pub use crate::engine::{HazardEngine, HealthStatus, ModelInfo, DEFAULT_LOCATION};
    pub use crate::error::{EngineError, Result};
    pub use crate::geo::{GeoPoint, Location};
    pub use crate::predictors::{
        EarthquakePredictor, FloodPredictor, RiskAssessor, WeatherEvent, WeatherPredictor,
    };
    pub use crate::risk::{
        Clock, DisasterType, FixedClock, HazardKind, PredictionResult, RiskAssessment, RiskLevel,
        Severity, SystemClock,
    };
}
