//! Hazard predictors module
//!
//! One service object per hazard family. Each owns its fitted classifier
//! (or nothing, when the fit failed) and its zone tables, and never mutates
//! either after construction.

mod earthquake;
mod flood;
mod weather;

pub use earthquake::EarthquakePredictor;
pub use flood::FloodPredictor;
pub use weather::{WeatherEvent, WeatherPredictor};

use crate::geo::Location;
use crate::models::ClassPrediction;
use crate::risk::{round3, DisasterType, PredictionResult, RiskAssessment, Severity};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::ops::Range;

/// Normalization radius (degrees) of the seismic proximity score
pub const SEISMIC_RADIUS: f64 = 50.0;

/// Post-scale applied to the seismic proximity score
pub const SEISMIC_AMPLIFICATION: f64 = 1.2;

/// Normalization radius (degrees) for flood, cyclone and heatwave scores
pub const BASIN_RADIUS: f64 = 30.0;

/// Anything that can score a location for one or more hazards
pub trait RiskAssessor: Send + Sync {
    fn assess_risk(&self, location: &Location) -> RiskAssessment;

    /// True once the backing classifier was fit
    fn is_ready(&self) -> bool;
}

/// `now` plus a whole number of hours drawn from `hours`
pub(crate) fn predicted_time<R: Rng + ?Sized>(
    now: DateTime<Utc>,
    hours: Range<i64>,
    rng: &mut R,
) -> DateTime<Utc> {
    now + Duration::hours(rng.gen_range(hours))
}

/// Shape a classifier output into a prediction
pub(crate) fn classified_result(
    disaster_type: DisasterType,
    prediction: &ClassPrediction,
    model_used: &str,
    model_version: &str,
    predicted_time: DateTime<Utc>,
    risk_factors: Vec<String>,
) -> PredictionResult {
    PredictionResult {
        disaster_type,
        probability: round3(prediction.probability().clamp(0.0, 1.0)),
        confidence: round3(prediction.confidence().clamp(0.0, 1.0)),
        severity: Severity::from_class(prediction.class),
        predicted_time,
        model_used: model_used.to_string(),
        model_version: model_version.to_string(),
        risk_factors,
    }
}
