//! Prediction and assessment outputs

use super::kind::{DisasterType, HazardKind};
use super::severity::Severity;
use super::round3;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Output of a single hazard prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub disaster_type: DisasterType,
    /// Probability of the reported severity class, in [0, 1]
    pub probability: f64,
    /// Largest class probability, in [0, 1]
    pub confidence: f64,
    pub severity: Severity,
    pub predicted_time: DateTime<Utc>,
    pub model_used: String,
    pub model_version: String,
    pub risk_factors: Vec<String>,
}

/// Proximity-based risk for one hazard at one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLevel {
    pub level: Severity,
    /// Score in [0, 1], rounded to three decimals
    pub score: f64,
    pub factors: Vec<String>,
}

impl RiskLevel {
    /// Bucket `score` with the per-hazard thresholds
    pub fn from_score(score: f64, factors: Vec<String>) -> Self {
        let score = score.clamp(0.0, 1.0);
        Self {
            level: Severity::from_hazard_score(score),
            score: round3(score),
            factors,
        }
    }
}

/// Hazard to risk mapping produced by `assess_risk`
pub type RiskAssessment = BTreeMap<HazardKind, RiskLevel>;
