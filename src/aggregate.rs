//! Multi-hazard risk aggregation
//!
//! Merges every predictor's per-hazard assessment for one location and
//! summarizes them with a single overall tier.

use crate::geo::{GeoPoint, Location};
use crate::predictors::RiskAssessor;
use crate::risk::{round3, Clock, RiskAssessment, Severity, SystemClock};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Combined risk for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRisk {
    pub location: GeoPoint,
    pub risk_levels: RiskAssessment,
    pub overall_risk: Severity,
    /// Mean of the per-hazard scores, rounded to three decimals
    pub overall_score: f64,
    pub last_updated: DateTime<Utc>,
}

/// Mean of the per-hazard scores; zero when there are none
pub fn mean_score(levels: &RiskAssessment) -> f64 {
    if levels.is_empty() {
        return 0.0;
    }
    levels.values().map(|level| level.score).sum::<f64>() / levels.len() as f64
}

/// Fans a location out to every registered assessor
pub struct RiskAggregator {
    assessors: Vec<Arc<dyn RiskAssessor>>,
    clock: Arc<dyn Clock>,
}

impl RiskAggregator {
    pub fn new(assessors: Vec<Arc<dyn RiskAssessor>>) -> Self {
        Self {
            assessors,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn len(&self) -> usize {
        self.assessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assessors.is_empty()
    }

    pub fn assess(&self, point: GeoPoint) -> AggregateRisk {
        let location = Location::from(point);

        // hazard keys are disjoint across assessors
        let mut risk_levels = RiskAssessment::new();
        for assessor in &self.assessors {
            risk_levels.extend(assessor.assess_risk(&location));
        }

        let mean = mean_score(&risk_levels);
        let overall_risk = Severity::from_aggregate_score(mean);
        let overall_score = round3(mean);

        debug!(
            latitude = point.latitude,
            longitude = point.longitude,
            hazards = risk_levels.len(),
            overall_score,
            %overall_risk,
            "Aggregated risk"
        );

        AggregateRisk {
            location: point,
            risk_levels,
            overall_risk,
            overall_score,
            last_updated: self.clock.now(),
        }
    }
}
