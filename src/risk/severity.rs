//! Severity tiers and the threshold rules that assign them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Map a classifier class {0, 1, 2} to {low, medium, high}
    pub fn from_class(class: usize) -> Self {
        match class {
            0 => Severity::Low,
            2 => Severity::High,
            _ => Severity::Medium,
        }
    }

    /// Per-hazard buckets: 0.3 / 0.5 / 0.7
    pub fn from_hazard_score(score: f64) -> Self {
        if score >= 0.7 {
            Severity::Critical
        } else if score >= 0.5 {
            Severity::High
        } else if score >= 0.3 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Cross-hazard buckets: 0.35 / 0.55 / 0.75
    pub fn from_aggregate_score(score: f64) -> Self {
        if score >= 0.75 {
            Severity::Critical
        } else if score >= 0.55 {
            Severity::High
        } else if score >= 0.35 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_mapping() {
        assert_eq!(Severity::from_class(0), Severity::Low);
        assert_eq!(Severity::from_class(1), Severity::Medium);
        assert_eq!(Severity::from_class(2), Severity::High);
    }

    #[test]
    fn test_hazard_thresholds() {
        assert_eq!(Severity::from_hazard_score(0.29), Severity::Low);
        assert_eq!(Severity::from_hazard_score(0.3), Severity::Medium);
        assert_eq!(Severity::from_hazard_score(0.5), Severity::High);
        assert_eq!(Severity::from_hazard_score(0.7), Severity::Critical);
    }

    #[test]
    fn test_aggregate_thresholds_differ() {
        assert_eq!(Severity::from_aggregate_score(0.34), Severity::Low);
        assert_eq!(Severity::from_aggregate_score(0.35), Severity::Medium);
        assert_eq!(Severity::from_aggregate_score(0.7), Severity::High);
        assert_eq!(Severity::from_aggregate_score(0.75), Severity::Critical);
        assert_ne!(
            Severity::from_aggregate_score(0.5),
            Severity::from_hazard_score(0.5)
        );
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"critical\"");
        assert_eq!(Severity::Medium.to_string(), "medium");
    }
}
