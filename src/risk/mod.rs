//! Risk vocabulary module
//!
//! Severity tiers, hazard identifiers, result types and the injectable clock.

mod clock;
mod kind;
mod result;
mod severity;

pub use clock::{Clock, FixedClock, SystemClock};
pub use kind::{DisasterType, HazardKind};
pub use result::{PredictionResult, RiskAssessment, RiskLevel};
pub use severity::Severity;

/// Round to three decimals, the precision every reported score carries
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.12345), 0.123);
        assert_eq!(round3(0.4), 0.4);
        assert_eq!(round3(1.0), 1.0);
    }
}
