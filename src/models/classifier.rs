//! Common interface over the fitted risk classifiers

use super::argmax;
use serde::{Deserialize, Serialize};

/// Class distribution served when no model could be fit
pub const FALLBACK_PROBABILITIES: [f64; 3] = [0.3, 0.4, 0.3];

/// Class served when no model could be fit
pub const FALLBACK_CLASS: usize = 1;

/// A fitted model mapping a feature row to a distribution over risk classes.
///
/// Implementations are immutable after fitting and shared across threads.
pub trait RiskClassifier: Send + Sync {
    /// Class probabilities aligned with classes `0..n_classes()`
    fn predict_proba(&self, features: &[f64]) -> Vec<f64>;

    fn n_classes(&self) -> usize;

    /// Most probable class together with the full distribution
    fn classify(&self, features: &[f64]) -> ClassPrediction {
        let probabilities = self.predict_proba(features);
        ClassPrediction {
            class: argmax(&probabilities),
            probabilities,
        }
    }
}

/// Output of a three-level risk classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassPrediction {
    /// Winning class in {0, 1, 2}
    pub class: usize,
    /// Probabilities for classes 0, 1, 2
    pub probabilities: Vec<f64>,
}

impl ClassPrediction {
    /// Fixed distribution used while a predictor has no model
    pub fn fallback() -> Self {
        Self {
            class: FALLBACK_CLASS,
            probabilities: FALLBACK_PROBABILITIES.to_vec(),
        }
    }

    /// Probability of the winning class
    pub fn probability(&self) -> f64 {
        self.probabilities.get(self.class).copied().unwrap_or(0.5)
    }

    /// Largest class probability
    pub fn confidence(&self) -> f64 {
        self.probabilities
            .iter()
            .cloned()
            .fold(0.0, f64::max)
    }
}

/// Run `model` on `features`, or serve the fallback distribution when absent
pub fn classify_or_fallback<M: RiskClassifier + ?Sized>(
    model: Option<&M>,
    features: &[f64],
) -> ClassPrediction {
    match model {
        Some(model) => model.classify(features),
        None => ClassPrediction::fallback(),
    }
}
