//! Synthetic training module
//!
//! Each hazard family draws a labeled dataset from fixed parametric
//! distributions with a fixed seed and fits its classifier on it. The dataset
//! is dropped once the fit returns.

mod cyclone;
mod earthquake;
mod flood;

pub use cyclone::{CycloneTrainer, CYCLONE_FEATURES};
pub use earthquake::{EarthquakeTrainer, EARTHQUAKE_FEATURES};
pub use flood::{FloodTrainer, FLOOD_FEATURES};

use crate::data::Dataset;
use crate::error::ModelError;
use crate::models::RiskClassifier;
use std::time::Instant;
use tracing::{error, info};

/// Number of risk classes every model predicts
pub const N_RISK_CLASSES: usize = 3;

/// Upper bounds (inclusive) of classes 0 and 1
pub const CLASS_THRESHOLDS: [f64; 2] = [0.33, 0.66];

/// Map a raw risk score to class 0, 1 or 2
pub fn discretize(score: f64) -> f64 {
    if score <= CLASS_THRESHOLDS[0] {
        0.0
    } else if score <= CLASS_THRESHOLDS[1] {
        1.0
    } else {
        2.0
    }
}

/// Builds a classifier from synthetic data, without any external input
pub trait SyntheticTrainer {
    type Model: RiskClassifier;

    /// Short model name used in logs
    fn name(&self) -> &'static str;

    /// Draw the labeled synthetic dataset
    fn generate(&self) -> Result<Dataset, ModelError>;

    /// Fit the classifier on a generated dataset
    fn fit(&self, dataset: &Dataset) -> Result<Self::Model, ModelError>;

    /// Generate and fit, collapsing any failure to `None` after logging it
    fn train(&self) -> Option<Self::Model> {
        let start = Instant::now();
        let result = self.generate().and_then(|dataset| {
            let model = self.fit(&dataset)?;
            Ok((model, dataset.n_samples()))
        });

        match result {
            Ok((model, n_samples)) => {
                info!(
                    model = self.name(),
                    samples = n_samples,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Prediction model trained successfully"
                );
                Some(model)
            }
            Err(e) => {
                error!(model = self.name(), error = %e, "Failed to train model");
                None
            }
        }
    }
}
