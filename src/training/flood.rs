//! Synthetic hydrological dataset and gradient boosting fit

use super::{discretize, SyntheticTrainer, N_RISK_CLASSES};
use crate::config::BoostingSettings;
use crate::data::Dataset;
use crate::error::ModelError;
use crate::models::{GbmClassifier, GbmParams};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp, Normal, Uniform};
use tracing::debug;

/// Feature order of the flood model
pub const FLOOD_FEATURES: [&str; 6] = [
    "rainfall",
    "water_level",
    "elevation",
    "soil_moisture",
    "river_proximity",
    "days_since_rain",
];

/// Trains the flood gradient boosting classifier
#[derive(Debug, Clone)]
pub struct FloodTrainer {
    settings: BoostingSettings,
    seed: u64,
}

impl FloodTrainer {
    pub fn new(settings: BoostingSettings, seed: u64) -> Self {
        Self { settings, seed }
    }
}

/// Hand-weighted flood risk before noise; input is one feature row
fn label_score(row: &[f64]) -> f64 {
    let (rainfall, water_level, elevation, soil_moisture, river_proximity, days_since_rain) =
        (row[0], row[1], row[2], row[3], row[4], row[5]);
    0.3 * (rainfall / 100.0)
        + 0.25 * (water_level / 10.0)
        + 0.15 * (1.0 - elevation / 200.0)
        + 0.15 * soil_moisture
        + 0.1 * (1.0 / (river_proximity + 1.0))
        + 0.05 * (1.0 / (days_since_rain + 1.0))
}

fn exponential(mean: f64, n: usize, rng: &mut ChaCha8Rng) -> Result<Vec<f64>, ModelError> {
    let dist = Exp::new(1.0 / mean).map_err(|e| ModelError::InvalidData(e.to_string()))?;
    Ok(dist.sample_iter(rng).take(n).collect())
}

impl SyntheticTrainer for FloodTrainer {
    type Model = GbmClassifier;

    fn name(&self) -> &'static str {
        "flood"
    }

    fn generate(&self) -> Result<Dataset, ModelError> {
        let n = self.settings.n_samples;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let rainfall = exponential(30.0, n, &mut rng)?;
        let water_level: Vec<f64> = exponential(2.0, n, &mut rng)?
            .into_iter()
            .map(|w| w + 1.0)
            .collect();
        let elevation = exponential(50.0, n, &mut rng)?;
        let soil_moisture: Vec<f64> = Uniform::new(0.0, 1.0).sample_iter(&mut rng).take(n).collect();
        let river_proximity = exponential(20.0, n, &mut rng)?;
        let days_since_rain = exponential(5.0, n, &mut rng)?;

        let noise = Normal::new(0.0, 0.1).map_err(|e| ModelError::InvalidData(e.to_string()))?;

        let mut dataset = Dataset::with_capacity(&FLOOD_FEATURES, n);
        for i in 0..n {
            let row = vec![
                rainfall[i],
                water_level[i],
                elevation[i],
                soil_moisture[i],
                river_proximity[i],
                days_since_rain[i],
            ];
            let score = (label_score(&row) + noise.sample(&mut rng)).clamp(0.0, 1.0);
            dataset.add_sample(row, discretize(score));
        }

        Ok(dataset)
    }

    fn fit(&self, dataset: &Dataset) -> Result<GbmClassifier, ModelError> {
        let mut model = GbmClassifier::with_params(
            GbmParams {
                n_estimators: self.settings.n_estimators,
                max_depth: self.settings.max_depth,
                learning_rate: self.settings.learning_rate,
                seed: self.seed,
                ..Default::default()
            },
            N_RISK_CLASSES,
        );
        model.fit(dataset)?;

        debug!(
            accuracy = model.accuracy(dataset),
            features = model.feature_names().len(),
            "Flood boosting model fitted"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn small(n_samples: usize) -> FloodTrainer {
        FloodTrainer::new(
            BoostingSettings {
                n_samples,
                n_estimators: 10,
                max_depth: 3,
                learning_rate: 0.1,
            },
            42,
        )
    }

    #[test]
    fn test_generate_ranges() {
        let dataset = small(400).generate().unwrap();
        assert_eq!(dataset.n_samples(), 400);
        for row in &dataset.features {
            assert!(row[0] >= 0.0);
            assert!(row[1] >= 1.0);
            assert!((0.0..1.0).contains(&row[3]));
        }
        // every class shows up with this many draws
        assert!(dataset.class_counts(3).iter().all(|&c| c > 0));
    }

    #[test]
    fn test_label_score_weights() {
        let dry_highland = [0.0, 0.0, 200.0, 0.0, 1e9, 1e9];
        assert_abs_diff_eq!(label_score(&dry_highland), 0.0, epsilon = 1e-6);

        let saturated = [100.0, 10.0, 0.0, 1.0, 0.0, 0.0];
        assert_abs_diff_eq!(label_score(&saturated), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_train_and_fallback() {
        assert!(small(300).train().is_some());
        assert!(small(0).train().is_none());
    }
}
