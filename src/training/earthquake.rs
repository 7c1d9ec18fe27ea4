//! Synthetic seismic dataset and random forest fit

use super::{discretize, SyntheticTrainer, N_RISK_CLASSES};
use crate::config::ForestSettings;
use crate::data::Dataset;
use crate::error::ModelError;
use crate::geo::{GeoPoint, ZoneTable, SEISMIC_ZONES};
use crate::models::{ForestConfig, RandomForest};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp, Poisson, Uniform};
use tracing::debug;

/// Feature order of the seismic model
pub const EARTHQUAKE_FEATURES: [&str; 6] = [
    "latitude",
    "longitude",
    "depth",
    "fault_distance",
    "historical_frequency",
    "recent_magnitude",
];

/// Trains the seismic random forest
#[derive(Debug, Clone)]
pub struct EarthquakeTrainer {
    settings: ForestSettings,
    seed: u64,
    zones: ZoneTable,
}

impl EarthquakeTrainer {
    pub fn new(settings: ForestSettings, seed: u64) -> Self {
        Self {
            settings,
            seed,
            zones: SEISMIC_ZONES,
        }
    }
}

/// Hand-weighted seismic risk before noise
fn label_score(fault_distance: f64, historical_frequency: f64, recent_magnitude: f64) -> f64 {
    0.3 * (1.0 / (fault_distance + 1.0))
        + 0.25 * (historical_frequency / 10.0)
        + 0.25 * (recent_magnitude / 8.0)
}

fn distribution_error<E: std::fmt::Display>(e: E) -> ModelError {
    ModelError::InvalidData(e.to_string())
}

impl SyntheticTrainer for EarthquakeTrainer {
    type Model = RandomForest;

    fn name(&self) -> &'static str {
        "earthquake"
    }

    fn generate(&self) -> Result<Dataset, ModelError> {
        let n = self.settings.n_samples;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let latitudes: Vec<f64> = Uniform::new(-60.0, 70.0).sample_iter(&mut rng).take(n).collect();
        let longitudes: Vec<f64> = Uniform::new(-180.0, 180.0).sample_iter(&mut rng).take(n).collect();
        let depth = Exp::new(1.0 / 50.0).map_err(distribution_error)?;
        let depths: Vec<f64> = depth.sample_iter(&mut rng).take(n).collect();
        let frequency = Poisson::new(3.0).map_err(distribution_error)?;
        let frequencies: Vec<f64> = frequency.sample_iter(&mut rng).take(n).collect();
        let magnitude = Exp::new(1.0 / 2.0).map_err(distribution_error)?;
        let magnitudes: Vec<f64> = magnitude
            .sample_iter(&mut rng)
            .take(n)
            .map(|m: f64| m + 1.0)
            .collect();

        let mut dataset = Dataset::with_capacity(&EARTHQUAKE_FEATURES, n);
        for i in 0..n {
            let fault_distance = self
                .zones
                .min_distance(&GeoPoint::new(latitudes[i], longitudes[i]));
            let score = label_score(fault_distance, frequencies[i], magnitudes[i])
                + 0.2 * rng.gen::<f64>();

            dataset.add_sample(
                vec![
                    latitudes[i],
                    longitudes[i],
                    depths[i],
                    fault_distance,
                    frequencies[i],
                    magnitudes[i],
                ],
                discretize(score.clamp(0.0, 1.0)),
            );
        }

        Ok(dataset)
    }

    fn fit(&self, dataset: &Dataset) -> Result<RandomForest, ModelError> {
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: self.settings.n_trees,
            max_depth: self.settings.max_depth,
            seed: self.seed,
            n_classes: N_RISK_CLASSES,
            ..Default::default()
        });
        forest.fit(dataset)?;

        let ranking = forest.feature_importance_ranking();
        debug!(
            accuracy = forest.accuracy(dataset),
            top_feature = ranking.first().map(|(name, _)| *name).unwrap_or("none"),
            "Seismic forest fitted"
        );
        Ok(forest)
    }
}
