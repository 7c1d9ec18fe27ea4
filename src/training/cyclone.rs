//! Synthetic atmospheric dataset and cyclone random forest fit

use super::{discretize, SyntheticTrainer, N_RISK_CLASSES};
use crate::config::ForestSettings;
use crate::data::Dataset;
use crate::error::ModelError;
use crate::models::{ForestConfig, RandomForest};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp, Uniform};
use tracing::debug;

/// Feature order of the cyclone model
pub const CYCLONE_FEATURES: [&str; 6] = [
    "temperature",
    "pressure",
    "humidity",
    "wind_speed",
    "sea_surface_temp",
    "latitude",
];

/// Trains the cyclone random forest
#[derive(Debug, Clone)]
pub struct CycloneTrainer {
    settings: ForestSettings,
    seed: u64,
}

impl CycloneTrainer {
    pub fn new(settings: ForestSettings, seed: u64) -> Self {
        Self { settings, seed }
    }
}

/// Low pressure, warm sea, humid air and wind raise the score
fn label_score(pressure: f64, sea_surface_temp: f64, humidity: f64, wind_speed: f64) -> f64 {
    0.3 * (1.0 - (pressure - 960.0) / 70.0)
        + 0.25 * ((sea_surface_temp - 24.0) / 8.0)
        + 0.2 * (humidity / 100.0)
        + 0.15 * (wind_speed / 80.0)
}

fn uniform(low: f64, high: f64, n: usize, rng: &mut ChaCha8Rng) -> Vec<f64> {
    Uniform::new(low, high).sample_iter(rng).take(n).collect()
}

impl SyntheticTrainer for CycloneTrainer {
    type Model = RandomForest;

    fn name(&self) -> &'static str {
        "cyclone"
    }

    fn generate(&self) -> Result<Dataset, ModelError> {
        let n = self.settings.n_samples;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let temperature = uniform(20.0, 35.0, n, &mut rng);
        let pressure = uniform(960.0, 1030.0, n, &mut rng);
        let humidity = uniform(40.0, 100.0, n, &mut rng);
        let wind = Exp::new(1.0 / 20.0).map_err(|e| ModelError::InvalidData(e.to_string()))?;
        let wind_speed: Vec<f64> = wind.sample_iter(&mut rng).take(n).collect();
        let sea_surface_temp = uniform(24.0, 32.0, n, &mut rng);
        let latitude = uniform(-30.0, 30.0, n, &mut rng);

        let mut dataset = Dataset::with_capacity(&CYCLONE_FEATURES, n);
        for i in 0..n {
            let score = label_score(pressure[i], sea_surface_temp[i], humidity[i], wind_speed[i])
                + 0.1 * rng.gen::<f64>();
            dataset.add_sample(
                vec![
                    temperature[i],
                    pressure[i],
                    humidity[i],
                    wind_speed[i],
                    sea_surface_temp[i],
                    latitude[i],
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

        debug!(
            accuracy = forest.accuracy(dataset),
            trees = forest.n_trees(),
            "Cyclone forest fitted"
        );
        Ok(forest)
    }
}
