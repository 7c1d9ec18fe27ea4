//! Random Forest implementation

use super::argmax;
use super::classifier::RiskClassifier;
use super::decision_tree::{DecisionTree, TaskType, TreeConfig};
use crate::data::Dataset;
use crate::error::ModelError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random Forest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Max features per split (floor of sqrt of total if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
    /// Number of target classes
    pub n_classes: usize,
}

/// Features tried per split when unset: `floor(sqrt(n))`, at least one
pub fn default_max_features(n_features: usize) -> usize {
    ((n_features as f64).sqrt() as usize).max(1)
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
            n_classes: 3,
        }
    }
}

/// Random Forest classifier.
///
/// Class probabilities are the mean of the per-tree leaf distributions, so
/// they always sum to one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    feature_names: Vec<String>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    /// Create a new random forest
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_names: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    /// Train the random forest
    pub fn fit(&mut self, dataset: &Dataset) -> Result<(), ModelError> {
        dataset.validate()?;
        if self.config.n_trees == 0 {
            return Err(ModelError::InvalidData("Forest needs at least one tree".to_string()));
        }

        self.feature_names = dataset.feature_names.clone();
        let n_features = dataset.n_features();

        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| default_max_features(n_features));

        // Build trees in parallel; collect keeps them in seed order
        let trees: Vec<DecisionTree> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|i| -> Result<DecisionTree, ModelError> {
                let tree_config = TreeConfig {
                    max_depth: self.config.max_depth,
                    min_samples_split: self.config.min_samples_split,
                    min_samples_leaf: self.config.min_samples_leaf,
                    max_features: Some(max_features),
                    seed: self.config.seed.wrapping_add(i as u64),
                    task: TaskType::Classification,
                    n_classes: self.config.n_classes,
                };

                let mut tree = DecisionTree::new(tree_config);

                // Bootstrap sample or use full dataset
                if self.config.bootstrap {
                    let bootstrap_data = dataset.bootstrap_sample(self.config.seed.wrapping_add(i as u64));
                    tree.fit(&bootstrap_data)?;
                } else {
                    tree.fit(dataset)?;
                }

                Ok(tree)
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        self.trees = trees;

        // Aggregate feature importances
        self.feature_importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (i, &imp) in tree.feature_importances().iter().enumerate() {
                self.feature_importances[i] += imp;
            }
        }

        // Normalize
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }

        Ok(())
    }

    /// Predict probabilities for a single sample
    pub fn predict_proba_one(&self, features: &[f64]) -> Vec<f64> {
        let k = self.config.n_classes.max(1);
        if self.trees.is_empty() {
            return vec![1.0 / k as f64; k];
        }

        let mut probs = vec![0.0; k];
        for tree in &self.trees {
            for (p, t) in probs.iter_mut().zip(tree.predict_proba_one(features)) {
                *p += t;
            }
        }

        let n = self.trees.len() as f64;
        probs.iter_mut().for_each(|p| *p /= n);
        probs
    }

    /// Predict the most probable class for a single sample
    pub fn predict_one(&self, features: &[f64]) -> usize {
        argmax(&self.predict_proba_one(features))
    }

    /// Predict classes for multiple samples
    pub fn predict(&self, dataset: &Dataset) -> Vec<usize> {
        dataset
            .features
            .par_iter()
            .map(|f| self.predict_one(f))
            .collect()
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Get feature names with importances, sorted by importance
    pub fn feature_importance_ranking(&self) -> Vec<(&str, f64)> {
        let mut ranking: Vec<(&str, f64)> = self
            .feature_names
            .iter()
            .zip(self.feature_importances.iter())
            .map(|(n, &i)| (n.as_str(), i))
            .collect();

        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }

    /// Calculate accuracy
    pub fn accuracy(&self, dataset: &Dataset) -> f64 {
        if dataset.is_empty() {
            return 0.0;
        }
        let correct = self
            .predict(dataset)
            .iter()
            .zip(dataset.labels.iter())
            .filter(|(&pred, &label)| pred == label as usize)
            .count();

        correct as f64 / dataset.n_samples() as f64
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl RiskClassifier for RandomForest {
    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        self.predict_proba_one(features)
    }

    fn n_classes(&self) -> usize {
        self.config.n_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn banded_dataset() -> Dataset {
        let mut dataset = Dataset::new(vec!["x".to_string(), "y".to_string()]);
        for i in 0..300 {
            let x = i as f64 / 30.0;
            let y = ((i * 7) % 11) as f64;
            let label = if x < 3.3 {
                0.0
            } else if x < 6.6 {
                1.0
            } else {
                2.0
            };
            dataset.add_sample(vec![x, y], label);
        }
        dataset
    }

    #[test]
    fn test_random_forest_classification() {
        let dataset = banded_dataset();

        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 20,
            max_depth: 5,
            max_features: Some(2),
            ..Default::default()
        });

        forest.fit(&dataset).unwrap();

        assert_eq!(forest.n_trees(), 20);
        assert_eq!(forest.feature_importances().len(), 2);
        assert_eq!(forest.feature_importance_ranking()[0].0, "x");
        assert!(forest.accuracy(&dataset) > 0.9);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let dataset = banded_dataset();
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 10,
            max_depth: 4,
            max_features: Some(2),
            ..Default::default()
        });
        forest.fit(&dataset).unwrap();

        for x in [0.5, 4.0, 9.0] {
            let probs = forest.predict_proba_one(&[x, 3.0]);
            assert_eq!(probs.len(), 3);
            assert_abs_diff_eq!(probs.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        }
        assert_eq!(forest.predict_one(&[9.5, 3.0]), 2);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let dataset = banded_dataset();
        let config = ForestConfig {
            n_trees: 8,
            max_depth: 6,
            ..Default::default()
        };

        let mut a = RandomForest::new(config.clone());
        let mut b = RandomForest::new(config);
        a.fit(&dataset).unwrap();
        b.fit(&dataset).unwrap();

        for x in [0.1, 3.3, 5.0, 6.61, 9.9] {
            assert_eq!(a.predict_proba_one(&[x, 1.0]), b.predict_proba_one(&[x, 1.0]));
        }
    }

    #[test]
    fn test_zero_trees_is_an_error() {
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 0,
            ..Default::default()
        });
        assert!(forest.fit(&banded_dataset()).is_err());
    }

    #[test]
    fn test_default_max_features() {
        assert_eq!(default_max_features(6), 2);
        assert_eq!(default_max_features(9), 3);
        assert_eq!(default_max_features(2), 1);
        assert_eq!(default_max_features(1), 1);
    }
}
