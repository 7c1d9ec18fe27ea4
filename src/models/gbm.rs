//! Gradient Boosting Machine implementation
//!
//! Multinomial-deviance boosting: every stage fits one regression tree per
//! class to the softmax residuals, then replaces each leaf value with a
//! single Newton step before shrinking it by the learning rate.

use super::argmax;
use super::classifier::RiskClassifier;
use super::decision_tree::{DecisionTree, TaskType, TreeConfig};
use crate::data::Dataset;
use crate::error::ModelError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// GBM hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbmParams {
    /// Number of boosting iterations (trees per class)
    pub n_estimators: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Learning rate (shrinkage)
    pub learning_rate: f64,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples required in a leaf node
    pub min_samples_leaf: usize,
    /// Seed for the per-tree feature shuffles
    pub seed: u64,
}

impl Default for GbmParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 3,
            learning_rate: 0.1,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

/// Gradient Boosting classifier over `n_classes` labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbmClassifier {
    params: GbmParams,
    n_classes: usize,
    /// Log class priors used as the starting raw score
    init_scores: Vec<f64>,
    /// `stages[m][k]` is the tree for class `k` at iteration `m`
    stages: Vec<Vec<DecisionTree>>,
    feature_names: Vec<String>,
}

impl GbmClassifier {
    /// Create a new GBM classifier with custom parameters
    pub fn with_params(params: GbmParams, n_classes: usize) -> Self {
        Self {
            params,
            n_classes,
            init_scores: Vec::new(),
            stages: Vec::new(),
            feature_names: Vec::new(),
        }
    }

    /// Train the model on a dataset
    pub fn fit(&mut self, dataset: &Dataset) -> Result<(), ModelError> {
        dataset.validate()?;
        let k = self.n_classes;
        if k < 2 {
            return Err(ModelError::InvalidData(
                "Boosting needs at least two classes".to_string(),
            ));
        }
        if !(self.params.learning_rate > 0.0 && self.params.learning_rate.is_finite()) {
            return Err(ModelError::InvalidData(format!(
                "Invalid learning rate {}",
                self.params.learning_rate
            )));
        }

        let n = dataset.n_samples();
        let counts = dataset.class_counts(k);
        self.init_scores = counts
            .iter()
            .map(|&c| (c as f64 / n as f64).max(1e-12).ln())
            .collect();

        let targets: Vec<Vec<f64>> = (0..k)
            .map(|class| {
                dataset
                    .labels
                    .iter()
                    .map(|&l| if l as usize == class { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect();

        let mut raw: Vec<Vec<f64>> = vec![self.init_scores.clone(); n];
        let lr = self.params.learning_rate;
        let shrink = (k as f64 - 1.0) / k as f64;

        self.stages = Vec::with_capacity(self.params.n_estimators);
        for stage in 0..self.params.n_estimators {
            let probs: Vec<Vec<f64>> = raw.iter().map(|r| softmax(r)).collect();

            let trees: Vec<DecisionTree> = (0..k)
                .into_par_iter()
                .map(|class| -> Result<DecisionTree, ModelError> {
                    let residuals: Vec<f64> = (0..n)
                        .map(|i| targets[class][i] - probs[i][class])
                        .collect();

                    let residual_set = Dataset {
                        features: dataset.features.clone(),
                        labels: residuals.clone(),
                        feature_names: dataset.feature_names.clone(),
                    };

                    let mut tree = DecisionTree::new(TreeConfig {
                        max_depth: self.params.max_depth,
                        min_samples_split: self.params.min_samples_split,
                        min_samples_leaf: self.params.min_samples_leaf,
                        max_features: None,
                        seed: self
                            .params
                            .seed
                            .wrapping_add((stage * k + class) as u64),
                        task: TaskType::Regression,
                        n_classes: k,
                    });
                    tree.fit(&residual_set)?;

                    // Newton step per leaf
                    let mut numerator = vec![0.0; tree.n_leaves()];
                    let mut denominator = vec![0.0; tree.n_leaves()];
                    for (i, row) in dataset.features.iter().enumerate() {
                        if let Some(leaf) = tree.apply(row) {
                            let r = residuals[i];
                            numerator[leaf] += r;
                            denominator[leaf] += r.abs() * (1.0 - r.abs());
                        }
                    }
                    let gammas: Vec<f64> = numerator
                        .iter()
                        .zip(denominator.iter())
                        .map(|(num, den)| {
                            if den.abs() < 1e-150 {
                                0.0
                            } else {
                                shrink * num / den
                            }
                        })
                        .collect();
                    tree.set_leaf_values(&gammas)?;

                    Ok(tree)
                })
                .collect::<Result<Vec<_>, ModelError>>()?;

            for (i, row) in dataset.features.iter().enumerate() {
                for (class, tree) in trees.iter().enumerate() {
                    raw[i][class] += lr * tree.predict_one(row);
                }
            }
            if raw.iter().flatten().any(|v| !v.is_finite()) {
                return Err(ModelError::TrainingFailed(format!(
                    "Raw scores diverged at stage {}",
                    stage
                )));
            }

            self.stages.push(trees);
        }

        self.feature_names = dataset.feature_names.clone();
        debug!(
            stages = self.stages.len(),
            classes = k,
            "Gradient boosting fit complete"
        );

        Ok(())
    }

    /// Raw (pre-softmax) class scores for one sample
    pub fn decision_function(&self, features: &[f64]) -> Vec<f64> {
        let mut raw = self.init_scores.clone();
        for trees in &self.stages {
            for (class, tree) in trees.iter().enumerate() {
                raw[class] += self.params.learning_rate * tree.predict_one(features);
            }
        }
        raw
    }

    /// Class probabilities for one sample
    pub fn predict_proba_one(&self, features: &[f64]) -> Vec<f64> {
        if !self.is_trained() {
            let k = self.n_classes.max(1);
            return vec![1.0 / k as f64; k];
        }
        softmax(&self.decision_function(features))
    }

    /// Most probable class for one sample
    pub fn predict_one(&self, features: &[f64]) -> usize {
        argmax(&self.predict_proba_one(features))
    }

    /// Fraction of rows whose predicted class matches the label
    pub fn accuracy(&self, dataset: &Dataset) -> f64 {
        if dataset.is_empty() {
            return 0.0;
        }
        let correct = dataset
            .features
            .par_iter()
            .zip(dataset.labels.par_iter())
            .filter(|(row, &label)| self.predict_one(row) == label as usize)
            .count();
        correct as f64 / dataset.n_samples() as f64
    }

    /// Get model parameters
    pub fn params(&self) -> &GbmParams {
        &self.params
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }

    /// Check if the model is trained
    pub fn is_trained(&self) -> bool {
        !self.init_scores.is_empty()
    }
}

impl RiskClassifier for GbmClassifier {
    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        self.predict_proba_one(features)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }
}

fn softmax(raw: &[f64]) -> Vec<f64> {
    let max = raw.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = raw.iter().map(|r| (r - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn create_test_dataset(n: usize) -> Dataset {
        let mut dataset = Dataset::new(vec!["feature1".to_string(), "feature2".to_string()]);

        for i in 0..n {
            let x1 = i as f64 / n as f64;
            let x2 = (i as f64 * 0.5).sin();
            let label = if x1 + 0.1 * x2 < 0.33 {
                0.0
            } else if x1 + 0.1 * x2 < 0.66 {
                1.0
            } else {
                2.0
            };
            dataset.add_sample(vec![x1, x2], label);
        }

        dataset
    }

    #[test]
    fn test_gbm_classifier() {
        let dataset = create_test_dataset(200);

        let mut model = GbmClassifier::with_params(
            GbmParams {
                n_estimators: 30,
                ..Default::default()
            },
            3,
        );
        model.fit(&dataset).unwrap();

        assert!(model.is_trained());
        assert_eq!(model.n_stages(), 30);
        assert!(model.accuracy(&dataset) > 0.9);

        let probs = model.predict_proba_one(&[0.9, 0.0]);
        assert_abs_diff_eq!(probs.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        assert_eq!(model.predict_one(&[0.9, 0.0]), 2);
    }

    #[test]
    fn test_untrained_is_uniform() {
        let model = GbmClassifier::with_params(GbmParams::default(), 3);
        assert_eq!(model.predict_proba_one(&[1.0, 2.0]), vec![1.0 / 3.0; 3]);
    }

    #[test]
    fn test_rejects_bad_learning_rate() {
        let mut model = GbmClassifier::with_params(
            GbmParams {
                learning_rate: 0.0,
                ..Default::default()
            },
            3,
        );
        assert!(matches!(
            model.fit(&create_test_dataset(20)),
            Err(ModelError::InvalidData(_))
        ));
    }

    #[test]
    fn test_softmax_normalizes() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(p[2] > p[1] && p[1] > p[0]);
    }
}
