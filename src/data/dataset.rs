//! Dataset structure for the synthetic training sets

use crate::error::ModelError;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Labeled feature rows for model fitting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Feature matrix (n_samples x n_features)
    pub features: Vec<Vec<f64>>,
    /// Target labels (class index for classification)
    pub labels: Vec<f64>,
    /// Feature names
    pub feature_names: Vec<String>,
}

impl Dataset {
    /// Create a new empty dataset
    pub fn new(feature_names: Vec<String>) -> Self {
        Self {
            features: Vec::new(),
            labels: Vec::new(),
            feature_names,
        }
    }

    /// Create an empty dataset with room for `capacity` rows
    pub fn with_capacity(feature_names: &[&str], capacity: usize) -> Self {
        Self {
            features: Vec::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Number of samples
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Number of features
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Add a sample
    pub fn add_sample(&mut self, features: Vec<f64>, label: f64) {
        debug_assert_eq!(features.len(), self.feature_names.len());
        self.features.push(features);
        self.labels.push(label);
    }

    /// Create a subset of the dataset by indices
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Row indices drawn with replacement
    pub fn bootstrap_indices(&self, seed: u64) -> Vec<usize> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = self.n_samples();
        (0..n).map(|_| rng.gen_range(0..n)).collect()
    }

    /// Bootstrap sample (random sample with replacement)
    pub fn bootstrap_sample(&self, seed: u64) -> Dataset {
        if self.is_empty() {
            return self.clone();
        }
        self.subset(&self.bootstrap_indices(seed))
    }

    /// Number of rows carrying each class label in `0..n_classes`
    pub fn class_counts(&self, n_classes: usize) -> Vec<usize> {
        let mut counts = vec![0; n_classes];
        for &label in &self.labels {
            let class = label as usize;
            if class < n_classes {
                counts[class] += 1;
            }
        }
        counts
    }

    /// Reject shapes and values no tree can be fit on
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.is_empty() {
            return Err(ModelError::InvalidData("Empty dataset".to_string()));
        }
        if self.labels.len() != self.features.len() {
            return Err(ModelError::InvalidData(format!(
                "{} feature rows but {} labels",
                self.features.len(),
                self.labels.len()
            )));
        }
        let n_features = self.n_features();
        for (i, row) in self.features.iter().enumerate() {
            if row.len() != n_features {
                return Err(ModelError::InvalidData(format!(
                    "Row {} has {} features, expected {}",
                    i,
                    row.len(),
                    n_features
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(ModelError::TrainingFailed(format!(
                    "Non-finite feature value in row {}",
                    i
                )));
            }
        }
        if self.labels.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::TrainingFailed("Non-finite label".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_operations() {
        let mut dataset = Dataset::new(vec!["f1".to_string(), "f2".to_string()]);
        dataset.add_sample(vec![1.0, 2.0], 0.0);
        dataset.add_sample(vec![3.0, 4.0], 2.0);
        dataset.add_sample(vec![5.0, 6.0], 2.0);

        assert_eq!(dataset.n_samples(), 3);
        assert_eq!(dataset.n_features(), 2);
        assert_eq!(dataset.class_counts(3), vec![1, 0, 2]);

        let subset = dataset.subset(&[2, 0]);
        assert_eq!(subset.features[0], vec![5.0, 6.0]);
        assert_eq!(subset.labels, vec![2.0, 0.0]);
    }

    #[test]
    fn test_bootstrap_is_seeded() {
        let mut dataset = Dataset::new(vec!["x".to_string()]);
        for i in 0..50 {
            dataset.add_sample(vec![i as f64], (i % 3) as f64);
        }

        let a = dataset.bootstrap_sample(7);
        let b = dataset.bootstrap_sample(7);
        assert_eq!(a.n_samples(), 50);
        assert_eq!(a.features, b.features);
    }

    #[test]
    fn test_validate_rejects_empty_and_nan() {
        let dataset = Dataset::new(vec!["x".to_string()]);
        assert!(matches!(dataset.validate(), Err(ModelError::InvalidData(_))));

        let mut dataset = Dataset::new(vec!["x".to_string()]);
        dataset.add_sample(vec![f64::NAN], 0.0);
        assert!(matches!(dataset.validate(), Err(ModelError::TrainingFailed(_))));
    }
}
