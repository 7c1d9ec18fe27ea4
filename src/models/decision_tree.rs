//! Decision Tree implementation

use super::argmax;
use crate::data::Dataset;
use crate::error::ModelError;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree
    pub max_depth: usize,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for reproducibility
    pub seed: u64,
    /// Task type
    pub task: TaskType,
    /// Number of classes (classification only)
    pub n_classes: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskType {
    Regression,
    Classification,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
            task: TaskType::Regression,
            n_classes: 2,
        }
    }
}

/// Tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    /// Feature index for split
    pub feature_idx: Option<usize>,
    /// Threshold for split
    pub threshold: Option<f64>,
    /// Prediction value (for leaf nodes)
    pub value: f64,
    /// Class probabilities (for classification)
    pub class_probs: Option<Vec<f64>>,
    /// Number of samples in this node
    pub n_samples: usize,
    /// Left child
    pub left: Option<Box<TreeNode>>,
    /// Right child
    pub right: Option<Box<TreeNode>>,
    /// Impurity at this node
    pub impurity: f64,
    /// Dense leaf numbering, assigned in depth-first order
    pub leaf_id: Option<usize>,
}

impl TreeNode {
    fn leaf(value: f64, n_samples: usize, impurity: f64) -> Self {
        Self {
            feature_idx: None,
            threshold: None,
            value,
            class_probs: None,
            n_samples,
            left: None,
            right: None,
            impurity,
            leaf_id: None,
        }
    }

    fn leaf_classification(class_probs: Vec<f64>, n_samples: usize, impurity: f64) -> Self {
        let value = argmax(&class_probs) as f64;

        Self {
            class_probs: Some(class_probs),
            ..Self::leaf(value, n_samples, impurity)
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn depth(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            1 + self
                .left
                .as_ref()
                .map(|n| n.depth())
                .unwrap_or(0)
                .max(self.right.as_ref().map(|n| n.depth()).unwrap_or(0))
        }
    }

    pub fn n_leaves(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.left.as_ref().map(|n| n.n_leaves()).unwrap_or(0)
                + self.right.as_ref().map(|n| n.n_leaves()).unwrap_or(0)
        }
    }

    fn number_leaves(&mut self, next: &mut usize) {
        if self.is_leaf() {
            self.leaf_id = Some(*next);
            *next += 1;
            return;
        }
        if let Some(left) = self.left.as_mut() {
            left.number_leaves(next);
        }
        if let Some(right) = self.right.as_mut() {
            right.number_leaves(next);
        }
    }

    fn assign_leaf_values(&mut self, values: &[f64]) {
        if let Some(id) = self.leaf_id {
            if let Some(&v) = values.get(id) {
                self.value = v;
            }
            return;
        }
        if let Some(left) = self.left.as_mut() {
            left.assign_leaf_values(values);
        }
        if let Some(right) = self.right.as_mut() {
            right.assign_leaf_values(values);
        }
    }
}

/// Best split found for a node
struct Split {
    feature_idx: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
    importance: f64,
}

/// Running label statistics for one side of a candidate split
#[derive(Clone)]
enum SideStats {
    Classes { counts: Vec<f64>, n: f64 },
    Moments { sum: f64, sum_sq: f64, n: f64 },
}

impl SideStats {
    fn empty(task: TaskType, n_classes: usize) -> Self {
        match task {
            TaskType::Classification => SideStats::Classes {
                counts: vec![0.0; n_classes],
                n: 0.0,
            },
            TaskType::Regression => SideStats::Moments {
                sum: 0.0,
                sum_sq: 0.0,
                n: 0.0,
            },
        }
    }

    fn add(&mut self, label: f64, sign: f64) {
        match self {
            SideStats::Classes { counts, n } => {
                if let Some(c) = counts.get_mut(label as usize) {
                    *c += sign;
                }
                *n += sign;
            }
            SideStats::Moments { sum, sum_sq, n } => {
                *sum += sign * label;
                *sum_sq += sign * label * label;
                *n += sign;
            }
        }
    }

    fn impurity(&self) -> f64 {
        match self {
            SideStats::Classes { counts, n } => {
                if *n <= 0.0 {
                    return 0.0;
                }
                1.0 - counts.iter().map(|c| (c / n).powi(2)).sum::<f64>()
            }
            SideStats::Moments { sum, sum_sq, n } => {
                if *n <= 0.0 {
                    return 0.0;
                }
                let mean = sum / n;
                (sum_sq / n - mean * mean).max(0.0)
            }
        }
    }
}

/// Decision Tree model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<TreeNode>,
    feature_names: Vec<String>,
    feature_importances: Vec<f64>,
    n_leaves: usize,
}

impl DecisionTree {
    /// Create a new decision tree with config
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            feature_names: Vec::new(),
            feature_importances: Vec::new(),
            n_leaves: 0,
        }
    }

    /// Create with default config
    pub fn default_regression() -> Self {
        Self::new(TreeConfig {
            task: TaskType::Regression,
            ..Default::default()
        })
    }

    pub fn default_classification(n_classes: usize) -> Self {
        Self::new(TreeConfig {
            task: TaskType::Classification,
            n_classes,
            ..Default::default()
        })
    }

    /// Train the decision tree
    pub fn fit(&mut self, dataset: &Dataset) -> Result<(), ModelError> {
        dataset.validate()?;
        if self.config.task == TaskType::Classification && self.config.n_classes == 0 {
            return Err(ModelError::InvalidData(
                "Classification tree needs at least one class".to_string(),
            ));
        }

        self.feature_names = dataset.feature_names.clone();
        let n_features = dataset.n_features();
        self.feature_importances = vec![0.0; n_features];

        let indices: Vec<usize> = (0..dataset.n_samples()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let mut root = self.build_tree(dataset, &indices, 0, &mut rng);
        let mut next = 0;
        root.number_leaves(&mut next);
        self.n_leaves = next;
        self.root = Some(root);

        // Normalize feature importances
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }

        Ok(())
    }

    fn node_stats(&self, dataset: &Dataset, indices: &[usize]) -> SideStats {
        let mut stats = SideStats::empty(self.config.task, self.config.n_classes);
        for &i in indices {
            stats.add(dataset.labels[i], 1.0);
        }
        stats
    }

    /// Build tree recursively
    fn build_tree(
        &mut self,
        dataset: &Dataset,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n = indices.len();
        let stats = self.node_stats(dataset, indices);
        let impurity = stats.impurity();

        // Check stopping conditions
        if depth >= self.config.max_depth
            || n < self.config.min_samples_split
            || impurity < 1e-10
        {
            return self.create_leaf(&stats, n, impurity);
        }

        match self.find_best_split(dataset, indices, &stats, rng) {
            Some(split) => {
                self.feature_importances[split.feature_idx] += split.importance;

                let left = self.build_tree(dataset, &split.left, depth + 1, rng);
                let right = self.build_tree(dataset, &split.right, depth + 1, rng);

                TreeNode {
                    feature_idx: Some(split.feature_idx),
                    threshold: Some(split.threshold),
                    value: 0.0,
                    class_probs: None,
                    n_samples: n,
                    left: Some(Box::new(left)),
                    right: Some(Box::new(right)),
                    impurity,
                    leaf_id: None,
                }
            }
            None => self.create_leaf(&stats, n, impurity),
        }
    }

    /// Create a leaf node
    fn create_leaf(&self, stats: &SideStats, n_samples: usize, impurity: f64) -> TreeNode {
        match stats {
            SideStats::Moments { sum, n, .. } => {
                let mean = if *n > 0.0 { sum / n } else { 0.0 };
                TreeNode::leaf(mean, n_samples, impurity)
            }
            SideStats::Classes { counts, n } => {
                let probs = if *n > 0.0 {
                    counts.iter().map(|c| c / n).collect()
                } else {
                    self.uniform()
                };
                TreeNode::leaf_classification(probs, n_samples, impurity)
            }
        }
    }

    /// Find the best split by sweeping each candidate feature in sorted order
    fn find_best_split(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        parent: &SideStats,
        rng: &mut ChaCha8Rng,
    ) -> Option<Split> {
        let n_features = dataset.n_features();
        if indices.len() < 2 || n_features == 0 {
            return None;
        }
        let max_features = self.config.max_features.unwrap_or(n_features).clamp(1, n_features);

        // Select features to consider
        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features);

        let parent_impurity = parent.impurity();
        let n_total = indices.len() as f64;
        let min_leaf = self.config.min_samples_leaf.max(1);

        let mut best_gain = 0.0;
        let mut best: Option<(usize, f64)> = None;

        let mut order: Vec<usize> = indices.to_vec();
        for &feature_idx in &feature_indices {
            order.sort_by(|&a, &b| {
                dataset.features[a][feature_idx].total_cmp(&dataset.features[b][feature_idx])
            });

            let mut left = SideStats::empty(self.config.task, self.config.n_classes);
            let mut right = parent.clone();

            for pos in 0..order.len() - 1 {
                let label = dataset.labels[order[pos]];
                left.add(label, 1.0);
                right.add(label, -1.0);

                let n_left = pos + 1;
                let n_right = order.len() - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let current = dataset.features[order[pos]][feature_idx];
                let next = dataset.features[order[pos + 1]][feature_idx];
                if current >= next {
                    continue;
                }

                let weighted_impurity = (n_left as f64 * left.impurity()
                    + n_right as f64 * right.impurity())
                    / n_total;
                let gain = parent_impurity - weighted_impurity;

                if gain > best_gain {
                    best_gain = gain;
                    best = Some((feature_idx, (current + next) / 2.0));
                }
            }
        }

        best.map(|(feature_idx, threshold)| {
            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| dataset.features[i][feature_idx] <= threshold);
            Split {
                feature_idx,
                threshold,
                left,
                right,
                importance: best_gain * n_total,
            }
        })
    }

    fn find_leaf(&self, features: &[f64]) -> Option<&TreeNode> {
        let mut node = self.root.as_ref()?;
        loop {
            match (node.feature_idx, node.threshold, &node.left, &node.right) {
                (Some(idx), Some(threshold), Some(left), Some(right)) => {
                    let value = features.get(idx).copied().unwrap_or(0.0);
                    node = if value <= threshold { &**left } else { &**right };
                }
                _ => return Some(node),
            }
        }
    }

    /// Predict for a single sample
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        self.find_leaf(features).map(|n| n.value).unwrap_or(0.0)
    }

    /// Predict probabilities for classification
    pub fn predict_proba_one(&self, features: &[f64]) -> Vec<f64> {
        self.find_leaf(features)
            .and_then(|n| n.class_probs.clone())
            .unwrap_or_else(|| self.uniform())
    }

    /// Leaf index reached by a sample
    pub fn apply(&self, features: &[f64]) -> Option<usize> {
        self.find_leaf(features).and_then(|n| n.leaf_id)
    }

    /// Overwrite leaf outputs, indexed by leaf id
    pub fn set_leaf_values(&mut self, values: &[f64]) -> Result<(), ModelError> {
        let n_leaves = self.n_leaves();
        let root = self.root.as_mut().ok_or(ModelError::NotTrained)?;
        if values.len() != n_leaves {
            return Err(ModelError::InvalidData(format!(
                "Expected {} leaf values, got {}",
                n_leaves,
                values.len()
            )));
        }
        root.assign_leaf_values(values);
        Ok(())
    }

    /// Predict for multiple samples
    pub fn predict(&self, dataset: &Dataset) -> Vec<f64> {
        dataset
            .features
            .iter()
            .map(|f| self.predict_one(f))
            .collect()
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Get feature names with importances
    pub fn feature_importance_map(&self) -> Vec<(&str, f64)> {
        self.feature_names
            .iter()
            .zip(self.feature_importances.iter())
            .map(|(n, &i)| (n.as_str(), i))
            .collect()
    }

    pub fn depth(&self) -> usize {
        self.root.as_ref().map(|r| r.depth()).unwrap_or(0)
    }

    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    fn uniform(&self) -> Vec<f64> {
        let k = self.config.n_classes.max(1);
        vec![1.0 / k as f64; k]
    }

    /// Calculate accuracy for classification
    pub fn accuracy(&self, dataset: &Dataset) -> f64 {
        if dataset.is_empty() {
            return 0.0;
        }
        let correct = self
            .predict(dataset)
            .iter()
            .zip(dataset.labels.iter())
            .filter(|(pred, label)| (*pred - *label).abs() < 1e-9)
            .count();

        correct as f64 / dataset.n_samples() as f64
    }

    /// Calculate MSE for regression
    pub fn mse_score(&self, dataset: &Dataset) -> f64 {
        if dataset.is_empty() {
            return 0.0;
        }
        let predictions = self.predict(dataset);
        predictions
            .iter()
            .zip(dataset.labels.iter())
            .map(|(p, l)| (p - l).powi(2))
            .sum::<f64>()
            / dataset.n_samples() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_tree_regression() {
        let mut dataset = Dataset::new(vec!["x".to_string()]);

        // Simple linear relationship
        for i in 0..100 {
            let x = i as f64 / 10.0;
            dataset.add_sample(vec![x], 2.0 * x + 1.0);
        }

        let mut tree = DecisionTree::default_regression();
        tree.fit(&dataset).unwrap();

        assert!(tree.mse_score(&dataset) < 1.0);
        assert!(tree.depth() <= 11);
    }

    #[test]
    fn test_decision_tree_three_classes() {
        let mut dataset = Dataset::new(vec!["x".to_string(), "noise".to_string()]);

        for i in 0..150 {
            let x = i as f64 / 10.0;
            let label = if x < 5.0 {
                0.0
            } else if x < 10.0 {
                1.0
            } else {
                2.0
            };
            dataset.add_sample(vec![x, (i % 7) as f64], label);
        }

        let mut tree = DecisionTree::default_classification(3);
        tree.fit(&dataset).unwrap();

        assert!(tree.accuracy(&dataset) > 0.95);

        let probs = tree.predict_proba_one(&[12.0, 3.0]);
        assert_eq!(probs.len(), 3);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert_eq!(tree.predict_one(&[12.0, 3.0]), 2.0);

        let importance = tree.feature_importance_map();
        assert!(importance[0].1 > importance[1].1);
    }

    #[test]
    fn test_leaf_ids_are_dense() {
        let mut dataset = Dataset::new(vec!["x".to_string()]);
        for i in 0..40 {
            dataset.add_sample(vec![i as f64], (i / 10) as f64);
        }

        let mut tree = DecisionTree::default_regression();
        tree.fit(&dataset).unwrap();

        let n_leaves = tree.n_leaves();
        assert!(n_leaves >= 4);
        for row in &dataset.features {
            let id = tree.apply(row).unwrap();
            assert!(id < n_leaves);
        }

        tree.set_leaf_values(&vec![7.0; n_leaves]).unwrap();
        assert_eq!(tree.predict_one(&[3.0]), 7.0);
    }

    #[test]
    fn test_unfitted_tree_is_uniform() {
        let mut tree = DecisionTree::default_classification(3);
        assert!(!tree.is_fitted());
        assert_eq!(tree.predict_proba_one(&[1.0]), vec![1.0 / 3.0; 3]);
        assert_eq!(tree.set_leaf_values(&[1.0]), Err(ModelError::NotTrained));
    }

    #[test]
    fn test_fit_rejects_empty_dataset() {
        let mut tree = DecisionTree::default_classification(3);
        let dataset = Dataset::new(vec!["x".to_string()]);
        assert!(tree.fit(&dataset).is_err());
    }
}
