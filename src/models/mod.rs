//! Machine learning models module
//!
//! Provides Decision Tree, Random Forest and Gradient Boosting classifiers,
//! all fit from scratch on in-memory datasets with seeded randomness.

mod classifier;
mod decision_tree;
mod gbm;
mod random_forest;

pub use classifier::{
    classify_or_fallback, ClassPrediction, RiskClassifier, FALLBACK_CLASS, FALLBACK_PROBABILITIES,
};
pub use decision_tree::{DecisionTree, TaskType, TreeConfig, TreeNode};
pub use gbm::{GbmClassifier, GbmParams};
pub use random_forest::{ForestConfig, RandomForest};

/// Index of the largest value; the first one wins on ties
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
