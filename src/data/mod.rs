//! Data structures module
//!
//! Provides the training dataset type and the per-request feature map.

mod dataset;
mod features;

pub use dataset::Dataset;
pub use features::Features;
