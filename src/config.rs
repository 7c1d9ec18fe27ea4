//! Configuration management
//!
//! Training hyperparameters for the three model families plus logging.
//! Every field has a default, so an empty file is a valid configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seed shared by every synthetic generator and model fit
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Seismic random forest
    #[serde(
        default = "ForestSettings::earthquake",
        deserialize_with = "earthquake_forest"
    )]
    pub earthquake: ForestSettings,

    /// Flood gradient boosting
    #[serde(default)]
    pub flood: BoostingSettings,

    /// Cyclone random forest
    #[serde(default = "ForestSettings::cyclone", deserialize_with = "cyclone_forest")]
    pub cyclone: ForestSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

fn default_seed() -> u64 {
    42
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            earthquake: ForestSettings::earthquake(),
            flood: BoostingSettings::default(),
            cyclone: ForestSettings::cyclone(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Random forest training settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestSettings {
    /// Synthetic rows to generate
    pub n_samples: usize,
    pub n_trees: usize,
    pub max_depth: usize,
}

impl ForestSettings {
    pub fn earthquake() -> Self {
        Self {
            n_samples: 2000,
            n_trees: 100,
            max_depth: 10,
        }
    }

    pub fn cyclone() -> Self {
        Self {
            n_samples: 1500,
            n_trees: 80,
            max_depth: 8,
        }
    }
}

/// Partial forest table; missing keys keep the hazard's defaults
#[derive(Deserialize)]
struct ForestOverrides {
    n_samples: Option<usize>,
    n_trees: Option<usize>,
    max_depth: Option<usize>,
}

impl ForestOverrides {
    fn apply(self, base: ForestSettings) -> ForestSettings {
        ForestSettings {
            n_samples: self.n_samples.unwrap_or(base.n_samples),
            n_trees: self.n_trees.unwrap_or(base.n_trees),
            max_depth: self.max_depth.unwrap_or(base.max_depth),
        }
    }
}

fn earthquake_forest<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ForestSettings, D::Error> {
    Ok(ForestOverrides::deserialize(deserializer)?.apply(ForestSettings::earthquake()))
}

fn cyclone_forest<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ForestSettings, D::Error> {
    Ok(ForestOverrides::deserialize(deserializer)?.apply(ForestSettings::cyclone()))
}

/// Gradient boosting training settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingSettings {
    #[serde(default = "default_flood_samples")]
    pub n_samples: usize,
    #[serde(default = "default_estimators")]
    pub n_estimators: usize,
    #[serde(default = "default_boosting_depth")]
    pub max_depth: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
}

fn default_flood_samples() -> usize {
    2000
}

fn default_estimators() -> usize {
    100
}

fn default_boosting_depth() -> usize {
    6
}

fn default_learning_rate() -> f64 {
    0.1
}

impl Default for BoostingSettings {
    fn default() -> Self {
        Self {
            n_samples: default_flood_samples(),
            n_estimators: default_estimators(),
            max_depth: default_boosting_depth(),
            learning_rate: default_learning_rate(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Level for this crate's targets (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Override fields from `DISASTER_RISK_SEED` and `DISASTER_RISK_LOG`
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(seed) = std::env::var("DISASTER_RISK_SEED") {
            self.seed = seed.trim().parse().map_err(|_| {
                ConfigError::Parse(format!("DISASTER_RISK_SEED is not an integer: {}", seed))
            })?;
        }
        if let Ok(level) = std::env::var("DISASTER_RISK_LOG") {
            self.logging.level = level;
        }
        Ok(self)
    }

    /// Check hyperparameters that would make training meaningless.
    ///
    /// Zero sample counts pass: they make the fit fail and the predictor
    /// serve its fallback distribution.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, depth) in [
            ("earthquake", self.earthquake.max_depth),
            ("flood", self.flood.max_depth),
            ("cyclone", self.cyclone.max_depth),
        ] {
            if depth == 0 {
                return Err(ConfigError::Validation(format!(
                    "{}.max_depth must be positive",
                    name
                )));
            }
        }
        let lr = self.flood.learning_rate;
        if !(lr > 0.0 && lr <= 1.0) {
            return Err(ConfigError::Validation(format!(
                "flood.learning_rate must be in (0, 1], got {}",
                lr
            )));
        }
        Ok(())
    }
}

/// Load configuration from a JSON or TOML file, chosen by extension
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let config: EngineConfig = if path.extension().map_or(false, |ext| ext == "json") {
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
    } else {
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.earthquake, ForestSettings::earthquake());
        assert_eq!(config.cyclone.n_samples, 1500);
        assert_eq!(config.cyclone.n_trees, 80);
        assert_eq!(config.flood.max_depth, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "seed = 7\n\n[flood]\nn_estimators = 20").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.flood.n_estimators, 20);
        assert_eq!(config.flood.max_depth, 6);
        assert_eq!(config.earthquake.n_trees, 100);
    }

    #[test]
    fn test_partial_forest_tables_keep_hazard_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[earthquake]\nn_trees = 50\n\n[cyclone]\nmax_depth = 4").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.earthquake.n_trees, 50);
        assert_eq!(config.earthquake.n_samples, 2000);
        assert_eq!(config.earthquake.max_depth, 10);
        assert_eq!(config.cyclone.max_depth, 4);
        assert_eq!(config.cyclone.n_samples, 1500);
        assert_eq!(config.cyclone.n_trees, 80);
    }

    #[test]
    fn test_json_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"cyclone": {{"n_samples": 10, "n_trees": 3, "max_depth": 2}}}}"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.cyclone.n_trees, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validation_rejects_zero_depth() {
        let mut config = EngineConfig::default();
        config.earthquake.max_depth = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_samples_is_valid() {
        let mut config = EngineConfig::default();
        config.flood.n_samples = 0;
        assert!(config.validate().is_ok());
    }
}
