//! Multi-hazard risk command line
//!
//! Usage:
//!   disaster-risk predict --type earthquake --lat 35.0 --lon 139.0 --feature depth=30
//!   disaster-risk assess --lat 28.6 --lon 77.2
//!   disaster-risk health
//!   disaster-risk models

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use disaster_risk::config::{load_config, EngineConfig};
use disaster_risk::data::Features;
use disaster_risk::engine::{HazardEngine, DEFAULT_LOCATION};
use disaster_risk::geo::{GeoPoint, Location};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-hazard disaster risk prediction")]
struct Args {
    /// JSON or TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the training seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict one hazard at a location
    Predict {
        /// earthquake, flood, cyclone, storm, heatwave or extreme_weather
        #[arg(short = 't', long = "type")]
        disaster_type: String,

        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Feature as key=value, repeatable
        #[arg(short, long = "feature", value_parser = parse_feature)]
        features: Vec<(String, f64)>,
    },

    /// Combined risk for a location
    Assess {
        #[arg(long, default_value_t = DEFAULT_LOCATION.latitude, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, default_value_t = DEFAULT_LOCATION.longitude, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Model readiness
    Health,

    /// Model catalog
    Models,
}

fn parse_feature(raw: &str) -> std::result::Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for '{}': {}", key, e))?;
    Ok((key.trim().to_string(), value))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    }
    .apply_env()?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("disaster_risk={}", config.logging.level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(seed = config.seed, "Training prediction models");
    let engine = HazardEngine::from_config(&config)?;

    match args.command {
        Command::Predict {
            disaster_type,
            lat,
            lon,
            features,
        } => {
            let location = Location {
                latitude: lat,
                longitude: lon,
            };
            let features: Features = features
                .iter()
                .map(|(key, value)| (key.as_str(), *value))
                .collect();
            let result = engine.predict(&disaster_type, &location, &features)?;
            print_json(&result)?;
        }
        Command::Assess { lat, lon } => {
            print_json(&engine.assess_risk(GeoPoint::new(lat, lon)))?;
        }
        Command::Health => print_json(&engine.health())?,
        Command::Models => print_json(&engine.model_info())?,
    }

    Ok(())
}
