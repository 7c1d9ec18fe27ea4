//! Hazard identifiers

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Disaster types accepted by the prediction dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisasterType {
    Earthquake,
    Flood,
    Cyclone,
    Storm,
    Heatwave,
    ExtremeWeather,
}

impl DisasterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisasterType::Earthquake => "earthquake",
            DisasterType::Flood => "flood",
            DisasterType::Cyclone => "cyclone",
            DisasterType::Storm => "storm",
            DisasterType::Heatwave => "heatwave",
            DisasterType::ExtremeWeather => "extreme_weather",
        }
    }
}

impl fmt::Display for DisasterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisasterType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "earthquake" => Ok(DisasterType::Earthquake),
            "flood" => Ok(DisasterType::Flood),
            "cyclone" => Ok(DisasterType::Cyclone),
            "storm" => Ok(DisasterType::Storm),
            "heatwave" => Ok(DisasterType::Heatwave),
            "extreme_weather" => Ok(DisasterType::ExtremeWeather),
            other => Err(EngineError::UnknownDisasterType(other.to_string())),
        }
    }
}

/// Keys of a location risk assessment, one per scored hazard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardKind {
    Earthquake,
    Flood,
    Cyclone,
    Heatwave,
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HazardKind::Earthquake => "earthquake",
            HazardKind::Flood => "flood",
            HazardKind::Cyclone => "cyclone",
            HazardKind::Heatwave => "heatwave",
        };
        f.write_str(name)
    }
}
