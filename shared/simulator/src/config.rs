use crate::area::AreaConfig;
use crate::checkpoint::RewardConfig;
use crate::flight::FlightConfig;
use crate::recovery::RecoveryConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub msg: String,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            msg: format!("failed to read config: {}", err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            msg: format!("invalid config: {}", err),
        }
    }
}

/// Shape and mass of the aircraft rigid body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftConfig {
    /// Half extents of the collision box (wingspan, height, length).
    pub half_extents: [f64; 3],
    pub density: f64,
    pub linear_damping: f64,
    pub angular_damping: f64,
}

impl Default for AircraftConfig {
    fn default() -> Self {
        Self {
            half_extents: [2.0, 1.0, 4.0],
            // 64 m^3 box, about 10 t.
            density: 156.25,
            linear_damping: 1.0,
            angular_damping: 5.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub flight: FlightConfig,
    pub rewards: RewardConfig,
    pub area: AreaConfig,
    pub recovery: RecoveryConfig,
    pub aircraft: AircraftConfig,
    /// Episode length in training. Zero means unlimited.
    pub training_max_step: u32,
    /// Laps needed to win a race.
    pub laps: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            flight: FlightConfig::default(),
            rewards: RewardConfig::default(),
            area: AreaConfig::default(),
            recovery: RecoveryConfig::default(),
            aircraft: AircraftConfig::default(),
            training_max_step: 5000,
            laps: 3,
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
