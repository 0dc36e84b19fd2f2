//! Session configuration.
//!
//! Everything a session needs besides its seed: belt shape, crew sizes,
//! rules, storm frequency and the settler autopilot. Configurations are
//! JSON files; every field is optional and falls back to its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::Rules;

/// Fewest asteroids a belt can be generated with.
pub const MIN_ASTEROIDS: u32 = 2;

/// Shape of a generated belt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeltConfig {
    /// Number of asteroids in the ring.
    pub asteroids: u32,
    /// Random shortcuts added across the ring.
    pub extra_links: u32,
    /// Thickest possible mantle.
    pub max_mantle: u32,
    /// Share of asteroids close to the sun, in `[0, 1]`.
    pub near_sun_ratio: f64,
    /// Share of asteroids generated with an empty core, in `[0, 1]`.
    pub empty_core_ratio: f64,
    /// Occupant limit for every asteroid (`None` = unlimited).
    pub capacity: Option<usize>,
}

impl Default for BeltConfig {
    fn default() -> Self {
        Self {
            asteroids: 24,
            extra_links: 8,
            max_mantle: 4,
            near_sun_ratio: 0.2,
            empty_core_ratio: 0.2,
            capacity: None,
        }
    }
}

impl BeltConfig {
    /// Check that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.asteroids < MIN_ASTEROIDS {
            return Err(ConfigError::Invalid(format!(
                "belt.asteroids must be at least {MIN_ASTEROIDS}, got {}",
                self.asteroids
            )));
        }
        for (name, ratio) in [
            ("belt.near_sun_ratio", self.near_sun_ratio),
            ("belt.empty_core_ratio", self.empty_core_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1], got {ratio}"
                )));
            }
        }
        if self.capacity == Some(0) {
            return Err(ConfigError::Invalid(
                "belt.capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// How the built-in settler policy plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    /// Materials a settler gathers before heading to the rally asteroid.
    pub carry_target: u32,
    /// Whether settlers spend materials on teleport gates.
    pub craft_gates: bool,
    /// Whether settlers spend materials on robots.
    pub craft_robots: bool,
    /// Index of the asteroid where settlers meet.
    pub rally: u32,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            carry_target: 3,
            craft_gates: false,
            craft_robots: false,
            rally: 0,
        }
    }
}

/// Complete session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Belt generation.
    pub belt: BeltConfig,
    /// Number of settlers.
    pub settlers: u32,
    /// Number of UFOs.
    pub ufos: u32,
    /// Goal thresholds and crafting costs.
    pub rules: Rules,
    /// Turns between solar storms (0 = no storms).
    pub storm_interval: u64,
    /// Turns between orbit shifts, each moving one asteroid towards or away
    /// from the sun (0 = fixed orbits).
    pub orbit_interval: u64,
    /// Turns after which an undecided session stops.
    pub max_turns: u64,
    /// Settler policy.
    pub autopilot: AutopilotConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            belt: BeltConfig::default(),
            settlers: 4,
            ufos: 2,
            rules: Rules::default(),
            storm_interval: 40,
            orbit_interval: 25,
            max_turns: 5000,
            autopilot: AutopilotConfig::default(),
        }
    }
}

impl GameConfig {
    /// Read and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// holds an out-of-range value.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io_error(std::io::Error::other(e)))?;
        fs::write(path, json).map_err(io_error)
    }

    /// Check that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.belt.validate()?;
        if self.settlers == 0 {
            return Err(ConfigError::Invalid(
                "settlers must be at least 1".to_string(),
            ));
        }
        if self.max_turns == 0 {
            return Err(ConfigError::Invalid(
                "max_turns must be at least 1".to_string(),
            ));
        }
        if self.autopilot.rally >= self.belt.asteroids {
            return Err(ConfigError::Invalid(format!(
                "autopilot.rally must name one of the {} asteroids, got {}",
                self.belt.asteroids, self.autopilot.rally
            )));
        }
        for (name, recipe) in [
            ("rules.gate_recipe", &self.rules.gate_recipe),
            ("rules.robot_recipe", &self.rules.robot_recipe),
        ] {
            if recipe.parts().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{name} must cost at least one material"
                )));
            }
        }
        Ok(())
    }
}
