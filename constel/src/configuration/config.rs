//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`GalaxyConfig`]  – how the initial star disk is generated
//! - [`PhysicsConfig`] – physical constants and time stepping
//! - [`RunConfig`]     – frame loop and worker pool settings
//! - [`ScenarioConfig`] – top-level wrapper used to load a scenario from YAML
//!
//! Every field has a default, so a file only needs the values it changes.
//!
//! # YAML format
//!
//! ```yaml
//! galaxy:
//!   stars: 20000          # number of stars, >= 2
//!   density: 7.0          # disk radius is sqrt(stars) / density
//!   star_speed: 0.5       # tangential speed factor, v = star_speed * r^0.25
//!   mass_min: 1.0
//!   mass_max: 10.0
//!   seed: 42              # omit for a random seed
//!
//! physics:
//!   gravity: 0.002        # gravitational constant
//!   epsilon: 2.0          # softening added to d^2
//!   accuracy: 2.0         # node is a point mass when d > size * accuracy
//!   speed: 1.0            # simulation time per real second
//!   min_fps: 30.0         # longer frames are clamped to 1/min_fps
//!
//! run:
//!   max_fps: 60.0
//!   frames: 600
//!   threads: 8            # omit to use every available core
//! ```

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::simulation::params::Parameters;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read scenario: {e}"),
            ConfigError::Parse(e) => write!(f, "failed to parse scenario: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid scenario: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

/// Initial galaxy disk
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GalaxyConfig {
    pub stars: usize, // number of stars
    pub density: f64, // disk radius = sqrt(stars) / density
    pub star_speed: f64, // tangential speed factor
    pub mass_min: f64, // star mass is uniform in [mass_min, mass_max)
    pub mass_max: f64,
    pub seed: Option<u64>, // deterministic seed, random when absent
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            stars: 20000,
            density: 7.0,
            star_speed: 0.5,
            mass_min: 1.0,
            mass_max: 10.0,
            seed: None,
        }
    }
}

/// Physical constants and time stepping
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsConfig {
    pub gravity: f64,
    pub epsilon: f64,
    pub accuracy: f64,
    pub speed: f64,
    pub min_fps: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let p = Parameters::default();
        Self {
            gravity: p.gravity,
            epsilon: p.epsilon,
            accuracy: p.accuracy,
            speed: p.speed,
            min_fps: p.min_fps,
        }
    }
}

impl PhysicsConfig {
    pub fn parameters(&self) -> Parameters {
        Parameters {
            gravity: self.gravity,
            epsilon: self.epsilon,
            accuracy: self.accuracy,
            speed: self.speed,
            min_fps: self.min_fps,
        }
    }
}

/// Frame loop driven by the command line runner
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub max_fps: f64, // frame rate cap of the runner
    pub frames: usize, // frames to run before exiting
    pub threads: Option<usize>, // worker count, all cores when absent
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_fps: 60.0,
            frames: 600,
            threads: None,
        }
    }
}

/// Top-level scenario configuration loaded from YAML
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    pub galaxy: GalaxyConfig,
    pub physics: PhysicsConfig,
    pub run: RunConfig,
}

impl ScenarioConfig {
    /// Read and validate a scenario file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path.as_ref()).map_err(ConfigError::Io)?;
        let cfg: ScenarioConfig =
            serde_yaml::from_reader(BufReader::new(file)).map_err(ConfigError::Parse)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a scenario held in memory
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let cfg: ScenarioConfig = serde_yaml::from_str(text).map_err(ConfigError::Parse)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.galaxy;
        if g.stars < 2 {
            return Err(ConfigError::Invalid(format!("galaxy.stars must be >= 2, got {}", g.stars)));
        }
        if !(g.density > 0.0 && g.density.is_finite()) {
            return Err(ConfigError::Invalid(format!("galaxy.density must be > 0, got {}", g.density)));
        }
        if !g.star_speed.is_finite() {
            return Err(ConfigError::Invalid("galaxy.star_speed must be finite".into()));
        }
        if !(g.mass_min > 0.0 && g.mass_max >= g.mass_min && g.mass_max.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "galaxy mass range must satisfy 0 < mass_min <= mass_max, got [{}, {}]",
                g.mass_min, g.mass_max
            )));
        }
        self.physics
            .parameters()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if !(self.run.max_fps > 0.0) {
            return Err(ConfigError::Invalid(format!("run.max_fps must be > 0, got {}", self.run.max_fps)));
        }
        if self.run.threads == Some(0) {
            return Err(ConfigError::Invalid("run.threads must be >= 1".into()));
        }
        Ok(())
    }
}
