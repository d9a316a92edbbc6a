//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime `Scenario`
//! containing:
//! - numerical parameters (`Parameters`)
//! - the initial star store, already sorted by mass
//! - the worker count and the seed that generated the stars
//!
//! The galaxy is a flat disk: each star gets a radius uniform in
//! `[0, sqrt(n) / density)` at a uniform angle, and a tangential velocity
//! `star_speed * r^0.25`. This is a rough differential-rotation heuristic,
//! not an orbital solution.

use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::configuration::config::{GalaxyConfig, ScenarioConfig};
use super::error::SimulationError;
use super::params::Parameters;
use super::states::{Star, StarStore};
use super::vecmath::{from_polar, tangent};

use std::f64::consts::TAU;

/// Runtime bundle handed to [`crate::simulation::world::World`]
#[derive(Debug, Clone)]
pub struct Scenario {
    pub parameters: Parameters,
    pub stars: StarStore,
    pub threads: usize,
    pub seed: u64,
}

impl Scenario {
    pub fn build_scenario(cfg: &ScenarioConfig) -> Result<Self, SimulationError> {
        let parameters = cfg.physics.parameters();
        parameters.validate()?;

        let seed = cfg.galaxy.seed.unwrap_or_else(|| rand::rng().random());
        info!("generating {} stars with seed {seed}", cfg.galaxy.stars);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let stars = generate_galaxy(&cfg.galaxy, &mut rng)?;

        Ok(Self {
            parameters,
            stars,
            threads: cfg.run.threads.unwrap_or_else(default_threads),
            seed,
        })
    }
}

/// Number of hardware threads, or 1 when it cannot be determined
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Draw a rotating disk of `cfg.stars` stars, sorted by ascending mass
pub fn generate_galaxy<R: Rng>(cfg: &GalaxyConfig, rng: &mut R) -> Result<StarStore, SimulationError> {
    if cfg.stars < 2 {
        return Err(SimulationError::TooFewStars(cfg.stars));
    }
    if !(cfg.density > 0.0 && cfg.density.is_finite()) || !(cfg.mass_min > 0.0) {
        return Err(SimulationError::InvalidParameter(format!(
            "galaxy density {} / mass_min {} must be positive",
            cfg.density, cfg.mass_min
        )));
    }
    let r_max = (cfg.stars as f64).sqrt() / cfg.density;

    let stars = (0..cfg.stars)
        .map(|_| {
            let r = rng.random_range(0.0..r_max);
            let dir = rng.random_range(0.0..TAU);
            let mass = if cfg.mass_max > cfg.mass_min {
                rng.random_range(cfg.mass_min..cfg.mass_max)
            } else {
                cfg.mass_min
            };
            let velocity = tangent(dir) * (cfg.star_speed * r.powf(0.25));
            Star::new(from_polar(r, dir), velocity, mass)
        })
        .collect();

    let mut store = StarStore::new(stars)?;
    store.sort_by_mass();
    Ok(store)
}
