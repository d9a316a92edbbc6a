//! Core state types for the galaxy simulation.
//!
//! Defines the `Star` point mass and the `StarStore` that owns all of them.
//! Indices into the store are stable for the life of a world: stars are
//! never added or removed once the store is built.

use super::error::SimulationError;
use super::vecmath::NVec2;

#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub position: NVec2, // world-space position
    pub velocity: NVec2, // velocity
    pub cached_acceleration: NVec2, // acceleration from the previous frame (velocity-Verlet)
    pub mass: f64, // mass, > 0
}

impl Star {
    pub fn new(position: NVec2, velocity: NVec2, mass: f64) -> Self {
        Self {
            position,
            velocity,
            cached_acceleration: NVec2::zeros(),
            mass,
        }
    }

    /// Star at rest
    pub fn at(x: f64, y: f64, mass: f64) -> Self {
        Self::new(NVec2::new(x, y), NVec2::zeros(), mass)
    }
}

/// Contiguous array of every star in a world
#[derive(Debug, Clone)]
pub struct StarStore {
    stars: Vec<Star>,
}

impl StarStore {
    /// Take ownership of `stars` after checking the count and masses
    pub fn new(stars: Vec<Star>) -> Result<Self, SimulationError> {
        if stars.len() < 2 {
            return Err(SimulationError::TooFewStars(stars.len()));
        }
        if let Some((index, star)) = stars
            .iter()
            .enumerate()
            .find(|(_, s)| !(s.mass > 0.0 && s.mass.is_finite()))
        {
            return Err(SimulationError::InvalidMass { index, mass: star.mass });
        }
        Ok(Self { stars })
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn as_slice(&self) -> &[Star] {
        &self.stars
    }

    pub fn as_mut_slice(&mut self) -> &mut [Star] {
        &mut self.stars
    }

    /// Ascending by mass. Lighter stars inserted first keep the running
    /// center-of-mass averages in the tree builder accurate.
    pub fn sort_by_mass(&mut self) {
        self.stars.sort_by(|a, b| a.mass.total_cmp(&b.mass));
    }

    pub fn total_mass(&self) -> f64 {
        self.stars.iter().map(|s| s.mass).sum()
    }

    /// Total linear momentum, sum of m * v
    pub fn momentum(&self) -> NVec2 {
        self.stars
            .iter()
            .fold(NVec2::zeros(), |acc, s| acc + s.velocity * s.mass)
    }

    pub fn center_of_mass(&self) -> NVec2 {
        let weighted = self
            .stars
            .iter()
            .fold(NVec2::zeros(), |acc, s| acc + s.position * s.mass);
        weighted / self.total_mass()
    }
}
