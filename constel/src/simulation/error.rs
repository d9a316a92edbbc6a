//! Errors raised by the simulation core
//!
//! All of them are structural: a world that returned one of these should be
//! torn down, there is nothing to retry.

use std::fmt;

#[derive(Debug)]
pub enum SimulationError {
    /// Fewer than two stars were supplied
    TooFewStars(usize),
    /// Star `index` has a mass that is not strictly positive and finite
    InvalidMass { index: usize, mass: f64 },
    /// The tree needed more branches than the preallocated arena holds
    ArenaExhausted { capacity: usize },
    /// A worker thread could not be started
    ThreadSpawn(std::io::Error),
    /// A worker thread failed while computing accelerations
    WorkerFailed(String),
    /// A physics parameter is out of range
    InvalidParameter(String),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::TooFewStars(n) => {
                write!(f, "simulation needs at least 2 stars, got {n}")
            }
            SimulationError::InvalidMass { index, mass } => {
                write!(f, "star {index} has invalid mass {mass}")
            }
            SimulationError::ArenaExhausted { capacity } => {
                write!(f, "quad-tree arena exhausted ({capacity} branches)")
            }
            SimulationError::ThreadSpawn(e) => write!(f, "failed to spawn worker thread: {e}"),
            SimulationError::WorkerFailed(msg) => write!(f, "worker failed: {msg}"),
            SimulationError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::ThreadSpawn(e) => Some(e),
            _ => None,
        }
    }
}
