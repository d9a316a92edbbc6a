//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds the runtime settings read once when a world starts:
//! - gravitational constant and softening (`gravity`, `epsilon`),
//! - tree acceptance ratio (`accuracy`),
//! - global time scale and the frame-time clamp (`speed`, `min_fps`)

use super::error::SimulationError;
use super::forces::GravityLaw;

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub gravity: f64, // gravitational constant
    pub epsilon: f64, // softening added to d^2
    pub accuracy: f64, // a node is a point mass when d > size * accuracy
    pub speed: f64, // simulation time per real second
    pub min_fps: f64, // slowest frame rate simulated faithfully
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            gravity: 0.002,
            epsilon: 2.0,
            accuracy: 2.0,
            speed: 1.0,
            min_fps: 30.0,
        }
    }
}

impl Parameters {
    pub fn validate(&self) -> Result<(), SimulationError> {
        let bad = |msg: String| Err(SimulationError::InvalidParameter(msg));
        if !self.gravity.is_finite() {
            return bad(format!("gravity must be finite, got {}", self.gravity));
        }
        if !(self.epsilon >= 0.0 && self.epsilon.is_finite()) {
            return bad(format!("epsilon must be >= 0, got {}", self.epsilon));
        }
        if !(self.accuracy > 0.0) {
            return bad(format!("accuracy must be > 0, got {}", self.accuracy));
        }
        if !(self.speed >= 0.0 && self.speed.is_finite()) {
            return bad(format!("speed must be >= 0, got {}", self.speed));
        }
        if !(self.min_fps > 0.0 && self.min_fps.is_finite()) {
            return bad(format!("min_fps must be > 0, got {}", self.min_fps));
        }
        Ok(())
    }

    /// Longest real frame time that is simulated as-is
    pub fn max_step(&self) -> f64 {
        1.0 / self.min_fps
    }

    /// Simulation time step for a frame that took `elapsed` seconds.
    /// Spikes are clamped to `max_step` before the time scale is applied.
    pub fn frame_step(&self, elapsed: f64) -> f64 {
        let elapsed = if elapsed > 0.0 { elapsed } else { 0.0 }; // also catches NaN
        elapsed.min(self.max_step()) * self.speed
    }

    /// Opening angle equivalent of `accuracy`: a node is accepted when
    /// size / distance < theta
    pub fn theta(&self) -> f64 {
        1.0 / self.accuracy
    }

    pub fn law(&self) -> GravityLaw {
        GravityLaw {
            gravity: self.gravity,
            epsilon: self.epsilon,
        }
    }
}
