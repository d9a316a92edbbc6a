pub mod simulation;
pub mod configuration;
pub mod display;
pub mod clock;
pub mod benchmark;

pub use simulation::states::{Star, StarStore};
pub use simulation::vecmath::NVec2;
pub use simulation::params::Parameters;
pub use simulation::error::SimulationError;
pub use simulation::forces::{Acceleration, DirectGravity, GravityLaw, TreeGravity};
pub use simulation::barnes_hut::QuadTree;
pub use simulation::integrator::verlet_step;
pub use simulation::scenario::Scenario;
pub use simulation::world::{FrameStats, World};

pub use configuration::config::{ConfigError, GalaxyConfig, PhysicsConfig, RunConfig, ScenarioConfig};

pub use display::DisplayBuffers;
pub use clock::{FpsHistory, FrameClock};

pub use benchmark::benchmark::{bench_forces, bench_frames};
