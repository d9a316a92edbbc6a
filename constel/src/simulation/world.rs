//! A running galaxy
//!
//! `World` owns everything a simulation needs between frames: the worker
//! pool (which in turn owns the star store and the tree arena), the
//! acceleration buffer, and the display buffers. A frame is
//!
//! 1. rebuild the tree from current positions
//! 2. evaluate every star's acceleration in parallel against that tree
//! 3. integrate sequentially, then project positions for display
//! 4. clear the tree for the next frame
//!
//! Nothing is allocated after [`World::from_stars`] returns.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::configuration::config::ScenarioConfig;
use crate::display::DisplayBuffers;

use super::barnes_hut::QuadTree;
use super::engine::{Frame, WorkerPool};
use super::error::SimulationError;
use super::integrator::verlet_step;
use super::params::Parameters;
use super::scenario::Scenario;
use super::states::{Star, StarStore};
use super::vecmath::NVec2;

/// Timings and counters of the last frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub frame: u64,       // frames completed so far
    pub dt: f64,          // simulation time advanced
    pub quad_count: usize, // branches used by the tree
    pub build: Duration,
    pub force: Duration,
    pub integrate: Duration,
}

pub struct World {
    pool: WorkerPool,
    params: Parameters,
    accelerations: Vec<NVec2>,
    display: DisplayBuffers,
    stats: FrameStats,
    seed: Option<u64>,
}

impl World {
    /// Generate a galaxy from `cfg` and start its worker pool
    pub fn init_world(cfg: &ScenarioConfig) -> Result<Self, SimulationError> {
        let scenario = Scenario::build_scenario(cfg)?;
        Self::from_scenario(scenario)
    }

    pub fn from_scenario(scenario: Scenario) -> Result<Self, SimulationError> {
        let seed = scenario.seed;
        let mut world = Self::from_store(scenario.stars, &scenario.parameters, scenario.threads)?;
        world.seed = Some(seed);
        Ok(world)
    }

    /// World over hand-placed stars. The stars are sorted by mass first, so
    /// indices may differ from `stars`.
    pub fn from_stars(stars: Vec<Star>, params: &Parameters, threads: usize) -> Result<Self, SimulationError> {
        let mut store = StarStore::new(stars)?;
        store.sort_by_mass();
        Self::from_store(store, params, threads)
    }

    fn from_store(stars: StarStore, params: &Parameters, threads: usize) -> Result<Self, SimulationError> {
        params.validate()?;
        let count = stars.len();
        let tree = QuadTree::with_capacity(count);
        let display = DisplayBuffers::new(stars.as_slice());
        let arena = tree.capacity();

        let pool = WorkerPool::spawn(Frame { stars, tree }, params, threads)?;
        info!(
            "world ready: {count} stars, {} workers, {arena} tree slots",
            pool.workers()
        );

        Ok(Self {
            pool,
            params: params.clone(),
            accelerations: vec![NVec2::zeros(); count],
            display,
            stats: FrameStats::default(),
            seed: None,
        })
    }

    /// Advance the world by one frame that took `elapsed` real seconds
    pub fn world_frame(&mut self, elapsed: f64) -> Result<&FrameStats, SimulationError> {
        if elapsed > self.params.max_step() {
            warn!(
                "frame took {:.3} s, simulating {:.3} s",
                elapsed,
                self.params.max_step()
            );
        }
        let dt = self.params.frame_step(elapsed);

        let start = Instant::now();
        {
            let mut frame = self.pool.frame_mut()?;
            let Frame { stars, tree } = &mut *frame;
            if let Err(e) = tree.build(stars.as_slice()) {
                tree.clear();
                return Err(e);
            }
        }
        let build = start.elapsed();

        let start = Instant::now();
        self.pool.compute(&mut self.accelerations)?;
        let force = start.elapsed();

        let start = Instant::now();
        let quad_count = {
            let mut frame = self.pool.frame_mut()?;
            let Frame { stars, tree } = &mut *frame;
            verlet_step(stars.as_mut_slice(), &self.accelerations, dt);
            self.display.project(stars.as_slice());
            let used = tree.quad_count();
            tree.clear();
            used
        };
        let integrate = start.elapsed();

        self.stats = FrameStats {
            frame: self.stats.frame + 1,
            dt,
            quad_count,
            build,
            force,
            integrate,
        };
        debug!(
            "frame {}: dt {:.4}, {} quads, build {:?}, force {:?}, integrate {:?}",
            self.stats.frame, dt, quad_count, build, force, integrate
        );
        Ok(&self.stats)
    }

    /// Stop the worker pool and release the world
    pub fn finalize_world(mut self) -> Result<(), SimulationError> {
        self.pool.shutdown()?;
        info!("world finalized after {} frames", self.stats.frame);
        Ok(())
    }

    pub fn positions(&self) -> &[[f32; 2]] {
        self.display.positions()
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        self.display.colors()
    }

    /// Copy of the current star store
    pub fn stars(&self) -> Result<Vec<Star>, SimulationError> {
        Ok(self.pool.frame()?.stars.as_slice().to_vec())
    }

    pub fn len(&self) -> usize {
        self.accelerations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accelerations.is_empty()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    pub fn last_stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Seed the galaxy was generated from, if it was generated
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}
