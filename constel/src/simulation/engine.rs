//! Fixed worker pool for the per-star force pass
//!
//! `P` logical workers share the force pass of every frame. Worker 0 is the
//! calling (coordinator) thread; workers `1..P` are OS threads spawned once
//! and parked on a bounded command channel between frames.
//!
//! Per frame the coordinator sends one `Compute` command to each thread,
//! computes its own lane, then meets everyone at the `finish` barrier. Only
//! after the barrier are the lanes gathered and handed to the integrator, so
//! every acceleration of a frame is computed against the same positions and
//! the same tree.
//!
//! Star `i` belongs to worker `i % P`. Striding instead of slicing keeps the
//! per-worker cost even when tree depth varies across the disk.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::{Arc, Barrier, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, JoinHandle};

use log::{debug, error};

use super::barnes_hut::QuadTree;
use super::error::SimulationError;
use super::forces::{accelerate, check_output_len, GravityLaw};
use super::params::Parameters;
use super::states::StarStore;
use super::vecmath::NVec2;

/// Star indices handled by `worker` out of `workers`
pub fn partition(worker: usize, workers: usize, count: usize) -> impl Iterator<Item = usize> {
    (worker..count).step_by(workers.max(1))
}

/// State read by every worker during the force pass and mutated by the
/// coordinator outside of it
#[derive(Debug)]
pub struct Frame {
    pub stars: StarStore,
    pub tree: QuadTree,
}

enum Command {
    Compute,
    Shutdown,
}

struct Shared {
    frame: RwLock<Frame>,
    lanes: Vec<Mutex<Vec<NVec2>>>, // one output buffer per worker
    law: GravityLaw,
    accuracy: f64,
    workers: usize,
    finish: Barrier,
    shutdown: AtomicBool,
    failure: Mutex<Option<String>>,
    #[cfg(test)]
    panic_lane: std::sync::atomic::AtomicUsize, // worker + 1 to panic, 0 for none
}

impl Shared {
    fn compute_lane(&self, worker: usize) -> Result<(), String> {
        #[cfg(test)]
        if self.panic_lane.load(Ordering::Relaxed) == worker + 1 {
            panic!("lane {worker} told to fail");
        }
        let frame = self.frame.read().map_err(|_| "frame lock poisoned".to_string())?;
        let mut lane = self.lanes[worker]
            .lock()
            .map_err(|_| format!("lane {worker} poisoned"))?;

        let stars = frame.stars.as_slice();
        lane.clear();
        lane.extend(
            partition(worker, self.workers, stars.len())
                .map(|i| accelerate(&frame.tree, i, stars, &self.law, self.accuracy)),
        );
        Ok(())
    }

    /// Run one lane, turning errors and panics into a recorded failure
    fn run_lane(&self, worker: usize) {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.compute_lane(worker)));
        let message = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(msg)) => msg,
            Err(_) => format!("worker {worker} panicked"),
        };
        error!("{message}");
        if let Ok(mut slot) = self.failure.lock() {
            slot.get_or_insert(message);
        }
    }
}

fn worker_loop(shared: Arc<Shared>, worker: usize, commands: Receiver<Command>) {
    debug!("worker {worker} started");
    while let Ok(command) = commands.recv() {
        if shared.shutdown.load(Ordering::Acquire) {
            break;
        }
        match command {
            Command::Compute => {
                shared.run_lane(worker);
                shared.finish.wait();
            }
            Command::Shutdown => break,
        }
    }
    debug!("worker {worker} stopped");
}

pub struct WorkerPool {
    shared: Arc<Shared>,
    senders: Vec<SyncSender<Command>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers - 1` threads around `frame`. The calling thread acts as
    /// worker 0 in [`WorkerPool::compute`].
    pub fn spawn(frame: Frame, params: &Parameters, workers: usize) -> Result<Self, SimulationError> {
        let workers = workers.max(1);
        let lane_len = frame.stars.len().div_ceil(workers);

        let shared = Arc::new(Shared {
            frame: RwLock::new(frame),
            lanes: (0..workers)
                .map(|_| Mutex::new(Vec::with_capacity(lane_len)))
                .collect(),
            law: params.law(),
            accuracy: params.accuracy,
            workers,
            finish: Barrier::new(workers),
            shutdown: AtomicBool::new(false),
            failure: Mutex::new(None),
            #[cfg(test)]
            panic_lane: std::sync::atomic::AtomicUsize::new(0),
        });

        let mut pool = Self {
            shared,
            senders: Vec::with_capacity(workers - 1),
            handles: Vec::with_capacity(workers - 1),
        };

        for worker in 1..workers {
            let (tx, rx) = sync_channel(1);
            let shared = Arc::clone(&pool.shared);
            let handle = thread::Builder::new()
                .name(format!("constel-worker-{worker}"))
                .spawn(move || worker_loop(shared, worker, rx));
            match handle {
                Ok(handle) => {
                    pool.senders.push(tx);
                    pool.handles.push(handle);
                }
                Err(e) => {
                    // no frame has run yet, so nobody waits on the barrier
                    pool.stop();
                    return Err(SimulationError::ThreadSpawn(e));
                }
            }
        }
        Ok(pool)
    }

    /// Number of logical workers, the coordinator included
    pub fn workers(&self) -> usize {
        self.shared.workers
    }

    pub fn frame(&self) -> Result<RwLockReadGuard<'_, Frame>, SimulationError> {
        self.shared
            .frame
            .read()
            .map_err(|_| SimulationError::WorkerFailed("frame lock poisoned".into()))
    }

    pub fn frame_mut(&self) -> Result<RwLockWriteGuard<'_, Frame>, SimulationError> {
        self.shared
            .frame
            .write()
            .map_err(|_| SimulationError::WorkerFailed("frame lock poisoned".into()))
    }

    /// Compute the acceleration of every star against the current tree and
    /// write it to `out[i]`. Returns once all workers are done.
    pub fn compute(&self, out: &mut [NVec2]) -> Result<(), SimulationError> {
        check_output_len(self.frame()?.stars.len(), out.len())?;
        for sender in &self.senders {
            sender
                .send(Command::Compute)
                .map_err(|_| SimulationError::WorkerFailed("worker hung up".into()))?;
        }
        self.shared.run_lane(0);
        self.shared.finish.wait();

        let failure = self
            .shared
            .failure
            .lock()
            .map_err(|_| SimulationError::WorkerFailed("failure slot poisoned".into()))?
            .take();
        if let Some(message) = failure {
            return Err(SimulationError::WorkerFailed(message));
        }

        let workers = self.shared.workers;
        for (worker, lane) in self.shared.lanes.iter().enumerate() {
            let lane = lane
                .lock()
                .map_err(|_| SimulationError::WorkerFailed(format!("lane {worker} poisoned")))?;
            for (k, a) in lane.iter().enumerate() {
                out[worker + k * workers] = *a;
            }
        }
        Ok(())
    }

    /// Stop and join every worker thread
    pub fn shutdown(&mut self) -> Result<(), SimulationError> {
        self.stop();
        let mut panicked = 0;
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                panicked += 1;
            }
        }
        if panicked > 0 {
            return Err(SimulationError::WorkerFailed(format!("{panicked} worker(s) panicked")));
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        for sender in self.senders.drain(..) {
            let _ = sender.send(Command::Shutdown); // worker may already be gone
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            let _ = self.shutdown();
        }
    }
}
