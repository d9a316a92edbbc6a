//! Frame pacing for the command line runner
//!
//! The simulation core never decides when a frame happens. [`FrameClock`]
//! is the outside driver: it caps the frame rate at `max_fps` by sleeping,
//! reports the real duration of each frame and records it in an
//! [`FpsHistory`].

use std::thread;
use std::time::{Duration, Instant};

const FPS_HISTORY: usize = 256;

/// Ring of the most recent frame rates
#[derive(Debug, Clone)]
pub struct FpsHistory {
    samples: [f64; FPS_HISTORY],
    count: usize,
    next: usize,
}

impl Default for FpsHistory {
    fn default() -> Self {
        Self {
            samples: [0.0; FPS_HISTORY],
            count: 0,
            next: 0,
        }
    }
}

impl FpsHistory {
    pub fn push(&mut self, fps: f64) {
        self.samples[self.next] = fps;
        self.next = (self.next + 1) % FPS_HISTORY;
        self.count = (self.count + 1).min(FPS_HISTORY);
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Most recent sample, 0 when empty
    pub fn latest(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.samples[(self.next + FPS_HISTORY - 1) % FPS_HISTORY]
    }

    /// Mean of the last `frames` samples (at least one, at most all)
    pub fn mean(&self, frames: usize) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let frames = frames.clamp(1, self.count);
        let start = (self.next + FPS_HISTORY - frames) % FPS_HISTORY;
        let sum: f64 = (0..frames)
            .map(|k| self.samples[(start + k) % FPS_HISTORY])
            .sum();
        sum / frames as f64
    }

    /// Mean over roughly the last `seconds`, judged by the latest rate
    pub fn mean_over(&self, seconds: f64) -> f64 {
        self.mean((seconds * self.latest()) as usize)
    }
}

#[derive(Debug)]
pub struct FrameClock {
    interval: Duration,
    last: Option<Instant>,
    history: FpsHistory,
}

impl FrameClock {
    /// `max_fps` must be positive
    pub fn new(max_fps: f64) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / max_fps),
            last: None,
            history: FpsHistory::default(),
        }
    }

    /// Sleep out the rest of the frame budget and return the real length of
    /// the frame in seconds. The first call reports one full interval.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let last = *self
            .last
            .get_or_insert_with(|| now.checked_sub(self.interval).unwrap_or(now));

        let spent = now.duration_since(last);
        if spent < self.interval {
            thread::sleep(self.interval - spent);
        }

        let now = Instant::now();
        let frame = now.duration_since(last).as_secs_f64();
        self.last = Some(now);
        if frame > 0.0 {
            self.history.push(1.0 / frame);
        }
        frame
    }

    pub fn history(&self) -> &FpsHistory {
        &self.history
    }
}
