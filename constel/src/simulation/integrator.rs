//! Velocity-Verlet time integration
//!
//! The force pass runs once per frame, so a step is split around it. Each
//! star keeps the acceleration computed on the previous frame in
//! `cached_acceleration`. When the fresh acceleration arrives the velocity of
//! the previous step is completed with the mean of the two, and the position
//! is advanced with the trapezoidal mean of the current velocity and the
//! fully kicked one:
//!
//! ```text
//! v  <- v + (a_cached + a) * dt/2
//! x  <- x + dt * (v + (v + a*dt)) / 2      = x + v*dt + a*dt^2/2
//! a_cached <- a
//! ```
//!
//! Accelerations are stored unscaled; the `dt / 2` factor is applied here
//! and nowhere else.

use super::states::Star;
use super::vecmath::NVec2;

/// Advance one star by `dt` given its freshly computed acceleration
#[inline]
pub fn verlet_kick_drift(star: &mut Star, acceleration: NVec2, dt: f64) {
    let half_dt = 0.5 * dt;

    // close the previous step: v_n = v_{n-1} + (a_{n-1} + a_n) * dt/2
    star.velocity += (star.cached_acceleration + acceleration) * half_dt;

    // x_{n+1} = x_n + dt * (v_n + (v_n + a_n * dt)) / 2
    let v_kicked = star.velocity + acceleration * dt;
    star.position += (star.velocity + v_kicked) * half_dt;

    star.cached_acceleration = acceleration;
}

/// Advance every star by `dt`. `accelerations[i]` belongs to `stars[i]`.
pub fn verlet_step(stars: &mut [Star], accelerations: &[NVec2], dt: f64) {
    debug_assert_eq!(stars.len(), accelerations.len());
    for (star, a) in stars.iter_mut().zip(accelerations) {
        verlet_kick_drift(star, *a, dt);
    }
}
