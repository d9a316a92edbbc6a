use std::time::Instant;

use crate::simulation::error::SimulationError;
use crate::simulation::forces::{Acceleration, DirectGravity, TreeGravity};
use crate::simulation::params::Parameters;
use crate::simulation::states::Star;
use crate::simulation::vecmath::NVec2;
use crate::simulation::world::World;

/// Direct summation against the tree for growing star counts
pub fn bench_forces() -> Result<(), SimulationError> {
    // Different system sizes to test
    let ns = [200, 400, 800, 1600, 3200, 6400];
    let params = Parameters::default();

    for n in ns {
        let stars = make_stars(n);
        let mut out = vec![NVec2::zeros(); n];

        let direct = DirectGravity { law: params.law() };
        let tree = TreeGravity::new(&params);

        // Warm up
        direct.acceleration(&stars, &mut out)?;
        tree.acceleration(&stars, &mut out)?;

        let t0 = Instant::now();
        direct.acceleration(&stars, &mut out)?;
        let dt_direct = t0.elapsed().as_secs_f64();

        let t1 = Instant::now();
        tree.acceleration(&stars, &mut out)?;
        let dt_tree = t1.elapsed().as_secs_f64();

        println!("N = {n:5}, direct = {dt_direct:8.6} s, BH = {dt_tree:8.6} s");
    }
    Ok(())
}

/// Whole frames per second for growing star counts and worker counts
pub fn bench_frames(max_workers: usize) -> Result<(), SimulationError> {
    let ns = [1000, 4000, 16000, 64000];
    let frames = 20;
    let params = Parameters::default();

    let mut workers = vec![1];
    while workers[workers.len() - 1] * 2 <= max_workers.max(1) {
        workers.push(workers[workers.len() - 1] * 2);
    }

    for n in ns {
        let mut row = format!("N = {n:6}");
        for &p in &workers {
            let mut world = World::from_stars(make_stars(n), &params, p)?;

            // Warm up
            world.world_frame(params.max_step())?;

            let t0 = Instant::now();
            for _ in 0..frames {
                world.world_frame(params.max_step())?;
            }
            let fps = frames as f64 / t0.elapsed().as_secs_f64();
            world.finalize_world()?;

            row.push_str(&format!(", P={p:2}: {fps:8.2} fps"));
        }
        println!("{row}");
    }
    Ok(())
}

/// Deterministic disk of `n` unit-mass stars, no rand needed
pub fn make_stars(n: usize) -> Vec<Star> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            Star::at((i_f * 0.37).sin() * 5.0, (i_f * 0.13).cos() * 5.0, 1.0)
        })
        .collect()
}
