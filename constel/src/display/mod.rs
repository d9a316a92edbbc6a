//! Output buffers handed to a renderer
//!
//! The simulation works in `f64`; a renderer wants compact `f32` data it can
//! upload as is. `DisplayBuffers` holds one position pair and one color per
//! star, in star store order.

pub mod color;

use crate::simulation::states::Star;
use crate::simulation::vecmath::to_display;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayBuffers {
    positions: Vec<[f32; 2]>,
    colors: Vec<[f32; 3]>,
}

impl DisplayBuffers {
    /// Buffers sized for `stars`, with colors fixed from each star's mass
    pub fn new(stars: &[Star]) -> Self {
        let mut buffers = Self {
            positions: vec![[0.0; 2]; stars.len()],
            colors: stars.iter().map(|s| color::color_for_mass(s.mass)).collect(),
        };
        buffers.project(stars);
        buffers
    }

    /// Copy current star positions into the position buffer
    pub fn project(&mut self, stars: &[Star]) {
        debug_assert_eq!(stars.len(), self.positions.len());
        for (out, star) in self.positions.iter_mut().zip(stars) {
            *out = to_display(&star.position);
        }
    }

    pub fn positions(&self) -> &[[f32; 2]] {
        &self.positions
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }
}
