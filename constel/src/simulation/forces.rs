//! Gravitational acceleration for the galaxy simulation
//!
//! Provides the softened force law, the Barnes–Hut tree walk used every
//! frame, and a direct all-pairs sum kept as the reference the tree is
//! measured against.

use super::barnes_hut::{Child, QuadTree};
use super::error::SimulationError;
use super::params::Parameters;
use super::states::Star;
use super::vecmath::{difference, length_squared, NVec2};

/// Softened Newtonian gravity
///
/// The pull of mass `m` at offset `delta` is
/// `G * m * unit(delta) / (|delta|^2 + epsilon)`.
/// The softening keeps close encounters bounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityLaw {
    pub gravity: f64, // gravitational constant
    pub epsilon: f64, // softening
}

impl GravityLaw {
    /// Acceleration toward a point mass `mass` sitting at `delta` from the
    /// attracted star. Coincident points exert nothing.
    #[inline]
    pub fn pull(&self, delta: &NVec2, mass: f64) -> NVec2 {
        let d2 = length_squared(delta);
        if d2 == 0.0 {
            return NVec2::zeros();
        }
        let d = d2.sqrt();
        delta * (self.gravity * mass / ((d2 + self.epsilon) * d))
    }
}

/// Net acceleration on star `index` from every other star, approximated
/// through `tree`.
///
/// A branch whose center of mass is farther than `size * accuracy` from the
/// star is taken as a single point mass; otherwise its children are visited.
/// Leaves are always exact. The star's own leaf contributes nothing.
pub fn accelerate(
    tree: &QuadTree,
    index: usize,
    stars: &[Star],
    law: &GravityLaw,
    accuracy: f64,
) -> NVec2 {
    let mut acc = NVec2::zeros();
    if tree.quad_count() > 0 {
        let walk = Walk { tree, stars, law, accuracy, index, position: stars[index].position };
        walk.branch(0, &mut acc);
    }
    acc
}

/// State shared by one star's tree walk
struct Walk<'a> {
    tree: &'a QuadTree,
    stars: &'a [Star],
    law: &'a GravityLaw,
    accuracy: f64,
    index: usize,
    position: NVec2,
}

impl Walk<'_> {
    fn branch(&self, node: usize, acc: &mut NVec2) {
        let branch = self.tree.branch(node);
        let delta = difference(&branch.center_of_mass, &self.position);
        let distance = length_squared(&delta).sqrt();

        if distance > branch.size * self.accuracy {
            *acc += self.law.pull(&delta, branch.mass);
            return;
        }

        for child in branch.children.iter().flatten() {
            match *child {
                Child::Branch(next) => self.branch(next, acc),
                Child::Leaf(head) => self.leaf(head, acc),
            }
        }
    }

    fn leaf(&self, head: usize, acc: &mut NVec2) {
        let mut cur = Some(head);
        while let Some(other) = cur {
            if other != self.index {
                let star = &self.stars[other];
                *acc += self.law.pull(&difference(&star.position, &self.position), star.mass);
            }
            cur = self.tree.chain_next(other);
        }
    }
}

/// Whole-store acceleration sources
/// Implementations overwrite `out[i]` with the acceleration of star `i`.
/// `out` must be exactly as long as `stars`.
pub trait Acceleration {
    fn acceleration(&self, stars: &[Star], out: &mut [NVec2]) -> Result<(), SimulationError>;
}

pub(crate) fn check_output_len(stars: usize, out: usize) -> Result<(), SimulationError> {
    if stars != out {
        return Err(SimulationError::InvalidParameter(format!(
            "acceleration buffer holds {out} entries for {stars} stars"
        )));
    }
    Ok(())
}

/// Direct O(N^2) summation over every pair
pub struct DirectGravity {
    pub law: GravityLaw,
}

impl Acceleration for DirectGravity {
    fn acceleration(&self, stars: &[Star], out: &mut [NVec2]) -> Result<(), SimulationError> {
        check_output_len(stars.len(), out.len())?;
        out.iter_mut().for_each(|a| *a = NVec2::zeros());
        let n = stars.len();

        // each unordered pair once, equal and opposite
        for i in 0..n {
            let si = &stars[i];
            for j in (i + 1)..n {
                let sj = &stars[j];
                let r = sj.position - si.position; // from i to j
                out[i] += self.law.pull(&r, sj.mass);
                out[j] += self.law.pull(&(-r), si.mass);
            }
        }
        Ok(())
    }
}

/// Barnes–Hut approximation evaluated sequentially, one fresh tree per call
pub struct TreeGravity {
    pub law: GravityLaw,
    pub accuracy: f64,
}

impl TreeGravity {
    pub fn new(params: &Parameters) -> Self {
        Self {
            law: params.law(),
            accuracy: params.accuracy,
        }
    }
}

impl Acceleration for TreeGravity {
    fn acceleration(&self, stars: &[Star], out: &mut [NVec2]) -> Result<(), SimulationError> {
        check_output_len(stars.len(), out.len())?;
        let mut tree = QuadTree::with_capacity(stars.len());
        tree.build(stars)?;
        for (i, a) in out.iter_mut().enumerate() {
            *a = accelerate(&tree, i, stars, &self.law, self.accuracy);
        }
        Ok(())
    }
}
