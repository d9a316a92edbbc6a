//! # Barnes–Hut quad-tree (2D)
//!
//! A square, recursively subdivided partition of every star in the world.
//! The tree is rebuilt from scratch once per frame and then only read while
//! accelerations are evaluated (see [`crate::simulation::forces`]).
//!
//! ## Layout
//!
//! Branches live in an arena preallocated for the whole session with room for
//! `2 × star_count` entries. A frame uses the prefix `0..quad_count`; the root
//! is always slot 0. Children refer to either a star (by store index) or
//! another branch (by arena index), so nothing in the tree borrows the star
//! store.
//!
//! ```text
//!   quadrant numbering     (+y up)
//!   +-------+-------+
//!   |   2   |   3   |
//!   +-------+-------+
//!   |   0   |   1   |
//!   +-------+-------+
//! ```
//!
//! ## Building
//!
//! Stars are inserted one at a time in store order. Every branch a star
//! passes through folds the star into its running center of mass, so the
//! store is kept sorted by ascending mass to keep that running average
//! accurate. When a star lands on a quadrant already holding a star, a new
//! branch half the size is carved out for that quadrant, seeded with the
//! resident star, and the descent continues into it.
//!
//! ## Degenerate input
//!
//! Two stars at exactly the same coordinates can never be separated by
//! subdividing. Such stars, and any pair still sharing a quadrant at
//! [`MAX_DEPTH`] or in a branch of zero size, are linked into a coincidence
//! chain hanging off the resident leaf. The force evaluator walks the chain
//! and treats every member as an exact point mass, so the only approximation
//! is that near-coincident stars below `root_size / 2^MAX_DEPTH` share a leaf.
//!
//! A close pair can need a long run of single-child branches before it
//! separates. When the arena has no slot left for another split, the star is
//! chained onto the resident leaf the same way, so a build over valid stars
//! always succeeds.

use log::warn;

use super::error::SimulationError;
use super::states::Star;
use super::vecmath::NVec2;

/// Deepest level at which a branch may still be split
pub const MAX_DEPTH: u32 = 48;

/// Occupant of one quadrant of a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    Leaf(usize),   // star index (head of its coincidence chain)
    Branch(usize), // arena index
}

/// Aggregate of two or more stars covering a square region
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Branch {
    pub center_of_mass: NVec2,
    pub mass: f64,
    pub size: f64, // edge length of the square region
    pub geometric_center: NVec2,
    pub children: [Option<Child>; 4],
    pub depth: u32, // root is 0
}

impl Branch {
    /// Fold one more point mass into the running aggregate
    #[inline]
    fn absorb(&mut self, position: &NVec2, mass: f64) {
        let total = self.mass + mass;
        self.center_of_mass = (self.center_of_mass * self.mass + position * mass) / total;
        self.mass = total;
    }
}

/// Quadrant of `point` relative to `center`. Points on a dividing line go
/// to the lower/left side.
#[inline]
pub fn quadrant(center: &NVec2, point: &NVec2) -> usize {
    ((point.x > center.x) as usize) | (((point.y > center.y) as usize) << 1)
}

/// Geometric center of quadrant `q` of a square of edge `size` around `center`
#[inline]
fn quadrant_center(center: &NVec2, size: f64, q: usize) -> NVec2 {
    let shift = size / 4.0;
    NVec2::new(
        center.x + if q & 1 != 0 { shift } else { -shift },
        center.y + if q & 2 != 0 { shift } else { -shift },
    )
}

#[derive(Debug, Clone)]
pub struct QuadTree {
    branches: Vec<Branch>,
    quad_count: usize,
    chain: Vec<Option<usize>>, // next star sharing a leaf, per star
}

impl QuadTree {
    /// Preallocate the arena for a world of `star_count` stars
    pub fn with_capacity(star_count: usize) -> Self {
        Self {
            branches: vec![Branch::default(); 2 * star_count],
            quad_count: 0,
            chain: vec![None; star_count],
        }
    }

    /// Number of branch slots in the arena
    pub fn capacity(&self) -> usize {
        self.branches.len()
    }

    /// Branches used by the current build
    pub fn quad_count(&self) -> usize {
        self.quad_count
    }

    /// Used prefix of the arena; empty until [`QuadTree::build`] runs
    pub fn branches(&self) -> &[Branch] {
        &self.branches[..self.quad_count]
    }

    pub fn root(&self) -> Option<&Branch> {
        self.branches().first()
    }

    #[inline]
    pub fn branch(&self, index: usize) -> &Branch {
        &self.branches[index]
    }

    /// Next member of the coincidence chain after `star`
    #[inline]
    pub fn chain_next(&self, star: usize) -> Option<usize> {
        self.chain[star]
    }

    /// Reset the used prefix so no branch data survives into the next build
    pub fn clear(&mut self) {
        for branch in &mut self.branches[..self.quad_count] {
            *branch = Branch::default();
        }
        self.chain.iter_mut().for_each(|c| *c = None);
        self.quad_count = 0;
    }

    /// Build the tree over `stars`, inserting them in slice order.
    ///
    /// Fails only on fewer than two stars. Stars that would need a split
    /// after the arena is full are chained instead.
    pub fn build(&mut self, stars: &[Star]) -> Result<(), SimulationError> {
        if stars.len() < 2 {
            return Err(SimulationError::TooFewStars(stars.len()));
        }
        if self.chain.len() != stars.len() {
            // Only reached when a tree is reused for a differently sized store
            *self = Self::with_capacity(stars.len());
        }
        if self.quad_count != 0 {
            self.clear();
        }

        let (min, max) = bounding_box(stars);
        let extent = max - min;
        self.branches[0] = Branch {
            geometric_center: (min + max) * 0.5,
            size: extent.x.max(extent.y), // keep nodes square
            ..Branch::default()
        };
        self.quad_count = 1;

        let mut saturated = 0;
        for index in 0..stars.len() {
            if self.insert(index, stars)? {
                saturated += 1;
            }
        }
        if saturated > 0 {
            warn!(
                "quad-tree arena full ({} branches), {saturated} star(s) chained unsplit",
                self.branches.len()
            );
        }
        Ok(())
    }

    /// Returns true when the star was chained only because the arena is full
    fn insert(&mut self, index: usize, stars: &[Star]) -> Result<bool, SimulationError> {
        let star = &stars[index];
        let mut node = 0;
        loop {
            let full = self.quad_count >= self.branches.len();
            let branch = &mut self.branches[node];
            branch.absorb(&star.position, star.mass);
            let q = quadrant(&branch.geometric_center, &star.position);

            match branch.children[q] {
                None => {
                    branch.children[q] = Some(Child::Leaf(index));
                    return Ok(false);
                }
                Some(Child::Branch(next)) => node = next,
                Some(Child::Leaf(resident)) => {
                    let inseparable = branch.depth >= MAX_DEPTH
                        || branch.size == 0.0
                        || stars[resident].position == star.position;
                    if inseparable || full {
                        self.chain_onto(resident, index);
                        return Ok(!inseparable);
                    }
                    node = self.split(node, q, resident, stars)?;
                }
            }
        }
    }

    /// Replace the leaf in quadrant `q` of `parent` with a new branch seeded
    /// with the resident star. Returns the new branch's index.
    fn split(
        &mut self,
        parent: usize,
        q: usize,
        resident: usize,
        stars: &[Star],
    ) -> Result<usize, SimulationError> {
        if self.quad_count >= self.branches.len() {
            return Err(SimulationError::ArenaExhausted {
                capacity: self.branches.len(),
            });
        }
        let index = self.quad_count;
        self.quad_count += 1;

        let (center, size, depth) = {
            let p = &self.branches[parent];
            (quadrant_center(&p.geometric_center, p.size, q), p.size / 2.0, p.depth + 1)
        };
        // a resident that heads a chain carries every coincident star with it
        let old = &stars[resident];
        let mut mass = old.mass;
        let mut cur = self.chain[resident];
        while let Some(next) = cur {
            mass += stars[next].mass;
            cur = self.chain[next];
        }
        let mut children = [None; 4];
        children[quadrant(&center, &old.position)] = Some(Child::Leaf(resident));

        self.branches[index] = Branch {
            center_of_mass: old.position,
            mass,
            size,
            geometric_center: center,
            children,
            depth,
        };
        self.branches[parent].children[q] = Some(Child::Branch(index));
        Ok(index)
    }

    fn chain_onto(&mut self, head: usize, index: usize) {
        let mut tail = head;
        while let Some(next) = self.chain[tail] {
            tail = next;
        }
        self.chain[tail] = Some(index);
    }

    /// Every star index reachable from the root, in traversal order
    pub fn leaves(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.chain.len());
        if self.quad_count > 0 {
            self.collect_leaves(0, &mut out);
        }
        out
    }

    fn collect_leaves(&self, node: usize, out: &mut Vec<usize>) {
        for child in self.branches[node].children.iter().flatten() {
            match *child {
                Child::Branch(next) => self.collect_leaves(next, out),
                Child::Leaf(head) => {
                    let mut cur = Some(head);
                    while let Some(i) = cur {
                        out.push(i);
                        cur = self.chain[i];
                    }
                }
            }
        }
    }
}

/// Axis-aligned bounds of every star position
fn bounding_box(stars: &[Star]) -> (NVec2, NVec2) {
    let mut min = NVec2::new(f64::INFINITY, f64::INFINITY);
    let mut max = NVec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for s in stars {
        min.x = min.x.min(s.position.x);
        min.y = min.y.min(s.position.y);
        max.x = max.x.max(s.position.x);
        max.y = max.y.max(s.position.y);
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_corners() -> Vec<Star> {
        vec![
            Star::at(-1.0, -1.0, 1.0),
            Star::at(1.0, -1.0, 1.0),
            Star::at(-1.0, 1.0, 1.0),
            Star::at(1.0, 1.0, 1.0),
        ]
    }

    #[test]
    fn quadrant_numbering() {
        let c = NVec2::zeros();
        assert_eq!(quadrant(&c, &NVec2::new(-1.0, -1.0)), 0);
        assert_eq!(quadrant(&c, &NVec2::new(1.0, -1.0)), 1);
        assert_eq!(quadrant(&c, &NVec2::new(-1.0, 1.0)), 2);
        assert_eq!(quadrant(&c, &NVec2::new(1.0, 1.0)), 3);
        // on the dividing lines
        assert_eq!(quadrant(&c, &NVec2::zeros()), 0);
    }

    #[test]
    fn root_is_square_bounding_box() {
        let stars = vec![Star::at(0.0, 0.0, 1.0), Star::at(4.0, 1.0, 1.0)];
        let mut tree = QuadTree::with_capacity(stars.len());
        tree.build(&stars).unwrap();
        let root = tree.root().unwrap();
        assert_eq!(root.size, 4.0);
        assert_eq!(root.geometric_center, NVec2::new(2.0, 0.5));
    }

    #[test]
    fn separated_stars_need_no_split() {
        let stars = four_corners();
        let mut tree = QuadTree::with_capacity(stars.len());
        tree.build(&stars).unwrap();
        assert_eq!(tree.quad_count(), 1);
        let root = tree.root().unwrap();
        assert_eq!(root.mass, 4.0);
        assert!(root.center_of_mass.norm() < 1e-15);
        for (q, child) in root.children.iter().enumerate() {
            assert_eq!(*child, Some(Child::Leaf(q)));
        }
    }

    #[test]
    fn split_seeds_branch_with_resident() {
        let stars = vec![
            Star::at(0.0, 0.0, 1.0),
            Star::at(4.0, 4.0, 1.0),
            Star::at(1.5, 0.5, 3.0),
        ];
        let mut tree = QuadTree::with_capacity(stars.len());
        tree.build(&stars).unwrap();
        assert_eq!(tree.quad_count(), 2);

        let root = tree.root().unwrap();
        assert_eq!(root.children[0], Some(Child::Branch(1)));
        assert_eq!(root.children[3], Some(Child::Leaf(1)));
        let child = tree.branch(1);
        assert_eq!(child.size, 2.0);
        assert_eq!(child.geometric_center, NVec2::new(1.0, 1.0));
        assert_eq!(child.depth, 1);
        assert_eq!(child.mass, 4.0);
        assert!((child.center_of_mass - NVec2::new(1.125, 0.375)).norm() < 1e-15);
        assert_eq!(child.children, [Some(Child::Leaf(0)), Some(Child::Leaf(2)), None, None]);
    }

    #[test]
    fn branch_aggregates_match_reachable_stars() {
        let stars: Vec<Star> = (0..64)
            .map(|i| {
                let t = i as f64;
                Star::at((t * 0.37).sin() * 5.0, (t * 0.13).cos() * 5.0, 1.0 + (i % 5) as f64)
            })
            .collect();
        let mut tree = QuadTree::with_capacity(stars.len());
        tree.build(&stars).unwrap();

        for (b, branch) in tree.branches().iter().enumerate() {
            let mut members = Vec::new();
            tree.collect_leaves(b, &mut members);
            let mass: f64 = members.iter().map(|&i| stars[i].mass).sum();
            let com = members
                .iter()
                .fold(NVec2::zeros(), |acc, &i| acc + stars[i].position * stars[i].mass)
                / mass;
            assert!((branch.mass - mass).abs() < 1e-9);
            assert!((branch.center_of_mass - com).norm() < 1e-9);
        }
    }

    #[test]
    fn coincident_stars_share_a_leaf() {
        let stars = vec![
            Star::at(1.0, 1.0, 1.0),
            Star::at(1.0, 1.0, 2.0),
            Star::at(1.0, 1.0, 3.0),
        ];
        let mut tree = QuadTree::with_capacity(stars.len());
        tree.build(&stars).unwrap();
        assert_eq!(tree.quad_count(), 1);
        assert_eq!(tree.root().unwrap().size, 0.0);
        assert_eq!(tree.chain_next(0), Some(1));
        assert_eq!(tree.chain_next(1), Some(2));
        assert_eq!(tree.chain_next(2), None);
        assert_eq!(tree.root().unwrap().mass, 6.0);
    }

    #[test]
    fn split_carries_whole_chain() {
        let stars = vec![
            Star::at(0.0, 0.0, 1.0),
            Star::at(0.0, 0.0, 2.0),
            Star::at(4.0, 4.0, 1.0),
            Star::at(1.0, 1.0, 1.0),
        ];
        let mut tree = QuadTree::with_capacity(stars.len());
        tree.build(&stars).unwrap();
        assert_eq!(tree.quad_count(), 3);
        assert_eq!(tree.root().unwrap().mass, 5.0);
        assert_eq!(tree.branch(1).mass, 4.0);
        assert_eq!(tree.branch(2).mass, 4.0);
        assert_eq!(tree.branch(2).children[0], Some(Child::Leaf(0)));
        assert_eq!(tree.branch(2).children[3], Some(Child::Leaf(3)));
        assert_eq!(tree.chain_next(0), Some(1));
    }

    #[test]
    fn clear_zeroes_used_prefix() {
        let stars = vec![
            Star::at(0.0, 0.0, 1.0),
            Star::at(4.0, 4.0, 1.0),
            Star::at(0.5, 0.5, 1.0),
        ];
        let mut tree = QuadTree::with_capacity(stars.len());
        tree.build(&stars).unwrap();
        tree.clear();
        assert_eq!(tree.quad_count(), 0);
        assert!(tree.root().is_none());
        assert!(tree.branches.iter().all(|b| *b == Branch::default()));
    }

    #[test]
    fn rebuild_gives_identical_tree() {
        let stars = vec![
            Star::at(0.0, 0.0, 1.0),
            Star::at(4.0, 4.0, 1.0),
            Star::at(0.5, 0.5, 1.0),
            Star::at(3.0, 0.2, 1.0),
        ];
        let mut tree = QuadTree::with_capacity(stars.len());
        tree.build(&stars).unwrap();
        let first = tree.branches().to_vec();
        tree.build(&stars).unwrap();
        assert_eq!(first, tree.branches());
    }

    #[test]
    fn full_arena_chains_close_pair() {
        // Two nearly coincident stars need more splits than 6 slots allow
        let stars = vec![
            Star::at(0.0, 0.0, 1.0),
            Star::at(1.0, 1.0, 1.0),
            Star::at(1.0 - 1e-9, 1.0 - 1e-9, 1.0),
        ];
        let mut tree = QuadTree::with_capacity(stars.len());
        tree.build(&stars).unwrap();
        assert_eq!(tree.quad_count(), tree.capacity());
        assert_eq!(tree.chain_next(1), Some(2));
        assert_eq!(tree.root().unwrap().mass, 3.0);
        assert_eq!(tree.branch(5).mass, 2.0);

        let mut leaves = tree.leaves();
        leaves.sort_unstable();
        assert_eq!(leaves, vec![0, 1, 2]);
    }
}
