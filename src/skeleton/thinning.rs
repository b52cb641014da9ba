use tracing::debug;

use crate::params::VoxelGraphParams;
use crate::voxel::{Cell, DistanceGrid};

use super::template::{templates, Direction, GridTemplate};

/// Voxel counts removed by each stage of [`Skeletonizer::thin`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThinningStats {
    pub peeled: usize,
    pub thinned: usize,
    pub isolated: usize,
    /// Full cycles over the eight directions, including the final one that removed nothing.
    pub cycles: usize,
}

/// Reduces a distance field to a one-voxel-wide skeleton.
#[derive(Debug, Clone, Copy)]
pub struct Skeletonizer {
    peel_depth: u32,
}

impl Skeletonizer {
    #[must_use]
    pub fn new(params: &VoxelGraphParams) -> Self {
        Self {
            peel_depth: params.peel_depth(),
        }
    }

    /// Overrides the outer layer depth removed before thinning.
    #[must_use]
    pub fn with_peel_depth(mut self, depth: u32) -> Self {
        self.peel_depth = depth;
        self
    }

    #[must_use]
    pub fn peel_depth(&self) -> u32 {
        self.peel_depth
    }

    /// Peels the outer layers, thins until stable and drops isolated voxels.
    pub fn thin(&self, field: &mut DistanceGrid) -> ThinningStats {
        let peeled = peel(field, self.peel_depth);
        let (thinned, cycles) = thin_directionally(field);
        let isolated = remove_isolated(field);
        let stats = ThinningStats {
            peeled,
            thinned,
            isolated,
            cycles,
        };
        debug!(
            peeled,
            thinned,
            isolated,
            cycles,
            remaining = field.nonzero_count(),
            "skeletonized distance field"
        );
        stats
    }
}

/// Zeroes every voxel whose distance value is at most `depth`.
pub fn peel(field: &mut DistanceGrid, depth: u32) -> usize {
    let shallow: Vec<Cell> = field.nonzero_cells().filter(|&c| field.get(c) <= depth).collect();
    for &cell in &shallow {
        field.set(cell, 0);
    }
    shallow.len()
}

/// Runs directional thinning passes until a whole cycle removes nothing.
///
/// Each pass finds every voxel matched by the direction's templates before
/// any of them is removed. Returns the number of removed voxels and cycles.
pub fn thin_directionally(field: &mut DistanceGrid) -> (usize, usize) {
    let mut removed = 0;
    let mut cycles = 0;
    loop {
        cycles += 1;
        let mut removed_this_cycle = 0;
        for direction in Direction::THINNING_ORDER {
            removed_this_cycle += thinning_pass(field, templates(direction));
        }
        removed += removed_this_cycle;
        if removed_this_cycle == 0 {
            return (removed, cycles);
        }
    }
}

fn thinning_pass(field: &mut DistanceGrid, set: &[GridTemplate]) -> usize {
    let removable: Vec<Cell> = field
        .nonzero_cells()
        .filter(|&cell| is_interior(field, cell))
        .filter(|&cell| set.iter().any(|t| t.matches(field, cell)))
        .collect();
    for &cell in &removable {
        field.set(cell, 0);
    }
    removable.len()
}

/// Zeroes voxels left without any occupied neighbour.
pub fn remove_isolated(field: &mut DistanceGrid) -> usize {
    let lone = GridTemplate::neighbor_less();
    let isolated: Vec<Cell> = field
        .nonzero_cells()
        .filter(|&cell| is_interior(field, cell) && lone.matches(field, cell))
        .collect();
    for &cell in &isolated {
        field.set(cell, 0);
    }
    isolated.len()
}

fn is_interior(field: &DistanceGrid, cell: Cell) -> bool {
    let dims = field.dims();
    (0..3).all(|axis| cell[axis] >= 1 && cell[axis] + 1 < dims[axis])
}
