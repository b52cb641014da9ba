use tracing::debug;

use crate::voxel::{DistanceGrid, VoxelGrid};

/// Drops every skeleton voxel to the bottom of the solid beneath it.
///
/// A voxel slides down its column while the voxel below is occupied in the
/// occupancy grid, carrying its distance value along. Voxels already resting
/// on the floor stay where they are.
pub struct ProjectToFloor<'a> {
    grid: &'a VoxelGrid,
}

impl<'a> ProjectToFloor<'a> {
    /// Creates a new `ProjectToFloor` operation over the occupancy of `grid`.
    #[must_use]
    pub fn new(grid: &'a VoxelGrid) -> Self {
        Self { grid }
    }

    /// Executes the projection in place. Returns how many voxels moved.
    pub fn execute(&self, field: &mut DistanceGrid) -> usize {
        let [nx, ny, nz] = field.dims();
        let mut moved = 0;
        for x in 1..nx.saturating_sub(1) {
            for y in 1..ny.saturating_sub(1) {
                for z in 1..nz.saturating_sub(1) {
                    let value = field.get([x, y, z]);
                    if value == 0 {
                        continue;
                    }
                    let mut floor = y;
                    while floor > 1 && self.grid.is_occupied(x, floor - 1, z) {
                        floor -= 1;
                    }
                    if floor != y {
                        field.set([x, floor, z], value);
                        field.set([x, y, z], 0);
                        moved += 1;
                    }
                }
            }
        }
        debug!(moved, remaining = field.nonzero_count(), "projected skeleton to floor");
        moved
    }
}
