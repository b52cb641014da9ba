use std::collections::VecDeque;

use tracing::debug;

use super::VoxelGrid;

/// A lattice cell index `[x, y, z]`.
pub type Cell = [usize; 3];

/// Offsets of the 26-neighbourhood, in ascending `dx`, `dy`, `dz` order.
pub const NEIGHBOR_OFFSETS: [[i8; 3]; 26] = neighbor_offsets();

const fn neighbor_offsets() -> [[i8; 3]; 26] {
    let mut out = [[0; 3]; 26];
    let mut n = 0;
    let mut dx = -1;
    while dx <= 1 {
        let mut dy = -1;
        while dy <= 1 {
            let mut dz = -1;
            while dz <= 1 {
                if dx != 0 || dy != 0 || dz != 0 {
                    out[n] = [dx, dy, dz];
                    n += 1;
                }
                dz += 1;
            }
            dy += 1;
        }
        dx += 1;
    }
    out
}

/// Per-voxel distance to the outside of the solid.
///
/// `0` is outside, `1` is an occupied voxel with an empty 26-neighbour and
/// `n > 1` is `n - 1` steps from the nearest such voxel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceGrid {
    dims: [usize; 3],
    cells: Vec<u32>,
}

impl DistanceGrid {
    /// Computes the distance field of the occupied voxels of `grid`.
    #[must_use]
    pub fn from_voxels(grid: &VoxelGrid) -> Self {
        let dims = grid.dims();
        let mut field = Self {
            dims,
            cells: vec![0; dims[0] * dims[1] * dims[2]],
        };

        let mut frontier = VecDeque::new();
        for x in 1..dims[0] - 1 {
            for y in 1..dims[1] - 1 {
                for z in 1..dims[2] - 1 {
                    if grid.is_occupied(x, y, z) && has_empty_neighbor(grid, [x, y, z]) {
                        field.set([x, y, z], 1);
                        frontier.push_back([x, y, z]);
                    }
                }
            }
        }

        // Multi-source BFS. Layer by layer this matches repeated full passes
        // that each set every unset voxel to its smallest set neighbour + 1.
        while let Some(cell) = frontier.pop_front() {
            let next = field.get(cell) + 1;
            for neighbor in field.neighbors(cell) {
                if field.get(neighbor) == 0 && grid.is_occupied(neighbor[0], neighbor[1], neighbor[2]) {
                    field.set(neighbor, next);
                    frontier.push_back(neighbor);
                }
            }
        }

        debug!(
            exposed = field.cells.iter().filter(|&&v| v == 1).count(),
            solid = field.nonzero_count(),
            max = field.max_value(),
            "computed distance field"
        );
        field
    }

    /// Builds a field directly from raw values, laid out `(x * ny + y) * nz + z`.
    ///
    /// Returns `None` if `values` does not match `dims`.
    #[must_use]
    pub fn from_raw(dims: [usize; 3], values: Vec<u32>) -> Option<Self> {
        (values.len() == dims[0] * dims[1] * dims[2]).then_some(Self { dims, cells: values })
    }

    #[must_use]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    fn index(&self, [x, y, z]: Cell) -> usize {
        (x * self.dims[1] + y) * self.dims[2] + z
    }

    /// Returns `true` if `cell` lies inside the lattice.
    #[must_use]
    pub fn in_bounds(&self, [x, y, z]: Cell) -> bool {
        x < self.dims[0] && y < self.dims[1] && z < self.dims[2]
    }

    /// Value at `cell`. Out of range reads as `0`.
    #[must_use]
    pub fn get(&self, cell: Cell) -> u32 {
        if self.in_bounds(cell) {
            self.cells[self.index(cell)]
        } else {
            0
        }
    }

    /// Overwrites the value at `cell`. Out of range writes are ignored.
    pub fn set(&mut self, cell: Cell, value: u32) {
        if self.in_bounds(cell) {
            let i = self.index(cell);
            self.cells[i] = value;
        }
    }

    /// Returns `true` if `cell` holds a nonzero value.
    #[must_use]
    pub fn is_set(&self, cell: Cell) -> bool {
        self.get(cell) != 0
    }

    /// Number of nonzero cells.
    #[must_use]
    pub fn nonzero_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }

    /// Largest value in the field.
    #[must_use]
    pub fn max_value(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Every nonzero cell in `x`, `y`, `z` scan order.
    pub fn nonzero_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let [_, ny, nz] = self.dims;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0)
            .map(move |(i, _)| [i / (ny * nz), (i / nz) % ny, i % nz])
    }

    /// In-bounds 26-neighbours of `cell`, in [`NEIGHBOR_OFFSETS`] order.
    pub fn neighbor_cells(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(move |offset| offset_cell(cell, *offset).filter(|c| self.in_bounds(*c)))
    }

    /// Nonzero 26-neighbours of `cell` in ascending `dx`, `dy`, `dz` order.
    #[must_use]
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        self.neighbor_cells(cell).filter(|c| self.is_set(*c)).collect()
    }

    /// Number of nonzero 26-neighbours of `cell`.
    #[must_use]
    pub fn neighbor_count(&self, cell: Cell) -> usize {
        self.neighbor_cells(cell).filter(|c| self.is_set(*c)).count()
    }
}

/// Applies a signed offset, or `None` if it would leave the non-negative range.
#[must_use]
pub fn offset_cell([x, y, z]: Cell, [dx, dy, dz]: [i8; 3]) -> Option<Cell> {
    Some([
        x.checked_add_signed(isize::from(dx))?,
        y.checked_add_signed(isize::from(dy))?,
        z.checked_add_signed(isize::from(dz))?,
    ])
}

fn has_empty_neighbor(grid: &VoxelGrid, cell: Cell) -> bool {
    NEIGHBOR_OFFSETS.iter().any(|offset| {
        offset_cell(cell, *offset).is_none_or(|[x, y, z]| !grid.is_occupied(x, y, z))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::AxisPins;
    use crate::math::Point3;
    use crate::mesh::make_cuboid;
    use crate::params::VoxelGraphParams;

    fn filled_cube(size: f64) -> VoxelGrid {
        let cube = make_cuboid(Point3::origin(), Point3::new(size, size, size)).unwrap();
        let params = VoxelGraphParams::new().with_resolution(1.0);
        let mut grid = VoxelGrid::from_component(&cube, &params, &AxisPins::world()).unwrap();
        grid.fill_internal_volume(&cube, 0.05);
        grid
    }

    /// Reference implementation: repeated full passes, collecting before writing.
    fn distance_by_passes(grid: &VoxelGrid) -> DistanceGrid {
        let dims = grid.dims();
        let mut field = DistanceGrid::from_raw(dims, vec![0; dims[0] * dims[1] * dims[2]]).unwrap();
        for x in 1..dims[0] - 1 {
            for y in 1..dims[1] - 1 {
                for z in 1..dims[2] - 1 {
                    if grid.is_occupied(x, y, z) && has_empty_neighbor(grid, [x, y, z]) {
                        field.set([x, y, z], 1);
                    }
                }
            }
        }
        loop {
            let mut updates = Vec::new();
            for x in 1..dims[0] - 1 {
                for y in 1..dims[1] - 1 {
                    for z in 1..dims[2] - 1 {
                        if !grid.is_occupied(x, y, z) || field.is_set([x, y, z]) {
                            continue;
                        }
                        let smallest = field
                            .neighbor_cells([x, y, z])
                            .map(|c| field.get(c))
                            .filter(|&v| v != 0)
                            .min();
                        if let Some(v) = smallest {
                            updates.push(([x, y, z], v + 1));
                        }
                    }
                }
            }
            if updates.is_empty() {
                return field;
            }
            for (cell, value) in updates {
                field.set(cell, value);
            }
        }
    }

    #[test]
    fn offsets_are_ordered_and_exclude_centre() {
        assert_eq!(NEIGHBOR_OFFSETS[0], [-1, -1, -1]);
        assert_eq!(NEIGHBOR_OFFSETS[12], [0, 0, -1]);
        assert_eq!(NEIGHBOR_OFFSETS[13], [0, 0, 1]);
        assert_eq!(NEIGHBOR_OFFSETS[25], [1, 1, 1]);
    }

    #[test]
    fn cube_layers_count_inward() {
        let grid = filled_cube(6.0);
        let field = DistanceGrid::from_voxels(&grid);
        // Lattice 2..=8 is solid; the centre voxel is three steps in.
        assert_eq!(field.get([2, 2, 2]), 1);
        assert_eq!(field.get([3, 5, 5]), 2);
        assert_eq!(field.get([4, 4, 6]), 3);
        assert_eq!(field.get([5, 5, 5]), 4);
        assert_eq!(field.max_value(), 4);
        assert_eq!(field.nonzero_count(), grid.occupied_count());
    }

    #[test]
    fn bfs_matches_repeated_passes() {
        let mut structure = crate::mesh::Structure::new();
        structure.add_component(make_cuboid(Point3::origin(), Point3::new(7.0, 3.0, 5.0)).unwrap());
        structure.add_component(
            make_cuboid(Point3::new(2.0, 3.0, 1.0), Point3::new(5.0, 9.0, 4.0)).unwrap(),
        );
        let params = VoxelGraphParams::new().with_resolution(1.0);
        let mut grid = VoxelGrid::from_structure(&structure, &params, &AxisPins::world()).unwrap();
        grid.fill_structure(&structure, 0.05);

        assert_eq!(DistanceGrid::from_voxels(&grid), distance_by_passes(&grid));
    }

    #[test]
    fn neighbors_follow_offset_order() {
        let mut field = DistanceGrid::from_raw([5, 5, 5], vec![0; 125]).unwrap();
        field.set([2, 2, 2], 1);
        field.set([3, 2, 2], 1);
        field.set([1, 3, 2], 1);
        field.set([2, 2, 1], 1);
        assert_eq!(field.neighbors([2, 2, 2]), vec![[1, 3, 2], [2, 2, 1], [3, 2, 2]]);
        assert_eq!(field.neighbor_count([2, 2, 2]), 3);
        assert_eq!(field.neighbors([0, 0, 0]), Vec::<Cell>::new());
    }

    #[test]
    fn raw_values_must_match_dims() {
        assert!(DistanceGrid::from_raw([2, 2, 2], vec![0; 7]).is_none());
    }

    #[test]
    fn nonzero_cells_scan_in_order() {
        let mut field = DistanceGrid::from_raw([3, 3, 3], vec![0; 27]).unwrap();
        field.set([2, 0, 1], 5);
        field.set([0, 1, 2], 3);
        let cells: Vec<_> = field.nonzero_cells().collect();
        assert_eq!(cells, vec![[0, 1, 2], [2, 0, 1]]);
    }
}
