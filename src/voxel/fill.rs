use tracing::debug;

use crate::math::intersect_3d::{ray_triangle_intersect, RayTriangleHit};
use crate::math::{Point3, Vector3};
use crate::mesh::{Component, Structure};

use super::VoxelGrid;

/// Extra voxels scanned beyond a component's own lattice extents.
const SPAN_BORDER: i64 = 2;

/// Sideways tilts tried, in units of the local X and Z axes, when a ray
/// passes exactly through a triangle edge or vertex.
const RAY_TILTS: [(f64, f64); 4] = [
    (0.0, 0.0),
    (0.0137, 0.0071),
    (-0.0113, 0.0179),
    (0.0191, -0.0053),
];

/// Lattice index range `[min, max)` covered by a component on each axis.
#[derive(Debug, Clone, Copy)]
struct VoxelSpan {
    min: [usize; 3],
    max: [usize; 3],
}

impl VoxelSpan {
    #[allow(clippy::cast_possible_truncation)]
    fn of_component(grid: &VoxelGrid, component: &Component) -> Option<Self> {
        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        for point in component.points() {
            let lattice = grid.lattice_coordinate(point);
            for axis in 0..3 {
                lo[axis] = lo[axis].min(lattice[axis]);
                hi[axis] = hi[axis].max(lattice[axis]);
            }
        }
        if lo[0] > hi[0] {
            return None;
        }

        let dims = grid.dims();
        let mut span = Self {
            min: [1; 3],
            max: [1; 3],
        };
        for axis in 0..3 {
            let first = lo[axis].floor() as i64 - SPAN_BORDER;
            let last = hi[axis].floor() as i64 + SPAN_BORDER;
            span.min[axis] = usize::try_from(first).map_or(1, |v| v.max(1));
            span.max[axis] = usize::try_from(last).map_or(1, |v| v.min(dims[axis] - 1));
        }
        Some(span)
    }
}

impl VoxelGrid {
    /// Fills the inside of every component of `structure`.
    pub fn fill_structure(&mut self, structure: &Structure, expansion_factor: f64) {
        for component in structure.components() {
            self.fill_internal_volume(component, expansion_factor);
        }
    }

    /// Fills voxels enclosed by `component` using parity ray casting.
    ///
    /// Columns are scanned upward along local Y. At each gap directly above
    /// an occupied voxel whose position lies in the component's box, a ray is
    /// cast up against this component's triangles only: an odd number of
    /// crossings fills the gap up to the next occupied voxel, no crossings at
    /// all ends the column.
    pub fn fill_internal_volume(&mut self, component: &Component, expansion_factor: f64) {
        let Some(span) = VoxelSpan::of_component(self, component) else {
            return;
        };
        let containment = component
            .index()
            .and_then(|i| self.component_box(i))
            .unwrap_or_else(|| self.bbox())
            .clone();
        let triangles: Vec<[Point3; 3]> = component
            .faces()
            .iter()
            .map(|face| component.face_corners(face))
            .collect();
        let [x_axis, y_axis, z_axis] = self.bbox().axes();
        let directions = RAY_TILTS.map(|(tx, tz)| y_axis + x_axis * tx + z_axis * tz);
        let top = self.dims()[1] - 2;

        let before = self.occupied_count();
        for x in span.min[0]..span.max[0] {
            for z in span.min[2]..span.max[2] {
                for y in span.min[1]..span.max[1] {
                    if self.is_occupied(x, y, z) || !self.is_occupied(x, y - 1, z) {
                        continue;
                    }
                    let origin = self.voxel_position(x, y, z);
                    if !containment.contains_global_coordinate(&origin, expansion_factor) {
                        continue;
                    }

                    let crossings = count_crossings(&origin, &directions, &triangles);
                    if crossings % 2 == 1 {
                        let mut rise = y;
                        while rise <= top && !self.is_occupied(x, rise, z) {
                            self.mark(x, rise, z);
                            rise += 1;
                        }
                    } else if crossings == 0 {
                        break;
                    }
                }
            }
        }
        debug!(
            component = component.index(),
            filled = self.occupied_count() - before,
            "filled internal volume"
        );
    }
}

/// Number of triangles crossed by a ray from `origin`.
///
/// Directions are tried in order until one passes cleanly through triangle
/// interiors only. If every direction grazes, the last count is used with
/// grazes counted as crossings.
fn count_crossings(origin: &Point3, directions: &[Vector3], triangles: &[[Point3; 3]]) -> usize {
    let mut crossings = 0;
    for dir in directions {
        crossings = 0;
        let mut grazed = false;
        for [a, b, c] in triangles {
            match ray_triangle_intersect(origin, dir, a, b, c) {
                RayTriangleHit::Hit { .. } => crossings += 1,
                RayTriangleHit::Grazing { .. } => {
                    grazed = true;
                    crossings += 1;
                }
                RayTriangleHit::Miss => {}
            }
        }
        if !grazed {
            return crossings;
        }
    }
    crossings
}
