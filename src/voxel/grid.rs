use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::geometry::{AxisPins, OrientedBoundingBox};
use crate::math::{round_to_index, Matrix3, Point3, Vector3};
use crate::mesh::{Component, Structure};
use crate::params::VoxelGraphParams;

/// Empty voxel layers kept between the box and the lattice start on each side.
pub const LEADING_MARGIN: usize = 2;

/// Voxels added to each rounded side length: the leading and trailing margins
/// plus one so that the far face itself gets a voxel.
pub const BOUND_PADDING: usize = 2 * LEADING_MARGIN + 1;

/// A fixed-size occupancy lattice in the local frame of an oriented box.
///
/// Voxel `(x, y, z)` sits at `start + resolution * (x * X + y * Y + z * Z)`
/// where `X`, `Y`, `Z` are the box axes and `start` lies two voxels before
/// the box origin on every axis. The outermost layer on every side is never
/// written.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    dims: [usize; 3],
    cells: Vec<bool>,
    resolution: f64,
    bbox: OrientedBoundingBox,
    start: Point3,
    to_lattice: Matrix3,
    component_boxes: BTreeMap<usize, OrientedBoundingBox>,
}

impl VoxelGrid {
    /// Allocates an empty grid covering `bbox` with the given spacing.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if `resolution` is not a positive
    /// finite number, and [`GeometryError::SingularMatrix`] if the box axes are
    /// linearly dependent.
    pub fn new(bbox: OrientedBoundingBox, resolution: f64) -> Result<Self> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(GeometryError::Degenerate(format!("voxel resolution {resolution}")).into());
        }

        let sides = bbox.side_lengths();
        let mut dims = [0; 3];
        for (dim, side) in dims.iter_mut().zip(sides) {
            let steps = usize::try_from(round_to_index(side / resolution)).unwrap_or(0);
            *dim = steps + BOUND_PADDING;
        }

        let [x_axis, y_axis, z_axis] = bbox.axes();
        #[allow(clippy::cast_precision_loss)]
        let lead = LEADING_MARGIN as f64 * resolution;
        let start = bbox.origin() - (x_axis + y_axis + z_axis) * lead;
        let to_lattice = Matrix3::from_columns(&[x_axis, y_axis, z_axis])
            .try_inverse()
            .ok_or(GeometryError::SingularMatrix)?;

        debug!(
            dims = ?dims,
            resolution,
            "allocated voxel grid"
        );

        Ok(Self {
            dims,
            cells: vec![false; dims[0] * dims[1] * dims[2]],
            resolution,
            bbox,
            start,
            to_lattice,
            component_boxes: BTreeMap::new(),
        })
    }

    /// Builds a grid around one component and rasterizes its shell.
    ///
    /// The interior is left empty; see [`VoxelGrid::fill_internal_volume`].
    ///
    /// # Errors
    ///
    /// Propagates box fitting failures and rejects a degenerate resolution.
    pub fn from_component(
        component: &Component,
        params: &VoxelGraphParams,
        pins: &AxisPins,
    ) -> Result<Self> {
        let bbox = OrientedBoundingBox::from_component(component, pins)?;
        let resolution = params
            .resolution
            .unwrap_or_else(|| bbox.shortest_side() / params.resolution_divider);

        let mut grid = Self::new(bbox.clone(), resolution)?;
        if let Some(index) = component.index() {
            grid.component_boxes.insert(index, bbox);
        }
        grid.create_shell(component);
        Ok(grid)
    }

    /// Builds one grid around a whole structure and rasterizes every shell.
    ///
    /// Each component's own unpinned box is kept for containment checks
    /// during interior fill. When the resolution is derived it is the average
    /// shortest side of those boxes over `resolution_divider`.
    ///
    /// # Errors
    ///
    /// Propagates box fitting failures and rejects a degenerate resolution.
    pub fn from_structure(
        structure: &Structure,
        params: &VoxelGraphParams,
        pins: &AxisPins,
    ) -> Result<Self> {
        let bbox = OrientedBoundingBox::from_structure(structure, pins)?;

        let mut component_boxes = BTreeMap::new();
        let mut shortest_sum = 0.0;
        for (position, component) in structure.components().iter().enumerate() {
            let component_box = OrientedBoundingBox::from_component(component, &AxisPins::none())?;
            shortest_sum += component_box.shortest_side();
            component_boxes.insert(component.index().unwrap_or(position), component_box);
        }

        let resolution = match params.resolution {
            Some(resolution) => resolution,
            None => {
                #[allow(clippy::cast_precision_loss)]
                let count = structure.components().len() as f64;
                shortest_sum / count / params.resolution_divider
            }
        };

        let mut grid = Self::new(bbox, resolution)?;
        grid.component_boxes = component_boxes;
        for component in structure.components() {
            grid.create_shell(component);
        }
        Ok(grid)
    }

    /// Number of voxels along local X, Y and Z.
    #[must_use]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Lattice spacing in world units.
    #[must_use]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// The box the lattice is aligned to.
    #[must_use]
    pub fn bbox(&self) -> &OrientedBoundingBox {
        &self.bbox
    }

    /// World position of voxel `(0, 0, 0)`.
    #[must_use]
    pub fn start(&self) -> &Point3 {
        &self.start
    }

    /// The containment box remembered for component `index`.
    #[must_use]
    pub fn component_box(&self, index: usize) -> Option<&OrientedBoundingBox> {
        self.component_boxes.get(&index)
    }

    pub(crate) fn linear_index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.dims[1] + y) * self.dims[2] + z
    }

    /// Returns `true` if `(x, y, z)` lies inside the lattice.
    #[must_use]
    pub fn in_bounds(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.dims[0] && y < self.dims[1] && z < self.dims[2]
    }

    /// Occupancy of voxel `(x, y, z)`. Out of range reads as empty.
    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize, z: usize) -> bool {
        self.in_bounds(x, y, z) && self.cells[self.linear_index(x, y, z)]
    }

    pub(crate) fn mark(&mut self, x: usize, y: usize, z: usize) {
        let i = self.linear_index(x, y, z);
        self.cells[i] = true;
    }

    /// Number of occupied voxels.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// World position of voxel `(x, y, z)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn voxel_position(&self, x: usize, y: usize, z: usize) -> Point3 {
        let [x_axis, y_axis, z_axis] = self.bbox.axes();
        self.start
            + (x_axis * x as f64 + y_axis * y as f64 + z_axis * z as f64) * self.resolution
    }

    /// Continuous lattice coordinates of a world point, in voxel units.
    #[must_use]
    pub fn lattice_coordinate(&self, point: &Point3) -> Vector3 {
        self.to_lattice * (point - self.start) / self.resolution
    }

    /// Position of the lowest voxel in the occupied run that contains
    /// `(x, y, z)` and extends straight down from it.
    #[must_use]
    pub fn lowest_position_in_column(&self, x: usize, y: usize, z: usize) -> Point3 {
        let mut lowest = y;
        while lowest > 0 && self.is_occupied(x, lowest - 1, z) {
            lowest -= 1;
        }
        self.voxel_position(x, lowest, z)
    }

    /// Returns `true` if no voxel of the outermost layer is occupied.
    #[must_use]
    pub fn margin_is_clear(&self) -> bool {
        let [nx, ny, nz] = self.dims;
        (0..nx).all(|x| {
            (0..ny).all(|y| {
                (0..nz).all(|z| {
                    let on_margin = x == 0 || y == 0 || z == 0 || x == nx - 1 || y == ny - 1 || z == nz - 1;
                    !on_margin || !self.cells[self.linear_index(x, y, z)]
                })
            })
        })
    }

    /// Clamps a rounded lattice coordinate into the writable interior of axis `axis`.
    pub(crate) fn clamp_to_interior(&self, value: i64, axis: usize) -> usize {
        let hi = self.dims[axis] - 2;
        usize::try_from(value).map_or(1, |v| v.clamp(1, hi))
    }
}
