use tracing::{debug, info};

use crate::error::Result;
use crate::geometry::AxisPins;
use crate::graph::NodeGraph;
use crate::mesh::{Component, Structure};
use crate::params::VoxelGraphParams;
use crate::skeleton::Skeletonizer;
use crate::voxel::{DistanceGrid, VoxelGrid};

use super::{ExtractGraph, MergeShortEdges, ProjectToFloor};

/// Runs the whole pipeline from triangle meshes to a merged node graph.
///
/// ```
/// use voxgraph::mesh::make_cuboid;
/// use voxgraph::math::Point3;
/// use voxgraph::{VoxelGraphGenerator, VoxelGraphParams};
///
/// let bar = make_cuboid(Point3::origin(), Point3::new(1.0, 1.0, 8.0)).unwrap();
/// let graph = VoxelGraphGenerator::new(VoxelGraphParams::default())
///     .generate_component(&bar)
///     .unwrap();
/// graph.validate().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct VoxelGraphGenerator {
    params: VoxelGraphParams,
}

impl VoxelGraphGenerator {
    #[must_use]
    pub fn new(params: VoxelGraphParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &VoxelGraphParams {
        &self.params
    }

    /// Builds the node graph of a single component in its own fitted frame.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid parameters, degenerate geometry or a
    /// graph inconsistency during extraction.
    pub fn generate_component(&self, component: &Component) -> Result<NodeGraph> {
        let grid = self.voxelize_component(component)?;
        self.graph_from_grid(&grid)
    }

    /// Builds one node graph for a whole structure in the world frame.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid parameters, degenerate geometry or a
    /// graph inconsistency during extraction.
    pub fn generate_structure(&self, structure: &Structure) -> Result<NodeGraph> {
        let grid = self.voxelize_structure(structure)?;
        self.graph_from_grid(&grid)
    }

    /// Shell and interior voxels of a component.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid parameters or degenerate geometry.
    pub fn voxelize_component(&self, component: &Component) -> Result<VoxelGrid> {
        self.params.validate()?;
        let mut grid = VoxelGrid::from_component(component, &self.params, &AxisPins::none())?;
        grid.fill_internal_volume(component, self.params.box_expansion_factor);
        Ok(grid)
    }

    /// Shell and interior voxels of every component of a structure, on one
    /// lattice aligned to the world axes.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid parameters or degenerate geometry.
    pub fn voxelize_structure(&self, structure: &Structure) -> Result<VoxelGrid> {
        self.params.validate()?;
        let mut grid = VoxelGrid::from_structure(structure, &self.params, &AxisPins::world())?;
        grid.fill_structure(structure, self.params.box_expansion_factor);
        Ok(grid)
    }

    /// Distance field of `grid` thinned to a skeleton resting on the floor.
    #[must_use]
    pub fn skeletal_grid(&self, grid: &VoxelGrid) -> DistanceGrid {
        let mut field = DistanceGrid::from_voxels(grid);
        let stats = Skeletonizer::new(&self.params).thin(&mut field);
        let moved = ProjectToFloor::new(grid).execute(&mut field);
        debug!(?stats, moved, "built skeletal grid");
        field
    }

    /// Extracts and merges the node graph of an already filled grid.
    ///
    /// # Errors
    ///
    /// Returns a graph error if extraction or merging hits an inconsistency.
    pub fn graph_from_grid(&self, grid: &VoxelGrid) -> Result<NodeGraph> {
        let skeleton = self.skeletal_grid(grid);
        let mut graph = ExtractGraph::new(grid, self.params.deviation_threshold).execute(&skeleton)?;
        let merged = MergeShortEdges::new(self.params.merge_threshold * grid.resolution())
            .execute(&mut graph)?;
        info!(
            dims = ?grid.dims(),
            resolution = grid.resolution(),
            skeleton = skeleton.nonzero_count(),
            merged,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "generated voxel node graph"
        );
        Ok(graph)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{ParamsError, VoxgraphError};
    use crate::math::Point3;
    use crate::mesh::make_cuboid;

    #[test]
    fn invalid_params_are_rejected_before_voxelizing() {
        let cube = make_cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0)).unwrap();
        let generator = VoxelGraphGenerator::new(VoxelGraphParams::new().with_resolution_divider(0.0));
        match generator.generate_component(&cube) {
            Err(VoxgraphError::Params(ParamsError::InvalidParameter { name, .. })) => {
                assert_eq!(name, "resolution_divider");
            }
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn component_grid_is_filled() {
        let cube = make_cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0)).unwrap();
        let generator = VoxelGraphGenerator::new(VoxelGraphParams::default());
        let grid = generator.voxelize_component(&cube).unwrap();
        // Seven voxels per side plus the far face: an 8^3 solid block.
        assert_eq!(grid.dims(), [12, 12, 12]);
        assert_eq!(grid.occupied_count(), 8 * 8 * 8);
        assert!(grid.margin_is_clear());
    }

    #[test]
    fn skeletal_grid_stays_inside_solid() {
        let bar = make_cuboid(Point3::origin(), Point3::new(2.0, 2.0, 8.0)).unwrap();
        let generator = VoxelGraphGenerator::new(VoxelGraphParams::new().with_resolution(0.25));
        let grid = generator.voxelize_component(&bar).unwrap();
        let skeleton = generator.skeletal_grid(&grid);
        assert!(skeleton.nonzero_count() > 0);
        assert!(skeleton.nonzero_cells().all(|[x, y, z]| grid.is_occupied(x, y, z)));
    }

    #[test]
    fn structure_graph_uses_world_frame() {
        let mut structure = Structure::new();
        structure.add_component(make_cuboid(Point3::origin(), Point3::new(1.0, 1.0, 6.0)).unwrap());
        let generator = VoxelGraphGenerator::new(VoxelGraphParams::default());
        let grid = generator.voxelize_structure(&structure).unwrap();
        let [x_axis, y_axis, z_axis] = grid.bbox().axes();
        approx::assert_relative_eq!(x_axis, crate::math::RIGHT, epsilon = 1e-9);
        approx::assert_relative_eq!(y_axis, crate::math::UP, epsilon = 1e-9);
        approx::assert_relative_eq!(z_axis, crate::math::FORWARD, epsilon = 1e-9);

        let graph = generator.generate_structure(&structure).unwrap();
        graph.validate().unwrap();
        for (_, node) in graph.nodes() {
            let c = node.coordinate();
            assert!(c.x > -0.01 && c.x < 1.01 && c.z > -0.01 && c.z < 6.01, "{c:?}");
        }
    }
}
