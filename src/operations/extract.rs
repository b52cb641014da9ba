use std::collections::VecDeque;

use tracing::debug;

use crate::error::{GraphError, Result};
use crate::graph::{EdgeId, NodeGraph, NodeId};
use crate::math::{distance_to_segment, Point3};
use crate::voxel::{Cell, DistanceGrid, VoxelGrid};

/// Per-voxel visited flags over the lattice.
struct VisitMap {
    dims: [usize; 3],
    flags: Vec<bool>,
}

impl VisitMap {
    fn new(dims: [usize; 3]) -> Self {
        Self {
            dims,
            flags: vec![false; dims[0] * dims[1] * dims[2]],
        }
    }

    fn slot(&self, [x, y, z]: Cell) -> usize {
        (x * self.dims[1] + y) * self.dims[2] + z
    }

    fn mark(&mut self, cell: Cell) {
        let i = self.slot(cell);
        self.flags[i] = true;
    }

    fn contains(&self, cell: Cell) -> bool {
        self.flags[self.slot(cell)]
    }
}

/// Why a walk along a run of two-neighbour voxels stopped.
enum WalkEnd {
    /// The straight line from the start no longer covers the run.
    Deviated,
    /// Reached a voxel some earlier walk already claimed.
    Visited,
    /// Reached a junction or dead end with these neighbours.
    Branch(Vec<Cell>),
}

/// Turns a thinned skeleton into a node graph.
///
/// The skeleton is walked breadth first from its end points. Runs of
/// voxels with exactly two neighbours collapse into single edges until the
/// run bends away from a straight line by more than
/// `resolution * deviation_threshold`; junctions, dead ends and bends
/// become nodes.
pub struct ExtractGraph<'a> {
    grid: &'a VoxelGrid,
    deviation_threshold: f64,
}

impl<'a> ExtractGraph<'a> {
    /// Creates a new `ExtractGraph` operation placing nodes in the frame of `grid`.
    #[must_use]
    pub fn new(grid: &'a VoxelGrid, deviation_threshold: f64) -> Self {
        Self {
            grid,
            deviation_threshold,
        }
    }

    /// Executes the extraction.
    ///
    /// # Errors
    ///
    /// Returns a graph error if a walk loses track of its start node.
    pub fn execute(&self, skeleton: &DistanceGrid) -> Result<NodeGraph> {
        let mut graph = NodeGraph::new();
        let mut visited = VisitMap::new(skeleton.dims());
        let mut claimed = VisitMap::new(skeleton.dims());
        let mut components = 0;

        for start in skeleton.nonzero_cells() {
            if claimed.contains(start) {
                continue;
            }
            components += 1;
            let members = component_cells(skeleton, &mut claimed, start);
            let mut queue = VecDeque::new();

            let terminals: Vec<Cell> = members
                .iter()
                .copied()
                .filter(|&c| skeleton.neighbor_count(c) <= 1)
                .collect();
            if terminals.is_empty() {
                graph.add_node(self.position(start));
                visited.mark(start);
                for next in skeleton.neighbors(start) {
                    queue.push_back((start, next));
                }
            } else {
                for terminal in terminals {
                    graph.add_node(self.position(terminal));
                    visited.mark(terminal);
                    for next in skeleton.neighbors(terminal) {
                        queue.push_back((terminal, next));
                    }
                }
            }

            while let Some((from, current)) = queue.pop_front() {
                self.walk(skeleton, &mut graph, &mut visited, &mut queue, from, current)?;
            }
        }

        debug!(
            components,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "extracted skeleton graph"
        );
        Ok(graph)
    }

    fn position(&self, [x, y, z]: Cell) -> Point3 {
        self.grid.voxel_position(x, y, z)
    }

    fn walk(
        &self,
        skeleton: &DistanceGrid,
        graph: &mut NodeGraph,
        visited: &mut VisitMap,
        queue: &mut VecDeque<(Cell, Cell)>,
        start: Cell,
        first: Cell,
    ) -> Result<()> {
        let start_position = self.position(start);
        let start_node = graph.node_at(&start_position).ok_or(GraphError::NodeNotFound)?;

        if visited.contains(first) {
            // Another walk got here first; close the gap unless the two are
            // already within two hops of each other.
            if let Some(target) = graph.node_at(&self.position(first)) {
                if !within_two_hops(graph, start_node, target)? {
                    let clearance = self.clearance(skeleton, &[start, first]);
                    graph.link_nodes(start_node, target, Some(clearance), Some(clearance))?;
                }
            }
            return Ok(());
        }

        let tolerance = self.grid.resolution() * self.deviation_threshold;
        let mut run = vec![start];
        let mut intermediates: Vec<Point3> = Vec::new();
        let mut came_from = start;
        let mut current = first;

        let end = loop {
            let current_position = self.position(current);
            if intermediates
                .iter()
                .any(|p| distance_to_segment(&start_position, &current_position, p) > tolerance)
            {
                break WalkEnd::Deviated;
            }
            if visited.contains(current) {
                break WalkEnd::Visited;
            }
            let neighbors = skeleton.neighbors(current);
            if neighbors.len() != 2 {
                visited.mark(current);
                break WalkEnd::Branch(neighbors);
            }

            intermediates.push(current_position);
            run.push(current);
            let next = if neighbors[0] == came_from {
                neighbors[1]
            } else {
                neighbors[0]
            };
            came_from = current;
            current = next;
            visited.mark(came_from);
        };

        match end {
            WalkEnd::Deviated => {
                // `came_from` is the last voxel the line still covered.
                let clearance = self.clearance(skeleton, &run);
                let position = self.position(came_from);
                graph.add_linked_node(position, Some(clearance), Some(clearance), &[start_node])?;
                if !visited.contains(current) {
                    queue.push_back((came_from, current));
                }
            }
            WalkEnd::Visited => {
                run.push(current);
                let clearance = self.clearance(skeleton, &run);
                let position = self.position(current);
                // A pass-through voxel of an earlier run: split that run's edge there.
                split_edge_at(graph, &position, tolerance)?;
                graph.add_linked_node(position, Some(clearance), Some(clearance), &[start_node])?;
            }
            WalkEnd::Branch(neighbors) => {
                run.push(current);
                let clearance = self.clearance(skeleton, &run);
                let position = self.position(current);
                graph.add_linked_node(position, Some(clearance), Some(clearance), &[start_node])?;
                for next in neighbors {
                    if next != came_from && !visited.contains(next) {
                        queue.push_back((current, next));
                    }
                }
            }
        }
        Ok(())
    }

    /// Mean distance value of `run` times the voxel diagonal.
    fn clearance(&self, skeleton: &DistanceGrid, run: &[Cell]) -> f64 {
        let total: f64 = run.iter().map(|&c| f64::from(skeleton.get(c))).sum();
        #[allow(clippy::cast_precision_loss)]
        let mean = total / run.len().max(1) as f64;
        mean * self.grid.resolution() * 3.0_f64.sqrt()
    }
}

/// Every voxel 26-connected to `start`, in breadth-first order. Marks them in `seen`.
fn component_cells(skeleton: &DistanceGrid, seen: &mut VisitMap, start: Cell) -> Vec<Cell> {
    seen.mark(start);
    let mut queue = VecDeque::from([start]);
    let mut cells = Vec::new();
    while let Some(cell) = queue.pop_front() {
        cells.push(cell);
        for next in skeleton.neighbors(cell) {
            if !seen.contains(next) {
                seen.mark(next);
                queue.push_back(next);
            }
        }
    }
    cells
}

/// Splits the edge passing nearest to `position`, within `tolerance`, with a
/// node at `position` that inherits the edge's clearance. Does nothing if a
/// node already sits there or no edge is close enough.
fn split_edge_at(graph: &mut NodeGraph, position: &Point3, tolerance: f64) -> Result<()> {
    if graph.node_at(position).is_some() {
        return Ok(());
    }
    let mut nearest: Option<(EdgeId, f64)> = None;
    for (id, edge) in graph.edges() {
        let [a, b] = edge.nodes();
        let d = distance_to_segment(graph.node(a)?.coordinate(), graph.node(b)?.coordinate(), position);
        if d <= tolerance && nearest.is_none_or(|(_, best)| d < best) {
            nearest = Some((id, d));
        }
    }
    if let Some((id, _)) = nearest {
        let (nodes, width, height) = {
            let edge = graph.edge(id)?;
            (edge.nodes(), edge.width(), edge.height())
        };
        graph.remove_edge(id)?;
        graph.add_linked_node(*position, width, height, &nodes)?;
    }
    Ok(())
}

fn within_two_hops(graph: &NodeGraph, a: NodeId, b: NodeId) -> Result<bool> {
    for link in graph.node(a)?.neighbors() {
        if link.node == b {
            return Ok(true);
        }
        if graph.node(link.node)?.neighbors().iter().any(|l| l.node == b) {
            return Ok(true);
        }
    }
    Ok(a == b)
}
