use crate::math::Point3;

use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a node in a [`NodeGraph`](super::NodeGraph).
    pub struct NodeId;
}

/// One adjacency entry: the neighbouring node and the edge leading to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborLink {
    pub node: NodeId,
    pub edge: EdgeId,
}

/// A point of the graph and its adjacency list.
#[derive(Debug, Clone)]
pub struct Node {
    pub(super) coordinate: Point3,
    pub(super) index: usize,
    pub(super) neighbors: Vec<NeighborLink>,
}

impl Node {
    pub(super) fn new(coordinate: Point3, index: usize) -> Self {
        Self {
            coordinate,
            index,
            neighbors: Vec::new(),
        }
    }

    #[must_use]
    pub fn coordinate(&self) -> &Point3 {
        &self.coordinate
    }

    /// Export index, compacted by [`NodeGraph::reindex`](super::NodeGraph::reindex).
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn neighbors(&self) -> &[NeighborLink] {
        &self.neighbors
    }

    /// Number of edges meeting at this node.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    /// Edge leading to `other`, if the two are adjacent.
    #[must_use]
    pub fn edge_to(&self, other: NodeId) -> Option<EdgeId> {
        self.neighbors.iter().find(|l| l.node == other).map(|l| l.edge)
    }
}
