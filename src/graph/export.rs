use crate::error::{GraphError, Result};

use super::NodeGraph;

/// Width or height written for an edge that was never measured.
pub const UNSET_CLEARANCE: f64 = -1.0;

/// A node as seen by graph exporters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeRecord {
    pub index: usize,
    pub coordinate: [f64; 3],
    /// `(neighbour node index, edge index)` pairs in adjacency order.
    pub neighbors: Vec<(usize, usize)>,
}

/// An edge as seen by graph exporters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeRecord {
    pub index: usize,
    pub nodes: [usize; 2],
    pub width: f64,
    pub height: f64,
}

/// Index-based snapshot of a [`NodeGraph`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphExport {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl NodeGraph {
    /// Flattens the graph into index-based records, in index order.
    ///
    /// Unmeasured clearance is written as [`UNSET_CLEARANCE`]. Call
    /// [`NodeGraph::compact`] first for gap-free indices.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidGraph`] if an adjacency entry or edge
    /// refers to a missing element.
    pub fn export(&self) -> Result<GraphExport> {
        let dangling = || GraphError::InvalidGraph("dangling reference during export".into());

        let mut nodes = Vec::with_capacity(self.node_count());
        for (_, node) in self.nodes() {
            let mut neighbors = Vec::with_capacity(node.degree());
            for link in node.neighbors() {
                let other = self.nodes.get(link.node).ok_or_else(dangling)?;
                let edge = self.edges.get(link.edge).ok_or_else(dangling)?;
                neighbors.push((other.index(), edge.index()));
            }
            let c = node.coordinate();
            nodes.push(NodeRecord {
                index: node.index(),
                coordinate: [c.x, c.y, c.z],
                neighbors,
            });
        }

        let mut edges = Vec::with_capacity(self.edge_count());
        for (_, edge) in self.edges() {
            let [a, b] = edge.nodes();
            let a = self.nodes.get(a).ok_or_else(dangling)?.index();
            let b = self.nodes.get(b).ok_or_else(dangling)?.index();
            edges.push(EdgeRecord {
                index: edge.index(),
                nodes: [a, b],
                width: edge.width().unwrap_or(UNSET_CLEARANCE),
                height: edge.height().unwrap_or(UNSET_CLEARANCE),
            });
        }
        Ok(GraphExport { nodes, edges })
    }
}
