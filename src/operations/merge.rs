use tracing::debug;

use crate::error::Result;
use crate::graph::{EdgeId, NodeGraph};

/// Collapses edges shorter than a distance threshold.
///
/// The lowest-index short edge is contracted first: both endpoints move to
/// its midpoint, which merges them. This repeats until no edge is shorter
/// than the threshold, then the graph is compacted.
pub struct MergeShortEdges {
    min_length: f64,
}

impl MergeShortEdges {
    /// Creates a new `MergeShortEdges` operation for edges shorter than `min_length`.
    #[must_use]
    pub fn new(min_length: f64) -> Self {
        Self { min_length }
    }

    /// Executes the merge pass. Returns the number of contracted edges.
    ///
    /// # Errors
    ///
    /// Returns a graph error if an edge refers to a missing node.
    pub fn execute(&self, graph: &mut NodeGraph) -> Result<usize> {
        let mut contracted = 0;
        while let Some(edge) = self.first_short_edge(graph)? {
            let [a, b] = graph.edge(edge)?.nodes();
            let midpoint = nalgebra::center(graph.node(a)?.coordinate(), graph.node(b)?.coordinate());
            graph.move_node(a, midpoint)?;
            graph.move_node(b, midpoint)?;
            contracted += 1;
        }
        graph.compact();
        debug!(
            contracted,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "merged short edges"
        );
        Ok(contracted)
    }

    fn first_short_edge(&self, graph: &NodeGraph) -> Result<Option<EdgeId>> {
        for (id, _) in graph.edges() {
            if graph.edge_length(id)? < self.min_length {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn close_pair_merges_at_midpoint() {
        let mut graph = NodeGraph::new();
        let far = graph.add_node(p(-10.0, 0.0, 0.0));
        let a = graph.add_linked_node(p(0.0, 0.0, 0.0), Some(2.0), Some(2.0), &[far]).unwrap();
        let b = graph.add_linked_node(p(1.0, 0.0, 0.0), Some(1.5), Some(1.5), &[a]).unwrap();
        let tail = graph.add_linked_node(p(12.0, 0.0, 0.0), Some(3.0), Some(3.0), &[b]).unwrap();

        // The edge runs [b, a]: `b` relocates first, then `a` moves onto it
        // and survives.
        assert_eq!(graph.edge(graph.edge_between(a, b).unwrap()).unwrap().nodes(), [b, a]);

        let contracted = MergeShortEdges::new(3.0).execute(&mut graph).unwrap();
        assert_eq!(contracted, 1);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        let merged = graph.node_at(&p(0.5, 0.0, 0.0)).unwrap();
        assert_eq!(merged, a);
        assert!(graph.are_linked(merged, far));
        assert!(graph.are_linked(merged, tail));
        graph.validate().unwrap();
    }

    #[test]
    fn chain_of_short_edges_collapses() {
        let mut graph = NodeGraph::new();
        let mut prev = graph.add_node(p(0.0, 0.0, 0.0));
        for i in 1..5 {
            prev = graph
                .add_linked_node(p(f64::from(i), 0.0, 0.0), Some(1.0), Some(1.0), &[prev])
                .unwrap();
        }
        MergeShortEdges::new(10.0).execute(&mut graph).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.nodes().next().unwrap().1.index(), 0);
    }

    #[test]
    fn merge_compacts_indices() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node(p(0.0, 0.0, 0.0));
        let b = graph.add_linked_node(p(0.0, 0.0, 0.1), None, None, &[a]).unwrap();
        graph.add_linked_node(p(0.0, 0.0, 9.0), None, None, &[b]).unwrap();
        MergeShortEdges::new(1.0).execute(&mut graph).unwrap();

        let export = graph.export().unwrap();
        let nodes: Vec<usize> = export.nodes.iter().map(|n| n.index).collect();
        let edges: Vec<usize> = export.edges.iter().map(|e| e.index).collect();
        assert_eq!(nodes, vec![0, 1]);
        assert_eq!(edges, vec![0]);
        for edge in &export.edges {
            assert!(edge.nodes.iter().all(|n| nodes.contains(n)));
        }
    }
}
