//! Mutable node graph with coordinate-unique nodes and measured edges.

pub mod collision;
pub mod edge;
pub mod export;
mod locator;
pub mod node;

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use slotmap::SlotMap;

use crate::error::{GraphError, Result};
use crate::math::{points_coincide, Point3};

pub use collision::DEFAULT_NODE_RADIUS;
pub use edge::{Edge, EdgeId};
pub use export::{EdgeRecord, GraphExport, NodeRecord, UNSET_CLEARANCE};
pub use node::{NeighborLink, Node, NodeId};

use edge::narrower;
use locator::CoordinateLocator;

/// Arena of nodes and edges.
///
/// Nodes are unique by coordinate: adding a node where one already exists
/// returns the existing one. Every node and edge also carries an export
/// index, assigned in insertion order and compacted only by
/// [`NodeGraph::reindex`].
#[derive(Debug, Clone)]
pub struct NodeGraph {
    nodes: SlotMap<NodeId, Node>,
    edges: SlotMap<EdgeId, Edge>,
    node_order: BTreeMap<usize, NodeId>,
    edge_order: BTreeMap<usize, EdgeId>,
    locator: CoordinateLocator,
    next_node_index: usize,
    next_edge_index: usize,
    node_radius: f64,
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            node_order: BTreeMap::new(),
            edge_order: BTreeMap::new(),
            locator: CoordinateLocator::default(),
            next_node_index: 0,
            next_edge_index: 0,
            node_radius: DEFAULT_NODE_RADIUS,
        }
    }

    /// Sets the planar radius used by the collision helpers.
    #[must_use]
    pub fn with_node_radius(mut self, radius: f64) -> Self {
        self.node_radius = radius;
        self
    }

    #[must_use]
    pub fn node_radius(&self) -> f64 {
        self.node_radius
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in export index order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.node_order
            .values()
            .filter_map(|&id| self.nodes.get(id).map(|node| (id, node)))
    }

    /// Edges in export index order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edge_order
            .values()
            .filter_map(|&id| self.edges.get(id).map(|edge| (id, edge)))
    }

    // --- Node operations ---

    /// Returns a reference to the node, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if the node has been removed.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or_else(|| GraphError::NodeNotFound.into())
    }

    /// Node at `coordinate`, compared with tolerance.
    #[must_use]
    pub fn node_at(&self, coordinate: &Point3) -> Option<NodeId> {
        self.locator.find(coordinate)
    }

    /// Node currently carrying export index `index`.
    #[must_use]
    pub fn node_by_index(&self, index: usize) -> Option<NodeId> {
        self.node_order.get(&index).copied()
    }

    /// Adds an unlinked node, or returns the node already at `coordinate`.
    pub fn add_node(&mut self, coordinate: Point3) -> NodeId {
        if let Some(existing) = self.locator.find(&coordinate) {
            return existing;
        }
        let index = self.next_node_index;
        self.next_node_index += 1;
        let id = self.nodes.insert(Node::new(coordinate, index));
        self.node_order.insert(index, id);
        self.locator.insert(id, coordinate);
        id
    }

    /// Adds (or finds) the node at `coordinate` and links it to every node
    /// in `neighbors` with the given clearance.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if a neighbour does not exist.
    /// Nothing is added in that case.
    pub fn add_linked_node(
        &mut self,
        coordinate: Point3,
        width: Option<f64>,
        height: Option<f64>,
        neighbors: &[NodeId],
    ) -> Result<NodeId> {
        for &neighbor in neighbors {
            self.node(neighbor)?;
        }
        let id = self.add_node(coordinate);
        for &neighbor in neighbors {
            self.link_nodes(id, neighbor, width, height)?;
        }
        Ok(id)
    }

    /// Moves a node to `target`.
    ///
    /// If another node already sits at `target` the two are merged: the
    /// moving node takes over the other's edges and coordinate and the other
    /// is deleted. Where both had an edge to the same neighbour, the
    /// narrower clearance is kept. An edge directly between the two also
    /// narrows every edge of the moving node. Returns the surviving node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if `id` does not exist.
    pub fn move_node(&mut self, id: NodeId, target: Point3) -> Result<NodeId> {
        self.node(id)?;
        match self.locator.find(&target) {
            None => {
                self.relocate(id, target);
                Ok(id)
            }
            Some(existing) if existing == id => Ok(id),
            Some(existing) => {
                self.merge_into(id, existing)?;
                Ok(id)
            }
        }
    }

    fn relocate(&mut self, id: NodeId, target: Point3) {
        if let Some(node) = self.nodes.get_mut(id) {
            self.locator.remove(id, &node.coordinate);
            node.coordinate = target;
            self.locator.insert(id, target);
        }
    }

    fn merge_into(&mut self, moving: NodeId, absorbed: NodeId) -> Result<()> {
        if let Some(bridge) = self.edge_between(moving, absorbed) {
            let (bridge_width, bridge_height) = {
                let edge = self.edge(bridge)?;
                (edge.width, edge.height)
            };
            let links = self.node(moving)?.neighbors.clone();
            for link in links.iter().filter(|l| l.edge != bridge) {
                if let Some(edge) = self.edges.get_mut(link.edge) {
                    edge.width = edge.width.map(|w| bridge_width.map_or(w, |b| w.min(b)));
                    edge.height = edge.height.map(|h| bridge_height.map_or(h, |b| h.min(b)));
                }
            }
        }

        self.adopt_neighbors(moving, absorbed)?;
        let target = self.node(absorbed)?.coordinate;
        self.remove_node(absorbed)?;
        self.relocate(moving, target);
        Ok(())
    }

    /// Links `keep` to every neighbour of `from` other than itself.
    fn adopt_neighbors(&mut self, keep: NodeId, from: NodeId) -> Result<()> {
        let adopted: Vec<(NodeId, Option<f64>, Option<f64>)> = self
            .node(from)?
            .neighbors
            .iter()
            .filter(|l| l.node != keep)
            .filter_map(|l| self.edges.get(l.edge).map(|e| (l.node, e.width, e.height)))
            .collect();

        for (neighbor, width, height) in adopted {
            match self.edge_between(keep, neighbor) {
                Some(existing) => {
                    if let Some(edge) = self.edges.get_mut(existing) {
                        edge.width = narrower(edge.width, width);
                        edge.height = narrower(edge.height, height);
                    }
                }
                None => {
                    self.create_edge(keep, neighbor, width, height);
                }
            }
        }
        Ok(())
    }

    /// Merges two nodes into the one with the lower `y`, which keeps its
    /// coordinate and inherits the other's edges.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if either node does not exist.
    pub fn unify_nodes(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        let ya = self.node(a)?.coordinate.y;
        let yb = self.node(b)?.coordinate.y;
        if a == b {
            return Ok(a);
        }
        let (keep, merged) = if ya <= yb { (a, b) } else { (b, a) };
        self.adopt_neighbors(keep, merged)?;
        self.remove_node(merged)?;
        Ok(keep)
    }

    /// Removes a node together with every edge touching it.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if the node does not exist.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.nodes.remove(id).ok_or(GraphError::NodeNotFound)?;
        for link in &node.neighbors {
            if let Some(edge) = self.edges.remove(link.edge) {
                self.edge_order.remove(&edge.index);
            }
            if let Some(other) = self.nodes.get_mut(link.node) {
                other.neighbors.retain(|l| l.edge != link.edge);
            }
        }
        self.locator.remove(id, &node.coordinate);
        self.node_order.remove(&node.index);
        Ok(())
    }

    // --- Edge operations ---

    /// Returns a reference to the edge, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EdgeNotFound`] if the edge has been removed.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge> {
        self.edges.get(id).ok_or_else(|| GraphError::EdgeNotFound.into())
    }

    fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge> {
        self.edges.get_mut(id).ok_or_else(|| GraphError::EdgeNotFound.into())
    }

    /// Edge currently carrying export index `index`.
    #[must_use]
    pub fn edge_by_index(&self, index: usize) -> Option<EdgeId> {
        self.edge_order.get(&index).copied()
    }

    /// Edge joining `a` and `b`, if any.
    #[must_use]
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.nodes.get(a).and_then(|node| node.edge_to(b))
    }

    #[must_use]
    pub fn are_linked(&self, a: NodeId, b: NodeId) -> bool {
        a != b && self.edge_between(a, b).is_some()
    }

    /// Links two nodes. Returns `true` if an edge was created or an existing
    /// edge without clearance received one.
    ///
    /// Linking a node to itself does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if either node does not exist.
    pub fn link_nodes(
        &mut self,
        a: NodeId,
        b: NodeId,
        width: Option<f64>,
        height: Option<f64>,
    ) -> Result<bool> {
        self.node(a)?;
        self.node(b)?;
        if a == b {
            return Ok(false);
        }
        if let Some(existing) = self.edge_between(a, b) {
            let edge = self.edge_mut(existing)?;
            if edge.width.is_none() && width.is_some() {
                edge.width = width;
                edge.height = height;
                return Ok(true);
            }
            return Ok(false);
        }
        self.create_edge(a, b, width, height);
        Ok(true)
    }

    fn create_edge(&mut self, a: NodeId, b: NodeId, width: Option<f64>, height: Option<f64>) -> EdgeId {
        let index = self.next_edge_index;
        self.next_edge_index += 1;
        let id = self.edges.insert(Edge {
            nodes: [a, b],
            index,
            width,
            height,
        });
        self.edge_order.insert(index, id);
        if let Some(node) = self.nodes.get_mut(a) {
            node.neighbors.push(NeighborLink { node: b, edge: id });
        }
        if let Some(node) = self.nodes.get_mut(b) {
            node.neighbors.push(NeighborLink { node: a, edge: id });
        }
        id
    }

    /// # Errors
    ///
    /// Returns [`GraphError::EdgeNotFound`] if the edge does not exist.
    pub fn set_edge_width(&mut self, id: EdgeId, width: f64) -> Result<()> {
        self.edge_mut(id)?.width = Some(width);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`GraphError::EdgeNotFound`] if the edge does not exist.
    pub fn set_edge_height(&mut self, id: EdgeId, height: f64) -> Result<()> {
        self.edge_mut(id)?.height = Some(height);
        Ok(())
    }

    /// Euclidean distance between the endpoints of an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its nodes does not exist.
    pub fn edge_length(&self, id: EdgeId) -> Result<f64> {
        let [a, b] = self.edge(id)?.nodes;
        Ok((self.node(a)?.coordinate - self.node(b)?.coordinate).norm())
    }

    /// Removes an edge and its adjacency entries.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EdgeNotFound`] if the edge does not exist.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<()> {
        let edge = self.edges.remove(id).ok_or(GraphError::EdgeNotFound)?;
        self.edge_order.remove(&edge.index);
        for node in edge.nodes {
            if let Some(node) = self.nodes.get_mut(node) {
                node.neighbors.retain(|l| l.edge != id);
            }
        }
        Ok(())
    }

    /// Removes the edge between `a` and `b`. Returns `false` if there is none.
    pub fn remove_edge_between(&mut self, a: NodeId, b: NodeId) -> bool {
        match self.edge_between(a, b) {
            Some(edge) => self.remove_edge(edge).is_ok(),
            None => false,
        }
    }

    // --- Indexing ---

    /// Renumbers nodes from `node_offset` and edges from `edge_offset`,
    /// keeping their relative order. New elements continue after the last.
    pub fn reindex(&mut self, node_offset: usize, edge_offset: usize) {
        let node_ids: Vec<NodeId> = self.node_order.values().copied().collect();
        self.node_order.clear();
        for (i, id) in node_ids.into_iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(id) {
                node.index = node_offset + i;
                self.node_order.insert(node.index, id);
            }
        }
        self.next_node_index = node_offset + self.node_order.len();

        let edge_ids: Vec<EdgeId> = self.edge_order.values().copied().collect();
        self.edge_order.clear();
        for (i, id) in edge_ids.into_iter().enumerate() {
            if let Some(edge) = self.edges.get_mut(id) {
                edge.index = edge_offset + i;
                self.edge_order.insert(edge.index, id);
            }
        }
        self.next_edge_index = edge_offset + self.edge_order.len();
    }

    /// Renumbers nodes and edges from zero.
    pub fn compact(&mut self) {
        self.reindex(0, 0);
    }

    /// Checks every structural invariant of the graph.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidGraph`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(GraphError::InvalidGraph(msg).into()) };

        if self.node_order.len() != self.nodes.len() || self.edge_order.len() != self.edges.len() {
            return invalid("index maps out of sync with arenas".into());
        }
        for (&index, &id) in &self.node_order {
            if self.nodes.get(id).is_none_or(|n| n.index != index) {
                return invalid(format!("node index {index} does not resolve"));
            }
        }
        for (&index, &id) in &self.edge_order {
            if self.edges.get(id).is_none_or(|e| e.index != index) {
                return invalid(format!("edge index {index} does not resolve"));
            }
        }

        let mut pairs = HashSet::new();
        for (id, edge) in self.edges() {
            let [a, b] = edge.nodes;
            if a == b {
                return invalid(format!("edge {} is a self link", edge.index));
            }
            let (Some(na), Some(nb)) = (self.nodes.get(a), self.nodes.get(b)) else {
                return invalid(format!("edge {} references a missing node", edge.index));
            };
            if na.edge_to(b) != Some(id) || nb.edge_to(a) != Some(id) {
                return invalid(format!("edge {} is not listed by both endpoints", edge.index));
            }
            if !pairs.insert((a.min(b), a.max(b))) {
                return invalid(format!("edge {} duplicates another edge", edge.index));
            }
        }

        for (id, node) in self.nodes() {
            for link in &node.neighbors {
                if self.edges.get(link.edge).is_none_or(|e| !e.connects(id, link.node)) {
                    return invalid(format!("node {} lists a dangling edge", node.index));
                }
            }
            if self.locator.find(&node.coordinate) != Some(id) {
                return invalid(format!("node {} is not locatable", node.index));
            }
        }

        let nodes: Vec<&Node> = self.nodes.values().collect();
        for (i, a) in nodes.iter().enumerate() {
            if let Some(b) = nodes[i + 1..].iter().find(|b| points_coincide(&a.coordinate, &b.coordinate)) {
                return invalid(format!("nodes {} and {} share a coordinate", a.index, b.index));
            }
        }
        Ok(())
    }
}

impl fmt::Display for NodeGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, edge) in self.edges() {
            let [a, b] = edge.nodes.map(|n| self.nodes.get(n).map_or(usize::MAX, |n| n.index));
            writeln!(f, "[{a}->{b}]({})", edge.index)?;
        }
        writeln!(f)?;
        for (_, node) in self.nodes() {
            let c = node.coordinate;
            writeln!(f, "Node [{}] ({}, {}, {})", node.index, c.x, c.y, c.z)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::VoxgraphError;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// a - b - c in a row along X.
    fn chain() -> (NodeGraph, [NodeId; 3]) {
        let mut graph = NodeGraph::new();
        let a = graph.add_node(p(0.0, 0.0, 0.0));
        let b = graph.add_linked_node(p(1.0, 0.0, 0.0), Some(2.0), Some(2.0), &[a]).unwrap();
        let c = graph.add_linked_node(p(2.0, 0.0, 0.0), Some(1.0), Some(1.0), &[b]).unwrap();
        (graph, [a, b, c])
    }

    // ── Nodes ──

    #[test]
    fn add_node_reuses_coinciding_coordinate() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node(p(1.0, 2.0, 3.0));
        let b = graph.add_node(p(1.0 + 1e-7, 2.0, 3.0 - 1e-7));
        assert_eq!(a, b);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node_at(&p(1.0, 2.0, 3.0)), Some(a));
        assert_eq!(graph.node_by_index(0), Some(a));
    }

    #[test]
    fn linking_to_missing_neighbor_fails_without_adding() {
        let (mut graph, [_, _, c]) = chain();
        graph.remove_node(c).unwrap();
        match graph.add_linked_node(p(5.0, 0.0, 0.0), None, None, &[c]) {
            Err(VoxgraphError::Graph(GraphError::NodeNotFound)) => {}
            other => panic!("expected NodeNotFound, got {other:?}"),
        }
        assert_eq!(graph.node_count(), 2);
        assert!(graph.node(c).is_err());
    }

    #[test]
    fn remove_node_drops_its_edges() {
        let (mut graph, [a, b, c]) = chain();
        graph.remove_node(b).unwrap();
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node(a).unwrap().degree(), 0);
        assert_eq!(graph.node(c).unwrap().degree(), 0);
        assert!(graph.node_at(&p(1.0, 0.0, 0.0)).is_none());
        graph.validate().unwrap();
    }

    // ── Edges ──

    #[test]
    fn link_fills_clearance_once() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node(p(0.0, 0.0, 0.0));
        let b = graph.add_node(p(0.0, 1.0, 0.0));
        assert!(graph.link_nodes(a, b, None, None).unwrap());
        assert!(graph.link_nodes(b, a, Some(3.0), Some(4.0)).unwrap());
        assert!(!graph.link_nodes(a, b, Some(9.0), Some(9.0)).unwrap());
        assert!(!graph.link_nodes(a, a, Some(1.0), Some(1.0)).unwrap());

        let edge = graph.edge(graph.edge_between(a, b).unwrap()).unwrap();
        assert_eq!(edge.clearance().unwrap(), (3.0, 4.0));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn remove_edge_between_updates_adjacency() {
        let (mut graph, [a, b, c]) = chain();
        assert!(graph.remove_edge_between(c, b));
        assert!(!graph.remove_edge_between(c, b));
        assert!(graph.are_linked(a, b));
        assert!(!graph.are_linked(b, c));
        assert_eq!(graph.node(b).unwrap().degree(), 1);
        graph.validate().unwrap();
    }

    #[test]
    fn setters_and_length() {
        let (mut graph, [a, b, _]) = chain();
        let e = graph.edge_between(a, b).unwrap();
        graph.set_edge_width(e, 0.5).unwrap();
        graph.set_edge_height(e, 0.25).unwrap();
        assert_eq!(graph.edge(e).unwrap().clearance().unwrap(), (0.5, 0.25));
        approx::assert_relative_eq!(graph.edge_length(e).unwrap(), 1.0);
    }

    // ── Moving and merging ──

    #[test]
    fn move_to_free_coordinate_relocates() {
        let (mut graph, [_, b, _]) = chain();
        let moved = graph.move_node(b, p(1.0, 5.0, 0.0)).unwrap();
        assert_eq!(moved, b);
        assert_eq!(graph.node_at(&p(1.0, 5.0, 0.0)), Some(b));
        assert!(graph.node_at(&p(1.0, 0.0, 0.0)).is_none());
        graph.validate().unwrap();
    }

    #[test]
    fn move_onto_node_merges() {
        let (mut graph, [a, b, c]) = chain();
        let d = graph.add_linked_node(p(1.0, 1.0, 0.0), Some(5.0), Some(5.0), &[b]).unwrap();
        graph.link_nodes(c, d, Some(0.5), Some(0.5)).unwrap();

        // c moves onto b: c keeps its id, takes b's coordinate and neighbours.
        let survivor = graph.move_node(c, p(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(survivor, c);
        assert!(graph.node(b).is_err());
        assert_eq!(graph.node_at(&p(1.0, 0.0, 0.0)), Some(c));
        assert!(graph.are_linked(c, a));
        assert!(graph.are_linked(c, d));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        // c - d was clamped by the 1.0 bridge, then kept narrower than b - d.
        let cd = graph.edge(graph.edge_between(c, d).unwrap()).unwrap();
        assert_eq!(cd.clearance().unwrap(), (0.5, 0.5));
        let ca = graph.edge(graph.edge_between(c, a).unwrap()).unwrap();
        assert_eq!(ca.clearance().unwrap(), (2.0, 2.0));
        graph.validate().unwrap();
    }

    #[test]
    fn bridge_narrows_moving_edges() {
        let (mut graph, [a, b, c]) = chain();
        let d = graph.add_linked_node(p(3.0, 0.0, 0.0), Some(4.0), Some(4.0), &[c]).unwrap();
        // c (bridge 1.0 to b) moves onto b, its edge to d narrows to 1.0.
        graph.move_node(c, p(1.0, 0.0, 0.0)).unwrap();
        let cd = graph.edge(graph.edge_between(c, d).unwrap()).unwrap();
        assert_eq!(cd.clearance().unwrap(), (1.0, 1.0));
        assert!(graph.are_linked(c, a));
        graph.validate().unwrap();
    }

    #[test]
    fn unify_keeps_lowest_node() {
        let mut graph = NodeGraph::new();
        let low = graph.add_node(p(0.0, 0.0, 0.0));
        let high = graph.add_node(p(0.0, 2.0, 0.0));
        let other = graph.add_linked_node(p(4.0, 2.0, 0.0), Some(1.0), Some(1.0), &[high]).unwrap();
        graph.link_nodes(low, high, None, None).unwrap();

        assert_eq!(graph.unify_nodes(high, low).unwrap(), low);
        assert!(graph.node(high).is_err());
        assert!(graph.are_linked(low, other));
        assert_eq!(graph.edge_count(), 1);
        graph.validate().unwrap();
    }

    // ── Indexing ──

    #[test]
    fn reindex_compacts_after_removal() {
        let (mut graph, [a, b, c]) = chain();
        let d = graph.add_linked_node(p(3.0, 0.0, 0.0), None, None, &[c]).unwrap();
        graph.remove_node(b).unwrap();
        assert_eq!(graph.node(c).unwrap().index(), 2);

        graph.compact();
        let indices: Vec<usize> = graph.nodes().map(|(_, n)| n.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(graph.node_by_index(0), Some(a));
        assert_eq!(graph.node_by_index(2), Some(d));
        let edge = graph.edge_by_index(0).unwrap();
        assert!(graph.edge(edge).unwrap().connects(c, d));

        graph.reindex(10, 20);
        assert_eq!(graph.node(a).unwrap().index(), 10);
        assert_eq!(graph.edge(edge).unwrap().index(), 20);
        let e = graph.add_node(p(9.0, 9.0, 9.0));
        assert_eq!(graph.node(e).unwrap().index(), 13);
        graph.validate().unwrap();
    }

    #[test]
    fn display_lists_edges_then_nodes() {
        let (graph, _) = chain();
        let text = graph.to_string();
        assert!(text.starts_with("[1->0](0)\n[2->1](1)\n\n"));
        assert!(text.contains("Node [2] (2, 0, 0)"));
    }
}
