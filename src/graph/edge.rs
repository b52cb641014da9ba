use crate::error::{GraphError, Result};

use super::node::NodeId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in a [`NodeGraph`](super::NodeGraph).
    pub struct EdgeId;
}

/// An undirected link between two distinct nodes.
///
/// `width` and `height` describe the traversable cross-section along the
/// edge and stay `None` until something measures them.
#[derive(Debug, Clone)]
pub struct Edge {
    pub(super) nodes: [NodeId; 2],
    pub(super) index: usize,
    pub(super) width: Option<f64>,
    pub(super) height: Option<f64>,
}

impl Edge {
    #[must_use]
    pub fn nodes(&self) -> [NodeId; 2] {
        self.nodes
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn width(&self) -> Option<f64> {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> Option<f64> {
        self.height
    }

    /// Returns `true` if the edge joins `a` and `b`, in either order.
    #[must_use]
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        self.nodes == [a, b] || self.nodes == [b, a]
    }

    /// The endpoint opposite `node`, or `None` if `node` is not an endpoint.
    #[must_use]
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        match self.nodes {
            [a, b] if a == node => Some(b),
            [a, b] if b == node => Some(a),
            _ => None,
        }
    }

    /// Width and height as concrete values.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnsetClearance`] if either is unset.
    pub fn clearance(&self) -> Result<(f64, f64)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(GraphError::UnsetClearance { edge: self.index }.into()),
        }
    }
}

/// Narrowest of two optional measurements, keeping whichever is known.
pub(super) fn narrower(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
