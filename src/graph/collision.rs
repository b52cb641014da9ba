use crate::error::{GraphError, Result};
use crate::math::Point3;

use super::{EdgeId, NodeGraph, NodeId};

/// Default planar radius around a node within which a point collides with it.
pub const DEFAULT_NODE_RADIUS: f64 = 15.0;

impl NodeGraph {
    /// Returns `true` if `point` lies within the node radius of `node`,
    /// measured in the X/Z plane.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if the node does not exist.
    pub fn point_close_to_node(&self, point: &Point3, node: NodeId) -> Result<bool> {
        let c = self.node(node)?.coordinate();
        Ok((c.x - point.x).hypot(c.z - point.z) < self.node_radius())
    }

    /// Returns `true` if `point` is close to an endpoint of `edge` or inside
    /// the X/Z rectangle spanned by its endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its nodes does not exist.
    pub fn point_on_edge(&self, point: &Point3, edge: EdgeId) -> Result<bool> {
        let [a, b] = self.edge(edge)?.nodes();
        if self.point_close_to_node(point, a)? || self.point_close_to_node(point, b)? {
            return Ok(true);
        }
        let pa = self.node(a)?.coordinate();
        let pb = self.node(b)?.coordinate();
        Ok(point.x <= pa.x.max(pb.x)
            && point.x >= pa.x.min(pb.x)
            && point.z <= pa.z.max(pb.z)
            && point.z >= pa.z.min(pb.z))
    }

    /// Node standing for a collision at `point` on `edge`.
    ///
    /// Reuses an endpoint near the point. Otherwise the edge is split by a
    /// new node at `point` that inherits the edge's clearance.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CollisionOffEdge`] if the point is not on the
    /// edge, or an error if the edge or its nodes do not exist.
    pub fn collision_node(&mut self, point: &Point3, edge: EdgeId) -> Result<NodeId> {
        let (nodes, width, height) = {
            let e = self.edge(edge)?;
            (e.nodes(), e.width(), e.height())
        };
        let [a, b] = nodes;
        if self.point_close_to_node(point, a)? {
            return Ok(a);
        }
        if self.point_close_to_node(point, b)? {
            return Ok(b);
        }
        if !self.point_on_edge(point, edge)? {
            return Err(GraphError::CollisionOffEdge.into());
        }
        self.remove_edge(edge)?;
        self.add_linked_node(*point, width, height, &nodes)
    }
}
