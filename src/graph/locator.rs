use std::collections::HashMap;

use crate::math::{points_coincide, Point3, COORD_EPSILON};

use super::node::NodeId;

/// Bucket size of the spatial hash. Coinciding points are at most one
/// bucket apart on every axis.
const BUCKET: f64 = 2.0 * COORD_EPSILON;

type Bucket = [i64; 3];

/// Hashed lookup of nodes by tolerant coordinate equality.
#[derive(Debug, Clone, Default)]
pub(super) struct CoordinateLocator {
    buckets: HashMap<Bucket, Vec<(NodeId, Point3)>>,
}

#[allow(clippy::cast_possible_truncation)]
fn bucket_of(point: &Point3) -> Bucket {
    [
        (point.x / BUCKET).floor() as i64,
        (point.y / BUCKET).floor() as i64,
        (point.z / BUCKET).floor() as i64,
    ]
}

impl CoordinateLocator {
    pub(super) fn insert(&mut self, id: NodeId, point: Point3) {
        self.buckets.entry(bucket_of(&point)).or_default().push((id, point));
    }

    pub(super) fn remove(&mut self, id: NodeId, point: &Point3) {
        let key = bucket_of(point);
        if let Some(entries) = self.buckets.get_mut(&key) {
            entries.retain(|(other, _)| *other != id);
            if entries.is_empty() {
                self.buckets.remove(&key);
            }
        }
    }

    pub(super) fn find(&self, point: &Point3) -> Option<NodeId> {
        let [bx, by, bz] = bucket_of(point);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let hit = self.buckets.get(&[bx + dx, by + dy, bz + dz]).and_then(|entries| {
                        entries.iter().find(|(_, p)| points_coincide(p, point)).map(|(id, _)| *id)
                    });
                    if hit.is_some() {
                        return hit;
                    }
                }
            }
        }
        None
    }
}
