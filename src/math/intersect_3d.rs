use crate::error::{GeometryError, Result};

use super::{Matrix3, Point3, Vector3, TOLERANCE};

/// Parallelism and forward-distance cutoff for ray/triangle tests.
const RAY_EPSILON: f64 = 1e-6;

/// Barycentric band around a triangle border in which a hit is ambiguous.
const GRAZE_EPSILON: f64 = 1e-9;

/// Outcome of casting a ray at a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RayTriangleHit {
    /// The ray misses the triangle (or runs parallel to it).
    Miss,
    /// The ray crosses the triangle interior at `origin + t * dir`.
    Hit { t: f64 },
    /// The ray passes through an edge or vertex of the triangle, so the
    /// crossing may be shared with a neighbouring triangle.
    Grazing { t: f64 },
}

/// Moller-Trumbore ray/triangle intersection.
///
/// Only forward hits (`t > 1e-6`) count.
#[must_use]
pub fn ray_triangle_intersect(
    origin: &Point3,
    dir: &Vector3,
    v0: &Point3,
    v1: &Point3,
    v2: &Point3,
) -> RayTriangleHit {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = dir.cross(&edge2);
    let a = edge1.dot(&h);
    if a.abs() < RAY_EPSILON {
        return RayTriangleHit::Miss;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);
    if !(-GRAZE_EPSILON..=1.0 + GRAZE_EPSILON).contains(&u) {
        return RayTriangleHit::Miss;
    }

    let q = s.cross(&edge1);
    let v = f * dir.dot(&q);
    if v < -GRAZE_EPSILON || u + v > 1.0 + GRAZE_EPSILON {
        return RayTriangleHit::Miss;
    }

    let t = f * edge2.dot(&q);
    if t <= RAY_EPSILON {
        return RayTriangleHit::Miss;
    }

    let w = 1.0 - u - v;
    if u.abs() <= GRAZE_EPSILON || v.abs() <= GRAZE_EPSILON || w.abs() <= GRAZE_EPSILON {
        RayTriangleHit::Grazing { t }
    } else {
        RayTriangleHit::Hit { t }
    }
}

/// Intersects three planes, each given by a normal and a point on it.
///
/// # Errors
///
/// Returns [`GeometryError::SingularMatrix`] if the normals are linearly dependent.
pub fn intersect_three_planes(normals: [&Vector3; 3], points: [&Point3; 3]) -> Result<Point3> {
    let lhs = Matrix3::from_rows(&[
        normals[0].transpose(),
        normals[1].transpose(),
        normals[2].transpose(),
    ]);
    let rhs = Vector3::new(
        normals[0].dot(&points[0].coords),
        normals[1].dot(&points[1].coords),
        normals[2].dot(&points[2].coords),
    );

    if lhs.determinant().abs() < TOLERANCE {
        return Err(GeometryError::SingularMatrix.into());
    }
    let solution = lhs.lu().solve(&rhs).ok_or(GeometryError::SingularMatrix)?;
    Ok(Point3::from(solution))
}
