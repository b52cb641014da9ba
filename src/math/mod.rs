pub mod intersect_3d;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 matrix type.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Absolute per-component tolerance under which two coordinates are the same point.
pub const COORD_EPSILON: f64 = 5e-7;

/// World right (+X).
pub const RIGHT: Vector3 = Vector3::new(1.0, 0.0, 0.0);

/// World up (+Y). The vertical axis of the whole pipeline.
pub const UP: Vector3 = Vector3::new(0.0, 1.0, 0.0);

/// World forward (+Z).
pub const FORWARD: Vector3 = Vector3::new(0.0, 0.0, 1.0);

/// Returns `true` if `a` and `b` differ by less than [`COORD_EPSILON`].
#[must_use]
#[allow(clippy::float_cmp)]
pub fn nearly_equal(a: f64, b: f64) -> bool {
    // Exact equality also covers matching infinities.
    if a == b {
        return true;
    }
    (a - b).abs() < COORD_EPSILON
}

/// Epsilon-tolerant point equality. This, not identity, defines "same point".
#[must_use]
pub fn points_coincide(a: &Point3, b: &Point3) -> bool {
    nearly_equal(a.x, b.x) && nearly_equal(a.y, b.y) && nearly_equal(a.z, b.z)
}

/// Returns `true` if every component of `v` is within [`COORD_EPSILON`] of zero.
#[must_use]
pub fn is_zero_vector(v: &Vector3) -> bool {
    nearly_equal(v.x, 0.0) && nearly_equal(v.y, 0.0) && nearly_equal(v.z, 0.0)
}

/// Closest point to `point` on the segment `start..end`.
#[must_use]
pub fn closest_point_on_segment(start: &Point3, end: &Point3, point: &Point3) -> Point3 {
    let segment = end - start;
    let len_sq = segment.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return *start;
    }
    let t = ((point - start).dot(&segment) / len_sq).clamp(0.0, 1.0);
    start + segment * t
}

/// Shortest distance from `point` to the segment `start..end`.
#[must_use]
pub fn distance_to_segment(start: &Point3, end: &Point3, point: &Point3) -> f64 {
    (point - closest_point_on_segment(start, end, point)).norm()
}

/// Rounds to the nearest integer, ties to even.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn round_to_index(value: f64) -> i64 {
    value.round_ties_even() as i64
}
