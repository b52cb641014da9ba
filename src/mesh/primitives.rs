use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3};

use super::Component;

/// Corner quads of a cuboid as `(corner bits, outward normal)`.
///
/// A corner is encoded as `x | y << 1 | z << 2`, each bit choosing the
/// min (0) or max (1) coordinate on that axis.
const CUBOID_QUADS: [([usize; 4], [f64; 3]); 6] = [
    ([0b000, 0b100, 0b110, 0b010], [-1.0, 0.0, 0.0]),
    ([0b001, 0b011, 0b111, 0b101], [1.0, 0.0, 0.0]),
    ([0b000, 0b001, 0b101, 0b100], [0.0, -1.0, 0.0]),
    ([0b010, 0b110, 0b111, 0b011], [0.0, 1.0, 0.0]),
    ([0b000, 0b010, 0b011, 0b001], [0.0, 0.0, -1.0]),
    ([0b100, 0b101, 0b111, 0b110], [0.0, 0.0, 1.0]),
];

/// Builds an axis-aligned cuboid with 8 vertices and 12 outward-facing triangles.
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] if `max` does not exceed `min` on
/// every axis.
pub fn make_cuboid(min: Point3, max: Point3) -> Result<Component> {
    let extents = max - min;
    if extents.iter().any(|&e| e.is_nan() || e <= 0.0) {
        return Err(GeometryError::Degenerate(format!(
            "cuboid extents {:?} must be positive",
            extents.as_slice()
        ))
        .into());
    }

    let mut component = Component::new();
    for bits in 0..8_usize {
        let pick = |bit: usize, lo: f64, hi: f64| if bits & bit == 0 { lo } else { hi };
        component.create_vertex(Point3::new(
            pick(0b001, min.x, max.x),
            pick(0b010, min.y, max.y),
            pick(0b100, min.z, max.z),
        ));
    }

    for ([a, b, c, d], normal) in CUBOID_QUADS {
        let normal = Vector3::from(normal);
        component.create_face(normal, [a, b, c])?;
        component.create_face(normal, [a, c, d])?;
    }
    Ok(component)
}
