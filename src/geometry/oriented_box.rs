use crate::error::{GeometryError, Result};
use crate::math::intersect_3d::intersect_three_planes;
use crate::math::{Matrix3, Point3, Vector3, COORD_EPSILON, FORWARD, RIGHT, TOLERANCE, UP};
use crate::mesh::{Component, Structure};

/// A candidate supporting plane: a point on it and its normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportPlane {
    pub point: Point3,
    pub normal: Vector3,
}

impl SupportPlane {
    #[must_use]
    pub fn new(point: Point3, normal: Vector3) -> Self {
        Self { point, normal }
    }
}

/// Optional fixed directions for the three box planes.
///
/// A pinned direction skips the span minimization for that plane.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisPins {
    pub first: Option<Vector3>,
    pub second: Option<Vector3>,
    pub third: Option<Vector3>,
}

impl AxisPins {
    /// No pinned directions.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Pins the world axes, giving an axis-aligned box.
    #[must_use]
    pub fn world() -> Self {
        Self {
            first: Some(RIGHT),
            second: Some(UP),
            third: Some(FORWARD),
        }
    }
}

/// One of the six bounding planes, oriented outward.
#[derive(Debug, Clone, Copy)]
struct BoundPlane {
    normal: Vector3,
    point: Point3,
}

impl BoundPlane {
    fn signed_distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&(p - self.point))
    }
}

/// An enclosing box fitted to a point set, with its own local frame.
///
/// The three plane directions are searched for, not assumed: the first is
/// the candidate normal with the smallest span of the points, the second the
/// smallest-span candidate orthogonal to it, the third their cross product.
/// The box faces are then labelled left, down and back by how closely their
/// outward normals follow world -X, -Y and -Z.
#[derive(Debug, Clone)]
pub struct OrientedBoundingBox {
    origin: Point3,
    max_x: Point3,
    max_y: Point3,
    max_z: Point3,
    max_xy: Point3,
    max_xz: Point3,
    max_yz: Point3,
    max_xyz: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
    z_axis: Vector3,
    /// Outward planes in the order left, down, back, right, up, front.
    faces: [BoundPlane; 6],
    transform: Matrix3,
    inverse: Matrix3,
    normal_transform: Matrix3,
}

impl OrientedBoundingBox {
    /// Fits a box to `points`, searching the plane directions among `candidates`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::EmptyInput`] if `points` is empty,
    /// [`GeometryError::ZeroVector`] for a zero pinned direction,
    /// [`GeometryError::Degenerate`] if no candidate plane resolves a needed
    /// direction, and [`GeometryError::SingularMatrix`] if the planes do not
    /// bound a box.
    pub fn from_planes(
        points: &[Point3],
        candidates: &[SupportPlane],
        pins: &AxisPins,
    ) -> Result<Self> {
        if points.is_empty() {
            return Err(GeometryError::EmptyInput("oriented box needs at least one point".into()).into());
        }

        let n1 = match pins.first {
            Some(pin) => unit(&pin)?,
            None => flattest_direction(
                points,
                candidates.iter().filter_map(|c| {
                    let len = c.normal.norm();
                    (len > TOLERANCE).then(|| c.normal / len)
                }),
            )
            .ok_or_else(|| GeometryError::Degenerate("no usable candidate plane".into()))?,
        };

        let n2 = match pins.second {
            Some(pin) => Some(unit(&pin)?),
            None => flattest_direction(
                points,
                candidates.iter().filter_map(|c| {
                    let orthogonal = c.normal - n1 * c.normal.dot(&n1);
                    let len = orthogonal.norm();
                    (len > TOLERANCE).then(|| orthogonal / len)
                }),
            ),
        };

        let (n2, n3) = match (n2, pins.third) {
            (Some(n2), Some(pin)) => (n2, unit(&pin)?),
            (Some(n2), None) => (n2, unit(&n1.cross(&n2)).map_err(|_| {
                GeometryError::Degenerate("first and second plane directions are parallel".into())
            })?),
            (None, Some(pin)) => {
                let n3 = unit(&pin)?;
                (unit(&n3.cross(&n1))?, n3)
            }
            // Coplanar input: any two directions spanning the plane orthogonal to n1.
            (None, None) => normal_plane(&n1),
        };

        Self::from_directions(points, [n1, n2, n3])
    }

    /// Fits a box to a component, one candidate plane per face.
    ///
    /// # Errors
    ///
    /// See [`OrientedBoundingBox::from_planes`].
    pub fn from_component(component: &Component, pins: &AxisPins) -> Result<Self> {
        let points: Vec<Point3> = component.points().copied().collect();
        let candidates = component_candidates(component);
        Self::from_planes(&points, &candidates, pins)
    }

    /// Fits one box around every component of a structure.
    ///
    /// # Errors
    ///
    /// See [`OrientedBoundingBox::from_planes`].
    pub fn from_structure(structure: &Structure, pins: &AxisPins) -> Result<Self> {
        let mut points = Vec::new();
        let mut candidates = Vec::new();
        for component in structure.components() {
            points.extend(component.points().copied());
            candidates.extend(component_candidates(component));
        }
        Self::from_planes(&points, &candidates, pins)
    }

    fn from_directions(points: &[Point3], directions: [Vector3; 3]) -> Result<Self> {
        // Signed planes keyed 1, 2, 3, -1, -2, -3, scanned in that order.
        let extremes = directions.map(|n| extreme_points(points, &n));
        let mut signed = Vec::with_capacity(6);
        for (k, (n, (_, far))) in (1_i8..).zip(directions.iter().zip(&extremes)) {
            signed.push((k, BoundPlane { normal: *n, point: *far }));
        }
        for (k, (n, (near, _))) in (1_i8..).zip(directions.iter().zip(&extremes)) {
            signed.push((-k, BoundPlane { normal: -n, point: *near }));
        }

        let left = take_most_aligned(&mut signed, &-RIGHT);
        let down = take_most_aligned(&mut signed, &-UP);
        let back = take_most_aligned(&mut signed, &-FORWARD);
        let (Some(left), Some(down), Some(back)) = (left, down, back) else {
            return Err(GeometryError::Degenerate("box planes could not be labelled".into()).into());
        };
        let right = left.0;
        let up = down.0;
        let front = back.0;
        let (left, down, back) = (left.1, down.1, back.1);

        let meet = |a: &BoundPlane, b: &BoundPlane, c: &BoundPlane| {
            intersect_three_planes([&a.normal, &b.normal, &c.normal], [&a.point, &b.point, &c.point])
        };
        let origin = meet(&left, &down, &back)?;
        let max_x = meet(&right, &down, &back)?;
        let max_y = meet(&left, &up, &back)?;
        let max_z = meet(&left, &down, &front)?;

        let y = max_y - origin;
        let z = max_z - origin;
        let max_xz = max_x + z;
        let max_xy = max_x + y;
        let max_yz = max_z + y;
        let max_xyz = max_xz + y;

        // Edge directions come from the face planes so that flat boxes keep a frame.
        let x_axis = edge_direction(&down.normal, &back.normal, &-left.normal)?;
        let y_axis = edge_direction(&left.normal, &back.normal, &-down.normal)?;
        let z_axis = edge_direction(&left.normal, &down.normal, &-back.normal)?;

        let transform = Matrix3::from_rows(&[x_axis.transpose(), y_axis.transpose(), z_axis.transpose()]);
        if transform.determinant().abs() < TOLERANCE {
            return Err(GeometryError::SingularMatrix.into());
        }
        let inverse = transform.try_inverse().ok_or(GeometryError::SingularMatrix)?;
        let normal_transform = inverse.transpose();

        Ok(Self {
            origin,
            max_x,
            max_y,
            max_z,
            max_xy,
            max_xz,
            max_yz,
            max_xyz,
            x_axis,
            y_axis,
            z_axis,
            faces: [left, down, back, right, up, front],
            transform,
            inverse,
            normal_transform,
        })
    }

    /// The left-down-back corner.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// The corner opposite [`origin`](Self::origin).
    #[must_use]
    pub fn max_xyz(&self) -> &Point3 {
        &self.max_xyz
    }

    /// All eight corners: origin, X, Y, Z, XY, XZ, YZ, XYZ.
    #[must_use]
    pub fn corners(&self) -> [Point3; 8] {
        [
            self.origin,
            self.max_x,
            self.max_y,
            self.max_z,
            self.max_xy,
            self.max_xz,
            self.max_yz,
            self.max_xyz,
        ]
    }

    /// Unit local axes X, Y and Z.
    #[must_use]
    pub fn axes(&self) -> [Vector3; 3] {
        [self.x_axis, self.y_axis, self.z_axis]
    }

    #[must_use]
    pub fn x_axis(&self) -> &Vector3 {
        &self.x_axis
    }

    #[must_use]
    pub fn y_axis(&self) -> &Vector3 {
        &self.y_axis
    }

    #[must_use]
    pub fn z_axis(&self) -> &Vector3 {
        &self.z_axis
    }

    /// Edge lengths along local X, Y and Z.
    #[must_use]
    pub fn side_lengths(&self) -> [f64; 3] {
        [
            (self.max_x - self.origin).norm(),
            (self.max_y - self.origin).norm(),
            (self.max_z - self.origin).norm(),
        ]
    }

    #[must_use]
    pub fn shortest_side(&self) -> f64 {
        self.side_lengths().into_iter().fold(f64::INFINITY, f64::min)
    }

    /// Average of the eight corners.
    #[must_use]
    pub fn centre(&self) -> Point3 {
        let sum = self
            .corners()
            .iter()
            .fold(Vector3::zeros(), |acc, c| acc + c.coords);
        Point3::from(sum / 8.0)
    }

    /// Expresses a world point in the box's local basis.
    #[must_use]
    pub fn local_coordinate(&self, global: &Point3) -> Point3 {
        Point3::from(self.transform * global.coords)
    }

    /// Inverse of [`local_coordinate`](Self::local_coordinate).
    #[must_use]
    pub fn global_coordinate(&self, local: &Point3) -> Point3 {
        Point3::from(self.inverse * local.coords)
    }

    /// Expresses a world direction in the box's local basis.
    #[must_use]
    pub fn local_vector(&self, global: &Vector3) -> Vector3 {
        self.transform * global
    }

    /// Transforms a surface normal into the local basis.
    #[must_use]
    pub fn local_normal(&self, normal: &Vector3) -> Vector3 {
        self.normal_transform * normal
    }

    /// Returns `true` if `point` lies inside all six faces, allowing it to poke
    /// out by `expansion_factor` times the box diagonal.
    #[must_use]
    pub fn contains_global_coordinate(&self, point: &Point3, expansion_factor: f64) -> bool {
        let permissible = (self.origin - self.max_xyz).norm() * expansion_factor + COORD_EPSILON;
        self.faces
            .iter()
            .all(|face| face.signed_distance(point) <= permissible)
    }
}

fn component_candidates(component: &Component) -> Vec<SupportPlane> {
    component
        .faces()
        .iter()
        .map(|face| SupportPlane::new(component.face_corners(face)[0], face.normal))
        .collect()
}

fn unit(v: &Vector3) -> Result<Vector3> {
    let len = v.norm();
    if len < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    Ok(v / len)
}

/// Spanning directions of the plane orthogonal to `normal`.
fn normal_plane(normal: &Vector3) -> (Vector3, Vector3) {
    let reference = if normal.x.abs() < 0.9 { RIGHT } else { UP };
    let u = normal.cross(&reference).normalize();
    let v = normal.cross(&u);
    (u, v)
}

/// Minimum and maximum projections of `points` on `direction`, as the
/// points realizing them.
fn extreme_points(points: &[Point3], direction: &Vector3) -> (Point3, Point3) {
    let mut near = (f64::INFINITY, points[0]);
    let mut far = (f64::NEG_INFINITY, points[0]);
    for p in points {
        let d = direction.dot(&p.coords);
        if d < near.0 {
            near = (d, *p);
        }
        if d > far.0 {
            far = (d, *p);
        }
    }
    (near.1, far.1)
}

fn span(points: &[Point3], direction: &Vector3) -> f64 {
    let (near, far) = extreme_points(points, direction);
    direction.dot(&(far - near))
}

/// Candidate direction with the smallest span. The first candidate wins ties.
fn flattest_direction(
    points: &[Point3],
    candidates: impl Iterator<Item = Vector3>,
) -> Option<Vector3> {
    let mut best: Option<(f64, Vector3)> = None;
    for direction in candidates {
        let s = span(points, &direction);
        if best.is_none_or(|(b, _)| s < b) {
            best = Some((s, direction));
        }
    }
    best.map(|(_, d)| d)
}

/// Removes the plane whose normal best follows `target` together with its
/// opposite, returning `(opposite, plane)`.
fn take_most_aligned(
    planes: &mut Vec<(i8, BoundPlane)>,
    target: &Vector3,
) -> Option<(BoundPlane, BoundPlane)> {
    let mut best: Option<(f64, i8)> = None;
    for (k, plane) in planes.iter() {
        let alignment = plane.normal.dot(target);
        if best.is_none_or(|(b, _)| alignment > b) {
            best = Some((alignment, *k));
        }
    }
    let (_, chosen) = best?;
    let plane = planes.iter().find(|(k, _)| *k == chosen)?.1;
    let opposite = planes.iter().find(|(k, _)| *k == -chosen)?.1;
    planes.retain(|(k, _)| k.abs() != chosen.abs());
    Some((opposite, plane))
}

/// Direction of the line where planes `a` and `b` meet, pointing along `towards`.
fn edge_direction(a: &Vector3, b: &Vector3, towards: &Vector3) -> Result<Vector3> {
    let dir = unit(&a.cross(b)).map_err(|_| GeometryError::SingularMatrix)?;
    Ok(if dir.dot(towards) < 0.0 { -dir } else { dir })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mesh::make_cuboid;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn rotated_cuboid() -> Component {
        let cube = make_cuboid(p(-1.0, -2.0, -0.5), p(1.0, 2.0, 0.5)).unwrap();
        let rotation = crate::math::Matrix4::new_rotation(Vector3::new(0.3, 0.5, -0.2));
        cube.transformed(&rotation).unwrap()
    }

    // ── fitting ──

    #[test]
    fn axis_aligned_cuboid_box_matches_extents() {
        let cube = make_cuboid(p(1.0, 2.0, 3.0), p(4.0, 6.0, 8.0)).unwrap();
        let obb = OrientedBoundingBox::from_component(&cube, &AxisPins::none()).unwrap();

        assert_relative_eq!(obb.origin().coords, p(1.0, 2.0, 3.0).coords, epsilon = 1e-9);
        assert_relative_eq!(obb.max_xyz().coords, p(4.0, 6.0, 8.0).coords, epsilon = 1e-9);
        let sides = obb.side_lengths();
        assert_relative_eq!(sides[0], 3.0, epsilon = 1e-9);
        assert_relative_eq!(sides[1], 4.0, epsilon = 1e-9);
        assert_relative_eq!(sides[2], 5.0, epsilon = 1e-9);
        assert_relative_eq!(obb.shortest_side(), 3.0, epsilon = 1e-9);
        assert_relative_eq!(obb.centre().coords, p(2.5, 4.0, 5.5).coords, epsilon = 1e-9);
    }

    #[test]
    fn rotated_cuboid_box_is_tight() {
        let obb = OrientedBoundingBox::from_component(&rotated_cuboid(), &AxisPins::none()).unwrap();
        let mut sides = obb.side_lengths();
        sides.sort_by(f64::total_cmp);
        assert_relative_eq!(sides[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(sides[1], 2.0, epsilon = 1e-9);
        assert_relative_eq!(sides[2], 4.0, epsilon = 1e-9);
    }

    #[test]
    fn box_contains_every_input_point() {
        let component = rotated_cuboid();
        let obb = OrientedBoundingBox::from_component(&component, &AxisPins::none()).unwrap();
        for point in component.points() {
            assert!(obb.contains_global_coordinate(point, 0.0));
        }
        assert!(obb.contains_global_coordinate(&obb.centre(), 0.0));
        assert!(!obb.contains_global_coordinate(&p(10.0, 0.0, 0.0), 0.0));
    }

    #[test]
    fn corners_lie_on_the_boundary() {
        let obb = OrientedBoundingBox::from_component(&rotated_cuboid(), &AxisPins::none()).unwrap();
        for corner in obb.corners() {
            assert!(obb.contains_global_coordinate(&corner, 0.0));
            let on_faces = obb
                .faces
                .iter()
                .filter(|face| face.signed_distance(&corner).abs() < 1e-9)
                .count();
            assert_eq!(on_faces, 3);
        }
    }

    #[test]
    fn expansion_tolerates_small_escape() {
        let cube = make_cuboid(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).unwrap();
        let obb = OrientedBoundingBox::from_component(&cube, &AxisPins::none()).unwrap();
        let outside = p(1.05, 0.5, 0.5);
        assert!(!obb.contains_global_coordinate(&outside, 0.0));
        assert!(obb.contains_global_coordinate(&outside, 0.05));
    }

    #[test]
    fn faces_are_labelled_by_world_direction() {
        let obb = OrientedBoundingBox::from_component(&rotated_cuboid(), &AxisPins::none()).unwrap();
        // The left face points roughly along -X, so local X runs roughly along +X.
        assert!(obb.x_axis().dot(&RIGHT) > 0.0);
        assert!(obb.y_axis().dot(&UP) > 0.0);
        assert!(obb.z_axis().dot(&FORWARD) > 0.0);
    }

    // ── coordinate conversions ──

    #[test]
    fn local_global_round_trip() {
        let obb = OrientedBoundingBox::from_component(&rotated_cuboid(), &AxisPins::none()).unwrap();
        for point in [p(0.0, 0.0, 0.0), p(3.5, -2.0, 7.25), p(-100.0, 40.0, 1e-3)] {
            let back = obb.global_coordinate(&obb.local_coordinate(&point));
            assert_relative_eq!(back.coords, point.coords, epsilon = 1e-9);
        }
    }

    #[test]
    fn local_normal_of_orthonormal_frame_matches_vector_transform() {
        let obb = OrientedBoundingBox::from_component(&rotated_cuboid(), &AxisPins::none()).unwrap();
        let n = Vector3::new(0.2, -0.4, 0.9);
        assert_relative_eq!(obb.local_normal(&n), obb.local_vector(&n), epsilon = 1e-9);
    }

    // ── pins and degenerate input ──

    #[test]
    fn world_pins_give_axis_aligned_box() {
        let component = rotated_cuboid();
        let obb = OrientedBoundingBox::from_component(&component, &AxisPins::world()).unwrap();
        let aabb = component.aabb().unwrap();
        assert_relative_eq!(obb.origin().coords, aabb.min.coords, epsilon = 1e-9);
        assert_relative_eq!(obb.max_xyz().coords, aabb.max.coords, epsilon = 1e-9);
        assert_relative_eq!(*obb.y_axis(), UP, epsilon = 1e-12);
    }

    #[test]
    fn structure_box_covers_all_components() {
        let mut structure = Structure::new();
        structure.add_component(make_cuboid(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).unwrap());
        structure.add_component(make_cuboid(p(3.0, 0.0, 0.0), p(4.0, 2.0, 1.0)).unwrap());
        let obb = OrientedBoundingBox::from_structure(&structure, &AxisPins::world()).unwrap();
        assert_relative_eq!(obb.max_xyz().coords, p(4.0, 2.0, 1.0).coords, epsilon = 1e-9);
    }

    #[test]
    fn coplanar_points_give_flat_box() {
        let mut square = Component::new();
        let a = square.create_vertex(p(0.0, 0.0, 0.0));
        let b = square.create_vertex(p(2.0, 0.0, 0.0));
        let c = square.create_vertex(p(2.0, 0.0, 3.0));
        let d = square.create_vertex(p(0.0, 0.0, 3.0));
        square.create_face(UP, [a, c, b]).unwrap();
        square.create_face(UP, [a, d, c]).unwrap();

        let obb = OrientedBoundingBox::from_component(&square, &AxisPins::none()).unwrap();
        assert_relative_eq!(obb.shortest_side(), 0.0, epsilon = 1e-9);
        for point in square.points() {
            assert!(obb.contains_global_coordinate(point, 0.0));
        }
    }

    #[test]
    fn empty_point_set_is_rejected() {
        let err = OrientedBoundingBox::from_planes(&[], &[], &AxisPins::none()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::VoxgraphError::Geometry(GeometryError::EmptyInput(_))
        ));
    }

    #[test]
    fn zero_normals_only_is_degenerate() {
        let points = [p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)];
        let candidates = [SupportPlane::new(points[0], Vector3::zeros())];
        let err = OrientedBoundingBox::from_planes(&points, &candidates, &AxisPins::none()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::VoxgraphError::Geometry(GeometryError::Degenerate(_))
        ));
    }

    #[test]
    fn zero_pin_is_rejected() {
        let pins = AxisPins {
            first: Some(Vector3::zeros()),
            ..AxisPins::none()
        };
        let points = [p(0.0, 0.0, 0.0)];
        assert!(OrientedBoundingBox::from_planes(&points, &[], &pins).is_err());
    }
}
