pub mod primitives;

pub use primitives::make_cuboid;

use crate::error::{GeometryError, Result};
use crate::math::{Matrix4, Point3, Vector3};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// The empty box, absorbing under [`Aabb::include`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Grows the box to contain `point`.
    pub fn include(&mut self, point: &Point3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Returns `true` if no point has been included yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Side lengths along X, Y and Z.
    #[must_use]
    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }
}

/// A mesh vertex and the faces that use it.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Position of the vertex.
    pub point: Point3,
    face_indices: Vec<usize>,
}

impl Vertex {
    /// Creates a vertex not yet used by any face.
    #[must_use]
    pub fn new(point: Point3) -> Self {
        Self {
            point,
            face_indices: Vec::new(),
        }
    }

    /// Indices of the faces referencing this vertex, in creation order.
    #[must_use]
    pub fn face_indices(&self) -> &[usize] {
        &self.face_indices
    }
}

/// A triangular face.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Outward normal as supplied by the importer. Not necessarily unit length.
    pub normal: Vector3,
    /// Indices of the three corners in the owning component.
    pub vertex_indices: [usize; 3],
}

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Component {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    index: Option<usize>,
    bounds: Option<Aabb>,
}

impl Component {
    /// Creates an empty component.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a vertex and returns its index.
    pub fn create_vertex(&mut self, point: Point3) -> usize {
        self.bounds.get_or_insert_with(Aabb::empty).include(&point);
        self.vertices.push(Vertex::new(point));
        self.vertices.len() - 1
    }

    /// Appends a face and registers it with its three vertices.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidFace`] if an index is out of range or
    /// the three indices are not distinct.
    pub fn create_face(&mut self, normal: Vector3, vertex_indices: [usize; 3]) -> Result<usize> {
        let [a, b, c] = vertex_indices;
        if a == b || b == c || a == c {
            return Err(GeometryError::InvalidFace(format!(
                "repeated vertex index in {vertex_indices:?}"
            ))
            .into());
        }
        if let Some(&bad) = vertex_indices.iter().find(|&&i| i >= self.vertices.len()) {
            return Err(GeometryError::InvalidFace(format!(
                "vertex index {bad} out of range for {} vertices",
                self.vertices.len()
            ))
            .into());
        }

        let face_index = self.faces.len();
        self.faces.push(Face {
            normal,
            vertex_indices,
        });
        for i in vertex_indices {
            self.vertices[i].face_indices.push(face_index);
        }
        Ok(face_index)
    }

    /// All vertices in creation order.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All faces in creation order.
    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Returns the position of vertex `vertex`, if it exists.
    #[must_use]
    pub fn coordinate(&self, vertex: usize) -> Option<&Point3> {
        self.vertices.get(vertex).map(|v| &v.point)
    }

    /// Positions of the three corners of `face`.
    #[must_use]
    pub fn face_corners(&self, face: &Face) -> [Point3; 3] {
        face.vertex_indices.map(|i| self.vertices[i].point)
    }

    /// Iterator over every vertex position.
    pub fn points(&self) -> impl Iterator<Item = &Point3> {
        self.vertices.iter().map(|v| &v.point)
    }

    /// Axis-aligned extents of the vertices, or `None` for an empty component.
    #[must_use]
    pub fn aabb(&self) -> Option<Aabb> {
        self.bounds
    }

    /// Position of this component in its structure, once added.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Returns a transformed copy.
    ///
    /// Points go through `transform`, normals through its inverse transpose.
    /// Column vector convention: `p' = M * p`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::SingularMatrix`] if `transform` has no inverse.
    pub fn transformed(&self, transform: &Matrix4) -> Result<Self> {
        let normal_transform = transform
            .try_inverse()
            .ok_or(GeometryError::SingularMatrix)?
            .transpose();

        let mut copy = self.clone();
        copy.bounds = None;
        for vertex in &mut copy.vertices {
            vertex.point = transform.transform_point(&vertex.point);
            copy.bounds.get_or_insert_with(Aabb::empty).include(&vertex.point);
        }
        for face in &mut copy.faces {
            let normal = normal_transform.transform_vector(&face.normal);
            let len = normal.norm();
            face.normal = if len > 0.0 { normal / len } else { normal };
        }
        Ok(copy)
    }
}

/// An ordered collection of components forming one model.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    components: Vec<Component>,
}

impl Structure {
    /// Creates an empty structure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a component, assigns its index and returns it.
    pub fn add_component(&mut self, mut component: Component) -> usize {
        let index = self.components.len();
        component.index = Some(index);
        self.components.push(component);
        index
    }

    /// Removes and returns the component at `index`, renumbering the rest.
    pub fn remove_component(&mut self, index: usize) -> Option<Component> {
        if index >= self.components.len() {
            return None;
        }
        let mut removed = self.components.remove(index);
        removed.index = None;
        for (i, component) in self.components.iter_mut().enumerate().skip(index) {
            component.index = Some(i);
        }
        Some(removed)
    }

    /// All components in order.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::VoxgraphError;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn triangle() -> Component {
        let mut component = Component::new();
        let a = component.create_vertex(p(0.0, 0.0, 0.0));
        let b = component.create_vertex(p(1.0, 0.0, 0.0));
        let c = component.create_vertex(p(0.0, 1.0, 0.0));
        component
            .create_face(Vector3::new(0.0, 0.0, 1.0), [a, b, c])
            .unwrap();
        component
    }

    #[test]
    fn faces_register_back_references() {
        let component = triangle();
        for vertex in component.vertices() {
            assert_eq!(vertex.face_indices(), &[0]);
        }
    }

    #[test]
    fn repeated_indices_are_rejected() {
        let mut component = triangle();
        let err = component
            .create_face(Vector3::new(0.0, 0.0, 1.0), [0, 1, 1])
            .unwrap_err();
        assert!(matches!(
            err,
            VoxgraphError::Geometry(GeometryError::InvalidFace(_))
        ));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut component = triangle();
        assert!(component
            .create_face(Vector3::new(0.0, 0.0, 1.0), [0, 1, 7])
            .is_err());
        assert_eq!(component.faces().len(), 1);
    }

    #[test]
    fn aabb_tracks_vertices() {
        let component = triangle();
        let aabb = component.aabb().unwrap();
        assert_eq!(aabb.min, p(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, p(1.0, 1.0, 0.0));
        assert!(Component::new().aabb().is_none());
    }

    #[test]
    fn transform_moves_points_and_rotates_normals() {
        let component = triangle();
        // Quarter turn about X, then shift along Y.
        let rotation = Matrix4::new_rotation(Vector3::new(std::f64::consts::FRAC_PI_2, 0.0, 0.0));
        let transform = Matrix4::new_translation(&Vector3::new(0.0, 5.0, 0.0)) * rotation;
        let moved = component.transformed(&transform).unwrap();

        let c = moved.coordinate(2).unwrap();
        assert_relative_eq!(c.y, 5.0, epsilon = 1e-12);
        assert_relative_eq!(c.z, 1.0, epsilon = 1e-12);

        let normal = moved.faces()[0].normal;
        assert_relative_eq!(normal.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(normal.z, 0.0, epsilon = 1e-12);

        // The input is untouched.
        assert_eq!(component.coordinate(2), Some(&p(0.0, 1.0, 0.0)));
    }

    #[test]
    fn singular_transform_is_rejected() {
        let err = triangle().transformed(&Matrix4::zeros()).unwrap_err();
        assert!(matches!(
            err,
            VoxgraphError::Geometry(GeometryError::SingularMatrix)
        ));
    }

    #[test]
    fn structure_assigns_and_renumbers_indices() {
        let mut structure = Structure::new();
        assert_eq!(structure.add_component(triangle()), 0);
        assert_eq!(structure.add_component(triangle()), 1);
        assert_eq!(structure.add_component(triangle()), 2);

        let removed = structure.remove_component(0).unwrap();
        assert_eq!(removed.index(), None);
        let indices: Vec<_> = structure.components().iter().map(Component::index).collect();
        assert_eq!(indices, vec![Some(0), Some(1)]);
        assert!(structure.remove_component(5).is_none());
    }
}
