//! Core mesh data types.

use nalgebra::{Point3, Vector3};

/// RGB color with 8-bit components, used for per-component material mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl VertexColor {
    /// Create a new color from RGB components.
    #[inline]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: VertexColor = VertexColor {
        r: 255,
        g: 255,
        b: 255,
    };
    pub const BLACK: VertexColor = VertexColor { r: 0, g: 0, b: 0 };
}

/// A mesh vertex. Coordinates are in millimeters.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// 3D position.
    pub position: Point3<f64>,
}

impl Vertex {
    /// Create a new vertex at the given position.
    #[inline]
    pub fn new(position: Point3<f64>) -> Self {
        Self { position }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

/// A triangle mesh with indexed vertices and faces.
///
/// Each face is `[v0, v1, v2]` with counter-clockwise winding when viewed
/// from outside the solid; normals follow the right-hand rule. Coincident
/// duplicate vertices across adjacent faces are tolerated (the builders do
/// not deduplicate; see [`crate::validate`] for the welded-edge audit).
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Number of vertices in the mesh.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces (triangles) in the mesh.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has no usable geometry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Compute the axis-aligned bounding box.
    /// Returns `(min_corner, max_corner)`, or `None` if the mesh is empty.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?;
        let mut min = first.position;
        let mut max = first.position;

        for vertex in &self.vertices[1..] {
            let p = &vertex.position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some((min, max))
    }

    /// Iterate over faces, yielding [`Triangle`]s with concrete vertex positions.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize].position,
            v1: self.vertices[i1 as usize].position,
            v2: self.vertices[i2 as usize].position,
        })
    }

    /// Get a specific triangle by face index.
    pub fn triangle(&self, face_idx: usize) -> Option<Triangle> {
        self.faces.get(face_idx).map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize].position,
            v1: self.vertices[i1 as usize].position,
            v2: self.vertices[i2 as usize].position,
        })
    }

    /// Translate the whole mesh by the given vector.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.position += offset;
        }
    }

    /// Append another mesh, shifting its face indices past this mesh's
    /// vertices. Returns the face index at which the appended mesh starts.
    pub fn append(&mut self, other: &Mesh) -> usize {
        let vertex_offset = self.vertices.len() as u32;
        let face_start = self.faces.len();

        self.vertices.extend(other.vertices.iter().cloned());
        self.faces.extend(other.faces.iter().map(|&[a, b, c]| {
            [a + vertex_offset, b + vertex_offset, c + vertex_offset]
        }));

        face_start
    }

    /// Compute the signed volume of the mesh via the divergence theorem.
    ///
    /// For a closed mesh with outward-facing normals (CCW winding viewed from
    /// outside) the result is positive; an inside-out mesh yields a negative
    /// value. The result is only meaningful for closed meshes.
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;

        for &[i0, i1, i2] in &self.faces {
            let v0 = &self.vertices[i0 as usize].position;
            let v1 = &self.vertices[i1 as usize].position;
            let v2 = &self.vertices[i2 as usize].position;

            // Scalar triple product v0 . (v1 x v2), summed over faces, / 6.
            let cross = Vector3::new(
                v1.y * v2.z - v1.z * v2.y,
                v1.z * v2.x - v1.x * v2.z,
                v1.x * v2.y - v1.y * v2.x,
            );
            volume += v0.x * cross.x + v0.y * cross.y + v0.z * cross.z;
        }

        volume / 6.0
    }

    /// Absolute enclosed volume, regardless of orientation.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Check whether the mesh appears inside-out (negative signed volume).
    #[inline]
    pub fn is_inside_out(&self) -> bool {
        self.signed_volume() < 0.0
    }

    /// Total surface area of all triangles.
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|tri| tri.area()).sum()
    }
}

/// A triangle with concrete vertex positions, for geometric calculations.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// The (unnormalized) face normal via cross product; direction follows
    /// the right-hand rule with CCW winding.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }

    /// The unit face normal, or `None` for degenerate (zero-area) triangles.
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len_sq = n.norm_squared();
        if len_sq > f64::EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Triangle area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Centroid (center of mass).
    #[inline]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::new(
            (self.v0.x + self.v1.x + self.v2.x) / 3.0,
            (self.v0.y + self.v1.y + self.v2.y) / 3.0,
            (self.v0.z + self.v1.z + self.v2.z) / 3.0,
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    /// Unit cube with outward CCW winding, the canonical closed test mesh.
    pub(crate) fn unit_cube() -> Mesh {
        let mut mesh = Mesh::new();

        for &(x, y, z) in &[
            (0.0, 0.0, 0.0),
            (1.0, 0.0, 0.0),
            (1.0, 1.0, 0.0),
            (0.0, 1.0, 0.0),
            (0.0, 0.0, 1.0),
            (1.0, 0.0, 1.0),
            (1.0, 1.0, 1.0),
            (0.0, 1.0, 1.0),
        ] {
            mesh.vertices.push(Vertex::from_coords(x, y, z));
        }

        let faces: [[u32; 3]; 12] = [
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        mesh.faces.extend_from_slice(&faces);

        mesh
    }

    #[test]
    fn test_triangle_normal_points_up() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let n = tri.normal().expect("non-degenerate");
        assert!(approx_eq(n.x, 0.0) && approx_eq(n.y, 0.0) && approx_eq(n.z, 1.0));
    }

    #[test]
    fn test_triangle_area_and_centroid() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
        );
        assert!(approx_eq(tri.area(), 4.5));
        let c = tri.centroid();
        assert!(approx_eq(c.x, 1.0) && approx_eq(c.y, 1.0));
    }

    #[test]
    fn test_degenerate_triangle_has_no_normal() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!(tri.normal().is_none());
    }

    #[test]
    fn test_bounds() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(-2.0, 1.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(5.0, -3.0, 4.0));

        let (min, max) = mesh.bounds().expect("non-empty");
        assert!(approx_eq(min.x, -2.0) && approx_eq(min.y, -3.0) && approx_eq(min.z, 0.0));
        assert!(approx_eq(max.x, 5.0) && approx_eq(max.y, 1.0) && approx_eq(max.z, 4.0));
    }

    #[test]
    fn test_empty_mesh_bounds() {
        assert!(Mesh::new().bounds().is_none());
    }

    #[test]
    fn test_cube_signed_volume() {
        let cube = unit_cube();
        assert!(approx_eq(cube.signed_volume(), 1.0));
        assert!(!cube.is_inside_out());
    }

    #[test]
    fn test_inverted_cube_signed_volume() {
        let mut cube = unit_cube();
        for face in &mut cube.faces {
            face.swap(1, 2);
        }
        assert!(approx_eq(cube.signed_volume(), -1.0));
        assert!(cube.is_inside_out());
    }

    #[test]
    fn test_cube_surface_area() {
        assert!(approx_eq(unit_cube().surface_area(), 6.0));
    }

    #[test]
    fn test_translate_preserves_volume() {
        let mut cube = unit_cube();
        cube.translate(Vector3::new(12.0, -7.0, 30.0));
        assert!(approx_eq(cube.signed_volume(), 1.0));
    }

    #[test]
    fn test_append_offsets_indices() {
        let mut mesh = unit_cube();
        let other = unit_cube();
        let face_start = mesh.append(&other);

        assert_eq!(face_start, 12);
        assert_eq!(mesh.face_count(), 24);
        assert_eq!(mesh.vertex_count(), 16);
        // Appended faces must reference the appended vertex block.
        for face in &mesh.faces[12..] {
            assert!(face.iter().all(|&i| i >= 8));
        }
        // Two unit cubes at the same place: signed volumes add up.
        assert!(approx_eq(mesh.signed_volume(), 2.0));
    }
}
