//! The axis-aligned box primitive every box-shaped feature is built from.

use std::ops::Range;

use nalgebra::Point3;

use crate::error::{MeshResult, QrMeshError};
use crate::types::{Mesh, Vertex};

/// Triangle table for a box over vertices ordered
/// `[x0y0z0, x1y0z0, x1y1z0, x0y1z0, x0y0z1, x1y0z1, x1y1z1, x0y1z1]`.
/// CCW from outside: bottom faces down, top faces up, sides face outward.
const BOX_TRIANGLES: [[u32; 3]; 12] = [
    // bottom (-z)
    [0, 2, 1],
    [0, 3, 2],
    // top (+z)
    [4, 5, 6],
    [4, 6, 7],
    // front (-y)
    [0, 1, 5],
    [0, 5, 4],
    // back (+y)
    [3, 7, 6],
    [3, 6, 2],
    // left (-x)
    [0, 4, 7],
    [0, 7, 3],
    // right (+x)
    [1, 2, 6],
    [1, 6, 5],
];

fn box_corners(
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    z0: f64,
    z1: f64,
) -> MeshResult<[Point3<f64>; 8]> {
    if !(x1 > x0 && y1 > y0 && z1 > z0) {
        return Err(QrMeshError::degenerate_geometry(format!(
            "box extents must be positive: x [{:.3}, {:.3}], y [{:.3}, {:.3}], z [{:.3}, {:.3}]",
            x0, x1, y0, y1, z0, z1
        )));
    }
    Ok([
        Point3::new(x0, y0, z0),
        Point3::new(x1, y0, z0),
        Point3::new(x1, y1, z0),
        Point3::new(x0, y1, z0),
        Point3::new(x0, y0, z1),
        Point3::new(x1, y0, z1),
        Point3::new(x1, y1, z1),
        Point3::new(x0, y1, z1),
    ])
}

/// Generate a closed rectangular prism spanning `[x0, x1] x [y0, y1] x [z0, z1]`.
///
/// Returns 8 vertices and 12 triangles with outward-facing CCW winding.
/// Deterministic: identical arguments produce identical vectors. Fails with
/// [`QrMeshError::DegenerateGeometry`] when any extent is zero or negative.
///
/// # Example
///
/// ```
/// use qr_mesh::make_box;
///
/// let (vertices, triangles) = make_box(0.0, 0.0, 10.0, 10.0, 0.0, 2.0).unwrap();
/// assert_eq!(vertices.len(), 8);
/// assert_eq!(triangles.len(), 12);
/// ```
pub fn make_box(
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    z0: f64,
    z1: f64,
) -> MeshResult<(Vec<Vertex>, Vec<[u32; 3]>)> {
    let corners = box_corners(x0, y0, x1, y1, z0, z1)?;
    let vertices = corners.iter().map(|&p| Vertex::new(p)).collect();
    Ok((vertices, BOX_TRIANGLES.to_vec()))
}

/// Append a box to an existing mesh; returns the range of the 12 new faces.
pub(crate) fn append_box(
    mesh: &mut Mesh,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    z0: f64,
    z1: f64,
) -> MeshResult<Range<usize>> {
    let corners = box_corners(x0, y0, x1, y1, z0, z1)?;
    let base = mesh.vertices.len() as u32;
    let face_start = mesh.faces.len();

    mesh.vertices.extend(corners.iter().map(|&p| Vertex::new(p)));
    mesh.faces
        .extend(BOX_TRIANGLES.iter().map(|&[a, b, c]| [a + base, b + base, c + base]));

    Ok(face_start..face_start + 12)
}

/// Append a planar quad as two triangles `(0,1,3)`, `(1,2,3)`.
/// Corners must be listed CCW when viewed from the quad's outside.
pub(crate) fn append_quad(mesh: &mut Mesh, corners: [Point3<f64>; 4]) {
    let base = mesh.vertices.len() as u32;
    mesh.vertices.extend(corners.iter().map(|&p| Vertex::new(p)));
    mesh.faces.push([base, base + 1, base + 3]);
    mesh.faces.push([base + 1, base + 2, base + 3]);
}
