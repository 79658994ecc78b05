//! Keychain mount synthesis: a tab with a circular through-hole.
//!
//! The tab is a thin box adjoining one edge of the base footprint, centered
//! along that edge. The hole is bored by two vertex rings (top and bottom
//! cap) joined by an inner wall band whose normals face the hole axis, i.e.
//! away from the tab's material. The top and bottom faces are annuli
//! stitched between the ring and the tab's rectangle by an angular merge
//! walk, so the segment count is free (at 8 segments the mount is exactly
//! 48 triangles).

use std::f64::consts::TAU;

use tracing::info;

use crate::component::{ComponentTag, TriangleComponentMap};
use crate::error::{MeshResult, QrMeshError};
use crate::types::{Mesh, Vertex};

/// Which edge of the base footprint the tab adjoins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorEdge {
    /// The far +Y edge (image top after row flipping).
    Top,
    /// The -Y edge.
    Bottom,
    /// The -X edge.
    Left,
    /// The +X edge.
    Right,
}

/// Parameters for a keychain mount. Immutable once constructed; millimeters.
#[derive(Debug, Clone, PartialEq)]
pub struct MountSpec {
    /// Edge of the footprint the tab is centered on.
    pub anchor: AnchorEdge,
    /// Diameter of the through-hole.
    pub hole_diameter: f64,
    /// Tab extent along the anchored edge.
    pub tab_width: f64,
    /// How far the tab protrudes from the footprint.
    pub tab_height: f64,
    /// Tab thickness (Z extent).
    pub tab_thickness: f64,
    /// Hole wall segments; at least 8 to avoid a visibly faceted hole.
    pub segments: usize,
}

impl Default for MountSpec {
    fn default() -> Self {
        Self {
            anchor: AnchorEdge::Top,
            hole_diameter: 4.0,
            tab_width: 15.0,
            tab_height: 10.0,
            tab_thickness: 2.0,
            segments: 8,
        }
    }
}

/// Build the keychain mount for a base footprint of `footprint_width` x
/// `footprint_depth` millimeters. All triangles are tagged
/// [`ComponentTag::Mount`].
///
/// Fails with [`QrMeshError::InvalidMount`] when the hole would breach the
/// tab walls (`hole_diameter >= min(tab_width, tab_height)`) or the segment
/// count is below 8, and with [`QrMeshError::DegenerateGeometry`] when any
/// dimension is not strictly positive.
///
/// # Example
///
/// ```
/// use qr_mesh::{build_keychain_mount, MountSpec};
///
/// let (mesh, map) = build_keychain_mount(&MountSpec::default(), 50.0, 50.0).unwrap();
/// assert_eq!(mesh.face_count(), 48); // 8-segment mount
/// assert_eq!(map.span_count(), 1);
/// ```
pub fn build_keychain_mount(
    spec: &MountSpec,
    footprint_width: f64,
    footprint_depth: f64,
) -> MeshResult<(Mesh, TriangleComponentMap)> {
    if footprint_width <= 0.0 || footprint_depth <= 0.0 {
        return Err(QrMeshError::degenerate_geometry(format!(
            "mount footprint must be positive, got {:.3} x {:.3}",
            footprint_width, footprint_depth
        )));
    }
    if spec.tab_width <= 0.0 || spec.tab_height <= 0.0 || spec.tab_thickness <= 0.0 {
        return Err(QrMeshError::degenerate_geometry(format!(
            "tab dimensions must be positive, got {:.3} x {:.3} x {:.3}",
            spec.tab_width, spec.tab_height, spec.tab_thickness
        )));
    }
    if spec.hole_diameter <= 0.0 {
        return Err(QrMeshError::degenerate_geometry(format!(
            "hole diameter must be positive, got {:.3}",
            spec.hole_diameter
        )));
    }
    if spec.segments < 8 {
        return Err(QrMeshError::invalid_mount(format!(
            "hole wall needs at least 8 segments, got {}",
            spec.segments
        )));
    }
    let shorter_side = spec.tab_width.min(spec.tab_height);
    if spec.hole_diameter >= shorter_side {
        return Err(QrMeshError::invalid_mount(format!(
            "hole diameter {:.1}mm would breach the tab (shorter side {:.1}mm)",
            spec.hole_diameter, shorter_side
        )));
    }

    // Tab rectangle, centered along the anchored edge. For Left/Right the
    // tab width runs along Y and the tab protrudes along X.
    let (x0, x1, y0, y1) = match spec.anchor {
        AnchorEdge::Top => {
            let x0 = (footprint_width - spec.tab_width) / 2.0;
            (x0, x0 + spec.tab_width, footprint_depth, footprint_depth + spec.tab_height)
        }
        AnchorEdge::Bottom => {
            let x0 = (footprint_width - spec.tab_width) / 2.0;
            (x0, x0 + spec.tab_width, -spec.tab_height, 0.0)
        }
        AnchorEdge::Left => {
            let y0 = (footprint_depth - spec.tab_width) / 2.0;
            (-spec.tab_height, 0.0, y0, y0 + spec.tab_width)
        }
        AnchorEdge::Right => {
            let y0 = (footprint_depth - spec.tab_width) / 2.0;
            (footprint_width, footprint_width + spec.tab_height, y0, y0 + spec.tab_width)
        }
    };

    let thickness = spec.tab_thickness;
    let (hx, hy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
    let radius = spec.hole_diameter / 2.0;
    let n = spec.segments;

    let mut mesh = Mesh::with_capacity(8 + 2 * n, 4 * n + 16);

    // 0..4 bottom corners, 4..8 top corners, both CCW viewed from above.
    for &z in &[0.0, thickness] {
        mesh.vertices.push(Vertex::from_coords(x0, y0, z));
        mesh.vertices.push(Vertex::from_coords(x1, y0, z));
        mesh.vertices.push(Vertex::from_coords(x1, y1, z));
        mesh.vertices.push(Vertex::from_coords(x0, y1, z));
    }

    // Hole rings, CCW viewed from above; vertex i sits at angle i * TAU/n.
    let ring_top: Vec<u32> = (0..n)
        .map(|i| {
            let a = TAU * i as f64 / n as f64;
            let idx = mesh.vertices.len() as u32;
            mesh.vertices.push(Vertex::from_coords(
                hx + radius * a.cos(),
                hy + radius * a.sin(),
                thickness,
            ));
            idx
        })
        .collect();
    let ring_bottom: Vec<u32> = (0..n)
        .map(|i| {
            let a = TAU * i as f64 / n as f64;
            let idx = mesh.vertices.len() as u32;
            mesh.vertices.push(Vertex::from_coords(
                hx + radius * a.cos(),
                hy + radius * a.sin(),
                0.0,
            ));
            idx
        })
        .collect();

    // Corner angles around the hole center, for the cap stitch.
    let corner_angle = |cx: f64, cy: f64| {
        let a = (cy - hy).atan2(cx - hx);
        if a < 0.0 { a + TAU } else { a }
    };
    let corners = [(x0, y0), (x1, y0), (x1, y1), (x0, y1)];

    // Top cap annulus (normals +z) between ring_top and top corners 4..8.
    stitch_annulus(
        &mut mesh.faces,
        &ring_top,
        &[
            (4, corner_angle(corners[0].0, corners[0].1)),
            (5, corner_angle(corners[1].0, corners[1].1)),
            (6, corner_angle(corners[2].0, corners[2].1)),
            (7, corner_angle(corners[3].0, corners[3].1)),
        ],
        true,
    );

    // Bottom cap annulus (normals -z) between ring_bottom and corners 0..4.
    stitch_annulus(
        &mut mesh.faces,
        &ring_bottom,
        &[
            (0, corner_angle(corners[0].0, corners[0].1)),
            (1, corner_angle(corners[1].0, corners[1].1)),
            (2, corner_angle(corners[2].0, corners[2].1)),
            (3, corner_angle(corners[3].0, corners[3].1)),
        ],
        false,
    );

    // Outer side walls, CCW from outside.
    let side_quads: [[u32; 4]; 4] = [
        [0, 1, 5, 4], // front (-y)
        [2, 3, 7, 6], // back (+y)
        [3, 0, 4, 7], // left (-x)
        [1, 2, 6, 5], // right (+x)
    ];
    for [a, b, c, d] in side_quads {
        mesh.faces.push([a, b, d]);
        mesh.faces.push([b, c, d]);
    }

    // Hole wall band; normals face the hole axis (outward from the solid).
    for i in 0..n {
        let j = (i + 1) % n;
        mesh.faces.push([ring_top[i], ring_top[j], ring_bottom[i]]);
        mesh.faces
            .push([ring_top[j], ring_bottom[j], ring_bottom[i]]);
    }

    let mut map = TriangleComponentMap::new();
    map.record(ComponentTag::Mount, 0..mesh.face_count());

    info!(
        anchor = ?spec.anchor,
        hole_mm = spec.hole_diameter,
        faces = mesh.face_count(),
        "built keychain mount"
    );

    Ok((mesh, map))
}

/// Stitch a triangulated annulus between an inner ring (vertex `i` at angle
/// `i * TAU / n`) and an outer loop of corner vertices with known angles,
/// both CCW viewed from +Z. `top` selects the +Z winding, otherwise -Z.
///
/// Classic two-loop merge walk: repeatedly advance whichever loop's next
/// vertex comes first by angle, emitting one triangle per advance; the
/// result has `inner.len() + outer.len()` triangles and is a manifold fan
/// as long as both loops are star-shaped around the common center, which a
/// centered hole inside its tab guarantees.
fn stitch_annulus(
    faces: &mut Vec<[u32; 3]>,
    inner: &[u32],
    outer: &[(u32, f64)],
    top: bool,
) {
    let n = inner.len();
    let m = outer.len();
    let step = TAU / n as f64;

    // Order the outer loop by angle, then start from the corner "behind"
    // inner vertex 0 (largest angle, unwrapped below zero).
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| outer[a].1.total_cmp(&outer[b].1));
    order.rotate_right(1);

    // Unwrapped outer angles: order[0] enters one turn early (below zero),
    // positions 1..m carry their raw ascending angles, and position m wraps
    // back to order[0] at its raw angle.
    let outer_angle = |k: usize| {
        let base = outer[order[k % m]].1;
        if k == 0 { base - TAU } else { base }
    };

    let mut i = 0; // inner advances consumed
    let mut j = 0; // outer advances consumed
    while i < n || j < m {
        let advance_inner = if i == n {
            false
        } else if j == m {
            true
        } else {
            (i + 1) as f64 * step <= outer_angle(j + 1)
        };

        let ii = inner[i % n];
        let oo = outer[order[j % m]].0;
        if advance_inner {
            let ii_next = inner[(i + 1) % n];
            if top {
                faces.push([ii, oo, ii_next]);
            } else {
                faces.push([ii, ii_next, oo]);
            }
            i += 1;
        } else {
            let oo_next = outer[order[(j + 1) % m]].0;
            if top {
                faces.push([oo, oo_next, ii]);
            } else {
                faces.push([oo, ii, oo_next]);
            }
            j += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::audit_edges;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Regular n-gon area at the given circumradius.
    fn ngon_area(n: usize, r: f64) -> f64 {
        0.5 * n as f64 * r * r * (TAU / n as f64).sin()
    }

    #[test]
    fn test_default_mount_is_48_triangles() {
        let (mesh, map) = build_keychain_mount(&MountSpec::default(), 50.0, 50.0).unwrap();
        assert_eq!(mesh.face_count(), 48);
        assert_eq!(map.triangle_count(ComponentTag::Mount), 48);
    }

    #[test]
    fn test_ring_vertex_count_follows_segments() {
        for segments in [8, 12, 16, 32] {
            let spec = MountSpec {
                segments,
                ..Default::default()
            };
            let (mesh, _) = build_keychain_mount(&spec, 40.0, 40.0).unwrap();
            // 8 tab corners plus two rings of `segments` vertices.
            assert_eq!(mesh.vertex_count(), 8 + 2 * segments);
            assert_eq!(mesh.face_count(), 4 * segments + 16);
        }
    }

    #[test]
    fn test_mount_is_closed_and_manifold() {
        for segments in [8, 11, 20] {
            let spec = MountSpec {
                segments,
                ..Default::default()
            };
            let (mesh, _) = build_keychain_mount(&spec, 50.0, 30.0).unwrap();
            let audit = audit_edges(&mesh);
            assert!(audit.is_closed(), "{} segments: boundary edges", segments);
            assert!(audit.is_manifold(), "{} segments: non-manifold", segments);
        }
    }

    #[test]
    fn test_mount_volume_is_tab_minus_hole_prism() {
        let spec = MountSpec::default();
        let (mesh, _) = build_keychain_mount(&spec, 50.0, 50.0).unwrap();
        let expected = spec.tab_width * spec.tab_height * spec.tab_thickness
            - ngon_area(spec.segments, spec.hole_diameter / 2.0) * spec.tab_thickness;
        assert!(
            approx_eq(mesh.signed_volume(), expected),
            "volume {} != expected {}",
            mesh.signed_volume(),
            expected
        );
    }

    #[test]
    fn test_tab_positions_per_anchor() {
        let spec = MountSpec::default();

        let (mesh, _) = build_keychain_mount(&spec, 50.0, 40.0).unwrap();
        let (min, max) = mesh.bounds().unwrap();
        // Top anchor: centered in X, protruding past y = 40.
        assert!(approx_eq(min.x, 17.5) && approx_eq(max.x, 32.5));
        assert!(approx_eq(min.y, 40.0) && approx_eq(max.y, 50.0));

        let spec = MountSpec {
            anchor: AnchorEdge::Left,
            ..Default::default()
        };
        let (mesh, _) = build_keychain_mount(&spec, 50.0, 40.0).unwrap();
        let (min, max) = mesh.bounds().unwrap();
        assert!(approx_eq(min.x, -10.0) && approx_eq(max.x, 0.0));
        assert!(approx_eq(min.y, 12.5) && approx_eq(max.y, 27.5));
    }

    #[test]
    fn test_hole_wall_normals_face_the_axis() {
        let spec = MountSpec::default();
        let (mesh, _) = build_keychain_mount(&spec, 50.0, 50.0).unwrap();
        let hole_center_x = 25.0;
        let hole_center_y = 55.0;
        let r = spec.hole_diameter / 2.0;

        let mut wall_faces = 0;
        for tri in mesh.triangles() {
            let c = tri.centroid();
            let dist = ((c.x - hole_center_x).powi(2) + (c.y - hole_center_y).powi(2)).sqrt();
            // Hole wall triangles sit on the cylinder surface.
            if (dist - r).abs() > 0.2 || c.z <= 0.0 || c.z >= spec.tab_thickness {
                continue;
            }
            wall_faces += 1;
            let normal = tri.normal().unwrap();
            let inward_x = hole_center_x - c.x;
            let inward_y = hole_center_y - c.y;
            assert!(
                normal.x * inward_x + normal.y * inward_y > 0.0,
                "hole wall normal points into the material"
            );
        }
        assert_eq!(wall_faces, 2 * spec.segments);
    }

    #[test]
    fn test_hole_too_large_rejected() {
        let spec = MountSpec {
            hole_diameter: 10.0, // == tab_height, the shorter side
            ..Default::default()
        };
        let err = build_keychain_mount(&spec, 50.0, 50.0).unwrap_err();
        assert!(matches!(err, QrMeshError::InvalidMount { .. }));
    }

    #[test]
    fn test_hole_just_under_limit_accepted() {
        let spec = MountSpec {
            hole_diameter: 9.9,
            ..Default::default()
        };
        assert!(build_keychain_mount(&spec, 50.0, 50.0).is_ok());
    }

    #[test]
    fn test_too_few_segments_rejected() {
        let spec = MountSpec {
            segments: 6,
            ..Default::default()
        };
        let err = build_keychain_mount(&spec, 50.0, 50.0).unwrap_err();
        assert!(matches!(err, QrMeshError::InvalidMount { .. }));
    }

    #[test]
    fn test_degenerate_tab_rejected() {
        let spec = MountSpec {
            tab_thickness: 0.0,
            ..Default::default()
        };
        let err = build_keychain_mount(&spec, 50.0, 50.0).unwrap_err();
        assert!(matches!(err, QrMeshError::DegenerateGeometry { .. }));
    }
}
