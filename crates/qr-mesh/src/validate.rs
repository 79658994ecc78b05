//! Closure and orientation checks for generated meshes.
//!
//! The builders emit duplicate coincident vertices rather than shared
//! indices, so topological checks first weld positions (1e-6 mm
//! quantization) and then count how many triangles use each undirected
//! edge. One adjacent triangle marks a boundary edge, more than two a
//! non-manifold edge.
//!
//! The audit is exact for independently closed objects (box primitives,
//! full-volume box ranges, the mount tab). The surface strategy's single
//! spanning bottom quad meets the per-cell perimeter walls at T-junction
//! vertices, which an edge count cannot pair up; closure of those meshes is
//! asserted through exact enclosed-volume accounting instead (see the
//! surface builder tests).

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::{debug, warn};

use crate::types::Mesh;

/// Welding quantum in millimeters. Vertices closer than this along every
/// axis are treated as the same point.
const WELD_EPSILON: f64 = 1e-6;

#[inline]
fn weld_key(p: &Point3<f64>) -> (i64, i64, i64) {
    (
        (p.x / WELD_EPSILON).round() as i64,
        (p.y / WELD_EPSILON).round() as i64,
        (p.z / WELD_EPSILON).round() as i64,
    )
}

/// Result of a welded-edge audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeAudit {
    /// Distinct undirected edges seen.
    pub edge_count: usize,
    /// Edges used by exactly one triangle.
    pub boundary_edge_count: usize,
    /// Edges used by more than two triangles.
    pub non_manifold_edge_count: usize,
    /// Distinct welded vertex positions.
    pub welded_vertex_count: usize,
}

impl EdgeAudit {
    /// No boundary edges: the surface encloses a volume.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.boundary_edge_count == 0
    }

    /// Every edge is used by at most two triangles.
    #[inline]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }
}

/// Audit every face of the mesh.
pub fn audit_edges(mesh: &Mesh) -> EdgeAudit {
    audit_edge_range(mesh, 0..mesh.face_count())
}

/// Audit a contiguous face range, welding only the vertices it references.
///
/// Use this on a [`crate::TriangleComponentMap`] span to check that a
/// full-volume object is independently closed.
pub fn audit_edge_range(mesh: &Mesh, faces: std::ops::Range<usize>) -> EdgeAudit {
    let mut vertex_ids: HashMap<(i64, i64, i64), u32> = HashMap::new();
    let mut edge_uses: HashMap<(u32, u32), usize> = HashMap::new();

    let mut id_of = |index: u32| -> u32 {
        let key = weld_key(&mesh.vertices[index as usize].position);
        let next = vertex_ids.len() as u32;
        *vertex_ids.entry(key).or_insert(next)
    };

    for face in &mesh.faces[faces] {
        let a = id_of(face[0]);
        let b = id_of(face[1]);
        let c = id_of(face[2]);
        for (u, v) in [(a, b), (b, c), (c, a)] {
            let edge = if u < v { (u, v) } else { (v, u) };
            *edge_uses.entry(edge).or_insert(0) += 1;
        }
    }

    let boundary_edge_count = edge_uses.values().filter(|&&n| n == 1).count();
    let non_manifold_edge_count = edge_uses.values().filter(|&&n| n > 2).count();

    EdgeAudit {
        edge_count: edge_uses.len(),
        boundary_edge_count,
        non_manifold_edge_count,
        welded_vertex_count: vertex_ids.len(),
    }
}

/// Validation report for a generated mesh.
#[derive(Debug, Clone)]
pub struct MeshReport {
    /// No boundary edges after welding.
    pub is_watertight: bool,
    /// No edge with more than two adjacent triangles.
    pub is_manifold: bool,
    pub boundary_edge_count: usize,
    pub non_manifold_edge_count: usize,
    pub vertex_count: usize,
    pub face_count: usize,
    /// Bounding box as (min corner, max corner).
    pub bounds: Option<(Point3<f64>, Point3<f64>)>,
    /// Signed volume; negative means inside-out winding.
    pub signed_volume: f64,
    /// Whether normals point inward.
    pub is_inside_out: bool,
}

impl MeshReport {
    /// Closed, manifold and correctly oriented.
    pub fn is_printable(&self) -> bool {
        self.is_watertight && self.is_manifold && !self.is_inside_out
    }
}

impl std::fmt::Display for MeshReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Mesh Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;
        if let Some((min, max)) = &self.bounds {
            writeln!(
                f,
                "  Bounds: [{:.1}, {:.1}, {:.1}] to [{:.1}, {:.1}, {:.1}]",
                min.x, min.y, min.z, max.x, max.y, max.z
            )?;
        }
        writeln!(f, "  Volume: {:.2} (signed)", self.signed_volume)?;
        writeln!(
            f,
            "  Watertight: {} (boundary edges: {})",
            if self.is_watertight { "yes" } else { "NO" },
            self.boundary_edge_count
        )?;
        writeln!(
            f,
            "  Manifold: {} (non-manifold edges: {})",
            if self.is_manifold { "yes" } else { "NO" },
            self.non_manifold_edge_count
        )?;
        writeln!(
            f,
            "  Orientation: {}",
            if self.is_inside_out {
                "INSIDE-OUT"
            } else {
                "correct"
            }
        )
    }
}

/// Validate a mesh and return a report, warning on failures.
pub fn validate_mesh(mesh: &Mesh) -> MeshReport {
    let audit = audit_edges(mesh);
    let signed_volume = mesh.signed_volume();

    let report = MeshReport {
        is_watertight: audit.is_closed(),
        is_manifold: audit.is_manifold(),
        boundary_edge_count: audit.boundary_edge_count,
        non_manifold_edge_count: audit.non_manifold_edge_count,
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        bounds: mesh.bounds(),
        signed_volume,
        is_inside_out: signed_volume < 0.0,
    };

    if !report.is_watertight {
        warn!(
            boundary_edges = report.boundary_edge_count,
            "mesh is not watertight"
        );
    }
    if !report.is_manifold {
        warn!(
            non_manifold_edges = report.non_manifold_edge_count,
            "mesh has non-manifold edges"
        );
    }
    debug!("{}", report);

    report
}
