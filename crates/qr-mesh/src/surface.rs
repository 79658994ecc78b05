//! Surface-optimized mesh builder for single-material output.
//!
//! Emits only the visible boundary of the stepped height field: one top quad
//! per cell at its class top, vertical walls where adjacent cells differ in
//! height, per-cell perimeter walls, and one bottom quad spanning the whole
//! footprint. Every exposed face is covered exactly once, so the result
//! encloses exactly the union of the cell columns with the minimum triangle
//! count.
//!
//! A completely flat grid falls out of the same rule as a plain slab: tops,
//! perimeter walls, bottom, and no internal walls.

use nalgebra::Point3;
use tracing::info;

use crate::classify::{HeightClass, HeightClassGrid, LayerProfile};
use crate::component::{ComponentTag, TriangleComponentMap};
use crate::error::{MeshResult, QrMeshError};
use crate::primitive::append_quad;
use crate::types::Mesh;

fn top_tag(class: HeightClass) -> ComponentTag {
    match class {
        HeightClass::Base => ComponentTag::Base,
        HeightClass::Raised => ComponentTag::QrModule,
        HeightClass::Frame => ComponentTag::Frame,
    }
}

/// Accumulates contiguous same-tag face runs while a builder emits geometry.
struct SpanRecorder {
    map: TriangleComponentMap,
    run_tag: Option<ComponentTag>,
    run_start: usize,
}

impl SpanRecorder {
    fn new() -> Self {
        Self {
            map: TriangleComponentMap::new(),
            run_tag: None,
            run_start: 0,
        }
    }

    fn mark(&mut self, tag: ComponentTag, face_index: usize) {
        if self.run_tag != Some(tag) {
            self.flush(face_index);
            self.run_tag = Some(tag);
            self.run_start = face_index;
        }
    }

    fn flush(&mut self, face_end: usize) {
        if let Some(tag) = self.run_tag.take() {
            self.map.record(tag, self.run_start..face_end);
        }
    }

    fn finish(mut self, face_end: usize) -> TriangleComponentMap {
        self.flush(face_end);
        self.map
    }
}

/// Build the surface mesh for a classified grid.
///
/// `cell_size` is the side length of one grid cell in millimeters; Z extents
/// come from the [`LayerProfile`]. See [`build_surface_mesh_tagged`] when the
/// caller also needs per-component triangle ranges.
///
/// # Example
///
/// ```
/// use qr_mesh::{build_surface_mesh, HeightClass, HeightClassGrid, LayerProfile};
///
/// let classes = HeightClassGrid::filled(3, 3, HeightClass::Base);
/// let profile = LayerProfile::two_layer(1.0, 2.0).unwrap();
/// let mesh = build_surface_mesh(&classes, &profile, 1.0).unwrap();
/// // Flat grid: per-cell tops, perimeter walls, bottom; no internal walls.
/// assert_eq!(mesh.face_count(), 2 * 9 + 2 * 12 + 2);
/// ```
pub fn build_surface_mesh(
    classes: &HeightClassGrid,
    profile: &LayerProfile,
    cell_size: f64,
) -> MeshResult<Mesh> {
    build_surface_mesh_tagged(classes, profile, cell_size).map(|(mesh, _)| mesh)
}

/// Build the surface mesh along with a component map: tops are tagged by
/// their height class, every wall as [`ComponentTag::Wall`], the bottom as
/// [`ComponentTag::Base`].
pub fn build_surface_mesh_tagged(
    classes: &HeightClassGrid,
    profile: &LayerProfile,
    cell_size: f64,
) -> MeshResult<(Mesh, TriangleComponentMap)> {
    if cell_size <= 0.0 {
        return Err(QrMeshError::degenerate_geometry(format!(
            "cell size must be positive, got {:.3}",
            cell_size
        )));
    }
    if classes.width() == 0 || classes.height() == 0 {
        return Err(QrMeshError::degenerate_geometry("class grid has no cells"));
    }

    let (width, height) = (classes.width(), classes.height());
    let floor = profile.floor();
    let top = |x: usize, y: usize| profile.top_of(classes.get(x, y));

    let mut mesh = Mesh::with_capacity(width * height * 8, width * height * 4);
    let mut spans = SpanRecorder::new();

    // Top surface, one quad per cell at its resolved top.
    for y in 0..height {
        for x in 0..width {
            let (x0, y0) = (x as f64 * cell_size, y as f64 * cell_size);
            let (x1, y1) = (x0 + cell_size, y0 + cell_size);
            let h = top(x, y);

            spans.mark(top_tag(classes.get(x, y)), mesh.face_count());
            append_quad(
                &mut mesh,
                [
                    Point3::new(x0, y0, h),
                    Point3::new(x1, y0, h),
                    Point3::new(x1, y1, h),
                    Point3::new(x0, y1, h),
                ],
            );
        }
    }

    // Internal walls at height discontinuities. The wall spans the height
    // difference starting at the lower cell's top, with the normal facing
    // away from the taller column.
    for y in 0..height {
        for x in 0..width {
            let (x0, y0) = (x as f64 * cell_size, y as f64 * cell_size);
            let (x1, y1) = (x0 + cell_size, y0 + cell_size);
            let curr = top(x, y);

            if x + 1 < width {
                let right = top(x + 1, y);
                if curr != right {
                    let (lo, hi) = (curr.min(right), curr.max(right));
                    spans.mark(ComponentTag::Wall, mesh.face_count());
                    let corners = if curr > right {
                        // Taller column on the left; wall faces +x.
                        [
                            Point3::new(x1, y0, lo),
                            Point3::new(x1, y1, lo),
                            Point3::new(x1, y1, hi),
                            Point3::new(x1, y0, hi),
                        ]
                    } else {
                        [
                            Point3::new(x1, y1, lo),
                            Point3::new(x1, y0, lo),
                            Point3::new(x1, y0, hi),
                            Point3::new(x1, y1, hi),
                        ]
                    };
                    append_quad(&mut mesh, corners);
                }
            }

            if y + 1 < height {
                let below = top(x, y + 1);
                if curr != below {
                    let (lo, hi) = (curr.min(below), curr.max(below));
                    spans.mark(ComponentTag::Wall, mesh.face_count());
                    let corners = if curr > below {
                        // Taller column on this side; wall faces +y.
                        [
                            Point3::new(x1, y1, lo),
                            Point3::new(x0, y1, lo),
                            Point3::new(x0, y1, hi),
                            Point3::new(x1, y1, hi),
                        ]
                    } else {
                        [
                            Point3::new(x0, y1, lo),
                            Point3::new(x1, y1, lo),
                            Point3::new(x1, y1, hi),
                            Point3::new(x0, y1, hi),
                        ]
                    };
                    append_quad(&mut mesh, corners);
                }
            }
        }
    }

    // Perimeter walls, one quad per boundary cell from the floor to its top.
    let total_w = width as f64 * cell_size;
    let total_d = height as f64 * cell_size;

    for x in 0..width {
        let (x0, x1) = (x as f64 * cell_size, (x + 1) as f64 * cell_size);

        // Front edge (y = 0), facing -y.
        let h = top(x, 0);
        spans.mark(ComponentTag::Wall, mesh.face_count());
        append_quad(
            &mut mesh,
            [
                Point3::new(x0, 0.0, floor),
                Point3::new(x1, 0.0, floor),
                Point3::new(x1, 0.0, h),
                Point3::new(x0, 0.0, h),
            ],
        );

        // Back edge (y = total_d), facing +y.
        let h = top(x, height - 1);
        spans.mark(ComponentTag::Wall, mesh.face_count());
        append_quad(
            &mut mesh,
            [
                Point3::new(x1, total_d, floor),
                Point3::new(x0, total_d, floor),
                Point3::new(x0, total_d, h),
                Point3::new(x1, total_d, h),
            ],
        );
    }

    for y in 0..height {
        let (y0, y1) = (y as f64 * cell_size, (y + 1) as f64 * cell_size);

        // Left edge (x = 0), facing -x.
        let h = top(0, y);
        spans.mark(ComponentTag::Wall, mesh.face_count());
        append_quad(
            &mut mesh,
            [
                Point3::new(0.0, y1, floor),
                Point3::new(0.0, y0, floor),
                Point3::new(0.0, y0, h),
                Point3::new(0.0, y1, h),
            ],
        );

        // Right edge (x = total_w), facing +x.
        let h = top(width - 1, y);
        spans.mark(ComponentTag::Wall, mesh.face_count());
        append_quad(
            &mut mesh,
            [
                Point3::new(total_w, y0, floor),
                Point3::new(total_w, y1, floor),
                Point3::new(total_w, y1, h),
                Point3::new(total_w, y0, h),
            ],
        );
    }

    // One bottom quad spanning the full footprint, facing -z.
    spans.mark(ComponentTag::Base, mesh.face_count());
    append_quad(
        &mut mesh,
        [
            Point3::new(0.0, 0.0, floor),
            Point3::new(0.0, total_d, floor),
            Point3::new(total_w, total_d, floor),
            Point3::new(total_w, 0.0, floor),
        ],
    );

    let map = spans.finish(mesh.face_count());
    info!(
        faces = mesh.face_count(),
        vertices = mesh.vertex_count(),
        "built surface mesh"
    );

    Ok((mesh, map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::audit_edges;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn profile() -> LayerProfile {
        LayerProfile::two_layer(1.0, 2.0).unwrap()
    }

    fn center_raised_3x3() -> HeightClassGrid {
        let mut classes = HeightClassGrid::filled(3, 3, HeightClass::Base);
        classes.set(1, 1, HeightClass::Raised);
        classes
    }

    /// Analytic volume of the stepped solid: sum of cell columns.
    fn expected_volume(classes: &HeightClassGrid, profile: &LayerProfile, cell: f64) -> f64 {
        let mut v = 0.0;
        for y in 0..classes.height() {
            for x in 0..classes.width() {
                v += cell * cell * (profile.top_of(classes.get(x, y)) - profile.floor());
            }
        }
        v
    }

    #[test]
    fn test_center_raised_triangle_count() {
        // 9 top quads + 4 internal walls + 12 perimeter walls + 1 bottom
        // = 26 quads = 52 triangles.
        let mesh = build_surface_mesh(&center_raised_3x3(), &profile(), 1.0).unwrap();
        assert_eq!(mesh.face_count(), 52);
    }

    #[test]
    fn test_center_raised_volume() {
        let mesh = build_surface_mesh(&center_raised_3x3(), &profile(), 1.0).unwrap();
        // 8 base columns of 1mm plus one raised column of 2mm.
        assert!(approx_eq(mesh.signed_volume(), 10.0));
    }

    #[test]
    fn test_center_raised_tags() {
        let (mesh, map) = build_surface_mesh_tagged(&center_raised_3x3(), &profile(), 1.0).unwrap();
        assert_eq!(map.triangle_count(ComponentTag::QrModule), 2);
        assert_eq!(map.triangle_count(ComponentTag::Wall), 32);
        assert_eq!(map.triangle_count(ComponentTag::Base), 18);
        // Every face is tagged.
        let tagged: usize = map.spans().map(|(r, _)| r.len()).sum();
        assert_eq!(tagged, mesh.face_count());
    }

    #[test]
    fn test_flat_grid_is_a_slab() {
        let classes = HeightClassGrid::filled(4, 5, HeightClass::Base);
        let mesh = build_surface_mesh(&classes, &profile(), 2.0).unwrap();

        // No internal walls: tops + perimeter + bottom only.
        assert_eq!(mesh.face_count(), 2 * 20 + 2 * (2 * 4 + 2 * 5) + 2);
        // Same solid as the single box of that footprint.
        assert!(approx_eq(mesh.signed_volume(), 8.0 * 10.0 * 1.0));
        let (min, max) = mesh.bounds().unwrap();
        assert!(approx_eq(min.x, 0.0) && approx_eq(min.y, 0.0) && approx_eq(min.z, 0.0));
        assert!(approx_eq(max.x, 8.0) && approx_eq(max.y, 10.0) && approx_eq(max.z, 1.0));
    }

    #[test]
    fn test_single_cell_grid_equals_box() {
        // With one cell the general rule degenerates to a plain box:
        // 12 triangles over 8 distinct corner positions, fully manifold.
        let classes = HeightClassGrid::filled(1, 1, HeightClass::Raised);
        let mesh = build_surface_mesh(&classes, &profile(), 3.0).unwrap();

        assert_eq!(mesh.face_count(), 12);
        let audit = audit_edges(&mesh);
        assert_eq!(audit.welded_vertex_count, 8);
        assert!(audit.is_closed());
        assert!(audit.is_manifold());
        assert!(approx_eq(mesh.signed_volume(), 3.0 * 3.0 * 2.0));
    }

    #[test]
    fn test_checkerboard_volume() {
        let mut classes = HeightClassGrid::filled(4, 4, HeightClass::Base);
        for y in 0..4 {
            for x in 0..4 {
                if (x + y) % 2 == 0 {
                    classes.set(x, y, HeightClass::Raised);
                }
            }
        }
        let p = profile();
        let mesh = build_surface_mesh(&classes, &p, 1.5).unwrap();
        assert!(approx_eq(
            mesh.signed_volume(),
            expected_volume(&classes, &p, 1.5)
        ));
        // 8 raised cells, 4 neighbors each differing, shared walls counted
        // once: 24 internal wall quads.
        assert_eq!(mesh.face_count(), 2 * 16 + 2 * 24 + 2 * 16 + 2);
    }

    #[test]
    fn test_three_tier_volume() {
        let p = LayerProfile::three_layer(1.0, 2.0, 3.0).unwrap();
        let mut classes = HeightClassGrid::filled(3, 1, HeightClass::Base);
        classes.set(1, 0, HeightClass::Raised);
        classes.set(2, 0, HeightClass::Frame);
        let mesh = build_surface_mesh(&classes, &p, 1.0).unwrap();
        assert!(approx_eq(
            mesh.signed_volume(),
            expected_volume(&classes, &p, 1.0)
        ));
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        let classes = HeightClassGrid::filled(2, 2, HeightClass::Base);
        let err = build_surface_mesh(&classes, &profile(), 0.0).unwrap_err();
        assert!(matches!(
            err,
            crate::error::QrMeshError::DegenerateGeometry { .. }
        ));
    }
}
