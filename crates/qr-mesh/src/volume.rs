//! Full-volume mesh builder for multi-material output.
//!
//! Emits one complete, independently closed box per raised cell (or per
//! merged same-class rectangle) on top of a full base-plate box, and tags
//! every box in a [`TriangleComponentMap`]. Nothing is done about the
//! coincident faces where module boxes sit on the base plate: each object is
//! watertight on its own, which is what a serializer splitting the mesh into
//! separately colored solids needs. That trades file size for robustness.

use tracing::info;

use crate::classify::{HeightClass, HeightClassGrid, LayerProfile};
use crate::component::{ComponentTag, TriangleComponentMap};
use crate::error::{MeshResult, QrMeshError};
use crate::primitive::append_box;
use crate::types::Mesh;

fn cell_tag(class: HeightClass) -> ComponentTag {
    match class {
        HeightClass::Base => ComponentTag::Base,
        HeightClass::Raised => ComponentTag::QrModule,
        HeightClass::Frame => ComponentTag::Frame,
    }
}

/// A merged run of same-class cells: `width x height` cells anchored at
/// `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRect {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    class: HeightClass,
}

/// Greedy rectangle decomposition of the non-base cells.
///
/// Scans row-major; each unclaimed cell grows a run rightward over identical
/// unclaimed cells, then the run extends downward while the entire column
/// span below matches. 4-connected and deterministic. Only rectangles are
/// produced, so one box per rectangle covers exactly its cells.
fn merge_rectangles(classes: &HeightClassGrid) -> Vec<CellRect> {
    let (width, height) = (classes.width(), classes.height());
    let mut claimed = vec![false; width * height];
    let mut rects = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if claimed[y * width + x] {
                continue;
            }
            let class = classes.get(x, y);
            if class == HeightClass::Base {
                continue;
            }

            let mut run_w = 1;
            while x + run_w < width
                && !claimed[y * width + x + run_w]
                && classes.get(x + run_w, y) == class
            {
                run_w += 1;
            }

            let mut run_h = 1;
            'grow: while y + run_h < height {
                for dx in 0..run_w {
                    let (cx, cy) = (x + dx, y + run_h);
                    if claimed[cy * width + cx] || classes.get(cx, cy) != class {
                        break 'grow;
                    }
                }
                run_h += 1;
            }

            for dy in 0..run_h {
                for dx in 0..run_w {
                    claimed[(y + dy) * width + x + dx] = true;
                }
            }

            rects.push(CellRect {
                x,
                y,
                width: run_w,
                height: run_h,
                class,
            });
        }
    }

    rects
}

/// Build the full-volume mesh: a base-plate box plus one box per non-base
/// cell, each tagged by its originating class.
///
/// With `merge_cells` set, adjacent same-class cells are first merged into
/// maximal rectangles (greedy row-run merging, 4-connected) to cut the box
/// count; per-object closure is unaffected. Module boxes sit on the base
/// plate, spanning from the base top to their class top.
///
/// # Example
///
/// ```
/// use qr_mesh::{build_volume_mesh, ComponentTag, HeightClass, HeightClassGrid, LayerProfile};
///
/// let mut classes = HeightClassGrid::filled(2, 2, HeightClass::Base);
/// classes.set(0, 0, HeightClass::Raised);
/// let profile = LayerProfile::two_layer(1.0, 2.0).unwrap();
///
/// let (mesh, map) = build_volume_mesh(&classes, &profile, 1.0, false).unwrap();
/// assert_eq!(mesh.face_count(), 24); // base box + one module box
/// assert_eq!(map.triangle_count(ComponentTag::QrModule), 12);
/// ```
pub fn build_volume_mesh(
    classes: &HeightClassGrid,
    profile: &LayerProfile,
    cell_size: f64,
    merge_cells: bool,
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
    let mut mesh = Mesh::new();
    let mut map = TriangleComponentMap::new();

    // Base plate spanning the whole footprint.
    let range = append_box(
        &mut mesh,
        0.0,
        0.0,
        width as f64 * cell_size,
        height as f64 * cell_size,
        profile.floor(),
        profile.base_top(),
    )?;
    map.record(ComponentTag::Base, range);

    let rects = if merge_cells {
        merge_rectangles(classes)
    } else {
        let mut singles = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let class = classes.get(x, y);
                if class != HeightClass::Base {
                    singles.push(CellRect {
                        x,
                        y,
                        width: 1,
                        height: 1,
                        class,
                    });
                }
            }
        }
        singles
    };

    for rect in &rects {
        let x0 = rect.x as f64 * cell_size;
        let y0 = rect.y as f64 * cell_size;
        let range = append_box(
            &mut mesh,
            x0,
            y0,
            x0 + rect.width as f64 * cell_size,
            y0 + rect.height as f64 * cell_size,
            profile.base_top(),
            profile.top_of(rect.class),
        )?;
        map.record(cell_tag(rect.class), range);
    }

    info!(
        boxes = rects.len() + 1,
        faces = mesh.face_count(),
        merged = merge_cells,
        "built full-volume mesh"
    );

    Ok((mesh, map))
}
