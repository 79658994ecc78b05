//! One-call conversion pipeline: classify, build, mount, tag.
//!
//! The strategy is selected once per call via [`MeshStrategy`]; both
//! strategies share classification and mount synthesis. Everything runs
//! synchronously on in-memory buffers and owns no state across calls.

use tracing::{debug, info};

use crate::classify::{classify, ClassifyParams, LayerProfile};
use crate::component::TriangleComponentMap;
use crate::error::{MeshResult, QrMeshError};
use crate::grid::PixelGrid;
use crate::mount::{build_keychain_mount, MountSpec};
use crate::surface::build_surface_mesh_tagged;
use crate::types::Mesh;
use crate::volume::build_volume_mesh;

/// Which triangulation strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshStrategy {
    /// Visible-surface triangulation; smallest output, single material.
    Surface,
    /// One closed box per cell over a base plate; per-component material
    /// separation. `merge_cells` merges same-class rectangles first.
    FullVolume { merge_cells: bool },
}

/// Parameters for [`convert`]. Millimeters throughout.
#[derive(Debug, Clone)]
pub struct ConvertParams {
    /// Physical footprint (width, depth) the grid is scaled to.
    pub base_size_mm: (f64, f64),
    /// Z extents per height class.
    pub profile: LayerProfile,
    /// Classification settings (inversion, frame rule).
    pub classify: ClassifyParams,
    /// Triangulation strategy.
    pub strategy: MeshStrategy,
    /// Optional keychain mount.
    pub mount: Option<MountSpec>,
}

impl Default for ConvertParams {
    /// 50x50mm footprint, 2mm base with 2mm modules, surface strategy.
    fn default() -> Self {
        Self {
            base_size_mm: (50.0, 50.0),
            profile: LayerProfile::unchecked(0.0, 2.0, 4.0, 4.0),
            classify: ClassifyParams::default(),
            strategy: MeshStrategy::Surface,
            mount: None,
        }
    }
}

/// Result of one conversion call.
#[derive(Debug, Clone)]
pub struct MeshBuild {
    /// The synthesized mesh.
    pub mesh: Mesh,
    /// Per-component triangle ranges for multi-material serialization.
    pub components: TriangleComponentMap,
    /// Derived cell size in millimeters.
    pub cell_size: f64,
}

/// Convert a pixel grid into a printable mesh.
///
/// The grid's rows are flipped first so the image top lands at the model's
/// far edge, then the cell size is derived from the physical footprint (mean
/// of the two axes, as a QR grid is square in practice), the grid is
/// classified, and the selected strategy emits geometry. A requested mount
/// is appended last with its own tag range.
///
/// # Example
///
/// ```
/// use qr_mesh::{convert, ConvertParams, PixelGrid};
///
/// let grid = PixelGrid::from_rows(&[
///     vec![0, 0, 0],
///     vec![0, 1, 0],
///     vec![0, 0, 0],
/// ])
/// .unwrap();
/// let build = convert(&grid, &ConvertParams::default()).unwrap();
/// assert_eq!(build.mesh.face_count(), 52);
/// assert!(!build.mesh.is_inside_out());
/// ```
pub fn convert(grid: &PixelGrid, params: &ConvertParams) -> MeshResult<MeshBuild> {
    let (base_w, base_d) = params.base_size_mm;
    if base_w <= 0.0 || base_d <= 0.0 {
        return Err(QrMeshError::degenerate_geometry(format!(
            "base size must be positive, got {:.3} x {:.3}",
            base_w, base_d
        )));
    }

    // Image rows run top-down; mesh Y runs bottom-up.
    let flipped = grid.flipped_rows();

    let cell_x = base_w / flipped.width() as f64;
    let cell_y = base_d / flipped.height() as f64;
    let cell_size = (cell_x + cell_y) / 2.0;
    debug!(
        width = flipped.width(),
        height = flipped.height(),
        cell_mm = format!("{:.3}", cell_size),
        "derived cell size"
    );

    let classes = classify(&flipped, &params.classify)?;

    let (mut mesh, mut components) = match params.strategy {
        MeshStrategy::Surface => {
            build_surface_mesh_tagged(&classes, &params.profile, cell_size)?
        }
        MeshStrategy::FullVolume { merge_cells } => {
            build_volume_mesh(&classes, &params.profile, cell_size, merge_cells)?
        }
    };

    if let Some(spec) = &params.mount {
        let footprint_w = flipped.width() as f64 * cell_size;
        let footprint_d = flipped.height() as f64 * cell_size;
        let (mount_mesh, mount_map) = build_keychain_mount(spec, footprint_w, footprint_d)?;
        let face_offset = mesh.append(&mount_mesh);
        components.extend_offset(&mount_map, face_offset);
    }

    if let Some((min, max)) = mesh.bounds() {
        info!(
            "model {:.1} x {:.1} x {:.1} mm, {} faces",
            max.x - min.x,
            max.y - min.y,
            max.z - min.z,
            mesh.face_count()
        );
    }

    Ok(MeshBuild {
        mesh,
        components,
        cell_size,
    })
}
