//! QR-code relief mesh synthesis.
//!
//! This crate turns a 2D QR-code pixel grid into a watertight triangle mesh
//! ready for 3D printing, with two triangulation strategies:
//!
//! - **Surface**: emits only the visible boundary (tops, transition walls,
//!   perimeter, bottom). Minimal triangle count, ideal for single-material
//!   STL-style output.
//! - **Full volume**: one independently closed box per module over a base
//!   plate, every triangle tagged with its logical component. Larger output,
//!   but exactly what multi-material 3MF-style serializers need to split the
//!   model into separately colored solids.
//!
//! Classification maps pixels to height classes (base / raised / frame, the
//! frame found by 4-connected border analysis), a [`LayerProfile`] gives
//! each class its Z extents, and an optional keychain mount with a circular
//! through-hole can be attached to any edge.
//!
//! The crate is the geometry engine only: QR encoding, image decoration and
//! file-format serialization are up to the caller. Output is an indexed
//! [`Mesh`] plus a [`TriangleComponentMap`]; pair the map with a
//! [`MaterialMap`] to hand a serializer its color groups.
//!
//! # Units and Conventions
//!
//! All coordinates are **millimeters** in a right-handed coordinate system
//! (Z up). Face winding is **counter-clockwise viewed from outside**, so
//! normals point outward by the right-hand rule; reversed winding is treated
//! as a defect everywhere.
//!
//! # Quick Start
//!
//! ```
//! use qr_mesh::{convert, ConvertParams, MeshStrategy, PixelGrid};
//!
//! // A tiny stand-in for a real QR bitmap (1 = ink).
//! let grid = PixelGrid::from_rows(&[
//!     vec![1, 0, 1],
//!     vec![0, 1, 0],
//!     vec![1, 0, 1],
//! ])
//! .unwrap();
//!
//! // Surface mesh on a 50x50mm footprint with default layer heights.
//! let build = convert(&grid, &ConvertParams::default()).unwrap();
//! assert!(!build.mesh.is_inside_out());
//!
//! // Full-volume mesh with per-component tags for multi-color printing.
//! let params = ConvertParams {
//!     strategy: MeshStrategy::FullVolume { merge_cells: true },
//!     ..Default::default()
//! };
//! let build = convert(&grid, &params).unwrap();
//! assert!(build.components.span_count() > 1);
//! ```
//!
//! # Errors
//!
//! Everything is a deterministic in-memory computation, so failures are
//! contract violations surfaced as [`QrMeshError`]: malformed grids,
//! non-positive extents, or a mount hole too large for its tab. Nothing is
//! retried or silently clamped.

mod classify;
mod component;
mod convert;
mod error;
mod grid;
mod mount;
mod primitive;
mod surface;
mod types;
mod volume;

pub mod validate;

pub use classify::{classify, ClassifyParams, FrameMode, HeightClass, HeightClassGrid, LayerProfile};
pub use component::{ComponentTag, MaterialMap, TriangleComponentMap};
pub use convert::{convert, ConvertParams, MeshBuild, MeshStrategy};
pub use error::{MeshResult, QrMeshError};
pub use grid::PixelGrid;
pub use mount::{build_keychain_mount, AnchorEdge, MountSpec};
pub use primitive::make_box;
pub use surface::{build_surface_mesh, build_surface_mesh_tagged};
pub use types::{Mesh, Triangle, Vertex, VertexColor};
pub use validate::{audit_edges, audit_edge_range, validate_mesh, EdgeAudit, MeshReport};
pub use volume::build_volume_mesh;
