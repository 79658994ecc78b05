//! Grid classification: pixel values to height classes.
//!
//! The classifier turns a [`PixelGrid`] into a [`HeightClassGrid`]: one
//! discrete elevation tier per cell. Frame detection runs a 4-connected
//! flood fill over ink cells and promotes every component that touches the
//! outer border to [`HeightClass::Frame`]; components partition the ink
//! cells, so a cell is never claimed by two regions.

use hashbrown::HashSet;
use tracing::debug;

use crate::error::{MeshResult, QrMeshError};
use crate::grid::PixelGrid;

/// A discrete elevation tier a grid cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeightClass {
    /// Background, at the base-plate top.
    Base,
    /// A QR module, extruded above the base.
    Raised,
    /// A border frame, at its own tier.
    Frame,
}

/// A classified grid: the same shape as the input, one class per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightClassGrid {
    width: usize,
    height: usize,
    classes: Vec<HeightClass>,
}

impl HeightClassGrid {
    /// A grid with every cell set to `class`.
    pub fn filled(width: usize, height: usize, class: HeightClass) -> Self {
        Self {
            width,
            height,
            classes: vec![class; width * height],
        }
    }

    /// Grid width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Class of the cell at `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> HeightClass {
        self.classes[y * self.width + x]
    }

    /// Set the class of the cell at `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, class: HeightClass) {
        self.classes[y * self.width + x] = class;
    }

    /// Number of cells with the given class.
    pub fn count(&self, class: HeightClass) -> usize {
        self.classes.iter().filter(|&&c| c == class).count()
    }
}

/// Z-extents for the height classes: a common floor plus a strictly
/// increasing stack of class tops, in millimeters.
///
/// Every class occupies `[floor, top_of(class)]`; with only two layers the
/// frame tier aliases the raised tier, matching a grid that never produces
/// [`HeightClass::Frame`].
#[derive(Debug, Clone, PartialEq)]
pub struct LayerProfile {
    floor: f64,
    base_top: f64,
    raised_top: f64,
    frame_top: f64,
}

impl LayerProfile {
    /// Base plate plus one raised tier (frame aliases raised).
    ///
    /// # Example
    ///
    /// ```
    /// use qr_mesh::LayerProfile;
    ///
    /// let profile = LayerProfile::two_layer(2.0, 4.0).unwrap();
    /// assert_eq!(profile.base_top(), 2.0);
    /// assert_eq!(profile.max_top(), 4.0);
    /// ```
    pub fn two_layer(base_top: f64, raised_top: f64) -> MeshResult<Self> {
        Self::new(0.0, base_top, raised_top, raised_top)
    }

    /// Base, raised and a distinct frame tier.
    pub fn three_layer(base_top: f64, raised_top: f64, frame_top: f64) -> MeshResult<Self> {
        Self::new(0.0, base_top, raised_top, frame_top)
    }

    fn new(floor: f64, base_top: f64, raised_top: f64, frame_top: f64) -> MeshResult<Self> {
        if !(floor < base_top && base_top < raised_top && raised_top <= frame_top) {
            return Err(QrMeshError::degenerate_geometry(format!(
                "layer tops must increase monotonically above the floor: \
                 floor {:.3} < base {:.3} < raised {:.3} <= frame {:.3}",
                floor, base_top, raised_top, frame_top
            )));
        }
        Ok(Self {
            floor,
            base_top,
            raised_top,
            frame_top,
        })
    }

    pub(crate) fn unchecked(floor: f64, base_top: f64, raised_top: f64, frame_top: f64) -> Self {
        Self {
            floor,
            base_top,
            raised_top,
            frame_top,
        }
    }

    /// Global floor Z.
    #[inline]
    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Top of the base plate.
    #[inline]
    pub fn base_top(&self) -> f64 {
        self.base_top
    }

    /// Top Z of the given class.
    #[inline]
    pub fn top_of(&self, class: HeightClass) -> f64 {
        match class {
            HeightClass::Base => self.base_top,
            HeightClass::Raised => self.raised_top,
            HeightClass::Frame => self.frame_top,
        }
    }

    /// The tallest declared top.
    #[inline]
    pub fn max_top(&self) -> f64 {
        self.frame_top
    }
}

/// How frame cells are identified during classification.
#[derive(Debug, Clone, Default)]
pub enum FrameMode {
    /// No frame tier: ink is Raised, background is Base.
    #[default]
    Off,
    /// Detect the frame as ink components touching the grid border.
    Detect,
    /// The 2D stage already decided: these `(x, y)` cells are the frame.
    Cells(HashSet<(usize, usize)>),
}

/// Parameters for [`classify`].
#[derive(Debug, Clone, Default)]
pub struct ClassifyParams {
    /// Swap the ink/background interpretation before classification.
    pub invert: bool,
    /// Frame identification rule.
    pub frame: FrameMode,
}

/// Classify every grid cell into a height class.
///
/// Grid well-formedness (non-empty, rectangular) is enforced when the
/// [`PixelGrid`] is constructed, so classification itself cannot observe a
/// malformed grid. An all-background grid classifies to all-Base; a grid
/// whose ink never touches the border simply produces no Frame cells.
///
/// # Example
///
/// ```
/// use qr_mesh::{classify, ClassifyParams, HeightClass, PixelGrid};
///
/// let grid = PixelGrid::from_rows(&[vec![0, 1], vec![0, 0]]).unwrap();
/// let classes = classify(&grid, &ClassifyParams::default()).unwrap();
/// assert_eq!(classes.get(1, 0), HeightClass::Raised);
/// assert_eq!(classes.get(0, 1), HeightClass::Base);
/// ```
pub fn classify(grid: &PixelGrid, params: &ClassifyParams) -> MeshResult<HeightClassGrid> {
    let (width, height) = (grid.width(), grid.height());
    let ink = |x: usize, y: usize| grid.is_ink(x, y) != params.invert;

    let mut classes = HeightClassGrid::filled(width, height, HeightClass::Base);
    for y in 0..height {
        for x in 0..width {
            if ink(x, y) {
                classes.set(x, y, HeightClass::Raised);
            }
        }
    }

    match &params.frame {
        FrameMode::Off => {}
        FrameMode::Cells(cells) => {
            for &(x, y) in cells {
                if x < width && y < height {
                    classes.set(x, y, HeightClass::Frame);
                }
            }
        }
        FrameMode::Detect => {
            let regions = ink_regions(grid, params.invert);
            let frame_regions = regions.iter().filter(|r| r.touches_border).count();
            debug!(
                regions = regions.len(),
                frame_regions, "classified ink components"
            );
            for region in regions {
                if region.touches_border {
                    for (x, y) in region.cells {
                        classes.set(x, y, HeightClass::Frame);
                    }
                }
            }
        }
    }

    Ok(classes)
}

/// A maximal 4-connected set of ink cells. Transient: consumed by frame
/// detection and discarded once classes are final.
struct Region {
    cells: Vec<(usize, usize)>,
    touches_border: bool,
}

/// Flood-fill all 4-connected ink components.
fn ink_regions(grid: &PixelGrid, invert: bool) -> Vec<Region> {
    let (width, height) = (grid.width(), grid.height());
    let ink = |x: usize, y: usize| grid.is_ink(x, y) != invert;

    let mut visited = vec![false; width * height];
    let mut regions = Vec::new();

    for start_y in 0..height {
        for start_x in 0..width {
            if visited[start_y * width + start_x] || !ink(start_x, start_y) {
                continue;
            }

            let mut cells = Vec::new();
            let mut touches_border = false;
            let mut stack = vec![(start_x, start_y)];
            visited[start_y * width + start_x] = true;

            while let Some((x, y)) = stack.pop() {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    touches_border = true;
                }
                cells.push((x, y));

                let mut neighbors = [(0usize, 0usize); 4];
                let mut n = 0;
                if x > 0 {
                    neighbors[n] = (x - 1, y);
                    n += 1;
                }
                if x + 1 < width {
                    neighbors[n] = (x + 1, y);
                    n += 1;
                }
                if y > 0 {
                    neighbors[n] = (x, y - 1);
                    n += 1;
                }
                if y + 1 < height {
                    neighbors[n] = (x, y + 1);
                    n += 1;
                }

                for &(nx, ny) in &neighbors[..n] {
                    if !visited[ny * width + nx] && ink(nx, ny) {
                        visited[ny * width + nx] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            regions.push(Region {
                cells,
                touches_border,
            });
        }
    }

    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect() -> ClassifyParams {
        ClassifyParams {
            invert: false,
            frame: FrameMode::Detect,
        }
    }

    #[test]
    fn test_plain_banding() {
        let grid = PixelGrid::from_rows(&[vec![0, 1, 0], vec![1, 1, 0]]).unwrap();
        let classes = classify(&grid, &ClassifyParams::default()).unwrap();
        assert_eq!(classes.get(0, 0), HeightClass::Base);
        assert_eq!(classes.get(1, 0), HeightClass::Raised);
        assert_eq!(classes.count(HeightClass::Raised), 3);
        assert_eq!(classes.count(HeightClass::Frame), 0);
    }

    #[test]
    fn test_invert_swaps_interpretation() {
        let grid = PixelGrid::from_rows(&[vec![0, 1]]).unwrap();
        let params = ClassifyParams {
            invert: true,
            ..Default::default()
        };
        let classes = classify(&grid, &params).unwrap();
        assert_eq!(classes.get(0, 0), HeightClass::Raised);
        assert_eq!(classes.get(1, 0), HeightClass::Base);
    }

    #[test]
    fn test_all_background_is_all_base() {
        let grid = PixelGrid::from_rows(&vec![vec![0; 4]; 4]).unwrap();
        let classes = classify(&grid, &detect()).unwrap();
        assert_eq!(classes.count(HeightClass::Base), 16);
    }

    #[test]
    fn test_frame_ring_and_interior_blob() {
        // A ring of ink touching the border, plus a disconnected blob in the
        // middle that does not: ring -> Frame, blob -> Raised.
        let grid = PixelGrid::from_rows(&[
            vec![1, 1, 1, 1, 1],
            vec![1, 0, 0, 0, 1],
            vec![1, 0, 1, 0, 1],
            vec![1, 0, 0, 0, 1],
            vec![1, 1, 1, 1, 1],
        ])
        .unwrap();
        let classes = classify(&grid, &detect()).unwrap();

        assert_eq!(classes.get(0, 0), HeightClass::Frame);
        assert_eq!(classes.get(4, 2), HeightClass::Frame);
        assert_eq!(classes.get(2, 2), HeightClass::Raised);
        assert_eq!(classes.get(1, 1), HeightClass::Base);
        assert_eq!(classes.count(HeightClass::Frame), 16);
        assert_eq!(classes.count(HeightClass::Raised), 1);
    }

    #[test]
    fn test_no_border_ink_means_no_frame() {
        let grid = PixelGrid::from_rows(&[
            vec![0, 0, 0],
            vec![0, 1, 0],
            vec![0, 0, 0],
        ])
        .unwrap();
        let classes = classify(&grid, &detect()).unwrap();
        assert_eq!(classes.count(HeightClass::Frame), 0);
        assert_eq!(classes.count(HeightClass::Raised), 1);
    }

    #[test]
    fn test_diagonal_touch_is_not_connected() {
        // The interior cell touches the border component only diagonally;
        // 4-connectivity keeps it a separate, non-frame region.
        let grid = PixelGrid::from_rows(&[
            vec![1, 0, 0],
            vec![0, 1, 0],
            vec![0, 0, 0],
        ])
        .unwrap();
        let classes = classify(&grid, &detect()).unwrap();
        assert_eq!(classes.get(0, 0), HeightClass::Frame);
        assert_eq!(classes.get(1, 1), HeightClass::Raised);
    }

    #[test]
    fn test_explicit_frame_cells() {
        let grid = PixelGrid::from_rows(&[vec![1, 1, 0]]).unwrap();
        let mut cells = HashSet::new();
        cells.insert((0usize, 0usize));
        let params = ClassifyParams {
            invert: false,
            frame: FrameMode::Cells(cells),
        };
        let classes = classify(&grid, &params).unwrap();
        assert_eq!(classes.get(0, 0), HeightClass::Frame);
        assert_eq!(classes.get(1, 0), HeightClass::Raised);
        assert_eq!(classes.get(2, 0), HeightClass::Base);
    }

    #[test]
    fn test_layer_profile_rejects_non_monotonic() {
        assert!(LayerProfile::two_layer(2.0, 2.0).is_err());
        assert!(LayerProfile::two_layer(0.0, 1.0).is_err());
        assert!(LayerProfile::three_layer(1.0, 3.0, 2.0).is_err());
        assert!(LayerProfile::three_layer(1.0, 2.0, 2.0).is_ok());
    }

    #[test]
    fn test_layer_profile_tops() {
        let profile = LayerProfile::three_layer(1.0, 2.0, 3.5).unwrap();
        assert_eq!(profile.top_of(HeightClass::Base), 1.0);
        assert_eq!(profile.top_of(HeightClass::Raised), 2.0);
        assert_eq!(profile.top_of(HeightClass::Frame), 3.5);
        assert_eq!(profile.max_top(), 3.5);
        assert_eq!(profile.floor(), 0.0);
    }
}
