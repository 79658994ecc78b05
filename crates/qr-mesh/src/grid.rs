//! The 2D pixel grid consumed by the classifier.

use crate::error::{MeshResult, QrMeshError};

/// An immutable, rectangular 2D grid of pixel values.
///
/// Value semantics: `0` is background, any non-zero value is ink (a module,
/// or a palette index assigned by an upstream decoration stage). Rows are
/// image rows, so row 0 is the top of the source image; the conversion
/// pipeline flips rows before meshing so that the image top ends up at the
/// far +Y edge of the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelGrid {
    /// Build a grid from row slices.
    ///
    /// Fails with [`QrMeshError::InvalidGrid`] when there are no rows, the
    /// rows are empty, or the rows have differing lengths.
    ///
    /// # Example
    ///
    /// ```
    /// use qr_mesh::PixelGrid;
    ///
    /// let grid = PixelGrid::from_rows(&[vec![0, 1], vec![1, 0]]).unwrap();
    /// assert_eq!(grid.width(), 2);
    /// assert!(grid.is_ink(1, 0));
    /// ```
    pub fn from_rows(rows: &[Vec<u8>]) -> MeshResult<Self> {
        let height = rows.len();
        if height == 0 {
            return Err(QrMeshError::invalid_grid("grid has no rows"));
        }

        let width = rows[0].len();
        if width == 0 {
            return Err(QrMeshError::invalid_grid("grid rows are empty"));
        }

        let mut data = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(QrMeshError::invalid_grid(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.len(),
                    width
                )));
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a grid from a flat row-major buffer.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> MeshResult<Self> {
        if width == 0 || height == 0 {
            return Err(QrMeshError::invalid_grid("grid dimensions must be > 0"));
        }
        if data.len() != width * height {
            return Err(QrMeshError::invalid_grid(format!(
                "buffer holds {} cells, expected {}x{} = {}",
                data.len(),
                width,
                height,
                width * height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
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

    /// Raw value at `(x, y)`, where `x` is the column and `y` the row.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Whether the cell at `(x, y)` is ink (non-zero).
    #[inline]
    pub fn is_ink(&self, x: usize, y: usize) -> bool {
        self.get(x, y) != 0
    }

    /// A copy with row order reversed (image top becomes last row).
    pub fn flipped_rows(&self) -> PixelGrid {
        let mut data = Vec::with_capacity(self.data.len());
        for y in (0..self.height).rev() {
            let start = y * self.width;
            data.extend_from_slice(&self.data[start..start + self.width]);
        }
        PixelGrid {
            width: self.width,
            height: self.height,
            data,
        }
    }
}
