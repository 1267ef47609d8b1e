// 高度场

use super::geometry::{lerp, PlanarPoint};
use crate::error::{Result, TerrainError};

/// Regular grid of `(rows + 1) x (cols + 1)` vertices, row-major.
///
/// Planar positions are fixed when the field is built; only heights change.
/// Row 0 lies at `z = -depth / 2`, column 0 at `x = -width / 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    rows: usize,
    cols: usize,
    width: f32,
    depth: f32,
    positions: Vec<PlanarPoint>,
    heights: Vec<f32>,
    /// Heights the field was built with, restored by [`HeightField::reset`]
    rest_heights: Vec<f32>,
}

impl HeightField {
    /// Flat field at height 0.
    pub fn new(rows: usize, cols: usize, width: f32, depth: f32) -> Result<Self> {
        let count = (rows + 1) * (cols + 1);
        Self::from_heights(rows, cols, width, depth, vec![0.0; count])
    }

    /// Field with explicit starting heights, `(rows + 1) * (cols + 1)` of them.
    pub fn from_heights(
        rows: usize,
        cols: usize,
        width: f32,
        depth: f32,
        heights: Vec<f32>,
    ) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(TerrainError::InvalidGrid { rows, cols });
        }
        if !(width > 0.0 && width.is_finite() && depth > 0.0 && depth.is_finite()) {
            return Err(TerrainError::InvalidExtent { width, depth });
        }
        let expected = (rows + 1) * (cols + 1);
        if heights.len() != expected {
            return Err(TerrainError::HeightCountMismatch {
                expected,
                actual: heights.len(),
            });
        }

        let cell_w = width / cols as f32;
        let cell_d = depth / rows as f32;
        let positions = (0..=rows)
            .flat_map(|row| {
                (0..=cols).map(move |col| {
                    PlanarPoint::new(
                        -width / 2.0 + col as f32 * cell_w,
                        -depth / 2.0 + row as f32 * cell_d,
                    )
                })
            })
            .collect();

        Ok(Self {
            rows,
            cols,
            width,
            depth,
            positions,
            rest_heights: heights.clone(),
            heights,
        })
    }

    /// Builds a field by evaluating `f(x, z)` at every vertex.
    pub fn from_fn(
        rows: usize,
        cols: usize,
        width: f32,
        depth: f32,
        f: impl Fn(f32, f32) -> f32,
    ) -> Result<Self> {
        let mut field = Self::new(rows, cols, width, depth)?;
        for (h, p) in field.heights.iter_mut().zip(field.positions.iter()) {
            *h = f(p.x, p.z);
        }
        field.rest_heights.clone_from(&field.heights);
        Ok(field)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Vertices per row
    pub fn row_stride(&self) -> usize {
        self.cols + 1
    }

    pub fn vertex_count(&self) -> usize {
        self.heights.len()
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row <= self.rows && col <= self.cols);
        row * (self.cols + 1) + col
    }

    pub fn positions(&self) -> &[PlanarPoint] {
        &self.positions
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn height(&self, row: usize, col: usize) -> f32 {
        self.heights[self.index(row, col)]
    }

    pub fn set_height(&mut self, row: usize, col: usize, value: f32) {
        let i = self.index(row, col);
        self.heights[i] = value;
    }

    /// World-space vertex `[x, y, z]`
    pub fn vertex(&self, index: usize) -> [f32; 3] {
        let p = self.positions[index];
        [p.x, self.heights[index], p.z]
    }

    /// Positions and heights side by side for in-place passes.
    pub(crate) fn split_mut(&mut self) -> (&[PlanarPoint], &mut [f32]) {
        (&self.positions, &mut self.heights)
    }

    /// `(min, max)` over all vertex heights.
    pub fn height_range(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            })
    }

    /// Restores the heights the field was built with.
    pub fn reset(&mut self) {
        self.heights.clone_from(&self.rest_heights);
    }

    /// Continuous `(column, row)` grid coordinates of a world position.
    /// Coordinates within [`GRID_SNAP`] of a grid line land on it, so vertex
    /// positions map back to whole indices.
    fn grid_coords(&self, x: f32, z: f32) -> (f32, f32) {
        let col = (x + self.width / 2.0) / self.width * self.cols as f32;
        let row = (z + self.depth / 2.0) / self.depth * self.rows as f32;
        (snap(col), snap(row))
    }

    /// Bilinear height at a world position.
    ///
    /// Cell indices are clamped to the grid, so positions off the field reuse
    /// the nearest edge cell.
    pub fn sample_height(&self, x: f32, z: f32) -> f32 {
        let (col, row) = self.grid_coords(x, z);

        let max_col = self.cols as isize - 1;
        let max_row = self.rows as isize - 1;
        let col0 = (col.floor() as isize).clamp(0, max_col) as usize;
        let row0 = (row.floor() as isize).clamp(0, max_row) as usize;
        let col1 = (col0 + 1).min(self.cols);
        let row1 = (row0 + 1).min(self.rows);

        let tx = (col.clamp(0.0, self.cols as f32) - col0 as f32).clamp(0.0, 1.0);
        let tz = (row.clamp(0.0, self.rows as f32) - row0 as f32).clamp(0.0, 1.0);

        let h00 = self.height(row0, col0);
        let h10 = self.height(row0, col1);
        let h01 = self.height(row1, col0);
        let h11 = self.height(row1, col1);

        let h0 = lerp(h00, h10, tx);
        let h1 = lerp(h01, h11, tx);
        lerp(h0, h1, tz)
    }

    /// Index of the vertex closest to a world position, clamped to the grid.
    pub fn nearest_vertex(&self, x: f32, z: f32) -> usize {
        let (col, row) = self.grid_coords(x, z);
        let col = (col.round().max(0.0) as usize).min(self.cols);
        let row = (row.round().max(0.0) as usize).min(self.rows);
        self.index(row, col)
    }
}

/// Grid-space tolerance for snapping onto grid lines
const GRID_SNAP: f32 = 1e-4;

fn snap(v: f32) -> f32 {
    let r = v.round();
    if (v - r).abs() < GRID_SNAP {
        r
    } else {
        v
    }
}
