//! Ragged row accumulation and compaction into ELLPACK form

use log::trace;
use num_traits::Num;

use crate::error::{reserve, EllpackError, Result};
use crate::matrix::EllpackMatrix;

/// Rows of `(column, value)` entries built so far, each sized to its content
///
/// Transpose and the kernels produce one row at a time without knowing the
/// final compressed width. Every row pushed here is owned by the container, so
/// an early return drops exactly the rows that were built.
pub struct RaggedRows<T> {
    rows: Vec<Vec<(usize, T)>>,
    max_width: usize,
    operation: &'static str,
}

impl<T> RaggedRows<T>
where
    T: Copy + Num,
{
    /// Reserves room for `height` rows; `operation` names allocation failures
    pub fn with_height(height: usize, operation: &'static str) -> Result<Self> {
        let mut rows = Vec::new();
        reserve(&mut rows, height, operation)?;
        Ok(Self {
            rows,
            max_width: 0,
            operation,
        })
    }

    /// Appends a row, skipping zero values
    pub fn push_row(&mut self, entries: &[(usize, T)]) -> Result<()> {
        let len = entries.iter().filter(|(_, val)| !val.is_zero()).count();
        let mut row = Vec::new();
        reserve(&mut row, len, self.operation)?;
        row.extend(entries.iter().copied().filter(|(_, val)| !val.is_zero()));

        self.max_width = self.max_width.max(len);
        self.rows.push(row);
        Ok(())
    }

    /// Number of rows pushed so far
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Longest row pushed so far
    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// Packs the rows into a matrix whose width is the longest row
    ///
    /// The width is at least 1, so a matrix without entries keeps a single
    /// padding column. Every column must be below `real_width`.
    pub fn flatten(self, real_width: usize) -> Result<EllpackMatrix<T>> {
        let width = self.max_width.max(1);
        let mut matrix = EllpackMatrix::new(real_width, self.rows.len(), width)?;

        for (i, row) in self.rows.into_iter().enumerate() {
            let start = i * width;
            for (slot, (col, val)) in row.into_iter().enumerate() {
                if col >= real_width {
                    return Err(EllpackError::ColumnOutOfBounds {
                        operation: self.operation,
                        row: i,
                        column: col,
                        real_width,
                    });
                }
                matrix.indices[start + slot] = col;
                matrix.values[start + slot] = val;
            }
        }

        trace!(
            "{}: flattened {} rows into width {}",
            self.operation,
            matrix.height,
            width
        );
        Ok(matrix)
    }
}
