//! ELLPACK (fixed row capacity) sparse matrix format implementation

use std::fmt;
use std::io::Write;

use log::debug;
use num_traits::Num;

use crate::error::{reserve, EllpackError, Result};
use crate::matrix::RaggedRows;

/// A sparse matrix in ELLPACK format
///
/// Every row owns `width` slots in two parallel row-major buffers:
/// - values: `height * width` entries, the stored non-zero values
/// - indices: `height * width` entries, the column index of each value
///
/// The first `k` slots of a row hold its `k` non-zeros in ascending column
/// order with no gaps; the remaining slots hold zero and act as the end-of-row
/// marker, so an explicit zero entry is never stored.
///
/// Ascending order inside a row is a producer contract. Construction does not
/// check it and the merge-join kernels rely on it; see [`has_sorted_rows`].
///
/// [`has_sorted_rows`]: EllpackMatrix::has_sorted_rows
#[derive(Clone)]
pub struct EllpackMatrix<T> {
    /// Number of columns of the conceptual dense matrix
    pub real_width: usize,

    /// Number of rows
    pub height: usize,

    /// Compressed row capacity (maximum stored entries over all rows)
    pub width: usize,

    /// Stored values, row-major (size: height * width)
    pub values: Vec<T>,

    /// Column index of each stored value, row-major (size: height * width)
    pub indices: Vec<usize>,
}

fn check_shape(real_width: usize, height: usize, width: usize) -> Result<usize> {
    let invalid = EllpackError::InvalidDimensions {
        real_width,
        height,
        width,
    };
    if real_width == 0 || height == 0 || width == 0 || width > real_width {
        return Err(invalid);
    }
    height.checked_mul(width).ok_or(invalid)
}

impl<T> EllpackMatrix<T>
where
    T: Copy + Num,
{
    /// Creates a zero-filled matrix with both buffers sized `height * width`
    ///
    /// # Errors
    ///
    /// - [`EllpackError::InvalidDimensions`] if a dimension is zero or `width > real_width`
    /// - [`EllpackError::Allocation`] if a buffer cannot be reserved
    pub fn new(real_width: usize, height: usize, width: usize) -> Result<Self> {
        let len = check_shape(real_width, height, width)?;

        let mut values = Vec::new();
        reserve(&mut values, len, "construct")?;
        values.resize(len, T::zero());

        let mut indices = Vec::new();
        reserve(&mut indices, len, "construct")?;
        indices.resize(len, 0);

        Ok(Self {
            real_width,
            height,
            width,
            values,
            indices,
        })
    }

    /// Creates a matrix from already padded row-major buffers
    pub fn from_parts(
        real_width: usize,
        height: usize,
        width: usize,
        values: Vec<T>,
        indices: Vec<usize>,
    ) -> Result<Self> {
        check_shape(real_width, height, width)?;
        let matrix = Self {
            real_width,
            height,
            width,
            values,
            indices,
        };
        matrix.ensure_valid("from_parts")?;
        matrix.ensure_in_bounds("from_parts")?;
        Ok(matrix)
    }

    /// Creates a matrix from ragged `(column, value)` rows
    ///
    /// The compressed width becomes the longest row. Zero values are dropped.
    pub fn from_rows(real_width: usize, rows: Vec<Vec<(usize, T)>>) -> Result<Self> {
        let mut ragged = RaggedRows::with_height(rows.len(), "flatten")?;
        for row in &rows {
            ragged.push_row(row)?;
        }
        ragged.flatten(real_width)
    }

    /// Returns true if both buffers hold exactly `height * width` slots
    pub fn is_valid(&self) -> bool {
        match self.height.checked_mul(self.width) {
            Some(len) => self.values.len() == len && self.indices.len() == len,
            None => false,
        }
    }

    pub(crate) fn ensure_valid(&self, operation: &'static str) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(EllpackError::InvalidMatrix {
                operation,
                height: self.height,
                width: self.width,
                values: self.values.len(),
                indices: self.indices.len(),
            })
        }
    }

    /// Fails on the first stored entry whose column is not below `real_width`
    pub(crate) fn ensure_in_bounds(&self, operation: &'static str) -> Result<()> {
        match self.triplets().find(|&(_, col, _)| col >= self.real_width) {
            Some((row, column, _)) => Err(EllpackError::ColumnOutOfBounds {
                operation,
                row,
                column,
                real_width: self.real_width,
            }),
            None => Ok(()),
        }
    }

    /// All `width` value slots of row `i`, padding included
    pub fn row_values(&self, i: usize) -> &[T] {
        assert!(i < self.height, "Row index out of bounds");
        &self.values[i * self.width..(i + 1) * self.width]
    }

    /// All `width` index slots of row `i`, padding included
    pub fn row_indices(&self, i: usize) -> &[usize] {
        assert!(i < self.height, "Row index out of bounds");
        &self.indices[i * self.width..(i + 1) * self.width]
    }

    /// Number of stored entries in row `i` (slots before the first zero)
    pub fn row_len(&self, i: usize) -> usize {
        self.row_values(i)
            .iter()
            .position(|v| v.is_zero())
            .unwrap_or(self.width)
    }

    /// Stored entry count of every row
    pub fn row_lengths(&self) -> Vec<usize> {
        (0..self.height).map(|i| self.row_len(i)).collect()
    }

    /// Returns an iterator over the stored entries of row i
    ///
    /// Each item is a tuple (col_idx, value)
    pub fn row_iter(&self, i: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        self.row_indices(i)
            .iter()
            .copied()
            .zip(self.row_values(i).iter().copied())
            .take_while(|(_, val)| !val.is_zero())
    }

    /// Iterates `(row, column, value)` over all stored entries in row-major order
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        (0..self.height).flat_map(move |i| self.row_iter(i).map(move |(col, val)| (i, col, val)))
    }

    /// Returns the number of stored non-zero elements
    pub fn nnz(&self) -> usize {
        (0..self.height).map(|i| self.row_len(i)).sum()
    }

    /// Finds the narrowest real width that holds every row
    ///
    /// Reads the index of the last stored entry of each row and returns
    /// `1 + max`. A matrix without stored entries yields 1.
    pub fn infer_real_width(&self) -> Result<usize> {
        self.ensure_valid("realwidth")?;
        let widest = (0..self.height)
            .filter_map(|i| match self.row_len(i) {
                0 => None,
                len => Some(self.indices[i * self.width + len - 1]),
            })
            .max();
        Ok(widest.map_or(1, |col| col + 1))
    }

    /// Returns true if every row stores its indices in strictly ascending order
    pub fn has_sorted_rows(&self) -> bool {
        (0..self.height).all(|i| {
            let len = self.row_len(i);
            self.row_indices(i)[..len].windows(2).all(|w| w[0] < w[1])
        })
    }

    /// Writes both buffers as labelled grids
    pub fn dump<W: Write>(&self, out: &mut W, name: &str) -> Result<()>
    where
        T: fmt::Display,
    {
        self.ensure_valid("dump")?;
        writeln!(out, "---- MATRIX {} ----\n", name)?;
        writeln!(out, "---- Indices ----")?;
        for i in 0..self.height {
            for idx in self.row_indices(i) {
                write!(out, "| {} ", idx)?;
            }
            writeln!(out, "|")?;
        }
        writeln!(out, "\n---- Values ----")?;
        for i in 0..self.height {
            for val in self.row_values(i) {
                write!(out, "| {:.6} ", val)?;
            }
            writeln!(out, "|")?;
        }
        writeln!(out, "\n---- END MATRIX ----")?;
        Ok(())
    }

    /// Compares shape and stored entries, allowing `tolerance` on each value
    ///
    /// Padding indices are ignored.
    pub fn approx_eq(&self, other: &Self, tolerance: T) -> bool
    where
        T: PartialOrd,
    {
        if self.height != other.height || self.width != other.width {
            return false;
        }
        (0..self.height).all(|i| {
            self.row_len(i) == other.row_len(i)
                && self.row_iter(i).zip(other.row_iter(i)).all(|((c1, v1), (c2, v2))| {
                    let diff = if v1 > v2 { v1 - v2 } else { v2 - v1 };
                    c1 == c2 && diff < tolerance
                })
        })
    }
}

/// Releases a group of matrices in order
pub fn release_all<T, I>(matrices: I)
where
    I: IntoIterator<Item = EllpackMatrix<T>>,
{
    for (n, matrix) in matrices.into_iter().enumerate() {
        debug!(
            "releasing matrix {} ({} x {}, width {})",
            n, matrix.height, matrix.real_width, matrix.width
        );
        drop(matrix);
    }
}

impl<T: fmt::Debug + Copy + Num> fmt::Debug for EllpackMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "EllpackMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.height, self.real_width)?;
        writeln!(f, "  width: {}", self.width)?;

        if !self.is_valid() {
            return write!(f, "  (invalid buffers)\n}}");
        }

        writeln!(f, "  nnz: {}", self.nnz())?;

        let max_rows_to_print = 5.min(self.height);
        writeln!(f, "  content sample:")?;

        for i in 0..max_rows_to_print {
            write!(f, "    row {}: ", i)?;
            let len = self.row_len(i);

            if len == 0 {
                writeln!(f, "(empty)")?;
                continue;
            }

            let max_elements = 5.min(len);
            for (col, val) in self.row_iter(i).take(max_elements) {
                write!(f, "({}, {:?}) ", col, val)?;
            }
            if len > max_elements {
                write!(f, "... ({} more)", len - max_elements)?;
            }
            writeln!(f)?;
        }

        if self.height > max_rows_to_print {
            writeln!(f, "    ... ({} more rows)", self.height - max_rows_to_print)?;
        }

        write!(f, "}}")
    }
}
