//! Transpose of an ELLPACK matrix built directly in ELLPACK form

use log::debug;
use num_traits::Num;

use crate::error::{reserve, Result};
use crate::matrix::{EllpackMatrix, RaggedRows};

impl<T> EllpackMatrix<T>
where
    T: Copy + Num,
{
    /// Returns the transpose of this matrix
    ///
    /// The result has one row per inferred column of `self`. Each result row
    /// lists the source rows holding that column in increasing row order, which
    /// is the order the merge-join kernels depend on.
    ///
    /// One read position ("walker") is kept per source row. For result row `c`
    /// every walker pointing at an entry with index `c` contributes that entry
    /// and advances, so each source entry is consumed exactly once provided the
    /// source rows are sorted.
    pub fn transpose(&self) -> Result<EllpackMatrix<T>> {
        self.ensure_valid("transpose")?;
        let height = self.infer_real_width()?;
        let lengths = self.row_lengths();

        let mut walkers = Vec::new();
        reserve(&mut walkers, self.height, "transpose")?;
        walkers.resize(self.height, 0usize);

        // a transposed row holds at most one entry per source row
        let mut scratch = Vec::new();
        reserve(&mut scratch, self.height, "transpose")?;

        let mut rows = RaggedRows::with_height(height, "transpose")?;
        for column in 0..height {
            scratch.clear();
            for (row, walker) in walkers.iter_mut().enumerate() {
                if *walker >= lengths[row] {
                    continue;
                }
                let slot = row * self.width + *walker;
                if self.indices[slot] == column {
                    scratch.push((row, self.values[slot]));
                    *walker += 1;
                }
            }
            rows.push_row(&scratch)?;
        }

        debug!(
            "transpose: {} x {} (width {}) -> {} rows (width {})",
            self.height,
            self.real_width,
            self.width,
            height,
            rows.max_width().max(1)
        );
        rows.flatten(self.height)
    }
}

/// Returns the transpose of `x`
pub fn transpose<T>(x: &EllpackMatrix<T>) -> Result<EllpackMatrix<T>>
where
    T: Copy + Num,
{
    x.transpose()
}
