//! Naive reference kernel
//!
//! Cell `(i, j)` is found by looking up, for every stored entry `(k, v)` of
//! `A`'s row `i`, the entry with index `j` in `B`'s row `k`. Costs
//! `O(width_A · width_B)` per cell but needs no transpose and no sorted rows,
//! which makes it the oracle for the merge-join kernels.

use std::ops::AddAssign;

use log::debug;
use num_traits::Num;

use crate::error::Result;
use crate::kernels::assemble_rows;
use crate::matrix::EllpackMatrix;

/// Multiplies `a` by `b` without transposing
///
/// Entries of `a` whose index has no matching row in `b` contribute nothing.
pub fn multiply_naive<T>(a: &EllpackMatrix<T>, b: &EllpackMatrix<T>) -> Result<EllpackMatrix<T>>
where
    T: Copy + Num + AddAssign,
{
    a.ensure_valid("naive multiplication")?;
    b.ensure_valid("naive multiplication")?;

    debug!(
        "naive multiplication: {} x {} (width {}) by {} x {} (width {})",
        a.height, a.real_width, a.width, b.height, b.real_width, b.width
    );

    assemble_rows(
        "naive multiplication",
        a.height,
        b.real_width,
        b.real_width,
        |i, j| {
            let mut sum = T::zero();
            for (k, a_val) in a.row_iter(i) {
                if k >= b.height {
                    continue;
                }
                if let Some((_, b_val)) = b.row_iter(k).find(|&(col, _)| col == j) {
                    sum += a_val * b_val;
                }
            }
            sum
        },
    )
}
