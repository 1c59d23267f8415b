//! Scalar merge-join kernel
//!
//! `B` is transposed first, so cell `(i, j)` of the product is the dot product
//! of `A`'s row `i` and `Bᵀ`'s row `j`. Both rows list their entries by
//! ascending index, so the dot product is a two-cursor intersection that runs
//! in `O(width_A + width_B)` per cell.

use std::cmp::Ordering;
use std::ops::AddAssign;

use log::debug;
use num_traits::Num;

use crate::error::Result;
use crate::kernels::assemble_rows;
use crate::matrix::EllpackMatrix;

/// The stored prefix of one row
#[derive(Clone, Copy)]
pub(crate) struct StoredRow<'a, T> {
    pub indices: &'a [usize],
    pub values: &'a [T],
}

impl<'a, T> StoredRow<'a, T>
where
    T: Copy + Num,
{
    pub fn of(matrix: &'a EllpackMatrix<T>, i: usize, len: usize) -> Self {
        Self {
            indices: &matrix.row_indices(i)[..len],
            values: &matrix.row_values(i)[..len],
        }
    }
}

/// Walks two ascending rows and calls `on_match` for each equal index
#[inline]
pub(crate) fn merge_join<T, F>(a: StoredRow<'_, T>, b: StoredRow<'_, T>, mut on_match: F)
where
    T: Copy,
    F: FnMut(T, T),
{
    let (mut p, mut q) = (0, 0);
    while p < a.indices.len() && q < b.indices.len() {
        match a.indices[p].cmp(&b.indices[q]) {
            Ordering::Equal => {
                on_match(a.values[p], b.values[q]);
                p += 1;
                q += 1;
            }
            Ordering::Greater => q += 1,
            Ordering::Less => p += 1,
        }
    }
}

/// Multiplies `a` by `b` with the scalar merge-join
///
/// Rows of both inputs must be sorted by index. The result has `a.height`
/// rows and `b.real_width` columns.
pub fn multiply_linear<T>(a: &EllpackMatrix<T>, b: &EllpackMatrix<T>) -> Result<EllpackMatrix<T>>
where
    T: Copy + Num + AddAssign,
{
    a.ensure_valid("linear multiplication")?;
    b.ensure_valid("linear multiplication")?;

    let bt = b.transpose()?;
    let a_lengths = a.row_lengths();
    let bt_lengths = bt.row_lengths();

    debug!(
        "linear multiplication: {} x {} (width {}) by {} x {} (width {})",
        a.height, a.real_width, a.width, b.height, b.real_width, b.width
    );

    assemble_rows(
        "linear multiplication",
        a.height,
        // columns past `b.real_width` are outside the product
        bt.height.min(b.real_width),
        b.real_width,
        |i, j| {
            let mut sum = T::zero();
            merge_join(
                StoredRow::of(a, i, a_lengths[i]),
                StoredRow::of(&bt, j, bt_lengths[j]),
                |x, y| sum += x * y,
            );
            sum
        },
    )
}
