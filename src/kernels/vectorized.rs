//! Merge-join kernel with four-lane product accumulation

use log::debug;

use crate::error::Result;
use crate::kernels::assemble_rows;
use crate::kernels::lanes::LaneBatch;
use crate::kernels::merge::{merge_join, StoredRow};
use crate::matrix::{detect_architecture, EllpackMatrix};

/// Multiplies `a` by `b` with the merge-join of [`multiply_linear`], batching
/// matched pairs into [`LaneBatch`]
///
/// Results equal the scalar kernel up to summation order.
///
/// [`multiply_linear`]: crate::kernels::multiply_linear
pub fn multiply_vectorized(
    a: &EllpackMatrix<f32>,
    b: &EllpackMatrix<f32>,
) -> Result<EllpackMatrix<f32>> {
    a.ensure_valid("vectorized multiplication")?;
    b.ensure_valid("vectorized multiplication")?;

    let bt = b.transpose()?;
    let a_lengths = a.row_lengths();
    let bt_lengths = bt.row_lengths();

    debug!(
        "vectorized multiplication ({} lanes): {} x {} (width {}) by {} x {} (width {})",
        detect_architecture().lane_backend(),
        a.height,
        a.real_width,
        a.width,
        b.height,
        b.real_width,
        b.width
    );

    assemble_rows(
        "vectorized multiplication",
        a.height,
        // columns past `b.real_width` are outside the product
        bt.height.min(b.real_width),
        b.real_width,
        |i, j| {
            let mut batch = LaneBatch::new();
            merge_join(
                StoredRow::of(a, i, a_lengths[i]),
                StoredRow::of(&bt, j, bt_lengths[j]),
                |x, y| batch.push(x, y),
            );
            batch.finish()
        },
    )
}
