//! Multiplication kernels for ELLPACK matrices
//!
//! All kernels compute `R = A × B` for `A` of logical size `M×N` and `B` of
//! logical size `N×P` and return a freshly allocated `R` whose compressed
//! width is the longest result row:
//!
//! - [`multiply_linear`]: merge-join of `A`'s rows against the rows of `Bᵀ`
//! - [`multiply_vectorized`]: the same merge-join, products summed four lanes at a time
//! - [`multiply_naive`]: direct lookup in `B`, the oracle for the other two
//!
//! The merge-join kernels require ascending indices in every row of `A` and
//! `B` and do not check it; out-of-order rows give wrong products. The naive
//! kernel has no such requirement.
//!
//! No kernel checks that `A`'s column count matches `B`'s row count. Callers
//! use [`check_dimensions`] before multiplying.

pub mod lanes;
pub mod merge;
pub mod naive;
pub mod vectorized;

use num_traits::Num;

use crate::error::{reserve, EllpackError, Result};
use crate::matrix::{EllpackMatrix, Kernel, MultiplyConfig, RaggedRows};

pub use merge::multiply_linear;
pub use naive::multiply_naive;
pub use vectorized::multiply_vectorized;

/// Checks that `A`'s column count equals `B`'s row count
pub fn check_dimensions<T>(a: &EllpackMatrix<T>, b: &EllpackMatrix<T>) -> Result<()> {
    if a.real_width != b.height {
        return Err(EllpackError::DimensionMismatch {
            a_real_width: a.real_width,
            b_height: b.height,
        });
    }
    Ok(())
}

/// Multiplies `a` by `b` with the kernel selected in `config`
pub fn multiply(
    a: &EllpackMatrix<f32>,
    b: &EllpackMatrix<f32>,
    config: &MultiplyConfig,
) -> Result<EllpackMatrix<f32>> {
    match config.kernel {
        Kernel::Linear => multiply_linear(a, b),
        Kernel::Vectorized => multiply_vectorized(a, b),
        Kernel::Naive => multiply_naive(a, b),
    }
}

/// Builds a `height`-row result by evaluating `cell(i, j)` for every candidate
/// column `j < candidates`; only non-zero sums are stored
pub(crate) fn assemble_rows<T, F>(
    operation: &'static str,
    height: usize,
    candidates: usize,
    real_width: usize,
    mut cell: F,
) -> Result<EllpackMatrix<T>>
where
    T: Copy + Num,
    F: FnMut(usize, usize) -> T,
{
    let mut scratch = Vec::new();
    reserve(&mut scratch, candidates, operation)?;

    let mut rows = RaggedRows::with_height(height, operation)?;
    for i in 0..height {
        scratch.clear();
        for j in 0..candidates {
            let sum = cell(i, j);
            if !sum.is_zero() {
                scratch.push((j, sum));
            }
        }
        rows.push_row(&scratch)?;
    }

    rows.flatten(real_width)
}
