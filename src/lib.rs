//! # ELLMUL: fast multiplication of ELLPACK matrices
//!
//! ELLMUL stores sparse matrices in the ELLPACK format and multiplies them
//! with one of three interchangeable kernels.
//!
//! ## Overview
//!
//! - **Storage**: [`EllpackMatrix`] keeps every row in a fixed number of
//!   slots, packed left, in two parallel buffers (values and column indices).
//! - **Transpose**: [`EllpackMatrix::transpose`] builds the transpose directly
//!   in ELLPACK form, listing each column's entries by increasing row.
//! - **Kernels**:
//!   - [`multiply_linear`]: sorted merge-join against the transposed right operand
//!   - [`multiply_vectorized`]: the same merge-join, summing products four lanes at a time
//!   - [`multiply_naive`]: direct lookup, no transpose, no sortedness requirement
//!
//! The merge-join kernels require every row to list its indices in ascending
//! order and do not check it. Matrices read with [`io::read_matrix`] are
//! always sorted; for other producers use [`EllpackMatrix::has_sorted_rows`]
//! or fall back to [`multiply_naive`].
//!
//! ## Usage
//!
//! ```
//! use ellmul::{EllpackMatrix, multiply_linear};
//!
//! // A = [2 -1; 2 0], B = [1 4; 2 0]
//! let a = EllpackMatrix::from_rows(2, vec![vec![(0, 2.0f32), (1, -1.0)], vec![(0, 2.0)]])?;
//! let b = EllpackMatrix::from_rows(2, vec![vec![(0, 1.0f32), (1, 4.0)], vec![(0, 2.0)]])?;
//!
//! let r = multiply_linear(&a, &b)?;
//! // cell (0, 0) is 2·1 + (-1)·2 = 0 and is not stored
//! assert_eq!(r.row_iter(0).collect::<Vec<_>>(), vec![(1, 8.0)]);
//! assert_eq!(r.row_iter(1).collect::<Vec<_>>(), vec![(0, 2.0), (1, 8.0)]);
//! # Ok::<(), ellmul::EllpackError>(())
//! ```

pub mod benchmark;
pub mod error;
pub mod fixtures;
pub mod io;
pub mod kernels;
pub mod matrix;
pub mod utils;

// Re-export primary components
pub use error::{EllpackError, Result};
pub use kernels::{check_dimensions, multiply, multiply_linear, multiply_naive, multiply_vectorized};
pub use matrix::{detect_architecture, release_all, transpose, Architecture, EllpackMatrix, Kernel, MultiplyConfig};
pub use utils::{from_dense, from_sprs_csr, to_dense, to_sprs_csr};

/// Version information for the ELLMUL library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
