//! Error types for ELLPACK storage, kernels and the text format

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors raised by matrix construction, transpose, the kernels and I/O
#[derive(Debug, Error)]
pub enum EllpackError {
    /// A buffer could not be reserved
    #[error("not enough memory during {operation}")]
    Allocation {
        operation: &'static str,
        #[source]
        source: TryReserveError,
    },

    /// Buffers do not hold `height * width` slots
    #[error("matrix passed to {operation} has wrong format: {values} values / {indices} indices for {height}x{width} slots")]
    InvalidMatrix {
        operation: &'static str,
        height: usize,
        width: usize,
        values: usize,
        indices: usize,
    },

    /// Dimensions that cannot describe an ELLPACK matrix
    #[error("invalid dimensions: real_width={real_width}, height={height}, width={width}")]
    InvalidDimensions {
        real_width: usize,
        height: usize,
        width: usize,
    },

    /// A stored entry lies outside the logical column range
    #[error("{operation}: row {row} stores column {column} but the matrix has {real_width} columns")]
    ColumnOutOfBounds {
        operation: &'static str,
        row: usize,
        column: usize,
        real_width: usize,
    },

    /// Left operand columns do not match right operand rows
    #[error("dimension mismatch: matrix A has {a_real_width} columns but matrix B has {b_height} rows")]
    DimensionMismatch { a_real_width: usize, b_height: usize },

    /// Malformed matrix file
    #[error("error while parsing matrix {source_name}: invalid line {line}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EllpackError>;

/// Reserve exactly `additional` slots, mapping failure to [`EllpackError::Allocation`]
pub(crate) fn reserve<T>(buffer: &mut Vec<T>, additional: usize, operation: &'static str) -> Result<()> {
    buffer
        .try_reserve_exact(additional)
        .map_err(|source| EllpackError::Allocation { operation, source })
}
