//! Utility functions and helpers

pub mod formats;

pub use formats::{from_dense, from_sprs_csr, to_dense, to_sprs_csr};

/// Computes an exclusive prefix sum (scan) for a vector
///
/// Turns per-row entry counts into CSR row pointers.
pub fn exclusive_scan(input: &[usize]) -> Vec<usize> {
    let mut result = Vec::with_capacity(input.len() + 1);
    let mut sum = 0;

    result.push(0); // First element is always 0

    for &val in input {
        sum += val;
        result.push(sum);
    }

    result
}
