//! Utilities for converting between ELLPACK and external matrix libraries

use ndarray::Array2;
use num_traits::Num;
use sprs::CsMat;

use crate::error::{EllpackError, Result};
use crate::matrix::EllpackMatrix;
use crate::utils::exclusive_scan;

/// Converts an ELLPACK matrix to sprs CsMat in CSR format
///
/// Rows must be sorted by index and every index must be below `real_width`.
pub fn to_sprs_csr<T>(matrix: &EllpackMatrix<T>) -> Result<CsMat<T>>
where
    T: Copy + Num + Default,
{
    matrix.ensure_valid("sprs conversion")?;
    matrix.ensure_in_bounds("sprs conversion")?;
    if !matrix.has_sorted_rows() {
        return Err(EllpackError::InvalidMatrix {
            operation: "sprs conversion",
            height: matrix.height,
            width: matrix.width,
            values: matrix.values.len(),
            indices: matrix.indices.len(),
        });
    }

    let indptr = exclusive_scan(&matrix.row_lengths());
    let (indices, data): (Vec<usize>, Vec<T>) = matrix.triplets().map(|(_, col, val)| (col, val)).unzip();

    Ok(CsMat::new((matrix.height, matrix.real_width), indptr, indices, data))
}

/// Converts sprs CsMat (either storage order) to ELLPACK
///
/// Explicitly stored zeros are dropped.
pub fn from_sprs_csr<T>(matrix: CsMat<T>) -> Result<EllpackMatrix<T>>
where
    T: Copy + Num + Default,
{
    // Ensure matrix is in CSR format
    let matrix = if matrix.is_csr() {
        matrix
    } else {
        matrix.to_csr()
    };

    let (n_rows, n_cols) = matrix.shape();
    let (indptr, indices, data) = matrix.into_raw_storage();

    let rows = (0..n_rows)
        .map(|i| {
            (indptr[i]..indptr[i + 1])
                .map(|k| (indices[k], data[k]))
                .collect()
        })
        .collect();

    EllpackMatrix::from_rows(n_cols, rows)
}

/// Expands an ELLPACK matrix to a dense `height × real_width` array
///
/// Fails if a stored column is not below `real_width`.
pub fn to_dense<T>(matrix: &EllpackMatrix<T>) -> Result<Array2<T>>
where
    T: Copy + Num,
{
    matrix.ensure_valid("dense conversion")?;
    matrix.ensure_in_bounds("dense conversion")?;
    let mut dense = Array2::from_elem((matrix.height, matrix.real_width), T::zero());
    for (row, col, val) in matrix.triplets() {
        dense[[row, col]] = val;
    }
    Ok(dense)
}

/// Compresses a dense array into ELLPACK, keeping its non-zeros
pub fn from_dense<T>(dense: &Array2<T>) -> Result<EllpackMatrix<T>>
where
    T: Copy + Num,
{
    let rows = dense
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|(_, val)| !val.is_zero())
                .map(|(col, &val)| (col, val))
                .collect()
        })
        .collect();

    EllpackMatrix::from_rows(dense.ncols(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> EllpackMatrix<f64> {
        //    [1 2 0]
        //    [0 3 0]
        //    [4 0 5]
        EllpackMatrix::from_rows(
            3,
            vec![vec![(0, 1.0), (1, 2.0)], vec![(1, 3.0)], vec![(0, 4.0), (2, 5.0)]],
        )
        .unwrap()
    }

    #[test]
    fn test_sprs_roundtrip() {
        let original = sample();

        let sprs_mat = to_sprs_csr(&original).unwrap();
        assert_eq!(sprs_mat.nnz(), 5);
        assert_eq!(sprs_mat.indptr().as_slice().unwrap(), &[0, 2, 3, 5]);

        let roundtrip = from_sprs_csr(sprs_mat).unwrap();
        assert_eq!(roundtrip.height, original.height);
        assert_eq!(roundtrip.real_width, original.real_width);
        assert_eq!(roundtrip.values, original.values);
        assert_eq!(roundtrip.triplets().collect::<Vec<_>>(), original.triplets().collect::<Vec<_>>());
    }

    #[test]
    fn test_from_sprs_csc() {
        let csc = to_sprs_csr(&sample()).unwrap().to_csc();
        let back = from_sprs_csr(csc).unwrap();
        assert_eq!(back.triplets().collect::<Vec<_>>(), sample().triplets().collect::<Vec<_>>());
    }

    #[test]
    fn test_unsorted_rows_are_rejected() {
        let unsorted = EllpackMatrix::from_rows(2, vec![vec![(1, 1.0f64), (0, 2.0)]]).unwrap();
        assert!(matches!(
            to_sprs_csr(&unsorted),
            Err(EllpackError::InvalidMatrix { operation: "sprs conversion", .. })
        ));
    }

    #[test]
    fn test_out_of_range_column_is_an_error() {
        // stored out of range after construction
        let mut matrix = sample();
        matrix.indices[2] = 3;

        for result in [to_dense(&matrix).map(|_| ()), to_sprs_csr(&matrix).map(|_| ())] {
            assert!(matches!(
                result,
                Err(EllpackError::ColumnOutOfBounds { row: 1, column: 3, real_width: 3, .. })
            ));
        }
    }

    #[test]
    fn test_dense_roundtrip() {
        let dense = to_dense(&sample()).unwrap();
        assert_eq!(dense, array![[1.0, 2.0, 0.0], [0.0, 3.0, 0.0], [4.0, 0.0, 5.0]]);

        let back = from_dense(&dense).unwrap();
        assert_eq!(back.width, 2);
        assert_eq!(back.triplets().collect::<Vec<_>>(), sample().triplets().collect::<Vec<_>>());
    }
}
