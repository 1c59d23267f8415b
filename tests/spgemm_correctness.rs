//! Correctness tests for the three multiplication kernels

use ellmul::fixtures::{regression_cases, run_regression, TESTING_PRECISION};
use ellmul::{
    check_dimensions, multiply, multiply_linear, multiply_naive, multiply_vectorized, EllpackError,
    EllpackMatrix, Kernel, MultiplyConfig,
};

fn row(matrix: &EllpackMatrix<f32>, i: usize) -> Vec<(usize, f32)> {
    matrix.row_iter(i).collect()
}

fn all_kernels(a: &EllpackMatrix<f32>, b: &EllpackMatrix<f32>) -> Vec<(Kernel, EllpackMatrix<f32>)> {
    Kernel::ALL
        .iter()
        .map(|&kernel| (kernel, multiply(a, b, &MultiplyConfig::for_kernel(kernel)).unwrap()))
        .collect()
}

/// A tridiagonal matrix with 2 on the diagonal and -1 beside it
fn tridiagonal(n: usize) -> EllpackMatrix<f32> {
    let rows = (0..n)
        .map(|i| {
            let mut row = Vec::new();
            if i > 0 {
                row.push((i - 1, -1.0));
            }
            row.push((i, 2.0));
            if i + 1 < n {
                row.push((i + 1, -1.0));
            }
            row
        })
        .collect();
    EllpackMatrix::from_rows(n, rows).unwrap()
}

fn diagonal(values: &[f32]) -> EllpackMatrix<f32> {
    let rows = values.iter().enumerate().map(|(i, &v)| vec![(i, v)]).collect();
    EllpackMatrix::from_rows(values.len(), rows).unwrap()
}

#[test]
fn test_small_product_with_cancellation() {
    // A = [2 -1; 2 0], B = [1 4; 2 0], R = [0 8; 2 8]
    let a = EllpackMatrix::from_rows(2, vec![vec![(0, 2.0), (1, -1.0)], vec![(0, 2.0)]]).unwrap();
    let b = EllpackMatrix::from_rows(2, vec![vec![(0, 1.0), (1, 4.0)], vec![(0, 2.0)]]).unwrap();

    for (kernel, r) in all_kernels(&a, &b) {
        assert_eq!(r.height, 2, "{}", kernel);
        assert_eq!(r.real_width, 2, "{}", kernel);
        assert_eq!(r.width, 2, "{}", kernel);
        assert_eq!(row(&r, 0), vec![(1, 8.0)], "{}", kernel);
        assert_eq!(row(&r, 1), vec![(0, 2.0), (1, 8.0)], "{}", kernel);
    }
}

#[test]
fn test_one_by_one_identity() {
    let one = diagonal(&[1.0]);
    for (kernel, r) in all_kernels(&one, &one) {
        assert_eq!(r.height, 1, "{}", kernel);
        assert_eq!(r.width, 1, "{}", kernel);
        assert_eq!(r.values, vec![1.0], "{}", kernel);
        assert_eq!(r.indices, vec![0], "{}", kernel);
    }
}

#[test]
fn test_diagonal_scaling() {
    let d = diagonal(&[2.0, 3.0, 4.0, 5.0]);
    let t = tridiagonal(4);

    for (kernel, r) in all_kernels(&d, &t) {
        assert_eq!(row(&r, 0), vec![(0, 4.0), (1, -2.0)], "{}", kernel);
        assert_eq!(row(&r, 2), vec![(1, -4.0), (2, 8.0), (3, -4.0)], "{}", kernel);
        assert_eq!(row(&r, 3), vec![(2, -5.0), (3, 10.0)], "{}", kernel);
    }
}

#[test]
fn test_tridiagonal_square() {
    // T² is pentadiagonal: 5 on the inner diagonal, 6 at the corners
    let t = tridiagonal(6);

    for (kernel, r) in all_kernels(&t, &t) {
        assert_eq!(r.width, 5, "{}", kernel);
        assert_eq!(row(&r, 0), vec![(0, 5.0), (1, -4.0), (2, 1.0)], "{}", kernel);
        assert_eq!(
            row(&r, 3),
            vec![(1, 1.0), (2, -4.0), (3, 6.0), (4, -4.0), (5, 1.0)],
            "{}",
            kernel
        );
        assert_eq!(row(&r, 5), vec![(3, 1.0), (4, -4.0), (5, 5.0)], "{}", kernel);
    }
}

#[test]
fn test_regression_cases_pass_for_every_kernel() {
    let total = regression_cases().unwrap().len();
    for kernel in Kernel::ALL {
        let report = run_regression(kernel).unwrap();
        assert!(report.all_passed(), "kernel {} failed {} cases", kernel, report.failures.len());
        assert_eq!(report.passed, total);

        let mut out = Vec::new();
        report.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("-- all {} tests passed --\n", total));
    }
}

#[test]
fn test_results_never_store_zeros() {
    // [1 1] × [1; -1] cancels to an empty row
    let a = EllpackMatrix::from_rows(2, vec![vec![(0, 1.0), (1, 1.0)], vec![(1, 3.0)]]).unwrap();
    let b = EllpackMatrix::from_rows(1, vec![vec![(0, 1.0)], vec![(0, -1.0)]]).unwrap();

    for (kernel, r) in all_kernels(&a, &b) {
        assert_eq!(r.width, 1, "{}", kernel);
        assert_eq!(r.row_len(0), 0, "{}", kernel);
        assert_eq!(row(&r, 1), vec![(0, -3.0)], "{}", kernel);
        assert!(r.triplets().all(|(_, _, v)| v != 0.0), "{}", kernel);
    }
}

#[test]
fn test_empty_product_keeps_width_one() {
    let a = EllpackMatrix::from_rows(2, vec![vec![(0, 1.0f32)], vec![]]).unwrap();
    let b = EllpackMatrix::from_rows(3, vec![vec![], vec![(2, 1.0)]]).unwrap();

    for (kernel, r) in all_kernels(&a, &b) {
        assert_eq!(r.height, 2, "{}", kernel);
        assert_eq!(r.real_width, 3, "{}", kernel);
        assert_eq!(r.width, 1, "{}", kernel);
        assert_eq!(r.nnz(), 0, "{}", kernel);
    }
}

#[test]
fn test_unsorted_rows_break_merge_join() {
    // row 0 of A lists column 1 before column 0
    let a = EllpackMatrix::from_rows(2, vec![vec![(1, 1.0f32), (0, 1.0)]]).unwrap();
    let identity = diagonal(&[1.0, 1.0]);
    assert!(!a.has_sorted_rows());

    let naive = multiply_naive(&a, &identity).unwrap();
    assert_eq!(row(&naive, 0), vec![(0, 1.0), (1, 1.0)]);

    // the merge walk skips past column 0 and never returns to it
    let linear = multiply_linear(&a, &identity).unwrap();
    assert_eq!(row(&linear, 0), vec![(1, 1.0)]);
    let vectorized = multiply_vectorized(&a, &identity).unwrap();
    assert_eq!(row(&vectorized, 0), vec![(1, 1.0)]);
}

#[test]
fn test_columns_past_real_width_stay_out_of_the_product() {
    assert!(matches!(
        EllpackMatrix::from_rows(1, vec![vec![(3, 2.0f32)]]),
        Err(EllpackError::ColumnOutOfBounds { .. })
    ));

    // a column moved out of range through the public buffers
    let a = diagonal(&[1.0]);
    let mut b = diagonal(&[2.0]);
    b.indices[0] = 3;

    for (kernel, r) in all_kernels(&a, &b) {
        assert_eq!(r.real_width, 1, "{}", kernel);
        assert_eq!(r.nnz(), 0, "{}", kernel);
    }
}

#[test]
fn test_vectorized_long_rows_within_tolerance() {
    // 11 products per cell: two full lane batches and a three-element tail
    let n = 11;
    let a_rows = (0..3)
        .map(|i| (0..n).map(|k| (k, 0.1 * (k + i + 1) as f32)).collect())
        .collect();
    let a = EllpackMatrix::from_rows(n, a_rows).unwrap();
    let b_rows = (0..n).map(|k| vec![(0, 1.0 / (k + 1) as f32), (1, 0.3)]).collect();
    let b = EllpackMatrix::from_rows(2, b_rows).unwrap();

    let linear = multiply_linear(&a, &b).unwrap();
    let vectorized = multiply_vectorized(&a, &b).unwrap();
    assert!(vectorized.approx_eq(&linear, TESTING_PRECISION));
}

#[test]
fn test_dimension_check() {
    let a = EllpackMatrix::from_rows(3, vec![vec![(2, 1.0f32)]]).unwrap();
    let b = diagonal(&[1.0, 1.0]);

    assert!(matches!(
        check_dimensions(&a, &b),
        Err(EllpackError::DimensionMismatch { a_real_width: 3, b_height: 2 })
    ));
    assert!(check_dimensions(&b, &b).is_ok());
}

#[test]
fn test_integer_kernels_agree() {
    let a = EllpackMatrix::from_rows(3, vec![vec![(0, 2i64), (2, 3)], vec![(1, -1)]]).unwrap();
    let b = EllpackMatrix::from_rows(2, vec![vec![(1, 5i64)], vec![(0, 7)], vec![(0, 1), (1, 1)]]).unwrap();

    let linear = multiply_linear(&a, &b).unwrap();
    let naive = multiply_naive(&a, &b).unwrap();
    assert_eq!(linear.triplets().collect::<Vec<_>>(), vec![(0, 0, 3), (0, 1, 13), (1, 0, -7)]);
    assert_eq!(linear.triplets().collect::<Vec<_>>(), naive.triplets().collect::<Vec<_>>());
}
