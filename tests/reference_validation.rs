//! Validation of ELLPACK products against sprs

use ellmul::{from_sprs_csr, multiply_linear, multiply_naive, multiply_vectorized, to_sprs_csr, EllpackMatrix};
use sprs::TriMat;

/// Deterministic sparse matrix with roughly `density` of its cells filled
fn generate_matrix(rows: usize, cols: usize, density: f64, seed: u64) -> EllpackMatrix<f32> {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as u32
    };

    let threshold = (density * u32::MAX as f64 / 2.0) as u32;
    let rows = (0..rows)
        .map(|_| {
            (0..cols)
                .filter_map(|col| {
                    if next() < threshold {
                        Some((col, (next() % 9) as f32 - 4.0))
                    } else {
                        None
                    }
                })
                .collect()
        })
        .collect();
    EllpackMatrix::from_rows(cols, rows).unwrap()
}

fn assert_matches_sprs(a: &EllpackMatrix<f32>, b: &EllpackMatrix<f32>) {
    let a_csr = to_sprs_csr(a).unwrap();
    let b_csr = to_sprs_csr(b).unwrap();
    let reference = from_sprs_csr(&a_csr * &b_csr).unwrap();

    for product in [
        multiply_linear(a, b).unwrap(),
        multiply_vectorized(a, b).unwrap(),
        multiply_naive(a, b).unwrap(),
    ] {
        assert_eq!(product.height, reference.height);
        assert_eq!(product.real_width, reference.real_width);
        assert!(
            product.approx_eq(&reference, 1e-3),
            "product differs from sprs:\n{:?}\n{:?}",
            product,
            reference
        );
    }
}

#[test]
fn test_square_products() {
    for seed in 1..6 {
        let a = generate_matrix(40, 40, 0.1, seed);
        let b = generate_matrix(40, 40, 0.1, seed + 100);
        assert_matches_sprs(&a, &b);
    }
}

#[test]
fn test_rectangular_products() {
    let a = generate_matrix(25, 60, 0.15, 7);
    let b = generate_matrix(60, 13, 0.2, 8);
    assert_matches_sprs(&a, &b);
}

#[test]
fn test_dense_rows_exercise_lanes() {
    let a = generate_matrix(8, 32, 0.9, 11);
    let b = generate_matrix(32, 8, 0.9, 12);
    assert_matches_sprs(&a, &b);
}

#[test]
fn test_from_triplet_assembly() {
    // [0 0 3]   [1 0]
    // [4 0 0] × [0 2]
    //           [5 0]
    let mut a = TriMat::new((2, 3));
    a.add_triplet(0, 2, 3.0f32);
    a.add_triplet(1, 0, 4.0);
    let mut b = TriMat::new((3, 2));
    b.add_triplet(0, 0, 1.0f32);
    b.add_triplet(1, 1, 2.0);
    b.add_triplet(2, 0, 5.0);

    let a = from_sprs_csr(a.to_csr()).unwrap();
    let b = from_sprs_csr(b.to_csr()).unwrap();
    let r = multiply_linear(&a, &b).unwrap();

    assert_eq!(r.triplets().collect::<Vec<_>>(), vec![(0, 0, 15.0), (1, 0, 4.0)]);
    assert_matches_sprs(&a, &b);
}
