//! Fixed regression cases for the multiplication kernels
//!
//! Each case is a pair of inputs with a hand-checked product. Values are
//! compared with [`TESTING_PRECISION`].

use std::io::Write;

use crate::error::Result;
use crate::kernels::multiply;
use crate::matrix::{EllpackMatrix, Kernel, MultiplyConfig};

/// Tolerance on every stored value
pub const TESTING_PRECISION: f32 = 1e-4;

/// One `A × B = R` case
pub struct RegressionCase {
    pub name: &'static str,
    pub a: EllpackMatrix<f32>,
    pub b: EllpackMatrix<f32>,
    pub expected: EllpackMatrix<f32>,
}

/// Padded buffers, `(real_width, width, height, values, indices)`
fn padded(
    real_width: usize,
    width: usize,
    height: usize,
    values: &[f32],
    indices: &[usize],
) -> Result<EllpackMatrix<f32>> {
    EllpackMatrix::from_parts(real_width, height, width, values.to_vec(), indices.to_vec())
}

fn identity(n: usize) -> Result<EllpackMatrix<f32>> {
    let indices: Vec<usize> = (0..n).collect();
    padded(n, 1, n, &vec![1.0; n], &indices)
}

fn case(
    name: &'static str,
    a: Result<EllpackMatrix<f32>>,
    b: Result<EllpackMatrix<f32>>,
    expected: Result<EllpackMatrix<f32>>,
) -> Result<RegressionCase> {
    Ok(RegressionCase {
        name,
        a: a?,
        b: b?,
        expected: expected?,
    })
}

/// All regression cases
pub fn regression_cases() -> Result<Vec<RegressionCase>> {
    let dense3 = [0, 1, 2, 0, 1, 2, 0, 1, 2];
    vec![
        case("identity 1x1", identity(1), identity(1), identity(1)),
        case("identity 2x2", identity(2), identity(2), identity(2)),
        case("identity 3x3", identity(3), identity(3), identity(3)),
        case(
            "values 1x1",
            padded(1, 1, 1, &[1.3], &[0]),
            padded(1, 1, 1, &[1.4], &[0]),
            padded(1, 1, 1, &[1.82], &[0]),
        ),
        case(
            "values 2x2",
            padded(2, 2, 2, &[2.1, 3.4, -5.7, 6.3], &[0, 1, 0, 1]),
            padded(2, 2, 2, &[-1.1, -5.0, 4.4, -0.5], &[0, 1, 0, 1]),
            padded(2, 2, 2, &[12.65, -12.2, 33.99, 25.35], &[0, 1, 0, 1]),
        ),
        case(
            "values 3x3",
            padded(3, 3, 3, &[-1.1, 0.7, 0.8, 1.4, 5.6, -4.4, 2.1, 2.3, 2.2], &dense3),
            padded(3, 3, 3, &[2.2, 5.5, 110.1, 2.3, 1.1, 2.1, 222.2, 6.6, 7.7], &dense3),
            // cell (0, 1) cancels to zero and is not stored
            padded(
                3,
                3,
                3,
                &[176.95, -113.48, 0.0, -961.72, -15.18, 132.02, 498.75, 28.6, 252.98],
                &[0, 2, 0, 0, 1, 2, 0, 1, 2],
            ),
        ),
        case(
            "sparse 2x2",
            padded(2, 2, 2, &[2.0, -1.0, 2.0, 0.0], &[0, 1, 0, 0]),
            padded(2, 2, 2, &[1.0, 4.0, 2.0, 0.0], &[0, 1, 0, 0]),
            padded(2, 2, 2, &[8.0, 0.0, 2.0, 8.0], &[1, 0, 0, 1]),
        ),
        case(
            "sparse 4x4",
            padded(4, 2, 4, &[3.0, 2.0, 11.0, 0.0, 17.0, 13.0, 5.0, 7.0], &[0, 2, 1, 0, 2, 3, 0, 1]),
            padded(4, 1, 4, &[2.0, 7.0, -3.0, 13.0], &[1, 0, 1, 3]),
            padded(4, 2, 4, &[0.0, 0.0, 77.0, 0.0, -51.0, 169.0, 49.0, 10.0], &[0, 0, 0, 0, 1, 3, 0, 1]),
        ),
        case(
            "sparse 4x5 by 5x6",
            padded(5, 2, 4, &[2.0, 11.0, 3.0, 13.0, 5.0, 0.0, 19.0, 7.0], &[0, 3, 1, 4, 2, 0, 0, 3]),
            padded(
                6,
                3,
                5,
                &[3.0, 2.0, 1.0, 3.0, 2.0, 1.0, 3.0, 2.0, 1.0, 3.0, 2.0, 1.0, 3.0, 2.0, 1.0],
                &[1, 3, 4, 1, 2, 4, 1, 3, 5, 1, 2, 4, 1, 3, 4],
            ),
            padded(
                6,
                4,
                4,
                &[39.0, 22.0, 4.0, 13.0, 48.0, 6.0, 26.0, 16.0, 15.0, 10.0, 5.0, 0.0, 78.0, 14.0, 38.0, 26.0],
                &[1, 2, 3, 4, 1, 2, 3, 4, 1, 3, 5, 0, 1, 2, 3, 4],
            ),
        ),
    ]
    .into_iter()
    .collect()
}

/// A case whose product differed from the expected matrix
pub struct RegressionFailure {
    pub case: RegressionCase,
    pub found: EllpackMatrix<f32>,
}

/// Outcome of [`run_regression`]
pub struct RegressionReport {
    pub kernel: Kernel,
    pub passed: usize,
    pub failures: Vec<RegressionFailure>,
}

impl RegressionReport {
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Dumps every failing case; prints a summary line when all passed
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        for failure in &self.failures {
            writeln!(out, "error on testcase {} with matrices:", failure.case.name)?;
            failure.case.a.dump(out, "A")?;
            failure.case.b.dump(out, "B")?;
            failure.case.expected.dump(out, "expected")?;
            failure.found.dump(out, "but found")?;
        }
        if self.all_passed() {
            writeln!(out, "-- all {} tests passed --", self.passed)?;
        }
        Ok(())
    }
}

/// Multiplies every regression case with `kernel`
pub fn run_regression(kernel: Kernel) -> Result<RegressionReport> {
    let config = MultiplyConfig::for_kernel(kernel);
    let mut report = RegressionReport {
        kernel,
        passed: 0,
        failures: Vec::new(),
    };

    for case in regression_cases()? {
        let found = multiply(&case.a, &case.b, &config)?;
        if found.approx_eq(&case.expected, TESTING_PRECISION) {
            report.passed += 1;
        } else {
            report.failures.push(RegressionFailure { case, found });
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cases_are_well_formed() {
        let cases = regression_cases().unwrap();
        assert_eq!(cases.len(), 9);
        for case in &cases {
            assert!(case.a.has_sorted_rows(), "{}", case.name);
            assert!(case.b.has_sorted_rows(), "{}", case.name);
            assert_eq!(case.a.real_width, case.b.height, "{}", case.name);
        }
    }

    #[test]
    fn test_report_output() {
        let report = run_regression(Kernel::Linear).unwrap();
        let mut out = Vec::new();
        report.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "-- all 9 tests passed --\n");
    }
}
