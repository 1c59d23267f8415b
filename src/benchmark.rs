//! Wall-clock timing of the multiplication kernels

use std::time::{Duration, Instant};

use log::info;

use crate::error::Result;
use crate::kernels::multiply;
use crate::matrix::{EllpackMatrix, Kernel, MultiplyConfig};

/// Largest accepted iteration count
pub const MAX_ITERATIONS: u32 = 100_000;

/// Timings of repeated runs of one kernel
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub kernel: Kernel,
    pub times: Vec<Duration>,
}

impl BenchmarkReport {
    pub fn iterations(&self) -> usize {
        self.times.len()
    }

    /// Mean time in seconds
    pub fn average(&self) -> f64 {
        if self.times.is_empty() {
            return 0.0;
        }
        self.times.iter().map(Duration::as_secs_f64).sum::<f64>() / self.times.len() as f64
    }

    /// Longest time in seconds
    pub fn max(&self) -> f64 {
        self.times.iter().map(Duration::as_secs_f64).fold(0.0, f64::max)
    }

    /// Shortest time in seconds
    pub fn min(&self) -> f64 {
        self.times
            .iter()
            .map(Duration::as_secs_f64)
            .reduce(f64::min)
            .unwrap_or(0.0)
    }
}

/// Times one multiplication with `config`
pub fn time_once(
    a: &EllpackMatrix<f32>,
    b: &EllpackMatrix<f32>,
    config: &MultiplyConfig,
) -> Result<(EllpackMatrix<f32>, Duration)> {
    let start = Instant::now();
    let result = multiply(a, b, config)?;
    Ok((result, start.elapsed()))
}

/// Runs the configured kernel `iterations` times and returns the timings
/// together with the product of the last run
pub fn run_benchmark(
    a: &EllpackMatrix<f32>,
    b: &EllpackMatrix<f32>,
    config: &MultiplyConfig,
    iterations: u32,
) -> Result<(EllpackMatrix<f32>, BenchmarkReport)> {
    let iterations = iterations.clamp(1, MAX_ITERATIONS);
    info!(
        "[BENCHMARK] Implementation {} with {} iterations",
        config.kernel, iterations
    );

    let mut times = Vec::with_capacity(iterations as usize);
    let mut last = None;
    for i in 0..iterations {
        let (result, elapsed) = time_once(a, b, config)?;
        let remaining = iterations - i - 1;
        info!(
            "[BENCHMARK] Implementation {}: iteration {} / {}: {:.6} (ETA: {:.6} secs)",
            config.kernel,
            i + 1,
            iterations,
            elapsed.as_secs_f64(),
            remaining as f64 * elapsed.as_secs_f64()
        );
        times.push(elapsed);
        last = Some(result);
    }

    let report = BenchmarkReport {
        kernel: config.kernel,
        times,
    };
    let result = match last {
        Some(result) => result,
        None => multiply(a, b, config)?,
    };
    Ok((result, report))
}
