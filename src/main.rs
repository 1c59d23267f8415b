//! ellmul: multiply two ELLPACK matrix files
//!
//! Usage:
//!   ellmul -a a.mat -b b.mat -o out.mat -V 1
//!   ellmul -a a.mat -b b.mat -B 20          # benchmark 20 runs
//!   ellmul -T 2                             # regression cases, naive kernel

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use ellmul::benchmark::{run_benchmark, MAX_ITERATIONS};
use ellmul::fixtures::run_regression;
use ellmul::io::{read_matrix, write_matrix};
use ellmul::{check_dimensions, multiply, release_all, EllpackMatrix, Kernel, MultiplyConfig, Result};

/// Fast multiplication of ELLPACK matrices
#[derive(Parser, Debug)]
#[command(name = "ellmul", author, about, long_about = None, disable_version_flag = true)]
struct Args {
    /// Path to input matrix A
    #[arg(short = 'a', long, value_name = "FILE", default_value = "a.mat")]
    amatrix: PathBuf,

    /// Path to input matrix B
    #[arg(short = 'b', long, value_name = "FILE", default_value = "b.mat")]
    bmatrix: PathBuf,

    /// Path to output matrix
    #[arg(short = 'o', long, value_name = "FILE", default_value = "out.mat")]
    output: PathBuf,

    /// Which implementation to run (0 linear, 1 vectorized, 2 naive)
    #[arg(short = 'V', long = "impl", default_value = "0", value_parser = clap::value_parser!(u8).range(0..=2))]
    implementation: u8,

    /// Benchmark with the given number of iterations
    #[arg(
        short = 'B',
        long,
        value_name = "N",
        num_args = 0..=1,
        default_missing_value = "10",
        value_parser = clap::value_parser!(u32).range(1..=MAX_ITERATIONS as i64)
    )]
    benchmark: Option<u32>,

    /// Run the regression cases against an implementation and exit
    #[arg(short = 'T', long, value_name = "IMPL", value_parser = clap::value_parser!(u8).range(0..=2))]
    test: Option<u8>,

    /// Produce verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn kernel_for(index: u8) -> Kernel {
    // clap restricts the range to 0..=2
    Kernel::from_index(index).unwrap_or(Kernel::Linear)
}

fn load(label: &str, path: &Path) -> Result<EllpackMatrix<f32>> {
    info!("[LOAD] Loading matrix {} ...", label);
    let matrix = read_matrix(path)?;
    info!(
        "[DONE] Matrix {} loaded, dimensions: [{} (formerly {}) x {}]",
        label, matrix.width, matrix.real_width, matrix.height
    );
    Ok(matrix)
}

fn run(args: &Args) -> Result<bool> {
    if let Some(target) = args.test {
        let report = run_regression(kernel_for(target))?;
        report.write_to(&mut io::stdout().lock())?;
        return Ok(report.all_passed());
    }

    info!("ellmul version v{}", ellmul::VERSION);

    let a = load("A", &args.amatrix)?;
    let b = load("B", &args.bmatrix)?;
    check_dimensions(&a, &b)?;
    info!("[LOAD_COMPLETE] Ready for multiplication");

    let config = MultiplyConfig::for_kernel(kernel_for(args.implementation));
    info!("[MUL] Multiplication with implementation {} in progress ...", config.kernel);

    let result = match args.benchmark {
        Some(iterations) => {
            let (result, report) = run_benchmark(&a, &b, &config, iterations)?;
            info!("[RESULT] Benchmark results for {}:", report.kernel);
            info!("AVERAGE : {:.6}", report.average());
            info!("MAX : {:.6}", report.max());
            info!("MIN : {:.6}", report.min());
            result
        }
        None => multiply(&a, &b, &config)?,
    };

    info!("[SAVE] Writing result matrix {}", args.output.display());
    write_matrix(&result, &args.output)?;

    info!("[FREE] Freeing used memory ...");
    release_all([a, b, result]);
    Ok(true)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
