//! Text format reader/writer
//!
//! ```text
//! 2            <- rows
//! 2            <- columns
//!              <- blank
//! 0;1;8.000000000e+00
//! 1;0;2.000000000e+00
//! 1;1;8.000000000e+00
//! ```
//!
//! ```no_run
//! use ellmul::io::{read_matrix, write_matrix};
//!
//! let a = read_matrix("a.mat")?;
//! write_matrix(&a.transpose()?, "a_t.mat")?;
//! # Ok::<(), ellmul::EllpackError>(())
//! ```
//!
//! One `row;column;value` record per stored entry, zero-based, no trailing
//! newline after the last record.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::{info, warn};

use crate::error::{reserve, EllpackError, Result};
use crate::matrix::EllpackMatrix;

/// Largest row or column count accepted in a header
pub const MAX_DIMENSION: usize = u32::MAX as usize;

/// Reads a matrix file
pub fn read_matrix<P: AsRef<Path>>(path: P) -> Result<EllpackMatrix<f32>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    parse_matrix(BufReader::new(file), &path.display().to_string())
}

/// Parses a matrix from `reader`; `source_name` labels error messages
///
/// Rows are sorted by column so the result satisfies the ascending-index
/// contract of [`EllpackMatrix`]. The compressed width shrinks to the longest row.
pub fn parse_matrix<R: BufRead>(reader: R, source_name: &str) -> Result<EllpackMatrix<f32>> {
    let parse_error = |line: usize, message: String| EllpackError::Parse {
        source_name: source_name.to_string(),
        line,
        message,
    };

    let mut lines = reader.lines();
    let mut header = |line: usize| -> Result<usize> {
        let text = lines
            .next()
            .transpose()?
            .ok_or_else(|| parse_error(line, "missing matrix size definition".to_string()))?;
        let value: usize = text
            .trim()
            .parse()
            .map_err(|_| parse_error(line, format!("invalid matrix size definition {:?}", text.trim())))?;
        if value == 0 {
            return Err(parse_error(line, "matrix size may not be 0".to_string()));
        }
        if value > MAX_DIMENSION {
            return Err(parse_error(line, format!("matrix size may not exceed {}", MAX_DIMENSION)));
        }
        Ok(value)
    };

    let height = header(1)?;
    let real_width = header(2)?;

    match lines.next().transpose()? {
        Some(separator) if !separator.trim().is_empty() => {
            warn!("{}: line 3 is not blank and is ignored: {:?}", source_name, separator);
        }
        _ => {}
    }

    info!("[SCAN] Reading matrix {} ({} x {}) ...", source_name, height, real_width);

    let mut rows: Vec<Vec<(usize, f32)>> = Vec::new();
    reserve(&mut rows, height, "load")?;
    rows.resize_with(height, Vec::new);
    let mut seen = HashSet::new();

    for (offset, line) in lines.enumerate() {
        let line_no = offset + 4;
        let line = line?;
        let record = line.trim();
        if record.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = record.split(';').map(str::trim).collect();
        if tokens.len() != 3 {
            return Err(parse_error(line_no, format!("expected 3 tokens, found {}", tokens.len())));
        }

        let row: usize = tokens[0]
            .parse()
            .map_err(|_| parse_error(line_no, format!("parse error for {}", tokens[0])))?;
        if row >= height {
            return Err(parse_error(line_no, "Row number is out of bounds".to_string()));
        }

        let col: usize = tokens[1]
            .parse()
            .map_err(|_| parse_error(line_no, format!("parse error for {}", tokens[1])))?;
        if col >= real_width {
            return Err(parse_error(line_no, "Column number is out of bounds".to_string()));
        }

        let value: f32 = tokens[2]
            .parse()
            .map_err(|_| parse_error(line_no, format!("parse error for {}", tokens[2])))?;
        if !value.is_finite() {
            return Err(parse_error(line_no, format!("value {} is not finite", tokens[2])));
        }

        if !seen.insert((row, col)) {
            return Err(parse_error(line_no, format!("duplicate entry for ({}, {})", row, col)));
        }
        if value == 0.0 {
            continue;
        }
        rows[row].push((col, value));
    }

    for row in &mut rows {
        row.sort_unstable_by_key(|&(col, _)| col);
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
    info!(
        "[SCAN] Completed, shrinking matrix width from {} -> {}",
        real_width, width
    );
    info!(
        "[INIT] Allocating {} bytes for matrix {}",
        width * height * (std::mem::size_of::<f32>() + std::mem::size_of::<usize>()),
        source_name
    );

    EllpackMatrix::from_rows(real_width, rows)
}

/// Writes a matrix file
pub fn write_matrix<P: AsRef<Path>>(matrix: &EllpackMatrix<f32>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut out = BufWriter::new(file);
    write_to(matrix, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Writes a matrix in text format to `out`
pub fn write_to<W: Write>(matrix: &EllpackMatrix<f32>, out: &mut W) -> Result<()> {
    matrix.ensure_valid("write")?;

    write!(out, "{}\n{}\n\n", matrix.height, matrix.real_width)?;
    for (n, (row, col, value)) in matrix.triplets().enumerate() {
        if n > 0 {
            writeln!(out)?;
        }
        write!(out, "{};{};{}", row, col, format_scientific(value))?;
    }
    Ok(())
}

/// Formats like C's `%.9e`: nine fractional digits, signed exponent of at
/// least two digits
pub fn format_scientific(value: f32) -> String {
    let formatted = format!("{:.9e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        // inf and NaN carry no exponent
        None => formatted,
    }
}
