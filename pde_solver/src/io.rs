//! Grid/initial-condition file readers and the snapshot-matrix writer: the
//! grid/IC file readers and the snapshot matrix serializer are external
//! collaborators, and this module is this crate's one concrete realization
//! of that boundary.
//!
//! The format is a deliberately simple whitespace-delimited text layout, not
//! a byte-for-byte port of the original's unspecified binary one: a 1D vector file is one value per line; a 2D matrix
//! file is a `nx ny` header line followed by `nx` lines of `ny`
//! whitespace-separated values, column-major (`u(x_i, y_0..y_{ny-1})` per
//! line). The output solution matrix uses the same `rows cols` header plus
//! one line per snapshot.

use std::io::{BufRead, Write};

use crate::error::{PdeError, PdeResult};
use crate::scalar::Scalar;

/// Reads a whitespace/newline-delimited vector of scalars, ignoring blank
/// lines. Used for 1D grid and initial-condition files.
pub fn read_vector<T: Scalar, R: BufRead>(reader: R) -> PdeResult<Vec<T>> {
    let mut values = Vec::new();
    for line in reader.lines() {
        let line = line?;
        for token in line.split_whitespace() {
            let value = token
                .parse::<f64>()
                .map_err(|e| PdeError::Deserialize(format!("invalid number `{token}`: {e}")))?;
            values.push(T::from_f64_lossy(value));
        }
    }
    if values.is_empty() {
        return Err(PdeError::Deserialize("vector file contained no values".to_string()));
    }
    Ok(values)
}

/// Reads a column-major `nx x ny` matrix: a `nx ny` header line followed by
/// `nx` rows of `ny` values each. Returns the flattened column-major data
/// (`data[i + nx*j] == row i, column j`), matching [`crate::grid::Grid2D::flatten`].
pub fn read_matrix<T: Scalar, R: BufRead>(reader: R) -> PdeResult<(Vec<T>, usize, usize)> {
    let mut lines = reader.lines();
    let header = lines
        .next()
        .ok_or_else(|| PdeError::Deserialize("matrix file missing header line".to_string()))??;
    let mut header_tokens = header.split_whitespace();
    let nx: usize = header_tokens
        .next()
        .ok_or_else(|| PdeError::Deserialize("matrix header missing nx".to_string()))?
        .parse()
        .map_err(|e| PdeError::Deserialize(format!("invalid nx in header: {e}")))?;
    let ny: usize = header_tokens
        .next()
        .ok_or_else(|| PdeError::Deserialize("matrix header missing ny".to_string()))?
        .parse()
        .map_err(|e| PdeError::Deserialize(format!("invalid ny in header: {e}")))?;

    let mut data = vec![T::zero(); nx * ny];
    for i in 0..nx {
        let row = lines
            .next()
            .ok_or_else(|| PdeError::Deserialize(format!("matrix file missing row {i}")))??;
        let tokens: Vec<&str> = row.split_whitespace().collect();
        if tokens.len() != ny {
            return Err(PdeError::Deserialize(format!(
                "row {i} has {} values, expected {ny}",
                tokens.len()
            )));
        }
        for (j, token) in tokens.iter().enumerate() {
            let value = token
                .parse::<f64>()
                .map_err(|e| PdeError::Deserialize(format!("invalid number `{token}`: {e}")))?;
            data[i + nx * j] = T::from_f64_lossy(value);
        }
    }
    Ok((data, nx, ny))
}

/// Writes `values` one per line, full round-trip precision (`{:e}`), so that
/// `read_vector` . `write_vector` is the identity up to the scalar type's
/// own precision.
pub fn write_vector<T: Scalar, W: Write>(mut writer: W, values: &[T]) -> PdeResult<()> {
    for v in values {
        writeln!(writer, "{v:e}")?;
    }
    Ok(())
}

/// Writes the column-major snapshot matrix (`rows` degrees of freedom,
/// `cols` recorded snapshots) as a `rows cols` header followed by one line
/// per snapshot column: a column-major matrix of size M x nSnapshots.
pub fn write_solution_matrix<T: Scalar, W: Write>(mut writer: W, columns: &[Vec<T>], rows: usize) -> PdeResult<()> {
    writeln!(writer, "{rows} {}", columns.len())?;
    for column in columns {
        debug_assert_eq!(column.len(), rows, "every recorded snapshot must have `rows` entries");
        let rendered: Vec<String> = column.iter().map(|v| format!("{v:e}")).collect();
        writeln!(writer, "{}", rendered.join(" "))?;
    }
    Ok(())
}

/// The built-in bell-curve initial condition used when no `-ic` file is
/// given: `exp(-1/4 . x^2)` in 1D, `exp(-1/4 . (x^2+y^2))` in 2D.
pub fn bell_1d<T: Scalar>(coords: &[T]) -> Vec<T> {
    let quarter = T::from_f64_lossy(0.25);
    coords.iter().map(|&x| (-(quarter * x * x)).exp()).collect()
}

pub fn bell_2d<T: Scalar>(xs: &[T], ys: &[T]) -> Vec<T> {
    let quarter = T::from_f64_lossy(0.25);
    let nx = xs.len();
    let mut out = vec![T::zero(); nx * ys.len()];
    for (j, &y) in ys.iter().enumerate() {
        for (i, &x) in xs.iter().enumerate() {
            out[i + nx * j] = (-(quarter * (x * x + y * y))).exp();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn vector_round_trips() {
        let values = vec![1.0_f64, -2.5, 3.0, 0.125];
        let mut buf = Vec::new();
        write_vector(&mut buf, &values).unwrap();
        let read_back = read_vector::<f64, _>(Cursor::new(buf)).unwrap();
        assert_eq!(values, read_back);
    }

    #[test]
    fn matrix_round_trips() {
        let (nx, ny) = (3usize, 4usize);
        let data: Vec<f64> = (0..nx * ny).map(|k| k as f64 * 0.5).collect();
        let mut buf = Vec::new();
        writeln!(&mut buf, "{nx} {ny}").unwrap();
        for i in 0..nx {
            let row: Vec<String> = (0..ny).map(|j| format!("{:e}", data[i + nx * j])).collect();
            writeln!(&mut buf, "{}", row.join(" ")).unwrap();
        }
        let (read_back, rnx, rny) = read_matrix::<f64, _>(Cursor::new(buf)).unwrap();
        assert_eq!((rnx, rny), (nx, ny));
        assert_eq!(read_back, data);
    }

    #[test]
    fn solution_matrix_header_matches_dimensions() {
        let columns = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let mut buf = Vec::new();
        write_solution_matrix(&mut buf, &columns, 3).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "3 2");
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn bell_1d_peaks_at_origin() {
        let coords = [-2.0_f64, -1.0, 0.0, 1.0, 2.0];
        let values = bell_1d(&coords);
        assert!(values[2] > values[1]);
        assert!(values[2] > values[3]);
        assert!((values[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_vector_file_is_an_error() {
        let result = read_vector::<f64, _>(Cursor::new(Vec::new()));
        assert!(result.is_err());
    }
}
