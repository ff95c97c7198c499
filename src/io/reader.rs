use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;
use ndarray::Array2;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::types::{MfccMatrix, RawTable};

/// Reads a headerless numeric CSV into a matrix.
///
/// Every cell must parse as a float; `NaN` tokens are accepted and kept as missing values.
/// Anything else fails with [`PipelineError::NonNumeric`] instead of being coerced to zero.
pub fn read_matrix(path: &Path) -> Result<MfccMatrix> {
    let mut reader = open_reader(path, false)?;

    let mut flat = Vec::new();
    let mut rows = 0usize;
    let mut cols = 0usize;
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|source| csv_error(path, source))?;
        if row_idx == 0 {
            cols = record.len();
        }
        for (col_idx, cell) in record.iter().enumerate() {
            let trimmed = cell.trim();
            let value = trimmed
                .parse::<f64>()
                .map_err(|_| PipelineError::NonNumeric {
                    path: path.to_path_buf(),
                    row: row_idx,
                    column: col_idx,
                    value: trimmed.to_string(),
                })?;
            flat.push(value);
        }
        rows += 1;
    }

    debug!(path = %path.display(), rows, cols, "matrix loaded");
    let cells = flat.len();
    Array2::from_shape_vec((rows, cols), flat)
        .map_err(|_| PipelineError::shape(path.display().to_string(), rows * cols, cells))
}

/// Reads a CSV table keeping every cell as text.
pub fn read_table(path: &Path, has_headers: bool) -> Result<RawTable> {
    let mut reader = open_reader(path, has_headers)?;

    let header = if has_headers {
        let header = reader
            .headers()
            .map_err(|source| csv_error(path, source))?;
        (!header.is_empty()).then(|| header.iter().map(|h| h.trim().to_string()).collect())
    } else {
        None
    };

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| csv_error(path, source))?;
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { header, records })
}

fn open_reader(path: &Path, has_headers: bool) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|err| PipelineError::io(path, err))?;
    Ok(ReaderBuilder::new()
        .has_headers(has_headers)
        .from_reader(file))
}

fn csv_error(path: &Path, source: csv::Error) -> PipelineError {
    PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.csv");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_numeric_matrix() {
        let (_dir, path) = scratch("1,2,3\n4, 5 ,6\n");
        let matrix = read_matrix(&path).unwrap();
        assert_eq!(matrix.dim(), (2, 3));
        assert_eq!(matrix[[1, 1]], 5.0);
    }

    #[test]
    fn empty_file_is_an_empty_matrix() {
        let (_dir, path) = scratch("");
        assert_eq!(read_matrix(&path).unwrap().dim(), (0, 0));
    }

    #[test]
    fn rejects_text_cells() {
        let (_dir, path) = scratch("1,2\n3,abc\n");
        match read_matrix(&path).unwrap_err() {
            PipelineError::NonNumeric { row, column, value, .. } => {
                assert_eq!((row, column), (1, 1));
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn rejects_ragged_rows() {
        let (_dir, path) = scratch("1,2,3\n4,5\n");
        assert!(matches!(
            read_matrix(&path).unwrap_err(),
            PipelineError::Csv { .. }
        ));
    }

    #[test]
    fn nan_tokens_survive() {
        let (_dir, path) = scratch("1,NaN\n");
        assert!(read_matrix(&path).unwrap()[[0, 1]].is_nan());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_matrix(Path::new("/nope/missing.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
        assert!(err.to_string().contains("missing.csv"));
    }

    #[test]
    fn table_keeps_header_and_text() {
        let (_dir, path) = scratch("a,b,artist\n1,x,foo\n");
        let table = read_table(&path, true).unwrap();
        assert_eq!(
            table.header.as_deref(),
            Some(&["a".to_string(), "b".to_string(), "artist".to_string()][..])
        );
        assert_eq!(table.records, vec![vec!["1", "x", "foo"]]);
    }
}
