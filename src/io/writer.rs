use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::Serialize;

use crate::error::{PipelineError, Result};

/// Writes a matrix as a headerless CSV, one matrix row per line.
///
/// A matrix with no columns produces an empty file.
pub fn write_matrix(path: &Path, matrix: &Array2<f64>) -> Result<()> {
    let records: Vec<Vec<String>> = if matrix.ncols() == 0 {
        Vec::new()
    } else {
        matrix
            .outer_iter()
            .map(|row| row.iter().copied().map(format_value).collect())
            .collect()
    };
    write_table(path, None, &records)
}

/// Shortest text that parses back to the same float; extreme magnitudes use exponent form.
pub(crate) fn format_value(value: f64) -> String {
    format!("{value:?}")
}

/// Writes text records (and an optional header) as CSV.
pub fn write_table(path: &Path, header: Option<&[String]>, records: &[Vec<String>]) -> Result<()> {
    commit(path, |partial| {
        let mut writer = csv::Writer::from_path(partial).map_err(|source| PipelineError::Csv {
            path: partial.to_path_buf(),
            source,
        })?;
        let csv_err = |source: csv::Error| PipelineError::Csv {
            path: partial.to_path_buf(),
            source,
        };
        if let Some(header) = header {
            writer.write_record(header).map_err(csv_err)?;
        }
        for record in records {
            writer.write_record(record).map_err(csv_err)?;
        }
        writer
            .flush()
            .map_err(|err| PipelineError::io(partial, err))
    })
}

/// Serializes `value` as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    commit(path, |partial| {
        let file = File::create(partial).map_err(|err| PipelineError::io(partial, err))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value).map_err(|source| PipelineError::Json {
            path: partial.to_path_buf(),
            source,
        })?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|err| PipelineError::io(partial, err))
    })
}

/// Runs `write` against a sibling `.partial` file and renames it into place on success.
///
/// A failed write never leaves a truncated file under the final name.
fn commit<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| PipelineError::io(parent, err))?;
    }

    let partial = partial_path(path);
    if let Err(err) = write(&partial) {
        let _ = fs::remove_file(&partial);
        return Err(err);
    }
    fs::rename(&partial, path).map_err(|err| PipelineError::io(path, err))
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
