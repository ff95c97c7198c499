//! Error taxonomy shared by every pipeline stage.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for results returned by the library stages.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input could not be read or output could not be written.
    #[error("i/o failure at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tabular file could not be parsed (ragged rows, bad quoting).
    #[error("malformed table {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A cell that must hold a number did not.
    #[error("non-numeric value {value:?} in {} at row {row}, column {column}", .path.display())]
    NonNumeric {
        path: PathBuf,
        row: usize,
        column: usize,
        value: String,
    },

    #[error("shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    /// Padding never truncates.
    #[error("cannot pad a matrix with {columns} columns to width {width}")]
    PadTooNarrow { width: usize, columns: usize },

    #[error("matrix has no cells to aggregate")]
    EmptyMatrix,

    /// A per-recording failure, tagged with the file it came from.
    #[error("recording {}: {source}", .path.display())]
    Recording {
        path: PathBuf,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("no .{extension} files found in {}", .dir.display())]
    EmptyCorpus { dir: PathBuf, extension: String },

    /// Tables being merged disagree on their header rows.
    #[error("header mismatch: {0}")]
    HeaderMismatch(String),

    #[error("label error: {0}")]
    Label(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot split {rows} rows with test fraction {test_fraction} into non-empty partitions")]
    Split { rows: usize, test_fraction: f64 },

    #[error("failed to serialize {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn recording(path: impl Into<PathBuf>, source: PipelineError) -> Self {
        Self::Recording {
            path: path.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn shape(context: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            expected,
            found,
        }
    }
}
