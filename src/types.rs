//! Core types for the MFCC preparation pipeline

use std::path::PathBuf;

use ndarray::{Array1, Array2};

use crate::io::writer::format_value;

/// Coefficient rows by time-frame columns.
pub type MfccMatrix = Array2<f64>;

/// A single recording's matrix together with its file-derived identity.
#[derive(Debug, Clone)]
pub struct Recording {
    /// File stem with stage prefixes removed (e.g. `song1`)
    pub id: String,
    /// File stem as found on disk (e.g. `padded_song1`)
    pub stem: String,
    pub source: PathBuf,
    pub matrix: MfccMatrix,
}

/// One aggregated feature vector, still tied to the recording it came from.
#[derive(Debug, Clone)]
pub struct FeatureRow {
    pub id: String,
    pub stem: String,
    pub values: Array1<f64>,
}

/// Per-recording feature rows stacked into one table, with an optional label column.
#[derive(Debug, Clone)]
pub struct CombinedTable {
    pub record_ids: Vec<String>,
    pub features: Array2<f64>,
    pub labels: Option<Vec<String>>,
}

impl CombinedTable {
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    /// Feature columns plus the label column when present.
    pub fn n_columns(&self) -> usize {
        self.features.ncols() + usize::from(self.labels.is_some())
    }

    /// Renders each row as text cells, label last.
    pub fn to_records(&self) -> Vec<Vec<String>> {
        self.features
            .outer_iter()
            .enumerate()
            .map(|(idx, row)| {
                let mut cells: Vec<String> = row.iter().copied().map(format_value).collect();
                if let Some(labels) = &self.labels {
                    cells.push(labels[idx].clone());
                }
                cells
            })
            .collect()
    }
}

/// Untyped table as read from disk; cells are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub header: Option<Vec<String>>,
    pub records: Vec<Vec<String>>,
}

impl RawTable {
    pub fn n_rows(&self) -> usize {
        self.records.len()
    }

    pub fn n_columns(&self) -> usize {
        self.header
            .as_ref()
            .map(Vec::len)
            .or_else(|| self.records.first().map(Vec::len))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn combined_table_counts_label_column() {
        let table = CombinedTable {
            record_ids: vec!["a".into(), "b".into()],
            features: array![[1.0, 2.0], [3.0, 4.0]],
            labels: Some(vec!["x".into(), "x".into()]),
        };
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_columns(), 3);
        assert_eq!(table.to_records()[1], vec!["3.0", "4.0", "x"]);
    }

    #[test]
    fn raw_table_width_prefers_header() {
        let table = RawTable {
            header: Some(vec!["a".into(), "b".into(), "c".into()]),
            records: Vec::new(),
        };
        assert_eq!(table.n_columns(), 3);
        assert_eq!(RawTable::default().n_columns(), 0);
    }
}
