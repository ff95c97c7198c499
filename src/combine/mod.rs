//! Stacking per-recording feature vectors into one table, and merging tables across batches.

pub mod label;

pub use label::LabelSource;

use ndarray::Array2;

use crate::error::{PipelineError, Result};
use crate::types::{CombinedTable, FeatureRow, RawTable};

/// Stacks feature rows in the given order and appends labels from `labels`.
///
/// Every row must have the same length.
pub fn combine(rows: &[FeatureRow], labels: &LabelSource) -> Result<CombinedTable> {
    let width = rows.first().map(|row| row.values.len()).unwrap_or(0);
    for row in rows {
        if row.values.len() != width {
            return Err(PipelineError::shape(
                format!("combined table (recording {})", row.id),
                width,
                row.values.len(),
            ));
        }
    }

    let flat: Vec<f64> = rows
        .iter()
        .flat_map(|row| row.values.iter().copied())
        .collect();
    let cells = flat.len();
    let features = Array2::from_shape_vec((rows.len(), width), flat)
        .map_err(|_| PipelineError::shape("combined table", rows.len() * width, cells))?;

    Ok(CombinedTable {
        record_ids: rows.iter().map(|row| row.id.clone()).collect(),
        features,
        labels: labels.resolve(rows)?,
    })
}

/// Concatenates tables from several batches, keeping the first table's header.
///
/// Tables must agree on width, and on their header rows when they have them.
pub fn merge_tables(tables: Vec<RawTable>) -> Result<RawTable> {
    let Some(first) = tables.first() else {
        return Ok(RawTable::default());
    };
    let header = first.header.clone();
    let width = first.n_columns();

    let mut records = Vec::with_capacity(tables.iter().map(RawTable::n_rows).sum());
    for (table_idx, table) in tables.into_iter().enumerate() {
        if table.header != header {
            return Err(PipelineError::HeaderMismatch(format!(
                "table {table_idx} header {:?} differs from {:?}",
                table.header, header
            )));
        }
        for record in table.records {
            if record.len() != width {
                return Err(PipelineError::shape(
                    format!("merged table {table_idx}"),
                    width,
                    record.len(),
                ));
            }
            records.push(record);
        }
    }

    Ok(RawTable { header, records })
}
