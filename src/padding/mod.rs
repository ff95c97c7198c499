//! Zero-padding of variable-length MFCC matrices to a shared width.

use ndarray::{s, Array2};

use crate::error::{PipelineError, Result};
use crate::types::MfccMatrix;

/// Widest column count across the batch; zero for an empty batch.
pub fn target_width(matrices: &[MfccMatrix]) -> usize {
    matrices.iter().map(Array2::ncols).max().unwrap_or(0)
}

/// Appends zero columns on the right until `matrix` is `width` columns wide.
///
/// Existing cells are copied untouched. Never truncates: a `width` narrower than the
/// matrix is an error.
pub fn pad_matrix(matrix: &MfccMatrix, width: usize) -> Result<MfccMatrix> {
    let (rows, cols) = matrix.dim();
    if width < cols {
        return Err(PipelineError::PadTooNarrow {
            width,
            columns: cols,
        });
    }
    let mut padded = Array2::zeros((rows, width));
    padded.slice_mut(s![.., ..cols]).assign(matrix);
    Ok(padded)
}

/// Pads every matrix in the batch to the batch's widest column count.
///
/// All matrices with rows must share one row count; the check runs over the whole batch
/// before any matrix is padded. A matrix with no rows (an empty file) pads to `0 x W`.
pub fn pad_batch(matrices: &[MfccMatrix]) -> Result<(usize, Vec<MfccMatrix>)> {
    check_row_counts(matrices, |idx| format!("matrix {idx}"))?;
    let width = target_width(matrices);
    let padded = matrices
        .iter()
        .map(|matrix| pad_matrix(matrix, width))
        .collect::<Result<Vec<_>>>()?;
    Ok((width, padded))
}

/// Fails on the first matrix whose row count differs from the first matrix that has rows.
///
/// `describe` names the offending matrix by its batch index.
pub fn check_row_counts<F>(matrices: &[MfccMatrix], describe: F) -> Result<()>
where
    F: Fn(usize) -> String,
{
    let mut with_rows = matrices
        .iter()
        .enumerate()
        .filter(|(_, matrix)| matrix.nrows() > 0);
    let Some((_, first)) = with_rows.next() else {
        return Ok(());
    };
    let expected = first.nrows();
    for (idx, matrix) in with_rows {
        if matrix.nrows() != expected {
            return Err(PipelineError::shape(
                format!("padding batch row count ({})", describe(idx)),
                expected,
                matrix.nrows(),
            ));
        }
    }
    Ok(())
}
