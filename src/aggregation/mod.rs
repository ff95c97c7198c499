//! Reduction of a variable-length MFCC matrix into a fixed-length feature vector.

pub mod statistics;

use ndarray::Array1;

use crate::error::{PipelineError, Result};
use crate::types::MfccMatrix;

/// Number of statistics computed per coefficient row.
pub const STATISTIC_COUNT: usize = 11;

/// One per-row reduction. The declaration order is the column order of every
/// aggregated vector, so downstream consumers can address (statistic, row) by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Mean,
    StdDev,
    Min,
    Max,
    Median,
    Range,
    Iqr,
    Energy,
    Rms,
    Skewness,
    Kurtosis,
}

impl Statistic {
    pub const ALL: [Statistic; STATISTIC_COUNT] = [
        Statistic::Mean,
        Statistic::StdDev,
        Statistic::Min,
        Statistic::Max,
        Statistic::Median,
        Statistic::Range,
        Statistic::Iqr,
        Statistic::Energy,
        Statistic::Rms,
        Statistic::Skewness,
        Statistic::Kurtosis,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::StdDev => "std",
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Median => "median",
            Statistic::Range => "range",
            Statistic::Iqr => "iqr",
            Statistic::Energy => "energy",
            Statistic::Rms => "rms",
            Statistic::Skewness => "skew",
            Statistic::Kurtosis => "kurtosis",
        }
    }

    /// Evaluates this statistic over one coefficient row.
    pub fn evaluate(self, row: &[f64]) -> f64 {
        self.evaluate_with_sorted(row, &statistics::sorted(row))
    }

    fn evaluate_with_sorted(self, row: &[f64], sorted: &[f64]) -> f64 {
        match self {
            Statistic::Mean => statistics::mean(row),
            Statistic::StdDev => statistics::population_std(row),
            Statistic::Min => statistics::min(row),
            Statistic::Max => statistics::max(row),
            Statistic::Median => statistics::percentile_sorted(sorted, 50.0),
            Statistic::Range => statistics::max(row) - statistics::min(row),
            Statistic::Iqr => {
                statistics::percentile_sorted(sorted, 75.0)
                    - statistics::percentile_sorted(sorted, 25.0)
            }
            Statistic::Energy => statistics::energy(row),
            Statistic::Rms => statistics::rms(row),
            Statistic::Skewness => statistics::skewness(row),
            Statistic::Kurtosis => statistics::kurtosis(row),
        }
    }
}

/// Aggregates an `R x T` matrix into a vector of length `11 * R`.
///
/// A matrix with no rows or no frames is a [`PipelineError::EmptyMatrix`] error.
///
/// The vector is the concatenation of one length-`R` block per statistic, in
/// [`Statistic::ALL`] order; block `s` holds statistic `s` for rows `0..R`.
pub fn aggregate(matrix: &MfccMatrix) -> Result<Array1<f64>> {
    let (rows, frames) = matrix.dim();
    if rows == 0 || frames == 0 {
        return Err(PipelineError::EmptyMatrix);
    }

    let mut features = Array1::zeros(STATISTIC_COUNT * rows);
    for (row_idx, row) in matrix.outer_iter().enumerate() {
        let values = row.to_vec();
        let sorted = statistics::sorted(&values);
        for (stat_idx, statistic) in Statistic::ALL.iter().enumerate() {
            features[stat_idx * rows + row_idx] = statistic.evaluate_with_sorted(&values, &sorted);
        }
    }
    Ok(features)
}

/// Column names matching [`aggregate`]'s layout, e.g. `mean_0 .. kurtosis_12` for 13 rows.
pub fn feature_names(rows: usize) -> Vec<String> {
    Statistic::ALL
        .iter()
        .flat_map(|statistic| (0..rows).map(move |row| format!("{}_{row}", statistic.name())))
        .collect()
}
