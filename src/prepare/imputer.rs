use ndarray::{Array1, Array2, Axis, Zip};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::aggregation::statistics;
use crate::error::{PipelineError, Result};

/// How a column's missing cells are filled.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    #[default]
    Mean,
    Median,
    MostFrequent,
}

/// Per-column fill values learned from the present (non-NaN) cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill: Array1<f64>,
}

impl Imputer {
    /// Learns one fill value per column. A column with no present cells fills with zero.
    pub fn fit(data: &Array2<f64>, strategy: ImputeStrategy) -> Self {
        let fill = data
            .axis_iter(Axis(1))
            .enumerate()
            .map(|(column, values)| {
                let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
                if present.is_empty() {
                    warn!(column, "column has no values; imputing zero");
                    return 0.0;
                }
                match strategy {
                    ImputeStrategy::Mean => statistics::mean(&present),
                    ImputeStrategy::Median => statistics::median(&present),
                    ImputeStrategy::MostFrequent => most_frequent(&present),
                }
            })
            .collect();
        Self { strategy, fill }
    }

    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }

    pub fn fill_values(&self) -> &Array1<f64> {
        &self.fill
    }

    pub fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        if data.ncols() != self.fill.len() {
            return Err(PipelineError::shape(
                "imputer input columns",
                self.fill.len(),
                data.ncols(),
            ));
        }
        let mut filled = data.clone();
        for mut row in filled.axis_iter_mut(Axis(0)) {
            Zip::from(&mut row).and(&self.fill).for_each(|cell, &fill| {
                if cell.is_nan() {
                    *cell = fill;
                }
            });
        }
        Ok(filled)
    }
}

/// Most common value; ties go to the smallest.
fn most_frequent(values: &[f64]) -> f64 {
    let sorted = statistics::sorted(values);
    let mut best = sorted[0];
    let mut best_count = 0usize;
    let mut idx = 0;
    while idx < sorted.len() {
        let value = sorted[idx];
        let run = sorted[idx..].iter().take_while(|v| **v == value).count();
        if run > best_count {
            best = value;
            best_count = run;
        }
        idx += run;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const NAN: f64 = f64::NAN;

    #[test]
    fn mean_fill_uses_present_cells() {
        let data = array![[1.0, NAN], [NAN, 4.0], [3.0, 8.0]];
        let imputer = Imputer::fit(&data, ImputeStrategy::Mean);
        assert_eq!(imputer.fill_values().to_vec(), vec![2.0, 6.0]);

        let filled = imputer.transform(&data).unwrap();
        assert_eq!(filled, array![[1.0, 6.0], [2.0, 4.0], [3.0, 8.0]]);
    }

    #[test]
    fn median_and_mode_strategies() {
        let data = array![[1.0], [9.0], [2.0], [2.0], [NAN]];
        assert_eq!(
            Imputer::fit(&data, ImputeStrategy::Median).fill_values()[0],
            2.0
        );
        assert_eq!(
            Imputer::fit(&data, ImputeStrategy::MostFrequent).fill_values()[0],
            2.0
        );
        assert_eq!(most_frequent(&[3.0, 1.0, 3.0, 1.0]), 1.0);
    }

    #[test]
    fn empty_column_fills_zero() {
        let data = array![[NAN, 1.0], [NAN, 2.0]];
        let filled = Imputer::fit(&data, ImputeStrategy::Mean)
            .transform(&data)
            .unwrap();
        assert_eq!(filled.column(0).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn width_mismatch_is_rejected() {
        let imputer = Imputer::fit(&array![[1.0, 2.0]], ImputeStrategy::Mean);
        assert!(imputer.transform(&array![[1.0]]).is_err());
    }
}
