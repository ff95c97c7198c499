use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Column-wise standardization to zero mean and unit (population) variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Learns per-column mean and standard deviation. Constant columns keep a scale of 1
    /// so they map to zero instead of dividing by zero.
    pub fn fit(data: &Array2<f64>) -> Self {
        let columns = data.ncols();
        if data.nrows() == 0 {
            return Self {
                mean: Array1::zeros(columns),
                scale: Array1::ones(columns),
            };
        }
        let mean = data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(columns));
        let scale = data
            .std_axis(Axis(0), 0.0)
            .mapv(|std| if std > 0.0 && std.is_finite() { std } else { 1.0 });
        Self { mean, scale }
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    pub fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        if data.ncols() != self.mean.len() {
            return Err(PipelineError::shape(
                "scaler input columns",
                self.mean.len(),
                data.ncols(),
            ));
        }
        Ok((data - &self.mean) / &self.scale)
    }
}
