use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Row indices assigned to each partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles `0..rows` with a seeded generator and cuts off the test partition.
///
/// The test partition holds `ceil(rows * test_fraction)` rows; both partitions must end up
/// non-empty. No stratification by label.
pub fn train_test_split(rows: usize, test_fraction: f64, seed: u64) -> Result<SplitIndices> {
    let split_error = PipelineError::Split {
        rows,
        test_fraction,
    };
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(split_error);
    }
    let test_rows = (rows as f64 * test_fraction).ceil() as usize;
    if test_rows == 0 || test_rows >= rows {
        return Err(split_error);
    }

    let mut order: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let train = order.split_off(test_rows);
    Ok(SplitIndices { train, test: order })
}
