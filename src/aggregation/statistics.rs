//! Per-row numeric reductions over a single coefficient's time series.
//!
//! Statistics 1 through 9 follow ordinary floating-point semantics: a NaN anywhere in the
//! row makes the result NaN. Skewness and kurtosis drop NaNs first and fall back to NaN when
//! the remaining samples have no spread.

/// Relative tolerance below which the second central moment counts as zero.
const ZERO_VARIANCE_RESOLUTION: f64 = 1e-15;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation normalised by `n`, not `n - 1`.
pub fn population_std(values: &[f64]) -> f64 {
    central_moment(values, mean(values), 2).sqrt()
}

pub fn min(values: &[f64]) -> f64 {
    fold_propagating_nan(values, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    fold_propagating_nan(values, f64::max)
}

pub fn median(values: &[f64]) -> f64 {
    percentile_sorted(&sorted(values), 50.0)
}

/// Percentile `q` in `[0, 100]`, linearly interpolated between the two nearest ranks.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    percentile_sorted(&sorted(values), q)
}

/// 75th minus 25th percentile.
pub fn iqr(values: &[f64]) -> f64 {
    let sorted = sorted(values);
    percentile_sorted(&sorted, 75.0) - percentile_sorted(&sorted, 25.0)
}

/// Sum of squared values.
pub fn energy(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

/// Square root of the mean of squared values.
pub fn rms(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    (energy(values) / values.len() as f64).sqrt()
}

/// Biased (population) sample skewness, ignoring NaNs.
pub fn skewness(values: &[f64]) -> f64 {
    let present = without_nan(values);
    let Some(m2) = spread(&present) else {
        return f64::NAN;
    };
    let m3 = central_moment(&present, mean(&present), 3);
    m3 / m2.powf(1.5)
}

/// Biased (population) excess kurtosis, ignoring NaNs. A normal distribution scores 0.
pub fn kurtosis(values: &[f64]) -> f64 {
    let present = without_nan(values);
    let Some(m2) = spread(&present) else {
        return f64::NAN;
    };
    let m4 = central_moment(&present, mean(&present), 4);
    m4 / (m2 * m2) - 3.0
}

/// Linear-interpolation percentile over an already sorted slice.
pub(crate) fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() || sorted.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let position = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn central_moment(values: &[f64], center: f64, order: i32) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().map(|v| (v - center).powi(order)).sum::<f64>() / values.len() as f64
}

/// Second central moment, or `None` when it is indistinguishable from zero.
fn spread(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let center = mean(values);
    let m2 = central_moment(values, center, 2);
    let floor = (ZERO_VARIANCE_RESOLUTION * center).powi(2);
    (m2 > floor).then_some(m2)
}

fn without_nan(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

fn fold_propagating_nan(values: &[f64], pick: fn(f64, f64) -> f64) -> f64 {
    let mut iter = values.iter().copied();
    let Some(first) = iter.next() else {
        return f64::NAN;
    };
    iter.try_fold(first, |acc, v| {
        if v.is_nan() || acc.is_nan() {
            None
        } else {
            Some(pick(acc, v))
        }
    })
    .filter(|v| !v.is_nan())
    .unwrap_or(f64::NAN)
}
