//! Robust spread statistics used to derive feature scale statistics.
//!
//! Medians skip NaN entries and return 0.0 for an empty input.

use crate::types::Value;
use ndarray::ArrayView1;
use std::collections::BTreeSet;

/// Consistency constant that makes the median absolute deviation an estimator
/// of the standard deviation for normally distributed data.
pub const GAUSSIAN_CONSISTENCY: f64 = 1.4826;

/// Median, ignoring NaN entries. Even-length inputs average the two middle values.
pub fn median(values: ArrayView1<'_, f64>) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_unstable_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Median absolute deviation from the median (unscaled).
pub fn median_abs_deviation(values: ArrayView1<'_, f64>) -> f64 {
    let center = median(values);
    let deviations = values.mapv(|v| (v - center).abs());
    median(deviations.view())
}

/// Distinct values in ascending order.
pub fn sorted_unique<'a, I>(values: I) -> Vec<Value>
where
    I: IntoIterator<Item = &'a Value>,
{
    values
        .into_iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
