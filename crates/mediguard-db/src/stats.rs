//! Descriptive statistics with PostgreSQL aggregate semantics.

use mediguard_common::BiomarkerSummary;

/// Continuous percentile (`PERCENTILE_CONT`) over ascending-sorted values.
pub fn percentile_cont(sorted: &[f64], fraction: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = fraction.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let weight = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * weight)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Summary of a value set; `None` when it is empty.
pub fn summarize(values: &[f64]) -> Option<BiomarkerSummary> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    Some(BiomarkerSummary {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean: mean(&sorted)?,
        q1: percentile_cont(&sorted, 0.25)?,
        median: percentile_cont(&sorted, 0.50)?,
        q3: percentile_cont(&sorted, 0.75)?,
        count: sorted.len() as i64,
    })
}
