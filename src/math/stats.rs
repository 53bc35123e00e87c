//! Sample statistics over simulated P&L distributions.
//!
//! Percentiles use linear interpolation between order statistics; the
//! standard deviation is the population form. Both conventions are part of
//! the simulator's output contract.

/// Arithmetic mean; zero for an empty sample.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; zero for an empty sample.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Percentile with linear interpolation between order statistics.
///
/// `p` is in percent, clamped to `[0, 100]`. Zero for an empty sample.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let w = rank - lo as f64;
        sorted[lo] + w * (sorted[hi] - sorted[lo])
    }
}

/// Summary of a simulated total-P&L distribution.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SummaryStatistics {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentile_5: f64,
    pub percentile_25: f64,
    pub percentile_50: f64,
    pub percentile_75: f64,
    pub percentile_95: f64,
}

impl SummaryStatistics {
    /// Computes every summary field over one sample.
    ///
    /// An empty sample yields an all-zero summary, matching the scalar
    /// helpers above.
    pub fn from_sample(values: &[f64]) -> Self {
        let (min, max) = if values.is_empty() {
            (0.0, 0.0)
        } else {
            (
                values.iter().copied().fold(f64::INFINITY, f64::min),
                values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            )
        };
        Self {
            mean: mean(values),
            std_dev: population_std(values),
            min,
            max,
            percentile_5: percentile(values, 5.0),
            percentile_25: percentile(values, 25.0),
            percentile_50: percentile(values, 50.0),
            percentile_75: percentile(values, 75.0),
            percentile_95: percentile(values, 95.0),
        }
    }
}
