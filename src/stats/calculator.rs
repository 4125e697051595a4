//! Statistics Calculator Module
//! Descriptive statistics used by the distribution and KPI views.

use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Whisker reach, in interquartile ranges beyond the box.
pub const WHISKER_IQR: f64 = 1.5;

/// Five-number summary plus outliers for one measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Smallest value not below `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Largest value not above `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
    pub mean: f64,
    /// Sample standard deviation, NaN for fewer than two values.
    pub std_dev: f64,
}

impl BoxSummary {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute the box-plot summary for a set of values. Non-finite values
    /// are ignored; returns `None` when nothing remains.
    pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let q1 = Self::percentile(&sorted, 25.0);
        let median = Self::percentile(&sorted, 50.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR * iqr;
        let high_fence = q3 + WHISKER_IQR * iqr;

        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < low_fence || v > high_fence)
            .collect();

        Some(BoxSummary {
            count: n,
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[n - 1],
            lower_whisker,
            upper_whisker,
            outliers,
            mean: sorted.iter().mean(),
            std_dev: sorted.iter().std_dev(),
        })
    }

    /// Arithmetic mean, `None` for an empty slice.
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            None
        } else {
            Some(values.iter().mean())
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Summaries for several named value sets, computed in parallel.
    /// Output keeps input order; empty sets are skipped.
    pub fn box_summaries_parallel(groups: &[(String, Vec<f64>)]) -> Vec<(String, BoxSummary)> {
        groups
            .par_iter()
            .filter_map(|(name, values)| Self::box_summary(values).map(|s| (name.clone(), s)))
            .collect()
    }
}
