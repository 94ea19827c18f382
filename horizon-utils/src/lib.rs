//! Date parsing and small statistics shared by the horizon crates.

/// Dates given on the command line
pub mod dates {
    use anyhow::Context;
    use chrono::NaiveDate;

    /// Parse an ISO `YYYY-MM-DD` date, ignoring surrounding whitespace.
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid date {s:?}, expected YYYY-MM-DD"))
    }

}

/// Small descriptive statistics used to seed the policy fit
pub mod stats {
    /// Arithmetic mean, `None` for an empty slice.
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Median, averaging the two middle values for even lengths.
    pub fn median(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }

    /// Sum of squared deviations from the mean.
    pub fn total_sum_of_squares(values: &[f64]) -> f64 {
        match mean(values) {
            Some(m) => values.iter().map(|v| (v - m).powi(2)).sum(),
            None => 0.0,
        }
    }

    /// Ordinary least squares line through `(x, y)`, as `(intercept, slope)`.
    ///
    /// `None` when there are fewer than two points, the lengths differ, or
    /// every `x` is the same.
    pub fn linear_regression(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
        if x.len() != y.len() || x.len() < 2 {
            return None;
        }
        let x_mean = mean(x)?;
        let y_mean = mean(y)?;
        let sxx: f64 = x.iter().map(|xi| (xi - x_mean).powi(2)).sum();
        if sxx <= f64::EPSILON * x_mean.abs().max(1.0) {
            return None;
        }
        let sxy: f64 = x
            .iter()
            .zip(y)
            .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
            .sum();
        let slope = sxy / sxx;
        Some((y_mean - slope * x_mean, slope))
    }

}
