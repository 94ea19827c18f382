//! Gap filling for daily series.
//!
//! Interior runs of missing days no longer than `max_fill_gap` are filled with
//! a monotone piecewise cubic Hermite curve (Fritsch-Carlson tangents) through
//! the valid values on either side. Runs touching either end of the series,
//! or longer than `max_fill_gap`, stay missing.

use horizon_core::record::{DailyRecord, DailySeries, Datum, Variable};
use log::debug;

/// A valid value and its day index in the series.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Knot {
    index: usize,
    value: f64,
}

impl Knot {
    /// Secant slope from `self` to `other`, per day.
    fn slope_to(&self, other: &Knot) -> f64 {
        (other.value - self.value) / (other.index - self.index) as f64
    }

    fn days_to(&self, other: &Knot) -> f64 {
        (other.index - self.index) as f64
    }
}

/// Weighted harmonic mean of the two secants around a knot, zero at a local
/// extremum.
fn interior_tangent(h_left: f64, d_left: f64, h_right: f64, d_right: f64) -> f64 {
    if d_left * d_right <= 0.0 {
        return 0.0;
    }
    let w1 = 2.0 * h_right + h_left;
    let w2 = h_right + 2.0 * h_left;
    (w1 + w2) / (w1 / d_left + w2 / d_right)
}

/// Keep a tangent inside the Fritsch-Carlson monotone box for secant `d`.
fn limit_tangent(tangent: f64, d: f64) -> f64 {
    if d == 0.0 || tangent * d <= 0.0 {
        return 0.0;
    }
    let ratio = (tangent / d).min(3.0);
    ratio * d
}

/// Fill the days strictly between `start` and `end`.
fn hermite_fill(
    prev: Option<&Knot>,
    start: &Knot,
    end: &Knot,
    next: Option<&Knot>,
) -> Vec<(usize, f64)> {
    let h = start.days_to(end);
    let d = start.slope_to(end);
    let m_start = match prev {
        Some(p) => interior_tangent(p.days_to(start), p.slope_to(start), h, d),
        None => d,
    };
    let m_end = match next {
        Some(n) => interior_tangent(h, d, end.days_to(n), end.slope_to(n)),
        None => d,
    };
    let m_start = limit_tangent(m_start, d);
    let m_end = limit_tangent(m_end, d);

    (start.index + 1..end.index)
        .map(|i| {
            let t = (i - start.index) as f64 / h;
            let t2 = t * t;
            let t3 = t2 * t;
            let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
            let h10 = t3 - 2.0 * t2 + t;
            let h01 = -2.0 * t3 + 3.0 * t2;
            let h11 = t3 - t2;
            let value =
                h00 * start.value + h10 * h * m_start + h01 * end.value + h11 * h * m_end;
            (i, value)
        })
        .collect()
}

/// Fill short interior gaps in one column of daily values.
///
/// Values present on input are returned untouched.
pub fn fill_column(values: &[Datum], max_fill_gap: usize) -> Vec<Datum> {
    let mut result = values.to_vec();
    let knots: Vec<Knot> = values
        .iter()
        .enumerate()
        .filter_map(|(index, datum)| datum.value().map(|value| Knot { index, value }))
        .collect();

    for k in 0..knots.len().saturating_sub(1) {
        let start = &knots[k];
        let end = &knots[k + 1];
        let gap = end.index - start.index - 1;
        if gap == 0 || gap > max_fill_gap {
            continue;
        }
        let prev = k.checked_sub(1).map(|j| &knots[j]);
        let next = knots.get(k + 2);
        for (i, value) in hermite_fill(prev, start, end, next) {
            result[i] = Datum::Filled(value);
        }
    }
    result
}

/// Fill short interior gaps in storage, release and inflow independently.
pub fn fill_gaps(series: &DailySeries, max_fill_gap: usize) -> DailySeries {
    let storage = fill_column(&series.column(Variable::Storage), max_fill_gap);
    let release = fill_column(&series.column(Variable::Release), max_fill_gap);
    let inflow = fill_column(&series.column(Variable::Inflow), max_fill_gap);

    let filled_days = [&storage, &release, &inflow]
        .iter()
        .map(|column| column.iter().filter(|d| d.is_filled()).count())
        .sum::<usize>();
    debug!(
        "Filled {} values across {} days (max gap {})",
        filled_days,
        series.len(),
        max_fill_gap
    );

    series.map_records_indexed(|i, record| DailyRecord {
        storage: storage[i],
        release: release[i],
        inflow: inflow[i],
        ..*record
    })
}
