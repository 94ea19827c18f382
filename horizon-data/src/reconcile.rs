//! Mass-balance reconciliation of weekly inflow and release.
//!
//! Over a week, `i_ - r_ == s_change`. One flow variable is kept as reported
//! and the other is recomputed from it so the balance holds exactly.

use horizon_core::config::ComputeFrom;
use horizon_core::error::{HorizonError, Result};
use horizon_core::weekly::WeeklyRecord;
use log::warn;

fn release_from_inflow(week: &WeeklyRecord, inflow: f64, s_change: f64) -> WeeklyRecord {
    WeeklyRecord {
        i_: Some(inflow),
        r_: Some(inflow - s_change),
        i_estimated: false,
        r_estimated: true,
        ..week.clone()
    }
}

fn inflow_from_release(week: &WeeklyRecord, release: f64, s_change: f64) -> WeeklyRecord {
    WeeklyRecord {
        i_: Some(release + s_change),
        r_: Some(release),
        i_estimated: true,
        r_estimated: false,
        ..week.clone()
    }
}

fn reconcile_week(week: &WeeklyRecord, compute_from: ComputeFrom) -> Result<WeeklyRecord> {
    let s_change = match week.s_change {
        Some(s_change) if week.is_valid => s_change,
        _ => return Ok(week.clone()),
    };
    match (compute_from, week.i_, week.r_) {
        (ComputeFrom::I, Some(inflow), _) => Ok(release_from_inflow(week, inflow, s_change)),
        (ComputeFrom::I, None, Some(release)) => Ok(inflow_from_release(week, release, s_change)),
        (ComputeFrom::R, _, Some(release)) => Ok(inflow_from_release(week, release, s_change)),
        (ComputeFrom::R, Some(inflow), None) => Ok(release_from_inflow(week, inflow, s_change)),
        (_, None, None) => Err(HorizonError::InsufficientData {
            water_year: week.water_year,
            water_week: week.water_week,
        }),
    }
}

/// Recompute one flow variable per valid week from the other and the storage
/// change.
///
/// `compute_from` names the variable kept as reported; when it has no data in
/// a week the other variable is used instead. Invalid weeks pass through
/// unchanged. A valid week with neither inflow nor release is an error.
pub fn back_calc_missing_flows(
    weekly: &[WeeklyRecord],
    compute_from: ComputeFrom,
) -> Result<Vec<WeeklyRecord>> {
    weekly
        .iter()
        .map(|week| reconcile_week(week, compute_from))
        .collect()
}

/// Remove valid weeks that have neither inflow nor release, so they are not
/// carried into reconciliation. Returns the kept weeks and the number removed.
pub fn drop_flowless_weeks(weekly: Vec<WeeklyRecord>) -> (Vec<WeeklyRecord>, usize) {
    let before = weekly.len();
    let kept: Vec<WeeklyRecord> = weekly
        .into_iter()
        .filter(|w| !(w.is_valid && w.i_.is_none() && w.r_.is_none()))
        .collect();
    let dropped = before - kept.len();
    if dropped > 0 {
        warn!("Dropped {} water weeks with no inflow or release data", dropped);
    }
    (kept, dropped)
}
