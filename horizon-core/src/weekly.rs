use serde::{Deserialize, Serialize};

/// Storage and flow totals for one water week.
///
/// Volumes are in the units of the daily series they were aggregated from
/// (MCM after unit conversion). Weeks with no observed storage are kept with
/// `is_valid == false` and empty storage fields so callers can see what was
/// dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRecord {
    pub water_year: i32,
    pub water_week: u32,
    pub s_start: Option<f64>,
    pub s_end: Option<f64>,
    pub s_change: Option<f64>,
    /// Inflow volume over the week, only when every day has an inflow value
    pub i_: Option<f64>,
    /// Release volume over the week, only when every day has a release value
    pub r_: Option<f64>,
    pub i_estimated: bool,
    pub r_estimated: bool,
    /// Days of the week present in the series
    pub n_days: u32,
    /// Calendar length of the week (7, or 8-9 for week 52)
    pub n_days_in_week: u32,
    /// Days with an observed storage value
    pub n_days_observed: u32,
    /// Days with an interpolated storage value
    pub n_days_filled: u32,
    /// Days with an inflow value, observed or filled
    pub n_days_inflow: u32,
    /// Days with a release value, observed or filled
    pub n_days_release: u32,
    pub is_valid: bool,
}

impl WeeklyRecord {
    pub fn week_key(&self) -> (i32, u32) {
        (self.water_year, self.water_week)
    }

    /// Every calendar day of the week is in the series.
    pub fn is_full_week(&self) -> bool {
        self.n_days == self.n_days_in_week
    }

    /// Valid, covering the whole week, with both flow totals present.
    pub fn is_complete(&self) -> bool {
        self.is_valid && self.is_full_week() && self.i_.is_some() && self.r_.is_some()
    }
}

/// Availability against release for one year of a (water_week, horizon) query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvailabilitySample {
    pub year: i32,
    pub water_week: u32,
    pub horizon_weeks: u32,
    /// Starting storage plus inflow over the horizon window
    pub availability: f64,
    pub release: f64,
}
