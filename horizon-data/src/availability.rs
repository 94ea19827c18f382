//! Availability vs. release samples for a (water week, horizon) query.

use horizon_core::config::{HorizonWindow, PipelineConfig, DEFAULT_MIN_ALLOWABLE_POINTS};
use horizon_core::error::{HorizonError, Result};
use horizon_core::water_year::{offset_week, WEEKS_PER_WATER_YEAR};
use horizon_core::weekly::{AvailabilitySample, WeeklyRecord};
use log::{debug, info};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityQuery {
    /// Target water week, 1..=52
    pub water_week: u32,
    /// Weeks of inflow counted toward availability, at least 1
    pub horizon: u32,
    pub min_allowable_points: usize,
    /// Years before this one are excluded
    pub cutoff_year: Option<i32>,
    pub window: HorizonWindow,
}

impl AvailabilityQuery {
    pub fn new(water_week: u32, horizon: u32) -> AvailabilityQuery {
        AvailabilityQuery {
            water_week,
            horizon,
            min_allowable_points: DEFAULT_MIN_ALLOWABLE_POINTS,
            cutoff_year: None,
            window: HorizonWindow::default(),
        }
    }

    /// Query using the sample threshold, cutoff and window of a pipeline config.
    pub fn from_config(
        water_week: u32,
        horizon: u32,
        config: &PipelineConfig,
    ) -> AvailabilityQuery {
        AvailabilityQuery {
            water_week,
            horizon,
            min_allowable_points: config.min_allowable_points,
            cutoff_year: config.cutoff_year,
            window: config.horizon_window,
        }
    }

    pub fn min_allowable_points(mut self, min_allowable_points: usize) -> AvailabilityQuery {
        self.min_allowable_points = min_allowable_points;
        self
    }

    pub fn cutoff_year(mut self, cutoff_year: Option<i32>) -> AvailabilityQuery {
        self.cutoff_year = cutoff_year;
        self
    }

    pub fn window(mut self, window: HorizonWindow) -> AvailabilityQuery {
        self.window = window;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(1..=WEEKS_PER_WATER_YEAR).contains(&self.water_week) {
            return Err(HorizonError::InvalidQuery(format!(
                "water_week must be in 1..=52, got {}",
                self.water_week
            )));
        }
        if self.horizon == 0 {
            return Err(HorizonError::InvalidQuery(
                "horizon must be at least 1 week".to_string(),
            ));
        }
        Ok(())
    }
}

/// Build one sample per qualifying year.
///
/// A year qualifies when its target week is complete (valid, covering every
/// calendar day, with both flows known) and every week of the horizon window
/// (wrapping into later water years) is present, valid, full and has inflow. Fewer than `min_allowable_points` samples
/// is an error.
pub fn compute_availability(
    weekly: &[WeeklyRecord],
    query: &AvailabilityQuery,
) -> Result<Vec<AvailabilitySample>> {
    query.validate()?;
    let by_week: HashMap<(i32, u32), &WeeklyRecord> =
        weekly.iter().map(|w| (w.week_key(), w)).collect();
    let years: BTreeSet<i32> = weekly
        .iter()
        .map(|w| w.water_year)
        .filter(|year| query.cutoff_year.map_or(true, |cutoff| *year >= cutoff))
        .collect();

    let mut samples = Vec::with_capacity(years.len());
    for year in years {
        let target = match by_week.get(&(year, query.water_week)) {
            Some(week) if week.is_complete() => *week,
            _ => {
                debug!("Skipping {}: target week {} incomplete", year, query.water_week);
                continue;
            }
        };
        let (s_start, release) = match (target.s_start, target.r_) {
            (Some(s_start), Some(release)) => (s_start, release),
            _ => continue,
        };
        let inflow: Option<f64> = query
            .window
            .offsets(query.horizon)
            .map(|offset| {
                let key = offset_week(year, query.water_week, offset);
                by_week
                    .get(&key)
                    .filter(|week| week.is_valid && week.is_full_week())
                    .and_then(|week| week.i_)
            })
            .sum();
        match inflow {
            Some(inflow) => samples.push(AvailabilitySample {
                year,
                water_week: query.water_week,
                horizon_weeks: query.horizon,
                availability: s_start + inflow,
                release,
            }),
            None => debug!("Skipping {}: horizon window incomplete", year),
        }
    }

    if samples.len() < query.min_allowable_points {
        return Err(HorizonError::InsufficientSamples {
            needed: query.min_allowable_points,
            found: samples.len(),
        });
    }
    info!(
        "Built {} availability samples for week {} with a {}-week horizon",
        samples.len(),
        query.water_week,
        query.horizon
    );
    Ok(samples)
}
