//! The daily-to-weekly pipeline, stage by stage.

use crate::aggregate::aggregate_to_water_weeks;
use crate::availability::{compute_availability, AvailabilityQuery};
use crate::interpolation::fill_gaps;
use crate::reconcile::{back_calc_missing_flows, drop_flowless_weeks};
use horizon_core::config::PipelineConfig;
use horizon_core::error::Result;
use horizon_core::record::DailySeries;
use horizon_core::units::convert_to_metric;
use horizon_core::weekly::{AvailabilitySample, WeeklyRecord};
use log::info;

/// Convert units, fill short gaps, aggregate to water weeks and reconcile
/// flows. Weeks with storage but no flow data at all are dropped before
/// reconciliation.
pub fn prepare_weekly(
    series: &DailySeries,
    config: &PipelineConfig,
) -> Result<Vec<WeeklyRecord>> {
    let metric = convert_to_metric(series, &config.storage_unit, &config.flow_unit)?;
    let filled = fill_gaps(&metric, config.max_fill_gap);
    let weekly = aggregate_to_water_weeks(&filled, config.water_year_epoch);
    let (weekly, _) = drop_flowless_weeks(weekly);
    let reconciled = back_calc_missing_flows(&weekly, config.compute_from)?;
    info!(
        "Prepared {} water weeks (compute_from = {})",
        reconciled.len(),
        config.compute_from
    );
    Ok(reconciled)
}

/// Run [`prepare_weekly`] and build availability samples for one query.
pub fn availability_samples(
    series: &DailySeries,
    config: &PipelineConfig,
    water_week: u32,
    horizon: u32,
) -> Result<Vec<AvailabilitySample>> {
    let weekly = prepare_weekly(series, config)?;
    let query = AvailabilityQuery::from_config(water_week, horizon, config);
    compute_availability(&weekly, &query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use horizon_core::config::ComputeFrom;
    use horizon_core::date_range::DateRange;
    use horizon_core::error::HorizonError;
    use horizon_core::record::DailyRecord;

    fn metric_config() -> PipelineConfig {
        PipelineConfig {
            storage_unit: "mcm".to_string(),
            flow_unit: "mcm_per_day".to_string(),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_constant_series_balances() {
        let start = NaiveDate::from_ymd_opt(2000, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2003, 9, 30).unwrap();
        let records = DateRange(start, end)
            .map(|date| DailyRecord::new(date, Some(100.0), Some(10.0), Some(10.0)))
            .collect();
        let series = DailySeries::from_records(records).unwrap();
        for compute_from in [ComputeFrom::I, ComputeFrom::R] {
            let config = PipelineConfig {
                compute_from,
                ..metric_config()
            };
            let weekly = prepare_weekly(&series, &config).unwrap();
            assert_eq!(weekly.len(), 156);
            for week in &weekly {
                assert_eq!(week.s_change, Some(0.0));
                assert_eq!(week.i_, week.r_);
            }
        }
    }

    #[test]
    fn test_gap_weeks_flow_through_as_invalid() {
        let start = NaiveDate::from_ymd_opt(2000, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2001, 9, 30).unwrap();
        let records = DateRange(start, end)
            .enumerate()
            .map(|(i, date)| {
                let storage = if (14..34).contains(&i) { None } else { Some(50.0) };
                DailyRecord::new(date, storage, Some(2.0), Some(2.0))
            })
            .collect();
        let series = DailySeries::from_records(records).unwrap();
        let weekly = prepare_weekly(&series, &metric_config()).unwrap();
        assert_eq!(weekly.iter().filter(|w| !w.is_valid).count(), 2);

        let samples = availability_samples(
            &series,
            &PipelineConfig {
                min_allowable_points: 1,
                ..metric_config()
            },
            3,
            1,
        );
        assert!(matches!(
            samples,
            Err(HorizonError::InsufficientSamples { needed: 1, found: 0 })
        ));
    }

    #[test]
    fn test_series_starting_mid_week_skips_clipped_week() {
        let start = NaiveDate::from_ymd_opt(2000, 10, 5).unwrap();
        let end = NaiveDate::from_ymd_opt(2003, 9, 30).unwrap();
        let records = DateRange(start, end)
            .map(|date| DailyRecord::new(date, Some(100.0), Some(10.0), Some(10.0)))
            .collect();
        let series = DailySeries::from_records(records).unwrap();
        let config = PipelineConfig {
            min_allowable_points: 1,
            ..metric_config()
        };
        let samples = availability_samples(&series, &config, 1, 1).unwrap();
        let years: Vec<i32> = samples.iter().map(|s| s.year).collect();
        assert_eq!(years, vec![2002, 2003]);
        for sample in &samples {
            assert_eq!(sample.availability, 170.0);
            assert_eq!(sample.release, 70.0);
        }
    }

    #[test]
    fn test_partially_reported_flows_give_no_sample() {
        let start = NaiveDate::from_ymd_opt(2000, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2002, 9, 30).unwrap();
        let records = DateRange(start, end)
            .enumerate()
            .map(|(i, date)| {
                // weeks 10-12 of water year 2001 report inflow on one day each
                let inflow = if (63..84).contains(&i) && i % 7 != 0 {
                    None
                } else {
                    Some(10.0)
                };
                DailyRecord::new(date, Some(100.0), None, inflow)
            })
            .collect();
        let series = DailySeries::from_records(records).unwrap();
        let config = PipelineConfig {
            max_fill_gap: 0,
            min_allowable_points: 1,
            ..metric_config()
        };
        let weekly = prepare_weekly(&series, &config).unwrap();
        assert!(!weekly
            .iter()
            .any(|w| w.water_year == 2001 && (10..=12).contains(&w.water_week)));

        let samples = availability_samples(&series, &config, 10, 1).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].year, 2002);
        assert_eq!(samples[0].availability, 170.0);
        assert_eq!(samples[0].release, 70.0);
    }

    #[test]
    fn test_unknown_unit_fails_early() {
        let config = PipelineConfig {
            flow_unit: "gpm".to_string(),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            prepare_weekly(&DailySeries::default(), &config),
            Err(HorizonError::InvalidUnit(_))
        ));
    }
}
