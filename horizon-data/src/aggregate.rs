//! Daily to water-week aggregation.

use horizon_core::record::{DailyRecord, DailySeries, Datum};
use horizon_core::water_year::{
    days_in_water_week, offset_week, to_water_calendar, WaterYearEpoch,
};
use horizon_core::weekly::WeeklyRecord;
use log::{info, warn};

/// Sum over the week and the number of days with a value. The sum is `None`
/// unless every day of the week has a value.
fn covered_sum(values: impl Iterator<Item = Datum>, n_days_in_week: u32) -> (Option<f64>, u32) {
    let (sum, covered) = values
        .filter_map(|datum| datum.value())
        .fold((0.0, 0u32), |(sum, n), v| (sum + v, n + 1));
    if covered == n_days_in_week {
        (Some(sum), covered)
    } else {
        (None, covered)
    }
}

fn aggregate_week(
    days: &[DailyRecord],
    epoch: WaterYearEpoch,
    previous: Option<&WeeklyRecord>,
) -> WeeklyRecord {
    let position = to_water_calendar(days[0].date, epoch);
    let (water_year, water_week) = position.week_key();
    let n_days_in_week = days_in_water_week(water_year, water_week, epoch);

    let storage: Vec<f64> = days.iter().filter_map(|d| d.storage.value()).collect();
    let n_days_observed = days.iter().filter(|d| d.storage.is_observed()).count() as u32;
    let n_days_filled = days.iter().filter(|d| d.storage.is_filled()).count() as u32;
    // interpolated storage alone is no basis for a storage change
    let is_valid = n_days_observed > 0;

    let (s_start, s_end) = if is_valid {
        // carry the previous week's end storage only across adjacent weeks
        let carried = previous
            .filter(|p| {
                p.is_valid
                    && offset_week(p.water_year, p.water_week, 1) == (water_year, water_week)
            })
            .and_then(|p| p.s_end);
        let s_start = days[0]
            .storage
            .value()
            .or(carried)
            .or_else(|| storage.first().copied());
        let s_end = days[days.len() - 1]
            .storage
            .value()
            .or_else(|| storage.last().copied());
        (s_start, s_end)
    } else {
        (None, None)
    };
    let s_change = match (s_start, s_end) {
        (Some(start), Some(end)) => Some(end - start),
        _ => None,
    };
    let (i_, n_days_inflow) = covered_sum(days.iter().map(|d| d.inflow), n_days_in_week);
    let (r_, n_days_release) = covered_sum(days.iter().map(|d| d.release), n_days_in_week);

    WeeklyRecord {
        water_year,
        water_week,
        s_start,
        s_end,
        s_change,
        i_,
        r_,
        i_estimated: false,
        r_estimated: false,
        n_days: days.len() as u32,
        n_days_in_week,
        n_days_observed,
        n_days_filled,
        n_days_inflow,
        n_days_release,
        is_valid,
    }
}

/// Group a daily series into water weeks, in chronological order.
///
/// Every week the series touches yields a record; weeks without an observed
/// storage value are flagged `is_valid == false`. Flow totals are only given
/// for weeks whose every calendar day has a value, so weeks clipped by the
/// ends of the series carry no flows.
pub fn aggregate_to_water_weeks(
    series: &DailySeries,
    epoch: WaterYearEpoch,
) -> Vec<WeeklyRecord> {
    let mut weeks: Vec<WeeklyRecord> = Vec::new();
    let same_week = |a: &DailyRecord, b: &DailyRecord| {
        to_water_calendar(a.date, epoch).week_key() == to_water_calendar(b.date, epoch).week_key()
    };
    for days in series.records().chunk_by(same_week) {
        let week = aggregate_week(days, epoch, weeks.last());
        weeks.push(week);
    }

    let invalid = weeks.iter().filter(|w| !w.is_valid).count();
    if invalid > 0 {
        warn!(
            "{} of {} water weeks have no observed storage and are flagged invalid",
            invalid,
            weeks.len()
        );
    }
    info!(
        "Aggregated {} days into {} water weeks",
        series.len(),
        weeks.len()
    );
    weeks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::fill_gaps;
    use chrono::{NaiveDate, TimeDelta};
    use horizon_core::date_range::DateRange;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn constant_series(start: NaiveDate, end: NaiveDate) -> DailySeries {
        let records = DateRange(start, end)
            .map(|date| DailyRecord::new(date, Some(100.0), Some(10.0), Some(10.0)))
            .collect();
        DailySeries::from_records(records).unwrap()
    }

    #[test]
    fn test_constant_three_water_years() {
        let series = constant_series(ymd(2000, 10, 1), ymd(2003, 9, 30));
        let weeks = aggregate_to_water_weeks(&series, WaterYearEpoch::US);
        assert_eq!(weeks.len(), 3 * 52);
        for week in &weeks {
            assert!(week.is_valid);
            assert_eq!(week.s_change, Some(0.0));
            assert_eq!(week.i_, week.r_);
            assert_eq!(week.i_, Some(10.0 * week.n_days as f64));
        }
        // water year 2004 would hold the leap day; 2001-2003 do not
        assert!(weeks.iter().filter(|w| w.water_week == 52).all(|w| w.n_days == 8));
        assert_eq!(weeks.iter().map(|w| w.n_days).sum::<u32>(), 3 * 365);
    }

    #[test]
    fn test_storage_change_invariant() {
        let start = ymd(2019, 10, 1);
        let records = DateRange(start, ymd(2020, 9, 30))
            .enumerate()
            .map(|(i, date)| {
                let storage = 500.0 + (i as f64 * 0.37).sin() * 40.0;
                DailyRecord::new(date, Some(storage), Some(3.0), None)
            })
            .collect();
        let series = DailySeries::from_records(records).unwrap();
        let weeks = aggregate_to_water_weeks(&series, WaterYearEpoch::US);
        assert_eq!(weeks.last().unwrap().n_days, 9);
        for week in &weeks {
            assert_eq!(week.s_end.unwrap() - week.s_start.unwrap(), week.s_change.unwrap());
            assert_eq!(week.i_, None);
        }
    }

    #[test]
    fn test_first_day_missing_carries_previous_end() {
        let start = ymd(2000, 10, 1);
        let mut records: Vec<DailyRecord> = DateRange(start, start + TimeDelta::days(13))
            .enumerate()
            .map(|(i, date)| DailyRecord::new(date, Some(i as f64), None, None))
            .collect();
        // first day of week 2
        records[7].storage = Datum::Missing;
        let series = DailySeries::from_records(records).unwrap();
        let weeks = aggregate_to_water_weeks(&series, WaterYearEpoch::US);
        assert_eq!(weeks[0].s_end, Some(6.0));
        assert_eq!(weeks[1].s_start, Some(6.0));
        assert_eq!(weeks[1].s_end, Some(13.0));
        assert_eq!(weeks[1].n_days_observed, 6);
    }

    #[test]
    fn test_twenty_day_gap_weeks_invalid() {
        let start = ymd(2000, 10, 1);
        let records: Vec<DailyRecord> = DateRange(start, start + TimeDelta::days(55))
            .enumerate()
            .map(|(i, date)| {
                let storage = if (14..34).contains(&i) { None } else { Some(100.0) };
                DailyRecord::new(date, storage, Some(1.0), Some(1.0))
            })
            .collect();
        let series = fill_gaps(&DailySeries::from_records(records).unwrap(), 10);
        let weeks = aggregate_to_water_weeks(&series, WaterYearEpoch::US);
        assert_eq!(weeks.len(), 8);
        // days 14..=20 and 21..=27 are weeks 3 and 4, entirely inside the gap
        assert!(!weeks[2].is_valid && !weeks[3].is_valid);
        assert_eq!(weeks[2].s_start, None);
        assert_eq!(weeks[2].s_change, None);
        assert_eq!(weeks[2].r_, Some(7.0));
        assert!(weeks[4].is_valid);
        assert_eq!(weeks[4].n_days_observed, 1);
        assert!(weeks[0].is_valid && weeks[1].is_valid);
    }

    #[test]
    fn test_filled_days_counted() {
        let start = ymd(2000, 10, 1);
        let records: Vec<DailyRecord> = DateRange(start, start + TimeDelta::days(20))
            .enumerate()
            .map(|(i, date)| {
                let storage = if (9..14).contains(&i) { None } else { Some(100.0) };
                DailyRecord::new(date, storage, None, None)
            })
            .collect();
        let series = fill_gaps(&DailySeries::from_records(records).unwrap(), 10);
        assert!(series.iter().all(|r| !r.storage.is_missing()));
        let weeks = aggregate_to_water_weeks(&series, WaterYearEpoch::US);
        assert_eq!(weeks[1].n_days_filled, 5);
        assert_eq!(weeks[1].n_days_observed, 2);
        assert!(weeks.iter().all(|w| w.is_valid));
    }

    #[test]
    fn test_fully_interpolated_week_invalid() {
        let start = ymd(2000, 10, 1);
        let records: Vec<DailyRecord> = DateRange(start, start + TimeDelta::days(27))
            .enumerate()
            .map(|(i, date)| {
                // days 6..=14 missing, a 9-day gap covering all of week 2
                let storage = if (6..15).contains(&i) { None } else { Some(100.0) };
                DailyRecord::new(date, storage, Some(1.0), Some(1.0))
            })
            .collect();
        let series = fill_gaps(&DailySeries::from_records(records).unwrap(), 10);
        let weeks = aggregate_to_water_weeks(&series, WaterYearEpoch::US);
        assert_eq!((weeks[1].n_days_observed, weeks[1].n_days_filled), (0, 7));
        assert!(!weeks[1].is_valid);
        assert_eq!(weeks[1].s_start, None);
        assert_eq!(weeks[1].s_end, None);
        assert_eq!(weeks[1].s_change, None);
        // week 3 opens on a filled day and has observed days after it
        assert!(weeks[2].is_valid);
        assert_eq!(weeks[2].n_days_filled, 1);
        assert!(weeks[0].is_valid && weeks[3].is_valid);
    }

    #[test]
    fn test_partial_flow_coverage_has_no_total() {
        let start = ymd(2000, 10, 1);
        let records: Vec<DailyRecord> = DateRange(start, start + TimeDelta::days(13))
            .enumerate()
            .map(|(i, date)| {
                // inflow on one day of week 1 only
                let inflow = if i == 3 || i >= 7 { Some(10.0) } else { None };
                DailyRecord::new(date, Some(100.0), Some(10.0), inflow)
            })
            .collect();
        let series = DailySeries::from_records(records).unwrap();
        let weeks = aggregate_to_water_weeks(&series, WaterYearEpoch::US);
        assert_eq!(weeks[0].i_, None);
        assert_eq!(weeks[0].n_days_inflow, 1);
        assert_eq!(weeks[0].r_, Some(70.0));
        assert_eq!(weeks[0].n_days_release, 7);
        assert_eq!(weeks[1].i_, Some(70.0));
        assert_eq!(weeks[1].n_days_inflow, 7);
    }

    #[test]
    fn test_clipped_edge_weeks_have_no_flows() {
        // starts on day 5 of week 1 and ends on day 2 of week 3
        let series = constant_series(ymd(2000, 10, 5), ymd(2000, 10, 16));
        let weeks = aggregate_to_water_weeks(&series, WaterYearEpoch::US);
        assert_eq!(weeks.len(), 3);
        assert_eq!((weeks[0].n_days, weeks[0].n_days_in_week), (3, 7));
        assert!(weeks[0].is_valid);
        assert!(!weeks[0].is_full_week());
        assert_eq!(weeks[0].i_, None);
        assert_eq!(weeks[0].n_days_inflow, 3);
        assert!(weeks[1].is_complete());
        assert_eq!(weeks[1].i_, Some(70.0));
        assert_eq!(weeks[2].n_days, 2);
        assert_eq!(weeks[2].r_, None);
    }
}
