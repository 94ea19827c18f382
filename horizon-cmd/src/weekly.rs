//! `weekly` and `availability`: write pipeline output as CSV.

use horizon_data::{availability_samples, prepare_weekly};
use log::info;
use std::path::Path;

use crate::args::{DatasetArgs, QueryArgs};
use crate::output::write_csv;

/// Write the reconciled weekly series of one dam.
pub fn run_weekly(dataset: &DatasetArgs, dam: &str, out: &Path) -> anyhow::Result<()> {
    let config = dataset.pipeline_config()?;
    let series = dataset.load_series(dam)?;
    let weekly = prepare_weekly(&series, &config)?;
    write_csv(out, &weekly)?;
    info!("Wrote {} water weeks for {} to {}", weekly.len(), dam, out.display());
    Ok(())
}

/// Write the availability samples of one dam for a water week and horizon.
pub fn run_availability(
    dataset: &DatasetArgs,
    query: &QueryArgs,
    dam: &str,
    out: &Path,
) -> anyhow::Result<()> {
    let mut config = dataset.pipeline_config()?;
    query.apply(&mut config);
    let series = dataset.load_series(dam)?;
    let samples = availability_samples(&series, &config, query.water_week, query.horizon)?;
    write_csv(out, &samples)?;
    info!(
        "Wrote {} availability samples for {} to {}",
        samples.len(),
        dam,
        out.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};
    use std::fmt::Write;
    use std::fs;

    /// Three water years of metric records with constant storage and flows.
    fn write_dam(dir: &Path) {
        let mut body = String::from("date,storage,release,inflow\n");
        let start = NaiveDate::from_ymd_opt(1999, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2002, 9, 30).unwrap();
        let mut date = start;
        while date <= end {
            writeln!(body, "{},100,2,2", date.format("%Y-%m-%d")).unwrap();
            date = date + Days::new(1);
        }
        fs::create_dir(dir.join("grand")).unwrap();
        fs::write(dir.join("grand").join("folsom.csv"), body).unwrap();
        fs::write(
            dir.join("config.json"),
            r#"{"storage_unit": "mcm", "flow_unit": "mcm_per_day"}"#,
        )
        .unwrap();
    }

    fn dataset(dir: &Path) -> DatasetArgs {
        DatasetArgs {
            data_dir: dir.to_path_buf(),
            config: Some(dir.join("config.json")),
            max_fill_gap: None,
            compute_from: None,
            start: None,
            end: None,
        }
    }

    #[test]
    fn test_run_weekly_writes_every_week() {
        let dir = tempfile::tempdir().unwrap();
        write_dam(dir.path());
        let out = dir.path().join("weekly.csv");
        run_weekly(&dataset(dir.path()), "grand_folsom", &out).unwrap();
        let written = fs::read_to_string(&out).unwrap();
        // header plus 3 * 52 weeks
        assert_eq!(written.lines().count(), 1 + 156);
        assert!(written.starts_with("water_year,water_week,s_start"));
    }

    #[test]
    fn test_run_availability_respects_min_points() {
        let dir = tempfile::tempdir().unwrap();
        write_dam(dir.path());
        let out = dir.path().join("samples.csv");
        let query = QueryArgs {
            water_week: 10,
            horizon: 2,
            cutoff_year: None,
            min_points: Some(3),
        };
        run_availability(&dataset(dir.path()), &query, "grand_folsom", &out).unwrap();
        let written = fs::read_to_string(&out).unwrap();
        assert_eq!(written.lines().count(), 1 + 3);

        let strict = QueryArgs {
            min_points: Some(4),
            ..query
        };
        assert!(run_availability(&dataset(dir.path()), &strict, "grand_folsom", &out).is_err());
    }
}
