use anyhow::Context;
use serde::Serialize;
use std::path::Path;

/// Write rows as CSV with a header taken from the field names.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_core::weekly::AvailabilitySample;

    #[test]
    fn test_write_samples_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.csv");
        let samples = vec![AvailabilitySample {
            year: 2001,
            water_week: 3,
            horizon_weeks: 2,
            availability: 12.5,
            release: 1.5,
        }];
        write_csv(&path, &samples).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("year,water_week,horizon_weeks,availability,release")
        );
        assert_eq!(lines.next(), Some("2001,3,2,12.5,1.5"));
    }
}
