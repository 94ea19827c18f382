//! Dam records stored as CSV files on disk.

use horizon_core::error::{HorizonError, Result};
use horizon_core::record::DailySeries;
use horizon_core::source::{DamKey, DamSource};
use log::info;
use std::fs::File;
use std::path::PathBuf;

/// Resolves `<source>_<dam>` to `<root>/<source>/<dam>.csv`.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    root: PathBuf,
}

impl CsvDirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> CsvDirectorySource {
        CsvDirectorySource { root: root.into() }
    }

    pub fn path_for(&self, key: &DamKey) -> PathBuf {
        self.root.join(&key.source).join(format!("{}.csv", key.dam))
    }
}

impl DamSource for CsvDirectorySource {
    fn resolve(&self, key: &DamKey) -> Result<DailySeries> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Err(HorizonError::DamNotFound(format!(
                "{} ({})",
                key,
                path.display()
            )));
        }
        let series = DailySeries::from_csv_reader(File::open(&path)?)?;
        info!("Loaded {} days for {} from {}", series.len(), key, path.display());
        Ok(series)
    }
}
