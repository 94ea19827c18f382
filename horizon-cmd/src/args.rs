//! Arguments shared by every subcommand and how they fold into a config.

use anyhow::Context;
use clap::Args;
use horizon_core::config::{ComputeFrom, PipelineConfig};
use horizon_core::record::DailySeries;
use horizon_core::source::{DamKey, DamSource};
use horizon_utils::dates::parse_date;
use std::path::PathBuf;

use crate::source::CsvDirectorySource;

#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Directory holding `<source>/<dam>.csv` files
    #[arg(short = 'd', long)]
    pub data_dir: PathBuf,

    /// JSON pipeline config; flags below override its fields
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Longest interior gap, in days, filled by interpolation
    #[arg(long)]
    pub max_fill_gap: Option<usize>,

    /// Authoritative flow when reconciling: `i` (inflow) or `r` (release)
    #[arg(long)]
    pub compute_from: Option<ComputeFrom>,

    /// First day of records to use (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Last day of records to use (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
}

impl DatasetArgs {
    /// Load the config file, if any, and apply flag overrides.
    pub fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_path(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(max_fill_gap) = self.max_fill_gap {
            config.max_fill_gap = max_fill_gap;
        }
        if let Some(compute_from) = self.compute_from {
            config.compute_from = compute_from;
        }
        Ok(config)
    }

    pub fn source(&self) -> CsvDirectorySource {
        CsvDirectorySource::new(&self.data_dir)
    }

    /// Resolve a dam and clip it to `--start`/`--end`.
    pub fn load_series(&self, dam: &str) -> anyhow::Result<DailySeries> {
        let key: DamKey = dam.parse()?;
        let series = self
            .source()
            .resolve(&key)
            .with_context(|| format!("Failed to load records for {key}"))?;
        let start = self.start.as_deref().map(parse_date).transpose()?;
        let end = self.end.as_deref().map(parse_date).transpose()?;
        Ok(series.between(start, end))
    }
}

#[derive(Args, Debug, Clone, Copy)]
pub struct QueryArgs {
    /// Target water week (1-52)
    #[arg(short = 'w', long)]
    pub water_week: u32,

    /// Forecast horizon in weeks
    #[arg(short = 'H', long)]
    pub horizon: u32,

    /// Ignore water years before this one
    #[arg(long)]
    pub cutoff_year: Option<i32>,

    /// Fewest samples accepted
    #[arg(long)]
    pub min_points: Option<usize>,
}

impl QueryArgs {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if self.cutoff_year.is_some() {
            config.cutoff_year = self.cutoff_year;
        }
        if let Some(min_points) = self.min_points {
            config.min_allowable_points = min_points;
        }
    }
}
