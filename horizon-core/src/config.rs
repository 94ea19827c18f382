//! Options recognized across the pipeline.

use crate::error::{HorizonError, Result};
use crate::water_year::WaterYearEpoch;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default longest run of missing days that gets interpolated.
pub const DEFAULT_MAX_FILL_GAP: usize = 10;

/// Default minimum number of qualifying years for an availability query.
pub const DEFAULT_MIN_ALLOWABLE_POINTS: usize = 10;

/// Which flow variable the mass balance is computed from.
///
/// `I` keeps inflow and derives release; `R` keeps release and derives inflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ComputeFrom {
    #[default]
    #[serde(rename = "i")]
    I,
    #[serde(rename = "r")]
    R,
}

impl FromStr for ComputeFrom {
    type Err = HorizonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "i" | "I" => Ok(ComputeFrom::I),
            "r" | "R" => Ok(ComputeFrom::R),
            other => Err(HorizonError::InvalidFormat(format!(
                "compute_from must be \"i\" or \"r\", got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for ComputeFrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeFrom::I => write!(f, "i"),
            ComputeFrom::R => write!(f, "r"),
        }
    }
}

/// Which weeks' inflow counts toward availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonWindow {
    /// Target week and the following `horizon - 1` weeks
    #[default]
    IncludeTargetWeek,
    /// The `horizon` weeks after the target week
    FollowingWeeks,
}

impl HorizonWindow {
    /// Week offsets from the target week covered by a horizon.
    pub fn offsets(&self, horizon: u32) -> std::ops::Range<u32> {
        match self {
            HorizonWindow::IncludeTargetWeek => 0..horizon,
            HorizonWindow::FollowingWeeks => 1..horizon + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_fill_gap: usize,
    pub water_year_epoch: WaterYearEpoch,
    pub compute_from: ComputeFrom,
    pub min_allowable_points: usize,
    pub cutoff_year: Option<i32>,
    pub horizon_window: HorizonWindow,
    pub storage_unit: String,
    pub flow_unit: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            max_fill_gap: DEFAULT_MAX_FILL_GAP,
            water_year_epoch: WaterYearEpoch::default(),
            compute_from: ComputeFrom::default(),
            min_allowable_points: DEFAULT_MIN_ALLOWABLE_POINTS,
            cutoff_year: None,
            horizon_window: HorizonWindow::default(),
            storage_unit: "af".to_string(),
            flow_unit: "cfs".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<PipelineConfig> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<PipelineConfig> {
        let json = std::fs::read_to_string(path)?;
        PipelineConfig::from_json_str(&json)
    }

    /// Reject unit tags the converter would not accept.
    pub fn validate(&self) -> Result<()> {
        self.storage_unit.parse::<crate::units::StorageUnit>()?;
        self.flow_unit.parse::<crate::units::FlowUnit>()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_fill_gap, 10);
        assert_eq!(config.water_year_epoch, WaterYearEpoch::US);
        assert_eq!(config.compute_from, ComputeFrom::I);
        assert_eq!(config.cutoff_year, None);
        assert_eq!(config.horizon_window, HorizonWindow::IncludeTargetWeek);
    }

    #[test]
    fn test_partial_json() {
        let config = PipelineConfig::from_json_str(
            r#"{"max_fill_gap": 5, "compute_from": "r", "cutoff_year": 1995,
                "water_year_epoch": {"month": 1, "day": 1},
                "horizon_window": "following_weeks"}"#,
        )
        .unwrap();
        assert_eq!(config.max_fill_gap, 5);
        assert_eq!(config.compute_from, ComputeFrom::R);
        assert_eq!(config.cutoff_year, Some(1995));
        assert!(config.water_year_epoch.is_calendar_year());
        assert_eq!(config.horizon_window, HorizonWindow::FollowingWeeks);
        assert_eq!(config.min_allowable_points, DEFAULT_MIN_ALLOWABLE_POINTS);
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"storage_unit": "gallons"}"#),
            Err(HorizonError::InvalidUnit(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"water_year_epoch": {"month": 2, "day": 29}}"#),
            Err(HorizonError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"compute_from": "x"}"#),
            Err(HorizonError::Config(_))
        ));
    }

    #[test]
    fn test_window_offsets() {
        assert_eq!(HorizonWindow::IncludeTargetWeek.offsets(3), 0..3);
        assert_eq!(HorizonWindow::FollowingWeeks.offsets(3), 1..4);
    }

    #[test]
    fn test_compute_from_parse() {
        assert_eq!("i".parse::<ComputeFrom>().unwrap(), ComputeFrom::I);
        assert_eq!("R".parse::<ComputeFrom>().unwrap(), ComputeFrom::R);
        assert!("both".parse::<ComputeFrom>().is_err());
    }
}
