//! Normalization of storage and flow units.
//!
//! Storage is converted to million cubic meters (MCM) and flows to daily
//! volumes in MCM per day.

use crate::error::{HorizonError, Result};
use crate::record::{DailyRecord, DailySeries};
use std::fmt;
use std::str::FromStr;

pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const CUBIC_METERS_PER_ACRE_FOOT: f64 = 1_233.481_837_547_52;
pub const CUBIC_METERS_PER_CUBIC_FOOT: f64 = 0.028_316_846_592;
pub const CUBIC_METERS_PER_MCM: f64 = 1.0e6;

/// Volumetric unit of reported storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageUnit {
    AcreFeet,
    ThousandAcreFeet,
    MillionCubicMeters,
    CubicMeters,
    CubicFeet,
}

/// Rate (or daily volume) unit of reported release and inflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowUnit {
    CubicFeetPerSecond,
    CubicMetersPerSecond,
    AcreFeetPerDay,
    MillionCubicMetersPerDay,
}

impl StorageUnit {
    /// Multiplier from this unit to MCM.
    pub fn to_mcm_factor(&self) -> f64 {
        match self {
            StorageUnit::AcreFeet => CUBIC_METERS_PER_ACRE_FOOT / CUBIC_METERS_PER_MCM,
            StorageUnit::ThousandAcreFeet => {
                1_000.0 * CUBIC_METERS_PER_ACRE_FOOT / CUBIC_METERS_PER_MCM
            }
            StorageUnit::MillionCubicMeters => 1.0,
            StorageUnit::CubicMeters => 1.0 / CUBIC_METERS_PER_MCM,
            StorageUnit::CubicFeet => CUBIC_METERS_PER_CUBIC_FOOT / CUBIC_METERS_PER_MCM,
        }
    }
}

impl FlowUnit {
    /// Multiplier from this unit to MCM per day.
    pub fn to_mcm_per_day_factor(&self) -> f64 {
        match self {
            FlowUnit::CubicFeetPerSecond => {
                CUBIC_METERS_PER_CUBIC_FOOT * SECONDS_PER_DAY / CUBIC_METERS_PER_MCM
            }
            FlowUnit::CubicMetersPerSecond => SECONDS_PER_DAY / CUBIC_METERS_PER_MCM,
            FlowUnit::AcreFeetPerDay => CUBIC_METERS_PER_ACRE_FOOT / CUBIC_METERS_PER_MCM,
            FlowUnit::MillionCubicMetersPerDay => 1.0,
        }
    }
}

impl FromStr for StorageUnit {
    type Err = HorizonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "af" | "acre-ft" | "acre_ft" | "acre-feet" => Ok(StorageUnit::AcreFeet),
            "taf" => Ok(StorageUnit::ThousandAcreFeet),
            "mcm" => Ok(StorageUnit::MillionCubicMeters),
            "m3" => Ok(StorageUnit::CubicMeters),
            "ft3" | "cf" => Ok(StorageUnit::CubicFeet),
            _ => Err(HorizonError::InvalidUnit(s.to_string())),
        }
    }
}

impl FromStr for FlowUnit {
    type Err = HorizonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cfs" | "ft3/s" => Ok(FlowUnit::CubicFeetPerSecond),
            "cms" | "m3/s" => Ok(FlowUnit::CubicMetersPerSecond),
            "af_per_day" | "afd" => Ok(FlowUnit::AcreFeetPerDay),
            "mcm_per_day" => Ok(FlowUnit::MillionCubicMetersPerDay),
            _ => Err(HorizonError::InvalidUnit(s.to_string())),
        }
    }
}

impl fmt::Display for StorageUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            StorageUnit::AcreFeet => "af",
            StorageUnit::ThousandAcreFeet => "taf",
            StorageUnit::MillionCubicMeters => "mcm",
            StorageUnit::CubicMeters => "m3",
            StorageUnit::CubicFeet => "ft3",
        };
        write!(f, "{tag}")
    }
}

impl fmt::Display for FlowUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            FlowUnit::CubicFeetPerSecond => "cfs",
            FlowUnit::CubicMetersPerSecond => "cms",
            FlowUnit::AcreFeetPerDay => "af_per_day",
            FlowUnit::MillionCubicMetersPerDay => "mcm_per_day",
        };
        write!(f, "{tag}")
    }
}

/// Convert a series from the given unit tags to MCM storage and MCM/day flows.
pub fn convert_to_metric(
    series: &DailySeries,
    storage_unit: &str,
    flow_unit: &str,
) -> Result<DailySeries> {
    let storage_unit: StorageUnit = storage_unit.parse()?;
    let flow_unit: FlowUnit = flow_unit.parse()?;
    Ok(convert_units(series, storage_unit, flow_unit))
}

/// Typed form of [`convert_to_metric`]; cannot fail.
pub fn convert_units(
    series: &DailySeries,
    storage_unit: StorageUnit,
    flow_unit: FlowUnit,
) -> DailySeries {
    let storage_factor = storage_unit.to_mcm_factor();
    let flow_factor = flow_unit.to_mcm_per_day_factor();
    series.map_records(|record| DailyRecord {
        storage: record.storage.map(|v| v * storage_factor),
        release: record.release.map(|v| v * flow_factor),
        inflow: record.inflow.map(|v| v * flow_factor),
        ..*record
    })
}
