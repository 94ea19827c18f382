//! Core types for inferring reservoir release policies: daily and weekly
//! records, the water calendar, unit conversion and the dam data source seam.

pub mod config;
pub mod date_range;
pub mod error;
pub mod record;
pub mod source;
pub mod units;
pub mod water_year;
pub mod weekly;

pub use error::{HorizonError, Result};
