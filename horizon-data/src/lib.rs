//! Data processing for daily reservoir records.
//!
//! This crate turns a raw daily series into reconciled water-week totals and
//! availability vs. release samples suitable for policy fitting.

pub mod aggregate;
pub mod availability;
pub mod interpolation;
pub mod pipeline;
pub mod reconcile;

pub use aggregate::aggregate_to_water_weeks;
pub use availability::{compute_availability, AvailabilityQuery};
pub use interpolation::fill_gaps;
pub use pipeline::{availability_samples, prepare_weekly};
pub use reconcile::back_calc_missing_flows;
