/// Error types for the horizon crates
use thiserror::Error;

/// Main error type for release policy inference
#[derive(Error, Debug)]
pub enum HorizonError {
    /// Unit tag not recognized by the converter
    #[error("Unrecognized unit tag: {0}")]
    InvalidUnit(String),

    /// A retained week has no basis for either flow variable
    #[error("Insufficient flow data for water year {water_year}, week {water_week}")]
    InsufficientData { water_year: i32, water_week: u32 },

    /// Too few qualifying years for a water week / horizon query
    #[error("Insufficient samples (needed: {needed}, found: {found})")]
    InsufficientSamples { needed: usize, found: usize },

    /// Optimizer hit its iteration cap without meeting the tolerance
    #[error("Piecewise fit did not converge after {iterations} iterations (best cost: {best_cost})")]
    FitDidNotConverge { iterations: u64, best_cost: f64 },

    /// Non-monotonic or duplicate dates in an input series
    #[error("Malformed series: {0}")]
    MalformedSeries(String),

    /// Water year epoch is not a valid non-leap month/day
    #[error("Invalid water year epoch: {month}/{day}")]
    InvalidEpoch { month: u32, day: u32 },

    /// Water week or horizon outside the accepted range
    #[error("Invalid availability query: {0}")]
    InvalidQuery(String),

    /// Availability or release sample is NaN or infinite
    #[error("Sample for year {year} contains non-finite values")]
    NonFiniteSample { year: i32 },

    /// Dam identifier not of the form `<source>_<damname>`
    #[error("Invalid dam key: {0}")]
    InvalidDamKey(String),

    /// Dam not known to the data source
    #[error("Dam not found: {0}")]
    DamNotFound(String),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Date parsing failed
    #[error("Failed to parse date: {0}")]
    DateParse(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Failed to read source data
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Type alias for Results using HorizonError
pub type Result<T> = std::result::Result<T, HorizonError>;
