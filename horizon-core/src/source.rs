use crate::error::{HorizonError, Result};
use crate::record::DailySeries;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Identifier of a dam record set: `<source>_<damname>`.
///
/// The split happens at the first underscore, so dam names may themselves
/// contain underscores.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct DamKey {
    pub source: String,
    pub dam: String,
}

impl FromStr for DamKey {
    type Err = HorizonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('_') {
            Some((source, dam)) if !source.is_empty() && !dam.is_empty() => Ok(DamKey {
                source: source.to_string(),
                dam: dam.to_string(),
            }),
            _ => Err(HorizonError::InvalidDamKey(s.to_string())),
        }
    }
}

impl fmt::Display for DamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.source, self.dam)
    }
}

/// Supplies the daily series for a dam.
pub trait DamSource {
    fn resolve(&self, key: &DamKey) -> Result<DailySeries>;
}

/// Series held in memory, keyed by dam.
#[derive(Debug, Default, Clone)]
pub struct InMemorySource {
    series: HashMap<DamKey, DailySeries>,
}

impl InMemorySource {
    pub fn new() -> InMemorySource {
        InMemorySource::default()
    }

    pub fn insert(&mut self, key: DamKey, series: DailySeries) -> Option<DailySeries> {
        self.series.insert(key, series)
    }
}

impl DamSource for InMemorySource {
    fn resolve(&self, key: &DamKey) -> Result<DailySeries> {
        self.series
            .get(key)
            .cloned()
            .ok_or_else(|| HorizonError::DamNotFound(key.to_string()))
    }
}
