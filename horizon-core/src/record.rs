use crate::date_range::DateRange;
use crate::error::{HorizonError, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Date format used in raw daily CSV files: "YYYY-MM-DD"
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Cell values treated as missing in raw daily CSV files.
pub const MISSING_TOKENS: [&str; 4] = ["", "NA", "NaN", "nan"];

/// A single daily value together with where it came from.
/// - `Observed`: reported by the data source
/// - `Filled`: interpolated across a short gap
/// - `Missing`: no value for this day
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub enum Datum {
    Observed(f64),
    Filled(f64),
    #[default]
    Missing,
}

impl Datum {
    pub fn value(&self) -> Option<f64> {
        match self {
            Datum::Observed(v) | Datum::Filled(v) => Some(*v),
            Datum::Missing => None,
        }
    }

    pub fn is_observed(&self) -> bool {
        matches!(self, Datum::Observed(_))
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Datum::Filled(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Datum::Missing)
    }

    /// Apply `f` to the value, keeping provenance.
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Datum {
        match self {
            Datum::Observed(v) => Datum::Observed(f(v)),
            Datum::Filled(v) => Datum::Filled(f(v)),
            Datum::Missing => Datum::Missing,
        }
    }
}

impl From<Option<f64>> for Datum {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Datum::Observed(v),
            _ => Datum::Missing,
        }
    }
}

/// One calendar day of reservoir operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub storage: Datum,
    pub release: Datum,
    pub inflow: Datum,
}

impl DailyRecord {
    pub fn new(
        date: NaiveDate,
        storage: Option<f64>,
        release: Option<f64>,
        inflow: Option<f64>,
    ) -> DailyRecord {
        DailyRecord {
            date,
            storage: storage.into(),
            release: release.into(),
            inflow: inflow.into(),
        }
    }

    /// A day with no values at all.
    pub fn missing(date: NaiveDate) -> DailyRecord {
        DailyRecord {
            date,
            storage: Datum::Missing,
            release: Datum::Missing,
            inflow: Datum::Missing,
        }
    }

    /// Parse a `date,storage,release,inflow` CSV row.
    fn from_string_record(record: &StringRecord) -> Result<DailyRecord> {
        if record.len() < 4 {
            return Err(HorizonError::InvalidFormat(format!(
                "expected 4 columns (date,storage,release,inflow), found {}",
                record.len()
            )));
        }
        let date_str = record.get(0).unwrap_or("").trim();
        let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
            .map_err(|e| HorizonError::DateParse(format!("{date_str}: {e}")))?;
        Ok(DailyRecord::new(
            date,
            parse_cell(record.get(1))?,
            parse_cell(record.get(2))?,
            parse_cell(record.get(3))?,
        ))
    }
}

fn parse_cell(cell: Option<&str>) -> Result<Option<f64>> {
    let raw = cell.unwrap_or("").trim();
    if MISSING_TOKENS.contains(&raw) {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| HorizonError::InvalidFormat(format!("not a number: {raw}")))
}

/// Which value field of a daily record to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    Storage,
    Release,
    Inflow,
}

impl Variable {
    pub const ALL: [Variable; 3] = [Variable::Storage, Variable::Release, Variable::Inflow];

    pub fn get(&self, record: &DailyRecord) -> Datum {
        match self {
            Variable::Storage => record.storage,
            Variable::Release => record.release,
            Variable::Inflow => record.inflow,
        }
    }

    pub fn set(&self, record: &mut DailyRecord, datum: Datum) {
        match self {
            Variable::Storage => record.storage = datum,
            Variable::Release => record.release = datum,
            Variable::Inflow => record.inflow = datum,
        }
    }
}

/// Contiguous, strictly ordered daily records: one slot per calendar day
/// between the first and last date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailySeries {
    records: Vec<DailyRecord>,
}

impl DailySeries {
    /// Build a series from records sorted by date.
    ///
    /// Duplicate or out-of-order dates are rejected. Calendar days absent
    /// from the input get a `Missing` slot.
    pub fn from_records(records: Vec<DailyRecord>) -> Result<DailySeries> {
        for pair in records.windows(2) {
            if pair[1].date == pair[0].date {
                return Err(HorizonError::MalformedSeries(format!(
                    "duplicate date {}",
                    pair[0].date
                )));
            }
            if pair[1].date < pair[0].date {
                return Err(HorizonError::MalformedSeries(format!(
                    "date {} follows {}",
                    pair[1].date, pair[0].date
                )));
            }
        }
        let (first, last) = match (records.first(), records.last()) {
            (Some(first), Some(last)) => (first.date, last.date),
            _ => return Ok(DailySeries::default()),
        };
        let range = DateRange(first, last);
        let mut aligned = Vec::with_capacity(range.num_days());
        let mut input = records.into_iter().peekable();
        for day in range {
            match input.next_if(|record| record.date == day) {
                Some(record) => aligned.push(record),
                None => aligned.push(DailyRecord::missing(day)),
            }
        }
        Ok(DailySeries { records: aligned })
    }

    /// Parse a raw daily CSV with a header row and
    /// `date,storage,release,inflow` columns.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<DailySeries> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let records = rdr
            .records()
            .map(|row| DailyRecord::from_string_record(&row?))
            .collect::<Result<Vec<DailyRecord>>>()?;
        DailySeries::from_records(records)
    }

    /// Parse raw daily CSV held in memory.
    pub fn from_csv_str(csv_object: &str) -> Result<DailySeries> {
        DailySeries::from_csv_reader(csv_object.as_bytes())
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<DailyRecord> {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DailyRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Records dated within `start..=end`; either bound may be open.
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> DailySeries {
        DailySeries {
            records: self
                .records
                .iter()
                .filter(|r| {
                    start.map_or(true, |s| r.date >= s) && end.map_or(true, |e| r.date <= e)
                })
                .copied()
                .collect(),
        }
    }

    /// The values of one variable, in date order.
    pub fn column(&self, variable: Variable) -> Vec<Datum> {
        self.records.iter().map(|r| variable.get(r)).collect()
    }

    /// Apply a per-record transform. Dates are untouched, so alignment holds.
    pub fn map_records(&self, f: impl Fn(&DailyRecord) -> DailyRecord) -> DailySeries {
        self.map_records_indexed(|_, record| f(record))
    }

    /// Like [`DailySeries::map_records`], also passing each record's position.
    pub fn map_records_indexed(
        &self,
        f: impl Fn(usize, &DailyRecord) -> DailyRecord,
    ) -> DailySeries {
        DailySeries {
            records: self
                .records
                .iter()
                .enumerate()
                .map(|(index, record)| DailyRecord {
                    date: record.date,
                    ..f(index, record)
                })
                .collect(),
        }
    }

    /// Replace one variable's values. `column` must have one datum per day.
    pub fn with_column(&self, variable: Variable, column: &[Datum]) -> Result<DailySeries> {
        if column.len() != self.records.len() {
            return Err(HorizonError::MalformedSeries(format!(
                "column of length {} for series of length {}",
                column.len(),
                self.records.len()
            )));
        }
        let mut records = self.records.clone();
        for (record, datum) in records.iter_mut().zip(column) {
            variable.set(record, *datum);
        }
        Ok(DailySeries { records })
    }
}

impl<'a> IntoIterator for &'a DailySeries {
    type Item = &'a DailyRecord;
    type IntoIter = std::slice::Iter<'a, DailyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
