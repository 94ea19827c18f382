use crate::error::{HorizonError, Result};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Every water year is split into exactly this many water weeks.
pub const WEEKS_PER_WATER_YEAR: u32 = 52;

/// Nominal length of a water week. Week 52 runs longer and absorbs the remainder.
pub const DAYS_PER_WEEK: u32 = 7;

/// Calendar month and day on which a water year begins.
///
/// The US convention starts on October 1 and names the water year after the
/// calendar year in which it ends, so water year 2023 runs from October 1, 2022
/// through September 30, 2023. An epoch of January 1 makes the water year
/// coincide with the calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "EpochFields")]
pub struct WaterYearEpoch {
    month: u32,
    day: u32,
}

#[derive(Deserialize)]
struct EpochFields {
    month: u32,
    day: u32,
}

impl TryFrom<EpochFields> for WaterYearEpoch {
    type Error = HorizonError;

    fn try_from(value: EpochFields) -> Result<Self> {
        WaterYearEpoch::new(value.month, value.day)
    }
}

impl Default for WaterYearEpoch {
    fn default() -> Self {
        WaterYearEpoch::US
    }
}

impl WaterYearEpoch {
    /// October 1, the US Geological Survey convention.
    pub const US: WaterYearEpoch = WaterYearEpoch { month: 10, day: 1 };

    /// Create an epoch, rejecting impossible dates and February 29 (an epoch has
    /// to exist in every calendar year).
    pub fn new(month: u32, day: u32) -> Result<Self> {
        match NaiveDate::from_ymd_opt(2001, month, day) {
            Some(_) => Ok(WaterYearEpoch { month, day }),
            None => Err(HorizonError::InvalidEpoch { month, day }),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// True when water years coincide with calendar years.
    pub fn is_calendar_year(&self) -> bool {
        self.month == 1 && self.day == 1
    }

    /// Day of the year, 1-based, on which the epoch falls in `calendar_year`.
    fn ordinal_in(&self, calendar_year: i32) -> u32 {
        let leap_day = u32::from(self.month > 2 && is_leap_year(calendar_year));
        DAYS_BEFORE_MONTH[(self.month - 1) as usize] + leap_day + self.day
    }

    /// Calendar year in which `water_year` begins.
    fn start_calendar_year(&self, water_year: i32) -> i32 {
        if self.is_calendar_year() {
            water_year
        } else {
            water_year.saturating_sub(1)
        }
    }
}

const DAYS_BEFORE_MONTH: [u32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Position of a date within the water calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaterCalendarPosition {
    pub water_year: i32,
    /// 1..=52
    pub water_week: u32,
    /// 1..=7, up to 9 in week 52
    pub day_in_week: u32,
}

impl WaterCalendarPosition {
    /// (water_year, water_week) grouping key.
    pub fn week_key(&self) -> (i32, u32) {
        (self.water_year, self.water_week)
    }
}

/// First day of a water year, `None` outside the dates chrono can represent.
pub fn water_year_start(water_year: i32, epoch: WaterYearEpoch) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(epoch.start_calendar_year(water_year), epoch.month, epoch.day)
}

/// Length of a water year in days: 365, or 366 when it contains February 29.
pub fn days_in_water_year(water_year: i32, epoch: WaterYearEpoch) -> u32 {
    let start = epoch.start_calendar_year(water_year);
    // an epoch in January or February precedes that year's leap day
    let february_year = if epoch.month <= 2 {
        start
    } else {
        start.saturating_add(1)
    };
    days_in_year(february_year)
}

/// Number of days in a water week of the given water year.
pub fn days_in_water_week(water_year: i32, water_week: u32, epoch: WaterYearEpoch) -> u32 {
    if water_week == WEEKS_PER_WATER_YEAR {
        days_in_water_year(water_year, epoch) - (WEEKS_PER_WATER_YEAR - 1) * DAYS_PER_WEEK
    } else {
        DAYS_PER_WEEK
    }
}

/// Map a calendar date onto the water calendar.
pub fn to_water_calendar(date: NaiveDate, epoch: WaterYearEpoch) -> WaterCalendarPosition {
    let year = date.year();
    let epoch_ordinal = epoch.ordinal_in(year);
    let (start_calendar_year, ordinal) = if date.ordinal() >= epoch_ordinal {
        (year, date.ordinal() - epoch_ordinal + 1)
    } else {
        let previous = year.saturating_sub(1);
        let days_before_new_year = days_in_year(previous) - epoch.ordinal_in(previous) + 1;
        (previous, days_before_new_year + date.ordinal())
    };
    let water_year = if epoch.is_calendar_year() {
        start_calendar_year
    } else {
        start_calendar_year.saturating_add(1)
    };
    let water_week = (1 + (ordinal - 1) / DAYS_PER_WEEK).min(WEEKS_PER_WATER_YEAR);
    let day_in_week = ordinal - (water_week - 1) * DAYS_PER_WEEK;
    WaterCalendarPosition {
        water_year,
        water_week,
        day_in_week,
    }
}

/// Reconstruct the calendar date of a water calendar position.
///
/// Returns `None` when the week or day does not exist in that water year, or
/// the date is outside the range chrono can represent.
pub fn from_water_calendar(
    position: WaterCalendarPosition,
    epoch: WaterYearEpoch,
) -> Option<NaiveDate> {
    let WaterCalendarPosition {
        water_year,
        water_week,
        day_in_week,
    } = position;
    if !(1..=WEEKS_PER_WATER_YEAR).contains(&water_week) {
        return None;
    }
    if day_in_week == 0 || day_in_week > days_in_water_week(water_year, water_week, epoch) {
        return None;
    }
    let offset = (water_week - 1) * DAYS_PER_WEEK + day_in_week - 1;
    water_year_start(water_year, epoch)?.checked_add_days(Days::new(u64::from(offset)))
}

/// The week `offset` weeks after (water_year, water_week), wrapping into
/// following water years past week 52.
pub fn offset_week(water_year: i32, water_week: u32, offset: u32) -> (i32, u32) {
    let index = (water_week - 1) + offset;
    let year = water_year + (index / WEEKS_PER_WATER_YEAR) as i32;
    (year, index % WEEKS_PER_WATER_YEAR + 1)
}
