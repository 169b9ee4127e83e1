use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Datelike, Month, NaiveDateTime, Timelike, Weekday};
use serde::{Serialize, Serializer};

use crate::error::BikeshareError;
use crate::time_utils::{month_name, weekday_name};

/// Collapse runs of whitespace and lowercase, so `"  New   York City "` and
/// `"new york city"` compare equal.
fn normalize_term(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ── City ──────────────────────────────────────────────────────────────────────

/// One of the three cities with trip data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum City {
    Chicago,
    NewYorkCity,
    Washington,
}

impl City {
    pub const ALL: [City; 3] = [City::Chicago, City::NewYorkCity, City::Washington];

    /// Canonical lowercase name, as typed at the prompt.
    pub fn name(&self) -> &'static str {
        match self {
            City::Chicago => "chicago",
            City::NewYorkCity => "new york city",
            City::Washington => "washington",
        }
    }

    /// Title-cased name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            City::Chicago => "Chicago",
            City::NewYorkCity => "New York City",
            City::Washington => "Washington",
        }
    }

    /// Name of the backing CSV file inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            City::Chicago => "chicago.csv",
            City::NewYorkCity => "new_york_city.csv",
            City::Washington => "washington.csv",
        }
    }
}

impl FromStr for City {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let term = normalize_term(s);
        City::ALL
            .into_iter()
            .find(|c| c.name() == term)
            .ok_or_else(|| BikeshareError::InvalidSelector {
                kind: "city",
                value: s.trim().to_string(),
            })
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl Serialize for City {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ── MonthFilter ───────────────────────────────────────────────────────────────

/// Months covered by the trip data, in calendar order.
pub const FILTER_MONTHS: [Month; 6] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
];

/// Month selector: `all`, or one of January through June.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthFilter {
    #[default]
    All,
    Only(Month),
}

impl MonthFilter {
    /// `true` when a row with the given month number (1–12) passes.
    pub fn matches(&self, month: u32) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Only(m) => m.number_from_month() == month,
        }
    }
}

impl FromStr for MonthFilter {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let term = normalize_term(s);
        if term == "all" {
            return Ok(MonthFilter::All);
        }
        FILTER_MONTHS
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(&term))
            .map(MonthFilter::Only)
            .ok_or_else(|| BikeshareError::InvalidSelector {
                kind: "month",
                value: s.trim().to_string(),
            })
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str("all"),
            MonthFilter::Only(m) => f.write_str(&m.name().to_lowercase()),
        }
    }
}

impl Serialize for MonthFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── DayFilter ─────────────────────────────────────────────────────────────────

/// Weekdays in the order they are offered at the prompt.
pub const FILTER_DAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Weekday selector: `all`, or one of the seven weekdays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayFilter {
    #[default]
    All,
    Only(Weekday),
}

impl DayFilter {
    pub fn matches(&self, weekday: Weekday) -> bool {
        match self {
            DayFilter::All => true,
            DayFilter::Only(d) => *d == weekday,
        }
    }
}

impl FromStr for DayFilter {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let term = normalize_term(s);
        if term == "all" {
            return Ok(DayFilter::All);
        }
        FILTER_DAYS
            .into_iter()
            .find(|d| weekday_name(*d).eq_ignore_ascii_case(&term))
            .map(DayFilter::Only)
            .ok_or_else(|| BikeshareError::InvalidSelector {
                kind: "day",
                value: s.trim().to_string(),
            })
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => f.write_str("all"),
            DayFilter::Only(d) => f.write_str(&weekday_name(*d).to_lowercase()),
        }
    }
}

impl Serialize for DayFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// The three validated answers that drive one analysis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub city: City,
    pub month: MonthFilter,
    pub day: DayFilter,
}

impl Selection {
    pub fn new(city: City, month: MonthFilter, day: DayFilter) -> Self {
        Self { city, month, day }
    }

    /// Unfiltered selection for `city`.
    pub fn all(city: City) -> Self {
        Self::new(city, MonthFilter::All, DayFilter::All)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (month: {}, day: {})", self.city, self.month, self.day)
    }
}

// ── TripRecord ────────────────────────────────────────────────────────────────

/// One trip row, with calendar fields derived from `start_time`.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    /// 0-based position of the row in the source file.
    pub row: usize,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Trip duration in seconds; `None` when the cell was empty.
    pub trip_duration: Option<f64>,
    pub start_station: String,
    pub end_station: String,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
    month: u32,
    weekday: Weekday,
    hour: u32,
}

impl TripRecord {
    /// Build a record and derive its month, weekday and hour.
    pub fn new(
        row: usize,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        start_station: impl Into<String>,
        end_station: impl Into<String>,
    ) -> Self {
        Self {
            row,
            start_time,
            end_time,
            trip_duration: None,
            start_station: start_station.into(),
            end_station: end_station.into(),
            user_type: None,
            gender: None,
            birth_year: None,
            month: start_time.month(),
            weekday: start_time.weekday(),
            hour: start_time.hour(),
        }
    }

    pub fn with_duration(mut self, seconds: Option<f64>) -> Self {
        self.trip_duration = seconds;
        self
    }

    pub fn with_user_type(mut self, user_type: Option<String>) -> Self {
        self.user_type = user_type;
        self
    }

    pub fn with_gender(mut self, gender: Option<String>) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_birth_year(mut self, year: Option<i32>) -> Self {
        self.birth_year = year;
        self
    }

    /// Month of the start time, 1–12.
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// Full weekday name of the start time, e.g. `"Friday"`.
    pub fn weekday_name(&self) -> &'static str {
        weekday_name(self.weekday)
    }

    /// Month name of the start time, e.g. `"March"`.
    pub fn month_name(&self) -> &'static str {
        month_name(self.month)
    }

    /// Hour of the start time, 0–23.
    pub fn hour(&self) -> u32 {
        self.hour
    }
}

// ── Schema / Dataset ──────────────────────────────────────────────────────────

/// Which optional columns a city's file carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Schema {
    pub has_gender: bool,
    pub has_birth_year: bool,
}

/// All trips for one city, in file order.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub city: City,
    pub source: PathBuf,
    pub schema: Schema,
    pub records: Vec<TripRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
