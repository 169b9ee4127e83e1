//! CSV loading for the per-city trip files.
//!
//! Resolves a [`City`] to its file in the data directory and parses it into a
//! [`Dataset`], deriving month, weekday and hour for every row.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use bikeshare_core::error::{BikeshareError, Result};
use bikeshare_core::models::{City, Dataset, Schema, TripRecord};
use bikeshare_core::time_utils::parse_trip_timestamp;
use csv::StringRecord;
use tracing::{debug, warn};

// ── Column names ──────────────────────────────────────────────────────────────

pub const START_TIME: &str = "Start Time";
pub const END_TIME: &str = "End Time";
pub const TRIP_DURATION: &str = "Trip Duration";
pub const START_STATION: &str = "Start Station";
pub const END_STATION: &str = "End Station";
pub const USER_TYPE: &str = "User Type";
pub const GENDER: &str = "Gender";
pub const BIRTH_YEAR: &str = "Birth Year";

// ── Public API ────────────────────────────────────────────────────────────────

/// Path of `city`'s backing file inside `data_dir`.
pub fn city_path(data_dir: &Path, city: City) -> PathBuf {
    data_dir.join(city.file_name())
}

/// Load the trips for `city` from `data_dir`.
pub fn load_city(data_dir: &Path, city: City) -> Result<Dataset> {
    load_dataset(&city_path(data_dir, city), city)
}

/// Load and parse one city file.
///
/// Fails when the file cannot be opened, a required column is missing, or any
/// row has an unparseable timestamp or number.
pub fn load_dataset(path: &Path, city: City) -> Result<Dataset> {
    let started = Instant::now();
    let file = File::open(path).map_err(|source| {
        warn!("Failed to open {}: {}", path.display(), source);
        BikeshareError::FileRead {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let (schema, records) = read_trips(file, path)?;

    debug!(
        city = city.name(),
        rows = records.len(),
        has_gender = schema.has_gender,
        has_birth_year = schema.has_birth_year,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "loaded {}",
        path.display()
    );

    Ok(Dataset {
        city,
        source: path.to_path_buf(),
        schema,
        records,
    })
}

/// Parse trip rows from any CSV source. `path` is only used in errors.
pub fn read_trips<R: Read>(source: R, path: &Path) -> Result<(Schema, Vec<TripRecord>)> {
    let csv_err = |source: csv::Error| BikeshareError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers().map_err(csv_err)?.clone();
    let columns = ColumnMap::resolve(&headers, path)?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;
        // records() starts after the header line; CSV lines are 1-based.
        let line = record
            .position()
            .map_or(idx + 2, |p| p.line() as usize);
        records.push(columns.parse_row(&record, idx, line, path)?);
    }

    Ok((columns.schema(), records))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Header positions of the columns the loader understands.
#[derive(Debug)]
struct ColumnMap {
    start_time: usize,
    end_time: usize,
    trip_duration: usize,
    start_station: usize,
    end_station: usize,
    user_type: usize,
    gender: Option<usize>,
    birth_year: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &StringRecord, path: &Path) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| normalize_header_name(h) == name)
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| BikeshareError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
        };

        Ok(Self {
            start_time: require(START_TIME)?,
            end_time: require(END_TIME)?,
            trip_duration: require(TRIP_DURATION)?,
            start_station: require(START_STATION)?,
            end_station: require(END_STATION)?,
            user_type: require(USER_TYPE)?,
            gender: find(GENDER),
            birth_year: find(BIRTH_YEAR),
        })
    }

    fn schema(&self) -> Schema {
        Schema {
            has_gender: self.gender.is_some(),
            has_birth_year: self.birth_year.is_some(),
        }
    }

    fn parse_row(
        &self,
        record: &StringRecord,
        row: usize,
        line: usize,
        path: &Path,
    ) -> Result<TripRecord> {
        let timestamp = |idx: usize| {
            let raw = cell(record, idx).unwrap_or_default();
            parse_trip_timestamp(raw).ok_or_else(|| BikeshareError::TimestampParse {
                path: path.to_path_buf(),
                line,
                value: raw.to_string(),
            })
        };
        let number = |idx: usize, column: &str| -> Result<Option<f64>> {
            match cell(record, idx) {
                None => Ok(None),
                Some(raw) => raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(Some)
                    .ok_or_else(|| BikeshareError::InvalidNumber {
                        path: path.to_path_buf(),
                        line,
                        column: column.to_string(),
                        value: raw.to_string(),
                    }),
            }
        };

        let start_time = timestamp(self.start_time)?;
        let end_time = timestamp(self.end_time)?;
        let trip_duration = number(self.trip_duration, TRIP_DURATION)?;
        let birth_year = match self.birth_year {
            Some(idx) => number(idx, BIRTH_YEAR)?.map(|y| y as i32),
            None => None,
        };

        Ok(TripRecord::new(
            row,
            start_time,
            end_time,
            cell(record, self.start_station).unwrap_or_default(),
            cell(record, self.end_station).unwrap_or_default(),
        )
        .with_duration(trip_duration)
        .with_user_type(cell(record, self.user_type).map(str::to_string))
        .with_gender(self.gender.and_then(|idx| cell(record, idx)).map(str::to_string))
        .with_birth_year(birth_year))
    }
}

/// Non-empty cell value, or `None` for blank/absent cells.
fn cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn normalize_header_name(name: &str) -> &str {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    name.trim().trim_start_matches('\u{feff}')
}

// ── Tests ─────────────────────────────────────────────────────────────────────
