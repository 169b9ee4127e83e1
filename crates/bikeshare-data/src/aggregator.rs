//! The four statistic groups computed over a (filtered) dataset view.
//!
//! Every query borrows the view immutably and is independent of the others.
//! Modes break ties toward the smallest value in the value's natural order:
//! numerically for months, hours and birth years, lexicographically for names.

use std::collections::BTreeMap;

use bikeshare_core::error::StatsError;
use bikeshare_core::time_utils::month_name;
use serde::Serialize;

use crate::filter::DatasetView;

/// Joins start and end station names into one trip label.
pub const TRIP_SEPARATOR: &str = " (to) ";

// ── Modal / counting helpers ──────────────────────────────────────────────────

/// The most frequent value of a column and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modal<T> {
    pub value: T,
    pub count: usize,
}

impl<T> Modal<T> {
    fn map<U>(self, f: impl FnOnce(T) -> U) -> Modal<U> {
        Modal {
            value: f(self.value),
            count: self.count,
        }
    }
}

/// Most frequent value, or `None` for an empty input.
///
/// Among equally frequent values the smallest one wins.
pub fn mode<T: Ord>(values: impl IntoIterator<Item = T>) -> Option<Modal<T>> {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }

    // Ascending iteration + strict `>` keeps the first (smallest) of a tie.
    let mut best: Option<Modal<T>> = None;
    for (value, count) in counts {
        if best.as_ref().map_or(true, |b| count > b.count) {
            best = Some(Modal { value, count });
        }
    }
    best
}

/// Occurrences per distinct value, most frequent first, ties by value.
pub fn value_counts<T: Ord>(values: impl IntoIterator<Item = T>) -> Vec<(T, usize)> {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    let mut out: Vec<(T, usize)> = counts.into_iter().collect();
    // Stable sort keeps the ascending value order inside equal counts.
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

// ── Time stats ────────────────────────────────────────────────────────────────

/// Most frequent times of travel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeStats {
    /// Month number, 1–12.
    pub month: Modal<u32>,
    pub month_name: &'static str,
    /// Full weekday name.
    pub weekday: Modal<&'static str>,
    /// Start hour, 0–23.
    pub hour: Modal<u32>,
}

pub fn time_stats(view: &DatasetView<'_>) -> Result<TimeStats, StatsError> {
    let month = mode(view.records().map(|r| r.month())).ok_or(StatsError::EmptyDataset)?;
    let weekday =
        mode(view.records().map(|r| r.weekday_name())).ok_or(StatsError::EmptyDataset)?;
    let hour = mode(view.records().map(|r| r.hour())).ok_or(StatsError::EmptyDataset)?;

    Ok(TimeStats {
        month_name: month_name(month.value),
        month,
        weekday,
        hour,
    })
}

// ── Station stats ─────────────────────────────────────────────────────────────

/// Most popular stations and trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationStats {
    pub start_station: Modal<String>,
    pub end_station: Modal<String>,
    /// `"<start> (to) <end>"`.
    pub trip: Modal<String>,
}

pub fn station_stats(view: &DatasetView<'_>) -> Result<StationStats, StatsError> {
    let start_station = mode(
        view.records()
            .map(|r| r.start_station.as_str())
            .filter(|s| !s.is_empty()),
    )
    .ok_or(StatsError::EmptyDataset)?
    .map(str::to_string);

    let end_station = mode(
        view.records()
            .map(|r| r.end_station.as_str())
            .filter(|s| !s.is_empty()),
    )
    .ok_or(StatsError::EmptyDataset)?
    .map(str::to_string);

    let trip = mode(
        view.records()
            .filter(|r| !r.start_station.is_empty() && !r.end_station.is_empty())
            .map(|r| format!("{}{}{}", r.start_station, TRIP_SEPARATOR, r.end_station)),
    )
    .ok_or(StatsError::EmptyDataset)?;

    Ok(StationStats {
        start_station,
        end_station,
        trip,
    })
}

// ── Trip duration stats ───────────────────────────────────────────────────────

/// Total and average trip duration, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub total_seconds: f64,
    /// Trips with a recorded duration.
    pub count: usize,
    /// Mean duration, exact halves rounded to the even neighbour.
    pub mean_seconds: i64,
}

pub fn trip_duration_stats(view: &DatasetView<'_>) -> Result<DurationStats, StatsError> {
    let (total_seconds, count) = view
        .records()
        .filter_map(|r| r.trip_duration)
        .fold((0.0_f64, 0_usize), |(sum, n), d| (sum + d, n + 1));

    if count == 0 {
        return Err(StatsError::EmptyDataset);
    }

    Ok(DurationStats {
        total_seconds,
        count,
        mean_seconds: round_half_even(total_seconds / count as f64),
    })
}

/// Nearest integer, with exact halves going to the even neighbour
/// (`150.5` → `150`, `151.5` → `152`).
fn round_half_even(x: f64) -> i64 {
    let rounded = x.round();
    if (x - x.trunc()).abs() == 0.5 && rounded % 2.0 != 0.0 {
        (rounded - x.signum()) as i64
    } else {
        rounded as i64
    }
}

// ── User stats ────────────────────────────────────────────────────────────────

/// Earliest, most recent and most common birth year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthYearStats {
    pub earliest: i32,
    pub most_recent: i32,
    pub most_common: Modal<i32>,
}

/// Rider demographics.
///
/// Gender and birth-year results carry a recoverable [`StatsError`] when the
/// city does not record them; user-type counts are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub user_types: Vec<(String, usize)>,
    pub genders: Result<Vec<(String, usize)>, StatsError>,
    pub birth_years: Result<BirthYearStats, StatsError>,
}

pub fn user_stats(view: &DatasetView<'_>) -> Result<UserStats, StatsError> {
    if view.is_empty() {
        return Err(StatsError::EmptyDataset);
    }
    let schema = view.schema();

    let user_types = owned_counts(view.records().filter_map(|r| r.user_type.as_deref()));

    let genders = if schema.has_gender {
        let counts = owned_counts(view.records().filter_map(|r| r.gender.as_deref()));
        if counts.is_empty() {
            Err(StatsError::NoGenderData)
        } else {
            Ok(counts)
        }
    } else {
        Err(StatsError::NoGenderData)
    };

    let birth_years = if schema.has_birth_year {
        birth_year_stats(view).ok_or(StatsError::NoBirthYearData)
    } else {
        Err(StatsError::NoBirthYearData)
    };

    if let Err(e) = &genders {
        tracing::info!(city = view.city().name(), "{}", e);
    }
    if let Err(e) = &birth_years {
        tracing::info!(city = view.city().name(), "{}", e);
    }

    Ok(UserStats {
        user_types,
        genders,
        birth_years,
    })
}

fn birth_year_stats(view: &DatasetView<'_>) -> Option<BirthYearStats> {
    let years: Vec<i32> = view.records().filter_map(|r| r.birth_year).collect();
    Some(BirthYearStats {
        earliest: *years.iter().min()?,
        most_recent: *years.iter().max()?,
        most_common: mode(years.iter().copied())?,
    })
}

fn owned_counts<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    value_counts(values)
        .into_iter()
        .map(|(v, n)| (v.to_string(), n))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bikeshare_core::models::{City, Dataset, Schema, TripRecord};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::path::PathBuf;

    fn at(m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn trip(row: usize, start: NaiveDateTime, from: &str, to: &str) -> TripRecord {
        TripRecord::new(row, start, start, from, to)
            .with_duration(Some(100.0))
            .with_user_type(Some("Subscriber".to_string()))
    }

    fn dataset(schema: Schema, records: Vec<TripRecord>) -> Dataset {
        Dataset {
            city: City::Chicago,
            source: PathBuf::from("chicago.csv"),
            schema,
            records,
        }
    }

    const FULL: Schema = Schema {
        has_gender: true,
        has_birth_year: true,
    };

    // ── mode / value_counts ───────────────────────────────────────────────────

    #[test]
    fn test_mode_picks_most_frequent() {
        let m = mode([3, 1, 3, 2, 3, 1]).unwrap();
        assert_eq!(m, Modal { value: 3, count: 3 });
    }

    #[test]
    fn test_mode_tie_breaks_to_smallest_number() {
        let m = mode([17, 8, 17, 8]).unwrap();
        assert_eq!(m.value, 8);
        assert_eq!(m.count, 2);
    }

    #[test]
    fn test_mode_tie_breaks_lexicographically() {
        let m = mode(["Wednesday", "Friday", "Monday", "Friday", "Monday"]).unwrap();
        assert_eq!(m.value, "Friday");
    }

    #[test]
    fn test_mode_empty_is_none() {
        assert!(mode(Vec::<u32>::new()).is_none());
    }

    #[test]
    fn test_value_counts_orders_by_count_then_value() {
        let counts = value_counts([
            "Customer",
            "Subscriber",
            "Dependent",
            "Subscriber",
            "Customer",
            "Subscriber",
        ]);
        assert_eq!(
            counts,
            vec![("Subscriber", 3), ("Customer", 2), ("Dependent", 1)]
        );
    }

    // ── time_stats ────────────────────────────────────────────────────────────

    #[test]
    fn test_time_stats() {
        let ds = dataset(
            Schema::default(),
            vec![
                trip(0, at(3, 3, 8), "A", "B"),  // Fri
                trip(1, at(3, 10, 8), "A", "B"), // Fri
                trip(2, at(4, 4, 17), "A", "B"), // Tue
            ],
        );
        let stats = time_stats(&DatasetView::full(&ds)).unwrap();
        assert_eq!(stats.month.value, 3);
        assert_eq!(stats.month_name, "March");
        assert_eq!(stats.weekday.value, "Friday");
        assert_eq!(stats.weekday.count, 2);
        assert_eq!(stats.hour.value, 8);
    }

    #[test]
    fn test_time_stats_on_filtered_view_only_counts_matching_rows() {
        use bikeshare_core::models::{DayFilter, MonthFilter};
        use chrono::{Month, Weekday};

        let ds = dataset(
            Schema::default(),
            vec![
                trip(0, at(3, 3, 18), "A", "B"), // Fri in March
                trip(1, at(3, 4, 9), "A", "B"),  // Sat in March
                trip(2, at(3, 4, 9), "A", "B"),  // Sat in March
                trip(3, at(4, 7, 9), "A", "B"),  // Fri in April
            ],
        );
        let view = crate::filter::apply_filters(
            &ds,
            MonthFilter::Only(Month::March),
            DayFilter::Only(Weekday::Fri),
        );
        let stats = time_stats(&view).unwrap();
        assert_eq!(stats.hour.value, 18);
        assert_eq!(stats.hour.count, 1);
    }

    #[test]
    fn test_time_stats_empty_view() {
        let ds = dataset(Schema::default(), vec![]);
        assert_eq!(
            time_stats(&DatasetView::full(&ds)),
            Err(StatsError::EmptyDataset)
        );
    }

    // ── station_stats ─────────────────────────────────────────────────────────

    #[test]
    fn test_station_pair_mode() {
        let ds = dataset(
            Schema::default(),
            vec![
                trip(0, at(1, 2, 9), "A", "B"),
                trip(1, at(1, 2, 9), "A", "B"),
                trip(2, at(1, 2, 9), "A", "C"),
            ],
        );
        let stats = station_stats(&DatasetView::full(&ds)).unwrap();
        assert_eq!(stats.start_station.value, "A");
        assert_eq!(stats.start_station.count, 3);
        assert_eq!(stats.end_station.value, "B");
        assert_eq!(stats.trip.value, "A (to) B");
        assert_eq!(stats.trip.count, 2);
    }

    #[test]
    fn test_station_stats_tie_breaks_lexicographically() {
        let ds = dataset(
            Schema::default(),
            vec![
                trip(0, at(1, 2, 9), "Wells St", "Clark St"),
                trip(1, at(1, 2, 9), "Canal St", "Adams St"),
            ],
        );
        let stats = station_stats(&DatasetView::full(&ds)).unwrap();
        assert_eq!(stats.start_station.value, "Canal St");
        assert_eq!(stats.end_station.value, "Adams St");
        assert_eq!(stats.trip.value, "Canal St (to) Adams St");
    }

    // ── trip_duration_stats ───────────────────────────────────────────────────

    #[test]
    fn test_trip_duration_stats() {
        let ds = dataset(
            Schema::default(),
            [100.0, 200.0, 300.0]
                .into_iter()
                .enumerate()
                .map(|(i, d)| trip(i, at(1, 2, 9), "A", "B").with_duration(Some(d)))
                .collect(),
        );
        let stats = trip_duration_stats(&DatasetView::full(&ds)).unwrap();
        assert_eq!(stats.total_seconds, 600.0);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean_seconds, 200);
    }

    #[test]
    fn test_trip_duration_skips_missing_and_rounds_mean() {
        let ds = dataset(
            Schema::default(),
            vec![
                trip(0, at(1, 2, 9), "A", "B").with_duration(Some(100.0)),
                trip(1, at(1, 2, 9), "A", "B").with_duration(None),
                trip(2, at(1, 2, 9), "A", "B").with_duration(Some(201.5)),
            ],
        );
        let stats = trip_duration_stats(&DatasetView::full(&ds)).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.total_seconds, 301.5);
        // 150.75 -> 151
        assert_eq!(stats.mean_seconds, 151);
    }

    #[test]
    fn test_trip_duration_mean_half_goes_to_even() {
        let ds = dataset(
            Schema::default(),
            vec![
                trip(0, at(1, 2, 9), "A", "B").with_duration(Some(100.0)),
                trip(1, at(1, 2, 9), "A", "B").with_duration(Some(201.0)),
            ],
        );
        let stats = trip_duration_stats(&DatasetView::full(&ds)).unwrap();
        // 150.5 -> 150
        assert_eq!(stats.mean_seconds, 150);
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(150.5), 150);
        assert_eq!(round_half_even(151.5), 152);
        assert_eq!(round_half_even(2.5), 2);
        assert_eq!(round_half_even(-2.5), -2);
        assert_eq!(round_half_even(150.75), 151);
        assert_eq!(round_half_even(150.25), 150);
        assert_eq!(round_half_even(7.0), 7);
    }

    #[test]
    fn test_trip_duration_empty_view() {
        let ds = dataset(Schema::default(), vec![]);
        assert_eq!(
            trip_duration_stats(&DatasetView::full(&ds)),
            Err(StatsError::EmptyDataset)
        );
    }

    // ── user_stats ────────────────────────────────────────────────────────────

    #[test]
    fn test_user_stats_with_demographics() {
        let ds = dataset(
            FULL,
            vec![
                trip(0, at(1, 2, 9), "A", "B")
                    .with_gender(Some("Male".to_string()))
                    .with_birth_year(Some(1985)),
                trip(1, at(1, 2, 9), "A", "B")
                    .with_user_type(Some("Customer".to_string()))
                    .with_gender(Some("Female".to_string()))
                    .with_birth_year(Some(1992)),
                trip(2, at(1, 2, 9), "A", "B")
                    .with_gender(Some("Male".to_string()))
                    .with_birth_year(Some(1985)),
                trip(3, at(1, 2, 9), "A", "B").with_birth_year(Some(1940)),
            ],
        );
        let stats = user_stats(&DatasetView::full(&ds)).unwrap();
        assert_eq!(
            stats.user_types,
            vec![("Subscriber".to_string(), 3), ("Customer".to_string(), 1)]
        );
        assert_eq!(
            stats.genders,
            Ok(vec![("Male".to_string(), 2), ("Female".to_string(), 1)])
        );
        let years = stats.birth_years.unwrap();
        assert_eq!(years.earliest, 1940);
        assert_eq!(years.most_recent, 1992);
        assert_eq!(years.most_common, Modal { value: 1985, count: 2 });
    }

    #[test]
    fn test_user_stats_without_demographic_columns() {
        let ds = dataset(
            Schema::default(),
            vec![
                trip(0, at(1, 2, 9), "A", "B"),
                trip(1, at(1, 2, 9), "A", "B").with_user_type(Some("Customer".to_string())),
            ],
        );
        let stats = user_stats(&DatasetView::full(&ds)).unwrap();
        assert_eq!(stats.genders, Err(StatsError::NoGenderData));
        assert_eq!(stats.birth_years, Err(StatsError::NoBirthYearData));
        assert_eq!(
            stats.user_types,
            vec![("Customer".to_string(), 1), ("Subscriber".to_string(), 1)]
        );
    }

    #[test]
    fn test_user_stats_columns_present_but_blank_in_view() {
        let ds = dataset(FULL, vec![trip(0, at(1, 2, 9), "A", "B")]);
        let stats = user_stats(&DatasetView::full(&ds)).unwrap();
        assert_eq!(stats.genders, Err(StatsError::NoGenderData));
        assert_eq!(stats.birth_years, Err(StatsError::NoBirthYearData));
    }

    #[test]
    fn test_user_stats_empty_view() {
        let ds = dataset(FULL, vec![]);
        assert_eq!(
            user_stats(&DatasetView::full(&ds)),
            Err(StatsError::EmptyDataset)
        );
    }

    // ── purity ────────────────────────────────────────────────────────────────

    #[test]
    fn test_queries_leave_dataset_untouched() {
        let ds = dataset(
            FULL,
            vec![
                trip(0, at(2, 1, 7), "A", "B").with_birth_year(Some(1980)),
                trip(1, at(5, 9, 22), "C", "D").with_gender(Some("Female".to_string())),
            ],
        );
        let before = ds.records.clone();
        let view = DatasetView::full(&ds);
        let _ = user_stats(&view);
        let _ = trip_duration_stats(&view);
        let _ = station_stats(&view);
        let _ = time_stats(&view);
        assert_eq!(ds.records, before);
        assert_eq!(view.len(), 2);
    }
}
