//! Runs the four statistic groups over one filtered view.
//!
//! Each query is timed on its own so the report can show how long every
//! group took, next to its values.

use std::time::{Duration, Instant};

use bikeshare_core::error::StatsError;
use bikeshare_core::models::Selection;
use serde::{Serialize, Serializer};

use crate::aggregator::{
    station_stats, time_stats, trip_duration_stats, user_stats, DurationStats, StationStats,
    TimeStats, UserStats,
};
use crate::filter::DatasetView;

// ── Public types ──────────────────────────────────────────────────────────────

/// A statistic group's outcome plus the wall-clock time it took.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timed<T> {
    pub result: Result<T, StatsError>,
    #[serde(rename = "elapsed_seconds", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

/// Everything printed for one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub selection: Selection,
    /// Rows left after filtering.
    pub rows: usize,
    /// Rows in the unfiltered city file.
    pub total_rows: usize,
    pub time: Timed<TimeStats>,
    pub stations: Timed<StationStats>,
    pub durations: Timed<DurationStats>,
    pub users: Timed<UserStats>,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Compute every statistic group over `view`.
///
/// An empty view still yields a report; each group then holds
/// [`StatsError::EmptyDataset`].
pub fn analyze(selection: Selection, view: &DatasetView<'_>) -> StatsReport {
    let report = StatsReport {
        selection,
        rows: view.len(),
        total_rows: view.dataset().len(),
        time: timed(|| time_stats(view)),
        stations: timed(|| station_stats(view)),
        durations: timed(|| trip_duration_stats(view)),
        users: timed(|| user_stats(view)),
    };

    tracing::debug!(
        %selection,
        rows = report.rows,
        time_us = report.time.elapsed.as_micros() as u64,
        stations_us = report.stations.elapsed.as_micros() as u64,
        durations_us = report.durations.elapsed.as_micros() as u64,
        users_us = report.users.elapsed.as_micros() as u64,
        "analysis complete"
    );
    report
}

fn timed<T>(f: impl FnOnce() -> Result<T, StatsError>) -> Timed<T> {
    let started = Instant::now();
    let result = f();
    Timed {
        result,
        elapsed: started.elapsed(),
    }
}

fn serialize_secs<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(d.as_secs_f64())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
