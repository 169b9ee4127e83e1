//! Data layer for the bikeshare explorer.
//!
//! Loads a city's trip CSV into a dataset, narrows it by month and weekday,
//! and computes the time, station, trip-duration and user statistics.

pub mod aggregator;
pub mod analysis;
pub mod filter;
pub mod reader;

pub use bikeshare_core as core;
