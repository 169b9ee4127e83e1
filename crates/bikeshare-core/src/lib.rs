//! Shared domain types for the bikeshare explorer.
//!
//! Cities, month/day selectors, trip records and datasets, the error types,
//! CLI settings with persisted last-used answers, and formatting helpers.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{BikeshareError, Result, StatsError};
