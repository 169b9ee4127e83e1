use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while loading and preparing bikeshare data.
#[derive(Error, Debug)]
pub enum BikeshareError {
    /// A data file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV layer rejected the file (bad quoting, invalid UTF-8, ...).
    #[error("Malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A column every city file must carry is absent from the header.
    #[error("Column \"{column}\" missing from {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// A start or end time did not match any accepted format.
    #[error("Invalid timestamp \"{value}\" in {path} at line {line}")]
    TimestampParse {
        path: PathBuf,
        line: usize,
        value: String,
    },

    /// A numeric column held a non-numeric value.
    #[error("Invalid {column} value \"{value}\" in {path} at line {line}")]
    InvalidNumber {
        path: PathBuf,
        line: usize,
        column: String,
        value: String,
    },

    /// A city, month or day term outside the fixed enumerations.
    #[error("Invalid {kind}: {value}")]
    InvalidSelector { kind: &'static str, value: String },
}

impl BikeshareError {
    /// `true` for the failures that mean the city's backing file is missing
    /// or unusable, as opposed to bad operator input.
    pub fn is_data_source(&self) -> bool {
        matches!(
            self,
            Self::FileRead { .. }
                | Self::Csv { .. }
                | Self::MissingColumn { .. }
                | Self::TimestampParse { .. }
                | Self::InvalidNumber { .. }
        )
    }
}

/// Recoverable conditions raised by the statistic queries.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum StatsError {
    /// The (filtered) view holds no rows, so no mode/mean exists.
    #[error("No trips match the selected filters")]
    EmptyDataset,

    /// The city's file has no gender column, or no gender values in the view.
    #[error("No Gender Data Available for This City.")]
    NoGenderData,

    /// The city's file has no birth-year column, or no values in the view.
    #[error("No Birth Year Data Available for This City.")]
    NoBirthYearData,
}

/// Convenience alias used throughout the bikeshare crates.
pub type Result<T> = std::result::Result<T, BikeshareError>;
