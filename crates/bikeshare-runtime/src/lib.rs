//! Runtime layer for the bikeshare explorer.
//!
//! Holds the per-city dataset cache and the session object that carries one
//! analysis pass from selection to report.

pub mod data_manager;
pub mod session;

pub use bikeshare_core as core;
pub use bikeshare_data as data;
