//! Terminal layer for the bikeshare explorer.
//!
//! Provides themes, validated prompts over a [`prompt::LineReader`], report
//! and raw-row rendering, and the interactive [`app::App`] loop.

pub mod app;
pub mod pager;
pub mod prompt;
pub mod report;
pub mod themes;

pub use bikeshare_core as core;
