use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{City, DayFilter, MonthFilter, Selection};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Explore US bikeshare trip data from the command line
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bikeshare",
    about = "Explore US bikeshare trip data from the command line",
    version
)]
pub struct Settings {
    /// Directory holding chicago.csv, new_york_city.csv and washington.csv
    #[arg(long, env = "BIKESHARE_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// City to analyse (skips the city prompt on the first pass)
    #[arg(long)]
    pub city: Option<City>,

    /// Month filter: all, or january through june
    #[arg(long)]
    pub month: Option<MonthFilter>,

    /// Day filter: all, or a weekday name
    #[arg(long)]
    pub day: Option<DayFilter>,

    /// Print one statistics report as JSON and exit
    #[arg(long, requires = "city")]
    pub json: bool,

    /// Raw rows shown per page (1-50)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u16).range(1..=50))]
    pub page_size: u16,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["auto", "dark", "light", "plain"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,

    /// Answers remembered from the previous run.
    #[arg(skip)]
    pub last_used: LastUsedParams,

    /// Problems met while loading, logged once logging is set up.
    #[arg(skip)]
    pub startup_warnings: Vec<String>,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.bikeshare/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u16>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.bikeshare/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".bikeshare").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Record the answers of a completed pass.
    pub fn remember(&mut self, selection: &Selection) {
        self.city = Some(selection.city.name().to_string());
        self.month = Some(selection.month.to_string());
        self.day = Some(selection.day.to_string());
    }

    /// Remembered city, if it still parses.
    pub fn last_city(&self) -> Option<City> {
        self.city.as_deref().and_then(|s| s.parse().ok())
    }

    pub fn last_month(&self) -> Option<MonthFilter> {
        self.month.as_deref().and_then(|s| s.parse().ok())
    }

    pub fn last_day(&self) -> Option<DayFilter> {
        self.day.as_deref().and_then(|s| s.parse().ok())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &Path,
    ) -> Self {
        // Build raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());

        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                settings
                    .startup_warnings
                    .push(format!("Failed to clear {}: {}", config_path.display(), e));
            }
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme.clone() {
                settings.theme = v;
            }
        }
        // NOTE: clap stores the arg id using the *field name* (underscores).
        if !is_arg_explicitly_set(&matches, "page_size") {
            if let Some(v) = last.page_size.filter(|n| (1..=50).contains(n)) {
                settings.page_size = v;
            }
        }

        settings.last_used = LastUsedParams {
            theme: Some(settings.theme.clone()),
            page_size: Some(settings.page_size),
            ..last
        };
        if let Err(e) = settings.last_used.save_to(config_path) {
            settings
                .startup_warnings
                .push(format!("Failed to save last used params: {}", e));
        }

        Self::apply_debug(settings)
    }

    /// Selection fully pre-answered on the command line, if `--city` was given.
    pub fn preselected(&self) -> Option<Selection> {
        self.city.map(|city| {
            Selection::new(
                city,
                self.month.unwrap_or_default(),
                self.day.unwrap_or_default(),
            )
        })
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Month, Weekday};
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    // ── LastUsedParams ────────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            city: Some("washington".to_string()),
            month: Some("march".to_string()),
            day: Some("all".to_string()),
            theme: Some("dark".to_string()),
            page_size: Some(10),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded, params);
        assert_eq!(loaded.last_city(), Some(City::Washington));
        assert_eq!(loaded.last_month(), Some(MonthFilter::Only(Month::March)));
        assert_eq!(loaded.last_day(), Some(DayFilter::All));
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&path).expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert_eq!(LastUsedParams::load_from(&path), LastUsedParams::default());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(LastUsedParams::load_from(&path), LastUsedParams::default());
    }

    #[test]
    fn test_remember_selection() {
        let mut params = LastUsedParams::default();
        params.remember(&Selection::new(
            City::NewYorkCity,
            MonthFilter::Only(Month::January),
            DayFilter::Only(Weekday::Tue),
        ));
        assert_eq!(params.city.as_deref(), Some("new york city"));
        assert_eq!(params.month.as_deref(), Some("january"));
        assert_eq!(params.day.as_deref(), Some("tuesday"));
    }

    #[test]
    fn test_stale_remembered_values_are_ignored() {
        let params = LastUsedParams {
            city: Some("boston".to_string()),
            month: Some("july".to_string()),
            ..Default::default()
        };
        assert!(params.last_city().is_none());
        assert!(params.last_month().is_none());
        assert!(params.last_day().is_none());
    }

    // ── Settings ──────────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["bikeshare"]);

        assert!(settings.city.is_none());
        assert!(settings.month.is_none());
        assert!(settings.day.is_none());
        assert!(!settings.json);
        assert_eq!(settings.page_size, 5);
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.log_level, "WARNING");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
        assert!(settings.preselected().is_none());
    }

    #[test]
    fn test_settings_cli_selection() {
        let settings = Settings::parse_from([
            "bikeshare",
            "--city",
            "new york city",
            "--month",
            "March",
            "--day",
            "friday",
        ]);
        assert_eq!(
            settings.preselected(),
            Some(Selection::new(
                City::NewYorkCity,
                MonthFilter::Only(Month::March),
                DayFilter::Only(Weekday::Fri),
            ))
        );
    }

    #[test]
    fn test_settings_city_only_defaults_filters_to_all() {
        let settings = Settings::parse_from(["bikeshare", "--city", "chicago"]);
        assert_eq!(settings.preselected(), Some(Selection::all(City::Chicago)));
    }

    #[test]
    fn test_settings_rejects_invalid_city() {
        assert!(Settings::try_parse_from(["bikeshare", "--city", "boston"]).is_err());
    }

    #[test]
    fn test_settings_json_requires_city() {
        assert!(Settings::try_parse_from(["bikeshare", "--json"]).is_err());
        assert!(Settings::try_parse_from(["bikeshare", "--json", "--city", "washington"]).is_ok());
    }

    #[test]
    fn test_settings_page_size_range() {
        assert!(Settings::try_parse_from(["bikeshare", "--page-size", "0"]).is_err());
        assert!(Settings::try_parse_from(["bikeshare", "--page-size", "51"]).is_err());
        let s = Settings::parse_from(["bikeshare", "--page-size", "12"]);
        assert_eq!(s.page_size, 12);
    }

    // ── load_with_last_used ───────────────────────────────────────────────────

    #[test]
    fn test_load_with_last_used_merges_persisted_theme() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("light".to_string()),
            page_size: Some(8),
            city: Some("chicago".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(vec!["bikeshare".into()], &config_path);
        assert_eq!(settings.theme, "light");
        assert_eq!(settings.page_size, 8);
        assert_eq!(settings.last_used.last_city(), Some(City::Chicago));
        // Remembered answers never pre-answer the prompts.
        assert!(settings.city.is_none());
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["bikeshare".into(), "--theme".into(), "plain".into()],
            &config_path,
        );
        assert_eq!(settings.theme, "plain");
        assert_eq!(
            LastUsedParams::load_from(&config_path).theme.as_deref(),
            Some("plain")
        );
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&config_path).expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["bikeshare".into(), "--clear".into()],
            &config_path,
        );

        assert!(!config_path.exists(), "file must be gone after --clear");
        assert_eq!(settings.last_used, LastUsedParams::default());
    }

    #[test]
    fn test_load_with_last_used_keeps_save_failure_for_later() {
        let tmp = TempDir::new().expect("tempdir");
        // A directory where the file should be makes the final rename fail.
        let config_path = tmp_config_path(&tmp);
        std::fs::create_dir_all(&config_path).expect("create dir");

        let settings = Settings::load_with_last_used_impl(vec!["bikeshare".into()], &config_path);
        assert_eq!(settings.startup_warnings.len(), 1);
        assert!(settings.startup_warnings[0].starts_with("Failed to save last used params"));
    }

    #[test]
    fn test_load_with_last_used_keeps_clear_failure_for_later() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        std::fs::create_dir_all(&config_path).expect("create dir");

        let settings = Settings::load_with_last_used_impl(
            vec!["bikeshare".into(), "--clear".into()],
            &config_path,
        );
        assert_eq!(settings.startup_warnings.len(), 1);
        assert!(settings.startup_warnings[0].starts_with("Failed to clear"));
    }

    #[test]
    fn test_load_with_last_used_no_warnings_on_success() {
        let tmp = TempDir::new().expect("tempdir");
        let settings =
            Settings::load_with_last_used_impl(vec!["bikeshare".into()], &tmp_config_path(&tmp));
        assert!(settings.startup_warnings.is_empty());
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            vec!["bikeshare".into(), "--debug".into()],
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }
}
