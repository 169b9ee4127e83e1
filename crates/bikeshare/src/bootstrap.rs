use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use bikeshare_core::models::City;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `~/.bikeshare/` exists (it holds `last_used.json`).
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(home.join(".bikeshare"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a level name (`DEBUG`, `INFO`, `WARNING`, `ERROR`, `CRITICAL`) to an
/// [`EnvFilter`] directive. Unknown names pass through unchanged.
fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Logs go to stderr, or only to `log_file` (appended, no colours) when one
/// is given, so the prompts on stdout stay readable.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };
    let stderr_layer = log_file.is_none().then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

fn has_city_files(dir: &Path) -> bool {
    City::ALL.iter().any(|c| dir.join(c.file_name()).is_file())
}

/// Pick the directory the city files are read from.
///
/// Checks, in order, `configured` and `~/.bikeshare/data/`, returning the first
/// that holds at least one city file. Falls back to `configured` so the load
/// error names the path the operator asked for.
pub fn resolve_data_dir(configured: &Path) -> PathBuf {
    let mut candidates = vec![configured.to_path_buf()];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".bikeshare").join("data"));
    }
    candidates
        .into_iter()
        .find(|p| has_city_files(p))
        .unwrap_or_else(|| configured.to_path_buf())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
