mod bootstrap;

use anyhow::{Context, Result};
use bikeshare_core::models::Selection;
use bikeshare_core::settings::{LastUsedParams, Settings};
use bikeshare_runtime::data_manager::DataManager;
use bikeshare_runtime::session::AnalysisSession;
use bikeshare_ui::app::App;
use bikeshare_ui::prompt::{Console, PromptError, RustylineReader};
use bikeshare_ui::themes::Theme;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Bikeshare explorer v{} starting", env!("CARGO_PKG_VERSION"));
    for warning in &settings.startup_warnings {
        tracing::warn!("{}", warning);
    }

    let data_dir = bootstrap::resolve_data_dir(&settings.data_dir);
    tracing::info!(
        "Data dir: {}, Theme: {}, Page size: {}",
        data_dir.display(),
        settings.theme,
        settings.page_size
    );
    let mut manager = DataManager::new(data_dir);

    if settings.json {
        let selection = settings
            .preselected()
            .context("--json needs --city to know what to analyse")?;
        return print_json(&mut manager, selection);
    }

    let reader = RustylineReader::new().context("cannot initialise the line editor")?;
    let console = Console::new(reader, std::io::stdout(), Theme::from_name(&settings.theme));
    let mut app = App::new(
        console,
        manager,
        settings.last_used.clone(),
        usize::from(settings.page_size),
    )
    .with_config_path(LastUsedParams::config_path());

    match app.run(settings.preselected()) {
        Ok(()) => Ok(()),
        Err(PromptError::Closed) => {
            tracing::info!("input closed; exiting");
            println!();
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Analyse one selection and print the report as pretty JSON on stdout.
fn print_json(manager: &mut DataManager, selection: Selection) -> Result<()> {
    let session = AnalysisSession::open(manager, selection)?;
    let view = session.view();
    let report = session.report(&view);

    let stdout = std::io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), &report)?;
    println!();
    Ok(())
}
