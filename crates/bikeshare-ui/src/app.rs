//! The interactive explore loop.
//!
//! [`App`] owns the console, the dataset cache and the remembered answers.
//! One pass is: select, load, report, browse raw rows. After every pass the
//! operator is asked whether to start over.

use std::io::Write;
use std::path::PathBuf;

use bikeshare_core::models::Selection;
use bikeshare_core::settings::LastUsedParams;
use bikeshare_data::filter::DatasetView;
use bikeshare_runtime::data_manager::DataManager;
use bikeshare_runtime::session::AnalysisSession;

use crate::pager::Pager;
use crate::prompt::{Console, LineReader, PromptError};
use crate::report::render_report;

pub const GREETING: &str = "Hello! Let's explore some US bikeshare data!";
pub const RESTART_QUESTION: &str = "Would you like to restart?";

pub struct App<R, W> {
    console: Console<R, W>,
    manager: DataManager,
    last_used: LastUsedParams,
    /// Where remembered answers are saved after each pass; `None` skips saving.
    config_path: Option<PathBuf>,
    page_size: usize,
}

impl<R: LineReader, W: Write> App<R, W> {
    pub fn new(
        console: Console<R, W>,
        manager: DataManager,
        last_used: LastUsedParams,
        page_size: usize,
    ) -> Self {
        Self {
            console,
            manager,
            last_used,
            config_path: None,
            page_size,
        }
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn last_used(&self) -> &LastUsedParams {
        &self.last_used
    }

    pub fn into_output(self) -> W {
        self.console.into_output()
    }

    /// Run passes until the operator declines to restart.
    ///
    /// `preselected` replaces the prompts for the first pass only.
    pub fn run(&mut self, mut preselected: Option<Selection>) -> Result<(), PromptError> {
        {
            let (out, theme) = self.console.split();
            writeln!(out, "\n{}", theme.paint(theme.heading, GREETING))?;
        }

        loop {
            let selection = match preselected.take() {
                Some(selection) => {
                    self.console.rule()?;
                    selection
                }
                None => self.console.ask_selection(&self.last_used)?,
            };
            self.run_pass(selection)?;

            if !self.console.confirm(RESTART_QUESTION)? {
                tracing::debug!("operator declined restart");
                return Ok(());
            }
        }
    }

    fn run_pass(&mut self, selection: Selection) -> Result<(), PromptError> {
        let session = match AnalysisSession::open(&mut self.manager, selection) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(%selection, error = %e, "could not load city data");
                let city = selection.city.display_name();
                let message = if e.is_data_source() {
                    format!(
                        "Could not load data for {} from {}: {}",
                        city,
                        self.manager.data_dir().display(),
                        e
                    )
                } else {
                    format!("Could not analyse {}: {}", city, e)
                };
                let (out, theme) = self.console.split();
                writeln!(out, "\n{}", theme.paint(theme.error, message))?;
                return Ok(());
            }
        };

        let view = session.view();
        let report = session.report(&view);
        {
            let (out, theme) = self.console.split();
            render_report(out, theme, &report)?;
        }
        self.browse_rows(&view)?;

        self.last_used.remember(&selection);
        if let Some(path) = &self.config_path {
            if let Err(e) = self.last_used.save_to(path) {
                tracing::warn!("Failed to save last used params: {}", e);
            }
        }
        Ok(())
    }

    /// Offer raw rows a page at a time until declined or out of rows.
    fn browse_rows(&mut self, view: &DatasetView<'_>) -> Result<(), PromptError> {
        let mut pager = Pager::new(self.page_size);
        let mut question = format!(
            "Do you want to see the first {} rows of data?",
            pager.page_size()
        );

        while !pager.is_exhausted(view) && self.console.confirm(&question)? {
            let (out, theme) = self.console.split();
            pager.next_page(out, theme, view)?;
            if pager.is_exhausted(view) {
                writeln!(out, "\n{}", theme.paint(theme.notice, "No more rows to display."))?;
                break;
            }
            question = format!(
                "Do you want to see the next {} rows of data?",
                pager.page_size()
            );
        }
        self.console.rule()?;
        Ok(())
    }
}
