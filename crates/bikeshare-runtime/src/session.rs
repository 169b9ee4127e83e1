//! One analysis pass: the operator's selection bound to its loaded dataset.
//!
//! The session is created per pass and handed to every stage, so no stage
//! reads the city or filters from anywhere else.

use std::sync::Arc;

use bikeshare_core::error::Result;
use bikeshare_core::models::{Dataset, Selection};
use bikeshare_data::analysis::{analyze, StatsReport};
use bikeshare_data::filter::{apply_filters, DatasetView};

use crate::data_manager::DataManager;

pub struct AnalysisSession {
    selection: Selection,
    dataset: Arc<Dataset>,
}

impl AnalysisSession {
    /// Load (or reuse) the selected city's dataset.
    pub fn open(manager: &mut DataManager, selection: Selection) -> Result<Self> {
        let dataset = manager.get(selection.city)?;
        tracing::info!(%selection, rows = dataset.len(), "session opened");
        Ok(Self::with_dataset(selection, dataset))
    }

    /// Bind `selection` to an already loaded dataset.
    pub fn with_dataset(selection: Selection, dataset: Arc<Dataset>) -> Self {
        Self { selection, dataset }
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The dataset narrowed to the session's month and day.
    pub fn view(&self) -> DatasetView<'_> {
        apply_filters(&self.dataset, self.selection.month, self.selection.day)
    }

    /// Run every statistic group over `view`.
    pub fn report(&self, view: &DatasetView<'_>) -> StatsReport {
        analyze(self.selection, view)
    }
}
