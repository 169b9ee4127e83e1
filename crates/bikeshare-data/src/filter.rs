//! Month/weekday narrowing of a loaded [`Dataset`].
//!
//! Filtering never copies or mutates trips: a [`DatasetView`] is the parent
//! dataset plus the ordered indices of the rows that passed.

use bikeshare_core::models::{City, Dataset, DayFilter, MonthFilter, Schema, TripRecord};

/// An ordered subset of a dataset's rows.
#[derive(Debug, Clone)]
pub struct DatasetView<'a> {
    dataset: &'a Dataset,
    rows: Vec<usize>,
}

impl<'a> DatasetView<'a> {
    /// View covering every row of `dataset`.
    pub fn full(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            rows: (0..dataset.records.len()).collect(),
        }
    }

    /// Keep the rows matching both selectors, in their current order.
    pub fn filter(&self, month: MonthFilter, day: DayFilter) -> DatasetView<'a> {
        let rows = self
            .rows
            .iter()
            .copied()
            .filter(|&i| {
                let rec = &self.dataset.records[i];
                month.matches(rec.month()) && day.matches(rec.weekday())
            })
            .collect();
        DatasetView {
            dataset: self.dataset,
            rows,
        }
    }

    pub fn records(&self) -> impl ExactSizeIterator<Item = &'a TripRecord> + '_ {
        let dataset = self.dataset;
        self.rows.iter().map(move |&i| &dataset.records[i])
    }

    /// Up to `len` records starting at position `offset` within the view.
    pub fn page(&self, offset: usize, len: usize) -> Vec<&'a TripRecord> {
        let dataset = self.dataset;
        self.rows
            .iter()
            .skip(offset)
            .take(len)
            .map(|&i| &dataset.records[i])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn schema(&self) -> Schema {
        self.dataset.schema
    }

    pub fn city(&self) -> City {
        self.dataset.city
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }
}

/// Narrow `dataset` to `month` and `day`.
pub fn apply_filters(dataset: &Dataset, month: MonthFilter, day: DayFilter) -> DatasetView<'_> {
    let view = DatasetView::full(dataset).filter(month, day);
    tracing::debug!(
        city = dataset.city.name(),
        %month,
        %day,
        kept = view.len(),
        total = dataset.len(),
        "filter applied"
    );
    view
}
