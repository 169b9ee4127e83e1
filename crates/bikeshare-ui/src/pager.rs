//! Page-at-a-time raw row display.

use std::io::{self, Write};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use bikeshare_core::models::{Schema, TripRecord};
use bikeshare_core::time_utils::DISPLAY_TIMESTAMP_FORMAT;
use bikeshare_data::filter::DatasetView;

use crate::themes::Theme;

/// Placeholder printed for missing cells.
pub const MISSING: &str = "not available";
/// Cells wider than this are cut and end in `...`.
pub const MAX_COLUMN_WIDTH: usize = 70;

const BASE_COLUMNS: [&str; 6] = [
    "Start Time",
    "End Time",
    "Trip Duration",
    "Start Station",
    "End Station",
    "User Type",
];

/// Column headers for a city, after the row index.
pub fn columns(schema: Schema) -> Vec<&'static str> {
    let mut cols = BASE_COLUMNS.to_vec();
    if schema.has_gender {
        cols.push("Gender");
    }
    if schema.has_birth_year {
        cols.push("Birth Year");
    }
    cols
}

fn cells(record: &TripRecord, schema: Schema) -> Vec<String> {
    let or_missing = |v: Option<String>| v.unwrap_or_else(|| MISSING.to_string());
    let mut row = vec![
        record.row.to_string(),
        record.start_time.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
        record.end_time.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
        or_missing(record.trip_duration.map(|d| format!("{:.0}", d))),
        record.start_station.clone(),
        record.end_station.clone(),
        or_missing(record.user_type.clone()),
    ];
    if schema.has_gender {
        row.push(or_missing(record.gender.clone()));
    }
    if schema.has_birth_year {
        row.push(or_missing(record.birth_year.map(|y| y.to_string())));
    }
    row
}

/// Cut `s` to at most `max` display columns.
fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let budget = max.saturating_sub(3);
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

fn pad(s: &str, width: usize, right: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(s.width()));
    if right {
        format!("{fill}{s}")
    } else {
        format!("{s}{fill}")
    }
}

/// Write `records` as an aligned table with a header line.
///
/// The row index, duration and birth-year columns are right-aligned.
pub fn render_rows<W: Write>(
    out: &mut W,
    theme: &Theme,
    schema: Schema,
    records: &[&TripRecord],
) -> io::Result<()> {
    let mut header: Vec<String> = vec![String::new()];
    header.extend(columns(schema).into_iter().map(str::to_string));
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            cells(r, schema)
                .iter()
                .map(|c| truncate(c, MAX_COLUMN_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            rows.iter()
                .map(|r| r[i].width())
                .chain(std::iter::once(header[i].width()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let right: Vec<bool> = header
        .iter()
        .map(|h| h.is_empty() || h == "Trip Duration" || h == "Birth Year")
        .collect();

    let line = |row: &[String]| -> String {
        row.iter()
            .enumerate()
            .map(|(i, c)| pad(c, widths[i], right[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", theme.paint(theme.table_header, line(&header)))?;
    for row in &rows {
        writeln!(out, "{}", line(row))?;
    }
    Ok(())
}

/// Cursor over a view, handing out `page_size` rows at a time.
#[derive(Debug, Clone)]
pub struct Pager {
    page_size: usize,
    offset: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            offset: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_exhausted(&self, view: &DatasetView<'_>) -> bool {
        self.offset >= view.len()
    }

    /// Print the next page and advance; returns how many rows were shown.
    pub fn next_page<W: Write>(
        &mut self,
        out: &mut W,
        theme: &Theme,
        view: &DatasetView<'_>,
    ) -> io::Result<usize> {
        let page = view.page(self.offset, self.page_size);
        if !page.is_empty() {
            render_rows(out, theme, view.schema(), &page)?;
        }
        self.offset += page.len();
        tracing::debug!(shown = page.len(), offset = self.offset, "page displayed");
        Ok(page.len())
    }
}
