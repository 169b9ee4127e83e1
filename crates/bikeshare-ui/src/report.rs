//! Text rendering of a [`StatsReport`].
//!
//! Every statistic group prints a heading, its values (or the reason it has
//! none), the time the query took, and a separator rule.

use std::io::{self, Write};

use bikeshare_core::formatting::{format_elapsed, format_hour, format_number, format_seconds};
use bikeshare_data::aggregator::{DurationStats, StationStats, TimeStats, UserStats};
use bikeshare_data::analysis::{StatsReport, Timed};

use crate::prompt::RULE_WIDTH;
use crate::themes::Theme;

/// Write the whole report to `out`.
pub fn render_report<W: Write>(out: &mut W, theme: &Theme, report: &StatsReport) -> io::Result<()> {
    let summary = format!(
        "{}: {} of {} trips",
        report.selection,
        format_number(report.rows as f64, 0),
        format_number(report.total_rows as f64, 0)
    );
    writeln!(out, "{}", theme.paint(theme.dim, summary))?;

    render_group(
        out,
        theme,
        "Calculating The Most Frequent Times of Travel...",
        &report.time,
        render_time,
    )?;
    render_group(
        out,
        theme,
        "Calculating The Most Popular Stations and Trip...",
        &report.stations,
        render_stations,
    )?;
    render_group(
        out,
        theme,
        "Calculating Trip Duration...",
        &report.durations,
        render_durations,
    )?;
    render_group(
        out,
        theme,
        "Calculating User Stats...",
        &report.users,
        render_users,
    )
}

fn render_group<W: Write, T>(
    out: &mut W,
    theme: &Theme,
    heading: &str,
    timed: &Timed<T>,
    body: impl FnOnce(&mut W, &Theme, &T) -> io::Result<()>,
) -> io::Result<()> {
    writeln!(out, "\n{}\n", theme.paint(theme.heading, heading))?;
    match &timed.result {
        Ok(stats) => body(out, theme, stats)?,
        Err(e) => writeln!(out, "{}", theme.paint(theme.notice, e))?,
    }
    writeln!(out, "\nThis took {} seconds.", format_elapsed(timed.elapsed))?;
    writeln!(out, "{}", theme.paint(theme.dim, "-".repeat(RULE_WIDTH)))
}

/// `label value`, with the value highlighted.
fn field(theme: &Theme, label: &str, value: impl std::fmt::Display) -> String {
    format!(
        "{} {}",
        theme.paint(theme.label, label),
        theme.paint(theme.value, value)
    )
}

fn trips(theme: &Theme, count: usize) -> String {
    theme.paint(theme.dim, format!("({} trips)", format_number(count as f64, 0)))
}

fn render_time<W: Write>(out: &mut W, theme: &Theme, stats: &TimeStats) -> io::Result<()> {
    writeln!(
        out,
        "{} {}",
        field(theme, "Most Frequent Month:", stats.month_name),
        trips(theme, stats.month.count)
    )?;
    writeln!(
        out,
        "{} {}",
        field(theme, "Most Frequent Day Of The Week:", stats.weekday.value),
        trips(theme, stats.weekday.count)
    )?;
    writeln!(
        out,
        "{} {}",
        field(theme, "Most Frequent Start Hour:", format_hour(stats.hour.value)),
        trips(theme, stats.hour.count)
    )
}

fn render_stations<W: Write>(out: &mut W, theme: &Theme, stats: &StationStats) -> io::Result<()> {
    writeln!(
        out,
        "{} {}",
        field(theme, "Most Commonly Used Start Station:", &stats.start_station.value),
        trips(theme, stats.start_station.count)
    )?;
    writeln!(
        out,
        "{} {}",
        field(theme, "Most Commonly Used End Station:", &stats.end_station.value),
        trips(theme, stats.end_station.count)
    )?;
    writeln!(out, "{}", theme.paint(theme.label, "Most Commonly Trip:"))?;
    writeln!(
        out,
        "\t(from) {} {}",
        theme.paint(theme.value, &stats.trip.value),
        trips(theme, stats.trip.count)
    )
}

fn render_durations<W: Write>(out: &mut W, theme: &Theme, stats: &DurationStats) -> io::Result<()> {
    writeln!(
        out,
        "{} seconds ({}) for {} Trips",
        field(theme, "Total Travel Time:", format_number(stats.total_seconds, 0)),
        format_seconds(stats.total_seconds),
        format_number(stats.count as f64, 0)
    )?;
    writeln!(
        out,
        "{} seconds ({})",
        field(theme, "Average Trip Duration:", stats.mean_seconds),
        format_seconds(stats.mean_seconds as f64)
    )
}

fn render_users<W: Write>(out: &mut W, theme: &Theme, stats: &UserStats) -> io::Result<()> {
    writeln!(out, "{}", theme.paint(theme.label, "Counts of Users' Types:"))?;
    for (user_type, count) in &stats.user_types {
        writeln!(out, "\t{}(s): {}", user_type, format_number(*count as f64, 0))?;
    }

    writeln!(out, "\n{}", theme.paint(theme.label, "Counts of Users' Genders:"))?;
    match &stats.genders {
        Ok(genders) => {
            for (gender, count) in genders {
                writeln!(out, "\t{}(s): {}", gender, format_number(*count as f64, 0))?;
            }
        }
        Err(e) => writeln!(out, "\t{}", theme.paint(theme.notice, e))?,
    }

    writeln!(out, "\n{}", theme.paint(theme.label, "Users' Birth Years Count:"))?;
    match &stats.birth_years {
        Ok(years) => {
            writeln!(out, "\t{}", field(theme, "The Earliest User's Birth Year:", years.earliest))?;
            writeln!(
                out,
                "\t{}",
                field(theme, "The Most Recent User's Birth Year:", years.most_recent)
            )?;
            writeln!(
                out,
                "\t{}",
                field(theme, "The Most Common User's Birth Year:", years.most_common.value)
            )
        }
        Err(e) => writeln!(out, "\t{}", theme.paint(theme.notice, e)),
    }
}
