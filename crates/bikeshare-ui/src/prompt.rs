//! Validated line prompts.
//!
//! Input arrives through a [`LineReader`] so the interactive loop can be
//! driven by `rustyline` in production and by canned answers in tests. An
//! interrupt (Ctrl+C) never aborts a prompt; it is reported as invalid input
//! and the question is asked again. End of input (Ctrl+D, closed pipe)
//! surfaces as [`PromptError::Closed`].

use std::fmt::Display;
use std::io::{self, Write};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use thiserror::Error;

use bikeshare_core::models::{City, DayFilter, MonthFilter, Selection};
use bikeshare_core::settings::LastUsedParams;

use crate::themes::Theme;

pub const INVALID_SELECTION: &str = "Invalid input or No input taken!";
pub const INVALID_ANSWER: &str = "Invalid Input!";
pub const RULE_WIDTH: usize = 40;

/// One attempt at reading a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    Interrupted,
    Closed,
}

/// Source of operator input.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome>;
}

impl<T: LineReader + ?Sized> LineReader for &mut T {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome> {
        (**self).read_line(prompt)
    }
}

/// Line editor backed by `rustyline`, with in-memory history.
pub struct RustylineReader {
    editor: DefaultEditor,
}

impl RustylineReader {
    pub fn new() -> Result<Self, ReadlineError> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineReader for RustylineReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        tracing::debug!(error = %e, "history entry not recorded");
                    }
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Closed),
            Err(ReadlineError::Io(e)) => Err(e),
            Err(e) => Err(io::Error::other(e)),
        }
    }
}

#[derive(Error, Debug)]
pub enum PromptError {
    /// The operator closed the input stream.
    #[error("input closed")]
    Closed,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Parse a yes/no answer (`yes`, `no`, `y`, `n`, any case).
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

/// Reader, output and theme bundled for the interactive loop.
pub struct Console<R, W> {
    reader: R,
    out: W,
    theme: Theme,
}

impl<R: LineReader, W: Write> Console<R, W> {
    pub fn new(reader: R, out: W, theme: Theme) -> Self {
        Self { reader, out, theme }
    }

    /// Output sink and theme, borrowed together for rendering.
    pub fn split(&mut self) -> (&mut W, &Theme) {
        (&mut self.out, &self.theme)
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Print the 40-dash separator.
    pub fn rule(&mut self) -> io::Result<()> {
        let line = self.theme.paint(self.theme.dim, "-".repeat(RULE_WIDTH));
        writeln!(self.out, "{line}")
    }

    fn notice(&mut self, message: &str) -> io::Result<()> {
        let line = self.theme.paint(self.theme.notice, message);
        writeln!(self.out, "\n{line}\n")
    }

    /// Ask `question` until `parse` accepts the answer.
    ///
    /// A blank answer yields `remembered` when there is one.
    pub fn choose<T: Copy + Display>(
        &mut self,
        question: &str,
        hint: &str,
        remembered: Option<T>,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T, PromptError> {
        let prompt = match remembered {
            Some(v) => format!("\t{hint} [last: {v}] --> "),
            None => format!("\t{hint} --> "),
        };
        loop {
            let heading = self.theme.paint(self.theme.heading, question);
            writeln!(self.out, "\n{heading}")?;
            self.out.flush()?;

            match self.reader.read_line(&prompt)? {
                ReadOutcome::Line(answer) => {
                    if answer.trim().is_empty() {
                        if let Some(v) = remembered {
                            return Ok(v);
                        }
                    } else if let Some(v) = parse(&answer) {
                        return Ok(v);
                    }
                    tracing::debug!(answer = %answer.trim(), "rejected answer");
                    self.notice(INVALID_SELECTION)?;
                }
                ReadOutcome::Interrupted => self.notice(INVALID_SELECTION)?,
                ReadOutcome::Closed => return Err(PromptError::Closed),
            }
        }
    }

    pub fn ask_city(&mut self, remembered: Option<City>) -> Result<City, PromptError> {
        self.choose(
            "Would you like to see data for Chicago, New York City, or Washington?",
            "Please write your choice here",
            remembered,
            |s| s.parse().ok(),
        )
    }

    pub fn ask_month(&mut self, remembered: Option<MonthFilter>) -> Result<MonthFilter, PromptError> {
        self.choose(
            "Would you like to see data for a certain month from 'January' to 'June' \
             or data for all the six months?",
            "Please write your 'Month' of choice or write 'All' here",
            remembered,
            |s| s.parse().ok(),
        )
    }

    pub fn ask_day(&mut self, remembered: Option<DayFilter>) -> Result<DayFilter, PromptError> {
        self.choose(
            "Would you like to see data for a certain 'day of the week'?",
            "Please write your 'Day' of choice or write 'All' here",
            remembered,
            |s| s.parse().ok(),
        )
    }

    /// Collect city, month and day, then print the separator.
    pub fn ask_selection(&mut self, last: &LastUsedParams) -> Result<Selection, PromptError> {
        let city = self.ask_city(last.last_city())?;
        let month = self.ask_month(last.last_month())?;
        let day = self.ask_day(last.last_day())?;
        self.rule()?;
        Ok(Selection::new(city, month, day))
    }

    /// Ask a yes/no question until answered.
    pub fn confirm(&mut self, question: &str) -> Result<bool, PromptError> {
        loop {
            let heading = self.theme.paint(self.theme.heading, question);
            writeln!(self.out, "\n{heading}")?;
            self.out.flush()?;

            match self.reader.read_line(" Enter (yes) or (no), here --> ")? {
                ReadOutcome::Line(answer) => {
                    if let Some(yes) = parse_yes_no(&answer) {
                        return Ok(yes);
                    }
                    self.notice(INVALID_ANSWER)?;
                }
                ReadOutcome::Interrupted => self.notice(INVALID_ANSWER)?,
                ReadOutcome::Closed => return Err(PromptError::Closed),
            }
        }
    }
}

/// Replays canned answers, then reports end of input.
#[cfg(test)]
pub(crate) struct ScriptedReader {
    answers: std::collections::VecDeque<ReadOutcome>,
    pub prompts: Vec<String>,
}

#[cfg(test)]
impl ScriptedReader {
    pub fn new(answers: impl IntoIterator<Item = ReadOutcome>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    pub fn lines(lines: &[&str]) -> Self {
        Self::new(lines.iter().map(|l| ReadOutcome::Line(l.to_string())))
    }
}

#[cfg(test)]
impl LineReader for ScriptedReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or(ReadOutcome::Closed))
    }
}
