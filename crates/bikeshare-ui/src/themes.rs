use std::fmt::Display;
use std::io::IsTerminal;

use crossterm::style::{Color, ContentStyle, Stylize};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`. Background values
/// 0–6 are considered dark; 7–15 are considered light. Absent or unparseable
/// values fall back to dark.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// Styles for every kind of line the explorer prints.
#[derive(Debug, Clone)]
pub struct Theme {
    pub heading: ContentStyle,
    pub label: ContentStyle,
    pub value: ContentStyle,
    pub dim: ContentStyle,
    pub notice: ContentStyle,
    pub error: ContentStyle,
    pub table_header: ContentStyle,
    /// No escape codes at all.
    plain: bool,
}

impl Theme {
    /// Resolve a theme name (`auto`, `dark`, `light`, `plain`).
    ///
    /// `auto` picks by background, and goes plain when stdout is not a
    /// terminal or `NO_COLOR` is set. Unknown names behave like `auto`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::dark(),
            "light" => Self::light(),
            "plain" => Self::plain(),
            _ => {
                if std::env::var_os("NO_COLOR").is_some() || !std::io::stdout().is_terminal() {
                    Self::plain()
                } else {
                    match detect_background() {
                        BackgroundType::Dark => Self::dark(),
                        BackgroundType::Light => Self::light(),
                    }
                }
            }
        }
    }

    pub fn dark() -> Self {
        Self {
            heading: ContentStyle::new().bold().with(Color::Cyan),
            label: ContentStyle::new().with(Color::Grey),
            value: ContentStyle::new().bold().with(Color::White),
            dim: ContentStyle::new().with(Color::DarkGrey),
            notice: ContentStyle::new().with(Color::Yellow),
            error: ContentStyle::new().bold().with(Color::Red),
            table_header: ContentStyle::new().bold().underlined().with(Color::Cyan),
            plain: false,
        }
    }

    pub fn light() -> Self {
        Self {
            heading: ContentStyle::new().bold().with(Color::DarkBlue),
            label: ContentStyle::new().with(Color::Black),
            value: ContentStyle::new().bold().with(Color::Black),
            dim: ContentStyle::new().with(Color::DarkGrey),
            notice: ContentStyle::new().with(Color::DarkYellow),
            error: ContentStyle::new().bold().with(Color::DarkRed),
            table_header: ContentStyle::new().bold().underlined().with(Color::DarkBlue),
            plain: false,
        }
    }

    pub fn plain() -> Self {
        Self {
            heading: ContentStyle::new(),
            label: ContentStyle::new(),
            value: ContentStyle::new(),
            dim: ContentStyle::new(),
            notice: ContentStyle::new(),
            error: ContentStyle::new(),
            table_header: ContentStyle::new(),
            plain: true,
        }
    }

    pub fn is_plain(&self) -> bool {
        self.plain
    }

    /// Render `text` in `style`, or unchanged for the plain theme.
    pub fn paint(&self, style: ContentStyle, text: impl Display) -> String {
        if self.plain {
            text.to_string()
        } else {
            style.apply(text).to_string()
        }
    }
}
