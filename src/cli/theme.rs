use crate::report::ChartSpec;
use crossterm::style::{Attribute, Color, ContentStyle, Stylize};
use std::io::IsTerminal;

/// What a rendered line represents; the theme maps each kind to a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    UserPrompt,
    UserInput,
    ModelPrompt,
    ModelText,
    ModelWaiting,
    ModelDegraded,
    SystemInfo,
    SystemError,
    ChartHeader,
    Series(usize),
    ChartRow,
    SourceHeader,
    SourceItem,
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    enabled: bool,
}

impl Theme {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Colors only when stdout is a terminal and `NO_COLOR` is unset or empty.
    pub fn from_env() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
        Self::new(!no_color && std::io::stdout().is_terminal())
    }

    pub(crate) fn style(&self, kind: LineKind) -> ContentStyle {
        if !self.enabled {
            return ContentStyle::new();
        }

        match kind {
            LineKind::UserPrompt => ContentStyle::new()
                .with(Color::Rgb {
                    r: 158,
                    g: 206,
                    b: 106,
                })
                .attribute(Attribute::Bold),
            LineKind::UserInput => ContentStyle::new().with(Color::White),
            LineKind::ModelPrompt => ContentStyle::new()
                .with(Color::Rgb {
                    r: 34,
                    g: 211,
                    b: 238,
                })
                .attribute(Attribute::Bold),
            LineKind::ModelText | LineKind::ChartRow | LineKind::SourceItem => {
                ContentStyle::new().with(Color::Rgb {
                    r: 192,
                    g: 202,
                    b: 245,
                })
            }
            LineKind::ModelWaiting => ContentStyle::new()
                .with(Color::Rgb {
                    r: 138,
                    g: 138,
                    b: 138,
                })
                .attribute(Attribute::Italic),
            LineKind::ModelDegraded => ContentStyle::new().with(Color::Rgb {
                r: 255,
                g: 158,
                b: 100,
            }),
            LineKind::SystemInfo => ContentStyle::new().with(Color::Rgb {
                r: 86,
                g: 95,
                b: 137,
            }),
            LineKind::SystemError => ContentStyle::new()
                .with(Color::Rgb {
                    r: 247,
                    g: 118,
                    b: 142,
                })
                .attribute(Attribute::Bold),
            LineKind::ChartHeader | LineKind::SourceHeader => {
                ContentStyle::new().attribute(Attribute::Bold)
            }
            LineKind::Series(index) => {
                ContentStyle::new().with(series_color(ChartSpec::series_color(index)))
            }
        }
    }

    pub(crate) fn paint(&self, kind: LineKind, text: &str) -> String {
        let style = self.style(kind);
        if style == ContentStyle::new() {
            return text.to_string();
        }
        style.apply(text).to_string()
    }
}

fn series_color(hex: &str) -> Color {
    parse_hex_color(hex).unwrap_or(Color::Cyan)
}

fn parse_hex_color(raw: &str) -> Option<Color> {
    let hex = raw.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color::Rgb {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}
