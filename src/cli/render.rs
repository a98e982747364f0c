use crate::cli::theme::{LineKind, Theme};
use crate::conversation::{ConversationEntry, EXAMPLE_PROMPTS, Role};
use crate::report::{ChartSpec, Source};

const USER_PROMPT: &str = "you> ";
const MODEL_PROMPT: &str = "ltgd> ";
const INDENT: &str = "  ";
const COLUMN_GAP: &str = "  ";
const SERIES_MARKER: &str = "\u{25a0}";

/// One terminal line: an optional styled prompt followed by styled text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    prompt: Option<(LineKind, &'static str)>,
    kind: LineKind,
    text: String,
}

impl Line {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            prompt: None,
            kind,
            text: text.into(),
        }
    }

    fn prompted(prompt_kind: LineKind, prompt: &'static str, kind: LineKind, text: &str) -> Self {
        Self {
            prompt: Some((prompt_kind, prompt)),
            kind,
            text: text.to_string(),
        }
    }

    pub(crate) fn blank() -> Self {
        Self::new(LineKind::ModelText, "")
    }

    #[cfg(test)]
    pub(crate) fn plain(&self) -> String {
        match self.prompt {
            Some((_, prompt)) => format!("{prompt}{}", self.text),
            None => self.text.clone(),
        }
    }

    pub(crate) fn painted(&self, theme: &Theme) -> String {
        let body = if self.text.is_empty() {
            String::new()
        } else {
            theme.paint(self.kind, &self.text)
        };
        match self.prompt {
            Some((kind, prompt)) => format!("{}{body}", theme.paint(kind, prompt)),
            None => body,
        }
    }
}

pub(crate) fn render_entry(entry: &ConversationEntry) -> Vec<Line> {
    match entry.role {
        Role::User => prompted_text(
            LineKind::UserPrompt,
            USER_PROMPT,
            LineKind::UserInput,
            entry.text.as_deref().unwrap_or_default(),
        ),
        Role::Model if entry.pending => vec![Line::prompted(
            LineKind::ModelPrompt,
            MODEL_PROMPT,
            LineKind::ModelWaiting,
            "Thinking...",
        )],
        Role::Model => {
            let kind = if entry.degraded {
                LineKind::ModelDegraded
            } else {
                LineKind::ModelText
            };
            let mut lines = prompted_text(
                LineKind::ModelPrompt,
                MODEL_PROMPT,
                kind,
                entry.text.as_deref().unwrap_or_default(),
            );
            if let Some(chart) = &entry.chart {
                lines.extend(render_chart(chart));
            }
            lines.extend(render_sources(&entry.sources));
            lines
        }
    }
}

fn prompted_text(
    prompt_kind: LineKind,
    prompt: &'static str,
    kind: LineKind,
    text: &str,
) -> Vec<Line> {
    let mut split = text.lines();
    let first = split.next().unwrap_or_default();
    let mut lines = vec![Line::prompted(prompt_kind, prompt, kind, first)];
    lines.extend(split.map(|line| Line::new(kind, line)));
    lines
}

/// A legend line per series followed by a plain table: category column
/// left-aligned, value columns right-aligned.
pub(crate) fn render_chart(chart: &ChartSpec) -> Vec<Line> {
    let mut lines = vec![
        Line::blank(),
        Line::new(
            LineKind::ChartHeader,
            format!(
                "[{} chart] {} by {}",
                chart.chart_type().as_str(),
                chart.value_keys().join(", "),
                chart.category_key()
            ),
        ),
    ];

    for (index, key) in chart.value_keys().iter().enumerate() {
        lines.push(Line::new(
            LineKind::Series(index),
            format!("{INDENT}{SERIES_MARKER} {key}"),
        ));
    }

    let header = std::iter::once(chart.category_key().to_string())
        .chain(chart.value_keys().iter().cloned())
        .collect::<Vec<_>>();
    let rows = chart
        .series()
        .iter()
        .map(|point| {
            std::iter::once(chart.category_key())
                .chain(chart.value_keys().iter().map(String::as_str))
                .map(|key| point.get(key).map(ToString::to_string).unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut widths = header
        .iter()
        .map(|cell| cell.chars().count())
        .collect::<Vec<_>>();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    for row in std::iter::once(&header).chain(&rows) {
        lines.push(Line::new(LineKind::ChartRow, format_row(row, &widths)));
    }
    lines
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let formatted = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(column, (cell, width))| {
            if column == 0 {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>width$}")
            }
        })
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    format!("{INDENT}{}", formatted.trim_end())
}

pub(crate) fn render_sources(sources: &[Source]) -> Vec<Line> {
    if sources.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![
        Line::blank(),
        Line::new(LineKind::SourceHeader, "Sources:"),
    ];
    lines.extend(sources.iter().enumerate().map(|(index, source)| {
        Line::new(
            LineKind::SourceItem,
            format!("{INDENT}[{}] {} ({})", index + 1, source.title, source.uri),
        )
    }));
    lines
}

pub(crate) fn render_examples() -> Vec<Line> {
    let mut lines = vec![Line::new(
        LineKind::SystemInfo,
        "Try one of these (/example <n>):",
    )];
    lines.extend(EXAMPLE_PROMPTS.iter().enumerate().map(|(index, prompt)| {
        Line::new(
            LineKind::SystemInfo,
            format!("{INDENT}{}. {prompt}", index + 1),
        )
    }));
    lines
}

pub(crate) fn info(text: &str) -> Vec<Line> {
    text.lines()
        .map(|line| Line::new(LineKind::SystemInfo, line))
        .collect()
}

pub(crate) fn error(text: &str) -> Vec<Line> {
    text.lines()
        .map(|line| Line::new(LineKind::SystemError, line))
        .collect()
}

#[cfg(test)]
pub(crate) fn to_plain(lines: &[Line]) -> String {
    lines
        .iter()
        .map(Line::plain)
        .collect::<Vec<_>>()
        .join("\n")
}
