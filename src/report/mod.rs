//! Turns one unstructured model completion into a typed report: markdown
//! analysis, an optional validated chart and deduplicated citations.

pub mod chart;
pub mod error;
pub mod parser;
pub mod prompt;
pub mod service;
pub mod sources;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub use chart::{ChartOutcome, ChartWarning, RawChart, normalize};
pub use error::{MalformedReason, ReportError};
pub use parser::{ParsedResponse, parse};
pub use service::ReportService;
pub use sources::{SourceCandidate, dedupe};

/// Colors handed to the chart surface, assigned by value-key index.
pub const SERIES_PALETTE: [&str; 5] = ["#22d3ee", "#a5f3fc", "#06b6d4", "#0891b2", "#0e7490"];

pub const DEGRADED_PREFIX: &str = "Sorry, I encountered an error while processing your request:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Bar,
}

impl ChartType {
    /// Case-sensitive: `"Line"` is not a chart type.
    pub fn from_declared(value: &str) -> Option<Self> {
        match value {
            "line" => Some(Self::Line),
            "bar" => Some(Self::Bar),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataValue {
    Number(f64),
    Text(String),
}

impl Display for DataValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct DataPoint(BTreeMap<String, DataValue>);

impl DataPoint {
    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: DataValue) {
        self.0.insert(key.into(), value);
    }
}

impl<K: Into<String>> FromIterator<(K, DataValue)> for DataPoint {
    fn from_iter<I: IntoIterator<Item = (K, DataValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Render-ready chart. Only [`normalize`] builds one, so every point is
/// guaranteed to carry the category key and every value key.
///
/// Serializes to the shape the chart surface consumes:
/// `{chartType, data, dataKeys, xAxisKey}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "chartType")]
    chart_type: ChartType,
    #[serde(rename = "data")]
    series: Vec<DataPoint>,
    #[serde(rename = "dataKeys")]
    value_keys: Vec<String>,
    #[serde(rename = "xAxisKey")]
    category_key: String,
}

impl ChartSpec {
    pub(crate) fn new_unchecked(
        chart_type: ChartType,
        series: Vec<DataPoint>,
        value_keys: Vec<String>,
        category_key: String,
    ) -> Self {
        Self {
            chart_type,
            series,
            value_keys,
            category_key,
        }
    }

    pub fn chart_type(&self) -> ChartType {
        self.chart_type
    }

    pub fn series(&self) -> &[DataPoint] {
        &self.series
    }

    pub fn value_keys(&self) -> &[String] {
        &self.value_keys
    }

    pub fn category_key(&self) -> &str {
        &self.category_key
    }

    pub fn series_color(index: usize) -> &'static str {
        SERIES_PALETTE[index % SERIES_PALETTE.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// Outcome of one request. Failures arrive here too, as `degraded` reports
/// whose analysis text explains what went wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportResult {
    pub analysis_text: String,
    pub chart: Option<ChartSpec>,
    pub sources: Vec<Source>,
    pub degraded: bool,
}

impl ReportResult {
    pub fn degraded(err: &ReportError) -> Self {
        Self {
            analysis_text: format!("{DEGRADED_PREFIX} {err}"),
            chart: None,
            sources: Vec::new(),
            degraded: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartSpec, ChartType, DataPoint, DataValue, ReportError, ReportResult};
    use serde_json::json;

    #[test]
    fn chart_type_match_is_case_sensitive() {
        assert_eq!(ChartType::from_declared("line"), Some(ChartType::Line));
        assert_eq!(ChartType::from_declared("bar"), Some(ChartType::Bar));
        assert_eq!(ChartType::from_declared("Line"), None);
        assert_eq!(ChartType::from_declared("pie"), None);
    }

    #[test]
    fn data_value_display_drops_trailing_zero_fraction() {
        assert_eq!(DataValue::Number(2023.0).to_string(), "2023");
        assert_eq!(DataValue::Number(4.25).to_string(), "4.25");
        assert_eq!(DataValue::Text("Q1".to_string()).to_string(), "Q1");
    }

    #[test]
    fn chart_spec_serializes_to_render_contract() {
        let point: DataPoint = [
            ("Year", DataValue::Text("2023".to_string())),
            ("Yield", DataValue::Number(4.5)),
        ]
        .into_iter()
        .collect();
        let spec = ChartSpec::new_unchecked(
            ChartType::Bar,
            vec![point],
            vec!["Yield".to_string()],
            "Year".to_string(),
        );

        let value = serde_json::to_value(&spec).expect("serialize");
        assert_eq!(
            value,
            json!({
                "chartType": "bar",
                "data": [{"Year": "2023", "Yield": 4.5}],
                "dataKeys": ["Yield"],
                "xAxisKey": "Year"
            })
        );
    }

    #[test]
    fn series_color_cycles_through_palette() {
        assert_eq!(ChartSpec::series_color(0), "#22d3ee");
        assert_eq!(ChartSpec::series_color(4), "#0e7490");
        assert_eq!(ChartSpec::series_color(5), "#22d3ee");
    }

    #[test]
    fn degraded_result_embeds_error_description() {
        let result = ReportResult::degraded(&ReportError::EmptyPayload);
        assert!(result.degraded);
        assert!(result.chart.is_none());
        assert!(result.sources.is_empty());
        assert_eq!(
            result.analysis_text,
            "Sorry, I encountered an error while processing your request: Received an empty response from the AI."
        );
    }
}
