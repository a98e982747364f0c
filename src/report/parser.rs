use serde_json::{Map, Value};

use super::chart::RawChart;
use super::error::{MalformedReason, ReportError};

pub const ANALYSIS_FIELD: &str = "analysis";
pub const CHART_FIELD: &str = "chart";

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    /// Empty when the completion omitted the analysis field.
    pub analysis_text: String,
    pub chart: RawChart,
}

/// Extracts the single JSON payload from a raw completion.
///
/// Anything before the first `{` or after the last `}` is ignored, which
/// covers prose preambles and markdown code fences. The chart is returned
/// un-normalized; see [`super::chart::normalize`].
pub fn parse(raw: &str) -> Result<ParsedResponse, ReportError> {
    let json = locate_object(raw).ok_or(MalformedReason::NoJsonObject)?;
    let mut object = serde_json::from_str::<Map<String, Value>>(json)
        .map_err(|err| MalformedReason::InvalidJson(err.to_string()))?;

    let analysis_text = match object.remove(ANALYSIS_FIELD) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(_) => return Err(MalformedReason::AnalysisWrongType.into()),
    };

    Ok(ParsedResponse {
        analysis_text,
        chart: RawChart::from_field(object.remove(CHART_FIELD)),
    })
}

fn locate_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}
