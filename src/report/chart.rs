use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

use super::{ChartSpec, ChartType, DataPoint, DataValue};

const CHART_TYPE_FIELD: &str = "chartType";
const DATA_FIELD: &str = "data";
const VALUE_KEYS_FIELD: &str = "dataKeys";
const CATEGORY_KEY_FIELD: &str = "xAxisKey";

/// The `chart` field exactly as the completion delivered it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawChart {
    Absent,
    Object(Map<String, Value>),
    /// The whole chart object serialized into a JSON string.
    Encoded(String),
    Unexpected(Value),
}

impl RawChart {
    pub fn from_field(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::Object(map)) => Self::Object(map),
            Some(Value::String(text)) if text.trim().is_empty() => Self::Absent,
            Some(Value::String(text)) => Self::Encoded(text),
            Some(other) => Self::Unexpected(other),
        }
    }
}

/// Why a declared chart was dropped. Logged, never shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartWarning {
    EncodedChart(String),
    EncodedData(String),
    UnexpectedShape(&'static str),
    UnknownChartType(String),
    InvalidField(&'static str),
    EmptyKeys,
    EmptySeries,
    InvalidPoint { index: usize },
    MissingKey { point: usize, key: String },
}

impl Display for ChartWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EncodedChart(err) => write!(f, "chart string is not valid JSON: {err}"),
            Self::EncodedData(err) => write!(f, "chart data string is not valid JSON: {err}"),
            Self::UnexpectedShape(kind) => write!(f, "chart is a JSON {kind}, expected an object"),
            Self::UnknownChartType(value) => write!(f, "unsupported chart type {value}"),
            Self::InvalidField(field) => write!(f, "chart field {field} is missing or invalid"),
            Self::EmptyKeys => write!(f, "chart declares no value keys"),
            Self::EmptySeries => write!(f, "chart has no data points"),
            Self::InvalidPoint { index } => write!(f, "data point {index} is not an object"),
            Self::MissingKey { point, key } => {
                write!(f, "data point {point} is missing key {key}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    Absent,
    Ready(ChartSpec),
    Dropped(ChartWarning),
}

impl ChartOutcome {
    pub fn into_chart(self) -> Option<ChartSpec> {
        match self {
            Self::Ready(spec) => Some(spec),
            Self::Absent | Self::Dropped(_) => None,
        }
    }

    pub fn warning(&self) -> Option<&ChartWarning> {
        match self {
            Self::Dropped(warning) => Some(warning),
            _ => None,
        }
    }
}

/// Validates a raw chart into a [`ChartSpec`]. Never fails: anything that
/// cannot be drawn as declared, in full, comes back as no chart.
pub fn normalize(raw: RawChart) -> ChartOutcome {
    let object = match raw {
        RawChart::Absent => return ChartOutcome::Absent,
        RawChart::Object(map) => map,
        RawChart::Encoded(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => map,
            Ok(Value::Null) => return ChartOutcome::Absent,
            Ok(other) => return ChartOutcome::Dropped(ChartWarning::UnexpectedShape(json_kind(&other))),
            Err(err) => return ChartOutcome::Dropped(ChartWarning::EncodedChart(err.to_string())),
        },
        RawChart::Unexpected(value) => {
            return ChartOutcome::Dropped(ChartWarning::UnexpectedShape(json_kind(&value)));
        }
    };

    match validate(&object) {
        Ok(spec) => ChartOutcome::Ready(spec),
        Err(warning) => ChartOutcome::Dropped(warning),
    }
}

fn validate(object: &Map<String, Value>) -> Result<ChartSpec, ChartWarning> {
    let chart_type = match object.get(CHART_TYPE_FIELD) {
        Some(Value::String(declared)) => ChartType::from_declared(declared)
            .ok_or_else(|| ChartWarning::UnknownChartType(format!("'{declared}'")))?,
        Some(other) => return Err(ChartWarning::UnknownChartType(other.to_string())),
        None => return Err(ChartWarning::InvalidField(CHART_TYPE_FIELD)),
    };

    let category_key = object
        .get(CATEGORY_KEY_FIELD)
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
        .ok_or(ChartWarning::InvalidField(CATEGORY_KEY_FIELD))?
        .to_string();

    let value_keys = value_keys(object.get(VALUE_KEYS_FIELD))?;
    let rows = data_rows(object.get(DATA_FIELD))?;
    if rows.is_empty() {
        return Err(ChartWarning::EmptySeries);
    }

    let mut series = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let Value::Object(fields) = row else {
            return Err(ChartWarning::InvalidPoint { index });
        };
        let point = to_data_point(fields);

        let missing = std::iter::once(&category_key)
            .chain(value_keys.iter())
            .find(|key| !point.contains_key(key));
        if let Some(key) = missing {
            return Err(ChartWarning::MissingKey {
                point: index,
                key: key.clone(),
            });
        }
        series.push(point);
    }

    Ok(ChartSpec::new_unchecked(
        chart_type,
        series,
        value_keys,
        category_key,
    ))
}

/// Keys are a set: duplicates collapse, first declaration order is kept.
fn value_keys(field: Option<&Value>) -> Result<Vec<String>, ChartWarning> {
    let Some(Value::Array(items)) = field else {
        return Err(ChartWarning::InvalidField(VALUE_KEYS_FIELD));
    };

    let mut keys: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let key = item
            .as_str()
            .filter(|key| !key.is_empty())
            .ok_or(ChartWarning::InvalidField(VALUE_KEYS_FIELD))?;
        if !keys.iter().any(|existing| existing == key) {
            keys.push(key.to_string());
        }
    }

    if keys.is_empty() {
        return Err(ChartWarning::EmptyKeys);
    }
    Ok(keys)
}

fn data_rows(field: Option<&Value>) -> Result<Vec<Value>, ChartWarning> {
    match field {
        Some(Value::Array(rows)) => Ok(rows.clone()),
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Array(rows)) => Ok(rows),
            Ok(_) => Err(ChartWarning::InvalidField(DATA_FIELD)),
            Err(err) => Err(ChartWarning::EncodedData(err.to_string())),
        },
        _ => Err(ChartWarning::InvalidField(DATA_FIELD)),
    }
}

/// Keeps string and numeric fields; anything else cannot be plotted.
fn to_data_point(fields: &Map<String, Value>) -> DataPoint {
    fields
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(text) => DataValue::Text(text.clone()),
                Value::Number(number) => DataValue::Number(number.as_f64()?),
                _ => return None,
            };
            Some((key.as_str(), value))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartOutcome, ChartWarning, RawChart, normalize};
    use crate::report::{ChartType, DataValue};
    use serde_json::{Value, json};

    fn raw(value: Value) -> RawChart {
        RawChart::from_field(Some(value))
    }

    fn yields_chart() -> Value {
        json!({
            "chartType": "line",
            "data": [
                {"Year": "2022", "Yield": 3.9, "Spread": 1.1},
                {"Year": "2023", "Yield": 4.5, "Spread": 0.8}
            ],
            "dataKeys": ["Yield", "Spread"],
            "xAxisKey": "Year"
        })
    }

    #[test]
    fn absent_chart_stays_absent() {
        assert_eq!(normalize(RawChart::Absent), ChartOutcome::Absent);
        assert_eq!(normalize(RawChart::from_field(None)), ChartOutcome::Absent);
        assert_eq!(normalize(raw(Value::Null)), ChartOutcome::Absent);
        assert_eq!(normalize(raw(json!(""))), ChartOutcome::Absent);
    }

    #[test]
    fn valid_chart_preserves_point_order() {
        let spec = normalize(raw(yields_chart())).into_chart().expect("chart");
        assert_eq!(spec.chart_type(), ChartType::Line);
        assert_eq!(spec.category_key(), "Year");
        assert_eq!(spec.value_keys(), ["Yield", "Spread"]);
        let years: Vec<String> = spec
            .series()
            .iter()
            .map(|p| p.get("Year").expect("year").to_string())
            .collect();
        assert_eq!(years, ["2022", "2023"]);
    }

    #[test]
    fn string_encoded_data_is_decoded() {
        let chart = json!({
            "chartType": "line",
            "data": "[{\"Year\":\"2023\",\"Yield\":4.5}]",
            "dataKeys": ["Yield"],
            "xAxisKey": "Year"
        });

        let spec = normalize(raw(chart)).into_chart().expect("chart");
        assert_eq!(spec.series().len(), 1);
        let point = &spec.series()[0];
        assert_eq!(point.get("Year"), Some(&DataValue::Text("2023".to_string())));
        assert_eq!(point.get("Yield"), Some(&DataValue::Number(4.5)));
    }

    #[test]
    fn string_encoded_chart_object_is_decoded() {
        let encoded = yields_chart().to_string();
        let outcome = normalize(raw(json!(encoded)));
        assert!(matches!(outcome, ChartOutcome::Ready(_)), "got {outcome:?}");
    }

    #[test]
    fn undecodable_chart_string_is_dropped_with_warning() {
        let outcome = normalize(raw(json!("{chartType: line")));
        assert!(matches!(
            outcome.warning(),
            Some(ChartWarning::EncodedChart(_))
        ));
        assert_eq!(outcome.into_chart(), None);
    }

    #[test]
    fn undecodable_data_string_is_dropped_with_warning() {
        let mut chart = yields_chart();
        chart["data"] = json!("[{\"Year\": 2023,");
        let outcome = normalize(raw(chart));
        assert!(matches!(
            outcome.warning(),
            Some(ChartWarning::EncodedData(_))
        ));
    }

    #[test]
    fn unknown_chart_type_is_dropped() {
        for declared in [json!("pie"), json!("Line"), json!(3)] {
            let mut chart = yields_chart();
            chart["chartType"] = declared;
            let outcome = normalize(raw(chart));
            assert!(
                matches!(outcome.warning(), Some(ChartWarning::UnknownChartType(_))),
                "got {outcome:?}"
            );
        }
    }

    #[test]
    fn point_missing_value_key_drops_whole_chart() {
        let mut chart = yields_chart();
        chart["data"][1] = json!({"Year": "2023", "Yield": 4.5});
        let outcome = normalize(raw(chart));
        assert_eq!(
            outcome,
            ChartOutcome::Dropped(ChartWarning::MissingKey {
                point: 1,
                key: "Spread".to_string()
            })
        );
    }

    #[test]
    fn point_missing_category_key_drops_whole_chart() {
        let mut chart = yields_chart();
        chart["data"][0] = json!({"Yield": 3.9, "Spread": 1.1});
        assert_eq!(
            normalize(raw(chart)),
            ChartOutcome::Dropped(ChartWarning::MissingKey {
                point: 0,
                key: "Year".to_string()
            })
        );
    }

    #[test]
    fn non_scalar_value_counts_as_missing() {
        let mut chart = yields_chart();
        chart["data"][0]["Yield"] = Value::Null;
        assert!(matches!(
            normalize(raw(chart)).warning(),
            Some(ChartWarning::MissingKey { point: 0, .. })
        ));
    }

    #[test]
    fn empty_series_and_empty_keys_are_dropped() {
        let mut chart = yields_chart();
        chart["data"] = json!([]);
        assert_eq!(
            normalize(raw(chart)),
            ChartOutcome::Dropped(ChartWarning::EmptySeries)
        );

        let mut chart = yields_chart();
        chart["dataKeys"] = json!([]);
        assert_eq!(
            normalize(raw(chart)),
            ChartOutcome::Dropped(ChartWarning::EmptyKeys)
        );
    }

    #[test]
    fn missing_or_malformed_fields_are_dropped() {
        for field in ["xAxisKey", "dataKeys", "data", "chartType"] {
            let mut chart = yields_chart();
            chart.as_object_mut().expect("object").remove(field);
            assert!(
                matches!(normalize(raw(chart)), ChartOutcome::Dropped(_)),
                "removing {field} should drop the chart"
            );
        }

        let mut chart = yields_chart();
        chart["dataKeys"] = json!(["Yield", 7]);
        assert_eq!(
            normalize(raw(chart)),
            ChartOutcome::Dropped(ChartWarning::InvalidField("dataKeys"))
        );
    }

    #[test]
    fn non_object_point_is_dropped() {
        let mut chart = yields_chart();
        chart["data"] = json!([[2023, 4.5]]);
        assert_eq!(
            normalize(raw(chart)),
            ChartOutcome::Dropped(ChartWarning::InvalidPoint { index: 0 })
        );
    }

    #[test]
    fn duplicate_value_keys_collapse() {
        let mut chart = yields_chart();
        chart["dataKeys"] = json!(["Yield", "Spread", "Yield"]);
        let spec = normalize(raw(chart)).into_chart().expect("chart");
        assert_eq!(spec.value_keys(), ["Yield", "Spread"]);
    }

    #[test]
    fn non_object_chart_is_dropped() {
        assert_eq!(
            normalize(raw(json!([1, 2]))),
            ChartOutcome::Dropped(ChartWarning::UnexpectedShape("array"))
        );
        assert_eq!(
            normalize(raw(json!("[1, 2]"))),
            ChartOutcome::Dropped(ChartWarning::UnexpectedShape("array"))
        );
    }
}
