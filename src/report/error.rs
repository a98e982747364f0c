use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::llm::provider::LlmError;

/// Every way a request can fail. None of these reach the UI as errors;
/// the service folds them into a degraded report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    Transport(String),
    EmptyPayload,
    MalformedResponse(MalformedReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    NoJsonObject,
    InvalidJson(String),
    AnalysisWrongType,
}

impl ReportError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::EmptyPayload => "empty_payload",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(msg) => f.write_str(msg),
            Self::EmptyPayload => write!(f, "Received an empty response from the AI."),
            Self::MalformedResponse(reason) => write!(f, "{reason}"),
        }
    }
}

impl Display for MalformedReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoJsonObject => {
                write!(f, "Could not find a valid JSON object in the AI's response.")
            }
            Self::InvalidJson(msg) => write!(f, "The AI's response is not valid JSON: {msg}"),
            Self::AnalysisWrongType => {
                write!(f, "The AI's response has an analysis field that is not text.")
            }
        }
    }
}

impl Error for ReportError {}

impl From<LlmError> for ReportError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::EmptyResponse => Self::EmptyPayload,
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<MalformedReason> for ReportError {
    fn from(reason: MalformedReason) -> Self {
        Self::MalformedResponse(reason)
    }
}
