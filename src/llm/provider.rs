use std::error::Error;
use std::fmt::{Display, Formatter};

/// One outbound completion: the prompt plus everything that shapes the answer.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system_instruction: String,
    pub web_search: bool,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Completion {
    pub text: String,
    pub grounding: Option<GroundingMetadata>,
}

/// Citations the collaborator attached to its answer. Every field is
/// optional on the wire, so nothing here is validated yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroundingMetadata {
    pub chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroundingChunk {
    pub web: Option<WebReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WebReference {
    pub uri: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    MissingApiKey,
    HttpStatus { status: u16, body: String },
    Transport(String),
    Timeout,
    Parse(String),
    EmptyResponse,
}

impl Display for LlmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "missing GEMINI_API_KEY"),
            Self::HttpStatus { status, body } => {
                write!(f, "provider request failed with status {status}: {body}")
            }
            Self::Transport(msg) => write!(f, "provider transport error: {msg}"),
            Self::Timeout => write!(f, "provider request timed out"),
            Self::Parse(msg) => write!(f, "provider parse error: {msg}"),
            Self::EmptyResponse => write!(f, "provider returned empty response text"),
        }
    }
}

impl Error for LlmError {}

pub type LlmResult<T> = std::result::Result<T, LlmError>;

pub trait CompletionProvider {
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl std::future::Future<Output = LlmResult<Completion>> + Send;
}
