use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::llm::provider::CompletionProvider;
use crate::report::{ChartSpec, ReportResult, ReportService, Source};

pub const GREETING: &str = "Hello! I am LTGD, your specialized AI agent for analyzing long-term US government debt. What would you like to know? You can ask about current yields, historical trends, or factors influencing demand.";

pub const EXAMPLE_PROMPTS: [&str; 4] = [
    "What's the current trend for the 10-year Treasury yield?",
    "Show me a chart of US inflation vs. 30-year bond rates over the last 5 years.",
    "How does the Federal Reserve's policy affect long-term debt demand?",
    "Compare US long-term debt to that of Germany and Japan.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEntry {
    pub id: String,
    pub role: Role,
    pub text: Option<String>,
    pub chart: Option<ChartSpec>,
    pub sources: Vec<Source>,
    pub pending: bool,
    pub degraded: bool,
}

impl ConversationEntry {
    fn user(id: String, text: &str) -> Self {
        Self {
            id,
            role: Role::User,
            text: Some(text.to_string()),
            chart: None,
            sources: Vec::new(),
            pending: false,
            degraded: false,
        }
    }

    fn model_text(id: String, text: &str) -> Self {
        Self {
            role: Role::Model,
            ..Self::user(id, text)
        }
    }

    fn placeholder(id: String) -> Self {
        Self {
            id,
            role: Role::Model,
            text: None,
            chart: None,
            sources: Vec::new(),
            pending: true,
            degraded: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationError {
    Busy,
    EmptyPrompt,
    UnknownTurn,
}

impl Display for ConversationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy => write!(f, "a request is already in flight"),
            Self::EmptyPrompt => write!(f, "prompt is empty"),
            Self::UnknownTurn => write!(f, "turn does not belong to this conversation"),
        }
    }
}

impl Error for ConversationError {}

/// Ticket for the one in-flight request. Consumed by
/// [`ConversationController::resolve`], so a placeholder is filled at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingTurn {
    index: usize,
    prompt: String,
}

impl PendingTurn {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Append-only conversation history with at most one pending model entry.
#[derive(Debug, Clone)]
pub struct ConversationController {
    entries: Vec<ConversationEntry>,
    pending: Option<usize>,
    next_seq: u64,
}

impl Default for ConversationController {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationController {
    pub fn new() -> Self {
        Self {
            entries: vec![ConversationEntry::model_text("greeting".to_string(), GREETING)],
            pending: None,
            next_seq: 1,
        }
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Example prompts are offered until the first question is asked.
    pub fn shows_examples(&self) -> bool {
        !self.is_pending() && self.entries.len() <= 1
    }

    pub fn submit(&mut self, prompt: &str) -> Result<PendingTurn, ConversationError> {
        if self.is_pending() {
            return Err(ConversationError::Busy);
        }
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ConversationError::EmptyPrompt);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries
            .push(ConversationEntry::user(format!("user-{seq}"), prompt));
        self.entries
            .push(ConversationEntry::placeholder(format!("model-{seq}")));

        let index = self.entries.len() - 1;
        self.pending = Some(index);
        Ok(PendingTurn {
            index,
            prompt: prompt.to_string(),
        })
    }

    pub fn resolve(
        &mut self,
        turn: PendingTurn,
        result: ReportResult,
    ) -> Result<&ConversationEntry, ConversationError> {
        if self.pending != Some(turn.index) {
            return Err(ConversationError::UnknownTurn);
        }
        let entry = self
            .entries
            .get_mut(turn.index)
            .ok_or(ConversationError::UnknownTurn)?;

        entry.text = Some(result.analysis_text);
        entry.chart = result.chart;
        entry.sources = result.sources;
        entry.degraded = result.degraded;
        entry.pending = false;
        self.pending = None;
        Ok(entry)
    }

    /// Starts over from the greeting. Refused while a request is in flight.
    pub fn clear(&mut self) -> Result<(), ConversationError> {
        if self.is_pending() {
            return Err(ConversationError::Busy);
        }
        self.entries.truncate(1);
        Ok(())
    }

    pub async fn ask<P: CompletionProvider>(
        &mut self,
        service: &ReportService<P>,
        prompt: &str,
    ) -> Result<&ConversationEntry, ConversationError> {
        let turn = self.submit(prompt)?;
        let result = service.generate_report(turn.prompt()).await;
        self.resolve(turn, result)
    }
}
