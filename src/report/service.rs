use super::chart::{ChartOutcome, normalize};
use super::error::ReportError;
use super::parser::parse;
use super::prompt::{REPORT_SYSTEM_INSTRUCTION, REPORT_TEMPERATURE};
use super::sources::{candidates_from_grounding, dedupe};
use super::ReportResult;
use crate::llm::provider::{CompletionProvider, CompletionRequest};
use crate::trace::SessionTrace;

/// Runs one question through the completion collaborator and shapes the
/// answer into a [`ReportResult`].
pub struct ReportService<P> {
    provider: P,
    trace: Option<SessionTrace>,
}

impl<P: CompletionProvider> ReportService<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: SessionTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn build_request(prompt: &str) -> CompletionRequest {
        CompletionRequest {
            prompt: prompt.to_string(),
            system_instruction: REPORT_SYSTEM_INSTRUCTION.to_string(),
            web_search: true,
            temperature: REPORT_TEMPERATURE,
        }
    }

    /// Has no error path: transport failures, empty payloads and malformed
    /// completions all come back as a degraded report. The collaborator is
    /// called exactly once, without retries.
    pub async fn generate_report(&self, prompt: &str) -> ReportResult {
        if let Some(trace) = &self.trace {
            trace.log_prompt(prompt);
        }

        match self.try_generate(prompt).await {
            Ok(result) => {
                if let Some(trace) = &self.trace {
                    trace.log_analysis(&result.analysis_text);
                    trace.log_note(&format!(
                        "report ready: chart={} sources={}",
                        result.chart.is_some(),
                        result.sources.len()
                    ));
                }
                result
            }
            Err(err) => {
                if let Some(trace) = &self.trace {
                    trace.log_report_error(&format!("{}: {err}", err.kind()));
                }
                ReportResult::degraded(&err)
            }
        }
    }

    async fn try_generate(&self, prompt: &str) -> Result<ReportResult, ReportError> {
        let completion = self.provider.complete(Self::build_request(prompt)).await?;
        if completion.text.trim().is_empty() {
            return Err(ReportError::EmptyPayload);
        }

        let sources = dedupe(
            completion
                .grounding
                .map(candidates_from_grounding)
                .unwrap_or_default(),
        );

        let parsed = parse(&completion.text)?;
        let chart = match normalize(parsed.chart) {
            ChartOutcome::Ready(spec) => Some(spec),
            ChartOutcome::Absent => None,
            ChartOutcome::Dropped(warning) => {
                if let Some(trace) = &self.trace {
                    trace.log_chart_warning(&warning.to_string());
                }
                None
            }
        };

        Ok(ReportResult {
            analysis_text: parsed.analysis_text,
            chart,
            sources,
            degraded: false,
        })
    }
}
