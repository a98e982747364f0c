use super::debug::{
    HttpDebugConfig, redact_header_value, redact_text_body, redact_url, truncate_for_log,
};
use crate::trace::SessionTrace;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
#[cfg(test)]
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// `reqwest` wrapper that owns the per-request timeout and the logging of
/// every exchange (stderr in verbose mode, raw into the session trace).
#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    debug: HttpDebugConfig,
    timeout: Option<Duration>,
    sink: LogSink,
    trace: Option<SessionTrace>,
}

#[derive(Clone)]
enum LogSink {
    Stderr,
    #[cfg(test)]
    Buffer(Arc<Mutex<Vec<String>>>),
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("debug", &self.debug)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponseData {
    pub status: u16,
    pub body: String,
}

impl HttpResponseData {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl HttpClient {
    pub fn new(inner: Client, debug: HttpDebugConfig) -> Self {
        Self {
            inner,
            debug,
            timeout: None,
            sink: LogSink::Stderr,
            trace: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_trace(mut self, trace: SessionTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        payload: &T,
    ) -> Result<HttpResponseData, reqwest::Error> {
        let body_json = serde_json::to_string(payload)
            .unwrap_or_else(|err| format!("{{\"_serialization_error\":\"{err}\"}}"));

        let mut builder = self.inner.post(url).query(query).json(payload);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let request = builder.build()?;

        self.log_lines(|| request_log_lines(self.debug, &request, &body_json));
        if let Some(trace) = &self.trace {
            trace.log_http_request(
                request.method().as_str(),
                request.url().as_str(),
                request.headers(),
                &body_json,
            );
        }

        let response = match self.inner.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                self.log_lines(|| vec![format!("[http] ! {err}")]);
                if let Some(trace) = &self.trace {
                    trace.log_http_error(&err.to_string());
                }
                return Err(err);
            }
        };
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        self.log_lines(|| response_log_lines(self.debug, status, &headers, &body));
        if let Some(trace) = &self.trace {
            trace.log_http_response(status, &headers, &body);
        }

        Ok(HttpResponseData { status, body })
    }

    fn log_lines(&self, lines: impl FnOnce() -> Vec<String>) {
        if !self.debug.enabled {
            return;
        }

        match &self.sink {
            LogSink::Stderr => {
                let mut stderr = io::stderr().lock();
                for line in lines() {
                    let _ = writeln!(stderr, "{line}");
                }
            }
            #[cfg(test)]
            LogSink::Buffer(buffer) => {
                if let Ok(mut b) = buffer.lock() {
                    b.extend(lines());
                }
            }
        }
    }

    #[cfg(test)]
    pub fn with_buffer_sink(
        inner: Client,
        debug: HttpDebugConfig,
    ) -> (Self, Arc<Mutex<Vec<String>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let client = Self {
            sink: LogSink::Buffer(Arc::clone(&buffer)),
            ..Self::new(inner, debug)
        };
        (client, buffer)
    }
}

fn request_log_lines(
    debug: HttpDebugConfig,
    request: &reqwest::Request,
    body_json: &str,
) -> Vec<String> {
    let mut lines = vec![format!(
        "[http] > {} {}",
        request.method(),
        redact_url(request.url(), debug.redact_secrets)
    )];
    append_header_lines(&mut lines, '>', debug, request.headers());
    append_body_lines(&mut lines, '>', debug, body_json);
    lines
}

fn response_log_lines(
    debug: HttpDebugConfig,
    status: u16,
    headers: &HeaderMap,
    body: &str,
) -> Vec<String> {
    let mut lines = vec![format!("[http] < HTTP {status}")];
    append_header_lines(&mut lines, '<', debug, headers);
    append_body_lines(&mut lines, '<', debug, body);
    lines
}

fn append_header_lines(
    lines: &mut Vec<String>,
    direction: char,
    debug: HttpDebugConfig,
    headers: &HeaderMap,
) {
    for (name, value) in headers {
        lines.push(format!(
            "[http] {direction} {}: {}",
            name.as_str(),
            redact_header_value(name.as_str(), value, debug.redact_secrets)
        ));
    }
    lines.push(format!("[http] {direction}"));
}

fn append_body_lines(lines: &mut Vec<String>, direction: char, debug: HttpDebugConfig, body: &str) {
    let body = redact_text_body(body, debug.redact_secrets);
    let body = truncate_for_log(&body, debug.max_body_chars);
    if body.is_empty() {
        lines.push(format!("[http] {direction} <empty body>"));
        return;
    }

    for line in body.lines() {
        lines.push(format!("[http] {direction} {line}"));
    }
}
