pub mod cli;
pub mod config;
pub mod conversation;
pub mod http;
pub mod llm;
pub mod report;
pub mod trace;

use anyhow::Result;
use cli::{AppState, CliArgs, Theme, run_once, run_repl};
use config::AppConfig;
use http::client::HttpClient;
use http::debug::HttpDebugConfig;
use llm::gemini::GeminiProvider;
use report::ReportService;
use std::time::{SystemTime, UNIX_EPOCH};
use trace::SessionTrace;

pub async fn run(args: CliArgs) -> Result<()> {
    let config = AppConfig::load_with_path(args.config.as_deref())?;
    let api_key = config.require_api_key()?.to_string();

    let session_id = generate_session_id();
    let trace = SessionTrace::create(&session_id)?;
    trace.log_note(&format!(
        "session {session_id} model={} timeout={}s",
        config.gemini_model,
        config.request_timeout.as_secs()
    ));

    let http = HttpClient::new(
        reqwest::Client::new(),
        HttpDebugConfig::from_verbose(args.verbose),
    )
    .with_timeout(config.request_timeout)
    .with_trace(trace.clone());
    let provider = GeminiProvider::new(
        http,
        Some(api_key),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
    )?;
    let service = ReportService::new(provider).with_trace(trace.clone());

    let mut app_state = AppState::new(service, trace, Theme::from_env());
    match args.prompt.as_deref() {
        Some(prompt) => run_once(&mut app_state, prompt).await,
        None => run_repl(&mut app_state).await,
    }
}

fn generate_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis());
    format!("{millis:x}-{:x}", std::process::id())
}
