#![cfg(unix)]

use serde_json::json;
use serial_test::serial;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path as path_matcher, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-test:generateContent";

#[test]
#[serial]
fn one_shot_prints_analysis_chart_and_sources() {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let server = rt.block_on(MockServer::start());
    let report = json!({
        "analysis": "Long-term yields edged lower.",
        "chart": {
            "chartType": "line",
            "xAxisKey": "Year",
            "dataKeys": ["Yield"],
            "data": [{"Year": "2023", "Yield": 4.5}, {"Year": "2024", "Yield": 4.25}]
        }
    });
    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path_matcher(GENERATE_PATH))
            .and(query_param("key", "test-key"))
            .and(body_string_contains("googleSearch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": format!("```json\n{report}\n```")}]},
                    "groundingMetadata": {"groundingChunks": [
                        {"web": {"uri": "https://home.treasury.gov", "title": "treasury.gov"}},
                        {"web": {"uri": "https://home.treasury.gov", "title": "duplicate"}}
                    ]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;
    });

    let homes = TestHomes::new();
    let output = run_app(&homes, &server, &["--prompt", "10y yield trend?"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(
        stdout.starts_with("ltgd> Long-term yields edged lower.\n"),
        "stdout:\n{stdout}"
    );
    assert!(stdout.contains("[line chart] Yield by Year"), "stdout:\n{stdout}");
    assert!(stdout.contains("  2024   4.25\n"), "stdout:\n{stdout}");
    assert!(
        stdout.contains("  [1] treasury.gov (https://home.treasury.gov)"),
        "stdout:\n{stdout}"
    );
    assert!(!stdout.contains("duplicate"), "stdout:\n{stdout}");

    let trace = homes.read_trace();
    assert!(trace.contains("10y yield trend?"), "trace:\n{trace}");
    assert!(trace.contains("Long-term yields edged lower."), "trace:\n{trace}");
}

#[test]
#[serial]
fn one_shot_with_provider_failure_prints_degraded_answer_and_fails() {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let server = rt.block_on(MockServer::start());
    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path_matcher(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("provider down"))
            .expect(1)
            .mount(&server)
            .await;
    });

    let homes = TestHomes::new();
    let output = run_app(&homes, &server, &["--prompt", "anything"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success());
    assert!(
        stdout.starts_with("ltgd> Sorry, I encountered an error while processing your request:"),
        "stdout:\n{stdout}"
    );
    assert!(
        stderr(&output).contains("report generation failed"),
        "stderr: {}",
        stderr(&output)
    );
    let trace = homes.read_trace();
    assert!(trace.contains("report.err"), "trace:\n{trace}");
}

#[test]
#[serial]
fn missing_api_key_is_fatal_at_startup() {
    let homes = TestHomes::new();
    let output = Command::new(binary_path())
        .args(["--prompt", "hello"])
        .current_dir(homes.work.path())
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .env("XDG_CONFIG_HOME", homes.config.path())
        .env("XDG_STATE_HOME", homes.state.path())
        .output()
        .expect("run binary");

    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("missing GEMINI_API_KEY"),
        "stderr: {}",
        stderr(&output)
    );
    assert!(
        !homes.state.path().join("ltgd").exists(),
        "no trace should be created before the key check"
    );
}

#[test]
#[serial]
fn explicit_config_file_supplies_credentials() {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let server = rt.block_on(MockServer::start());
    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path_matcher(GENERATE_PATH))
            .and(query_param("key", "file-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "{\"analysis\":\"From file config.\"}"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;
    });

    let homes = TestHomes::new();
    let cfg_path = homes.work.path().join("custom.toml");
    write_config(&cfg_path, &server.uri());

    let output = Command::new(binary_path())
        .arg("--config")
        .arg(&cfg_path)
        .args(["--prompt", "hello"])
        .current_dir(homes.work.path())
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .env_remove("GEMINI_MODEL")
        .env_remove("GEMINI_BASE_URL")
        .env("XDG_CONFIG_HOME", homes.config.path())
        .env("XDG_STATE_HOME", homes.state.path())
        .output()
        .expect("run binary");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "ltgd> From file config.\n"
    );
}

struct TestHomes {
    config: TempDir,
    state: TempDir,
    work: TempDir,
}

impl TestHomes {
    fn new() -> Self {
        Self {
            config: tempfile::tempdir().expect("config home"),
            state: tempfile::tempdir().expect("state home"),
            work: tempfile::tempdir().expect("working dir"),
        }
    }

    fn read_trace(&self) -> String {
        let trace_dir = self.state.path().join("ltgd").join("traces");
        let entries = fs::read_dir(&trace_dir)
            .unwrap_or_else(|err| panic!("failed to read {}: {err}", trace_dir.display()))
            .collect::<Result<Vec<_>, _>>()
            .expect("iterate trace dir");
        assert_eq!(entries.len(), 1, "expected exactly one trace file");
        fs::read_to_string(entries[0].path()).expect("read trace file")
    }
}

fn run_app(homes: &TestHomes, server: &MockServer, args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .current_dir(homes.work.path())
        .env("NO_COLOR", "1")
        .env("XDG_CONFIG_HOME", homes.config.path())
        .env("XDG_STATE_HOME", homes.state.path())
        .env("GEMINI_API_KEY", "test-key")
        .env("GEMINI_MODEL", "gemini-test")
        .env("GEMINI_BASE_URL", server.uri())
        .output()
        .expect("run binary")
}

fn write_config(path: &Path, base_url: &str) {
    let content = format!(
        "gemini_api_key = \"file-key\"\n\
         gemini_model = \"gemini-test\"\n\
         gemini_base_url = \"{base_url}\"\n\
         request_timeout_secs = 5\n"
    );
    fs::write(path, content).expect("write test config");
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn binary_path() -> String {
    env!("CARGO_BIN_EXE_ltgd").to_string()
}
