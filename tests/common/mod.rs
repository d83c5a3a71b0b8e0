//! Shared fixtures for integration tests
//!
//! - [`ScriptedConsole`]: replays input lines and records everything printed
//! - [`RecordingClient`]: fake Data API client with queued responses

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rdsline::ui::parse_yes_no;
use rdsline::{
    Console, DataApiClient, ExecuteStatementRequest, ExecuteStatementResponse, ProfileStore,
    RdslineError, ReadLine, Result, Session,
};

pub const TWO_PROFILES: &str = r"
profiles:
  default:
    type: rds-secretsmanager
    cluster_arn: arn:aws:rds:us-east-1:123456789012:cluster:default-cluster
    secret_arn: arn:aws:secretsmanager:us-east-1:123456789012:secret:default-secret
    database: default_db
  prod:
    type: rds-secretsmanager
    cluster_arn: arn:aws:rds:eu-west-1:123456789012:cluster:prod-cluster
    secret_arn: arn:aws:secretsmanager:eu-west-1:123456789012:secret:prod-secret
    database: prod_db
    credentials:
      profile: production
";

pub const DEFAULT_CLUSTER: &str = "arn:aws:rds:us-east-1:123456789012:cluster:default-cluster";
pub const PROD_CLUSTER: &str = "arn:aws:rds:eu-west-1:123456789012:cluster:prod-cluster";

enum Scripted {
    Line(String),
    Interrupt,
}

/// Console that replays a script and records output
pub struct ScriptedConsole {
    inputs: VecDeque<Scripted>,
    interactive: bool,
    pub prompts: Vec<String>,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl ScriptedConsole {
    pub fn piped(lines: &[&str]) -> Self {
        Self::with_lines(lines, false)
    }

    pub fn interactive(lines: &[&str]) -> Self {
        Self::with_lines(lines, true)
    }

    fn with_lines(lines: &[&str], interactive: bool) -> Self {
        Self {
            inputs: lines.iter().map(|l| Scripted::Line((*l).to_string())).collect(),
            interactive,
            prompts: Vec::new(),
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }

    /// Queue a Ctrl+C followed by more lines
    pub fn then_interrupt(mut self, lines: &[&str]) -> Self {
        self.inputs.push_back(Scripted::Interrupt);
        self.inputs.extend(lines.iter().map(|l| Scripted::Line((*l).to_string())));
        self
    }

    pub fn output(&self) -> String {
        self.stdout.join("\n")
    }

    pub fn errors(&self) -> String {
        self.stderr.join("\n")
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl Console for ScriptedConsole {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn read_line(&mut self, prompt: &str) -> Result<ReadLine> {
        self.prompts.push(prompt.to_string());
        Ok(match self.inputs.pop_front() {
            Some(Scripted::Line(line)) => ReadLine::Line(line),
            Some(Scripted::Interrupt) => ReadLine::Interrupted,
            None => ReadLine::Eof,
        })
    }

    fn prompt(&mut self, label: &str, default: Option<&str>) -> Result<Option<String>> {
        self.prompts.push(label.to_string());
        Ok(match self.inputs.pop_front() {
            Some(Scripted::Line(answer)) => match default {
                Some(default) if answer.trim().is_empty() => Some(default.to_string()),
                _ => Some(answer),
            },
            Some(Scripted::Interrupt) | None => None,
        })
    }

    fn confirm(&mut self, label: &str, default: bool) -> Result<Option<bool>> {
        self.prompts.push(label.to_string());
        Ok(match self.inputs.pop_front() {
            Some(Scripted::Line(answer)) => Some(parse_yes_no(&answer, default)),
            Some(Scripted::Interrupt) | None => None,
        })
    }

    fn print(&mut self, text: &str) {
        self.stdout.push(text.to_string());
    }

    fn print_error(&mut self, message: &str) {
        self.stderr.push(format!("Error: {message}"));
    }
}

/// Fake Data API client: records requests, replays queued responses
///
/// With nothing queued it answers `numberOfRecordsUpdated: 0`.
#[derive(Default)]
pub struct RecordingClient {
    responses: Mutex<VecDeque<Result<ExecuteStatementResponse>>>,
    requests: Mutex<Vec<ExecuteStatementRequest>>,
    clients: Mutex<Vec<(String, String)>>,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond_json(&self, json: &str) {
        let response = serde_json::from_str(json).unwrap();
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn respond_error(&self, message: &str) {
        self.responses.lock().unwrap().push_back(Err(RdslineError::backend(message)));
    }

    pub fn requests(&self) -> Vec<ExecuteStatementRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.sql).collect()
    }

    /// `(credentials profile, region)` for every client handed out
    pub fn clients(&self) -> Vec<(String, String)> {
        self.clients.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataApiClient for RecordingClient {
    async fn execute_statement(
        &self,
        request: ExecuteStatementRequest,
    ) -> Result<ExecuteStatementResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(ExecuteStatementResponse {
                number_of_records_updated: Some(0),
                ..ExecuteStatementResponse::default()
            })
        })
    }
}

/// Store whose connections all share `client`
pub fn store_with(client: &Arc<RecordingClient>) -> ProfileStore {
    let client = client.clone();
    ProfileStore::new(move |profile: &str, region: &str| -> Result<Arc<dyn DataApiClient>> {
        client.clients.lock().unwrap().push((profile.to_string(), region.to_string()));
        Ok(client.clone() as Arc<dyn DataApiClient>)
    })
}

/// Session over `yaml` with the given console
pub fn session(yaml: &str, console: ScriptedConsole, client: &Arc<RecordingClient>) -> Session<ScriptedConsole> {
    let mut store = store_with(client);
    store.load(yaml).unwrap();
    Session::new(store, console)
}

/// Unique path under the temp dir; the caller removes it
pub fn temp_path(tag: &str) -> PathBuf {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("rdsline_{tag}_{}_{n}", std::process::id()))
}
