//! Production backend over the AWS command-line client.
//!
//! Every call spawns `aws <service> <operation> ... --output json` and parses
//! stdout with serde. Calls are bounded by the configured timeout: a child that
//! outlives it is killed and the call fails with `SourceUnavailable`.

#![allow(missing_docs)]

use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;

use super::{EntityDirectory, LogSource, LogStreamRef, MAX_CURRENT_STREAMS, Metadata, RawEvent};
use crate::core::config::AwsConfig;
use crate::core::errors::{LlvError, Result};

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Error marker the CLI prints when a log group (or function) does not exist.
const NOT_FOUND_MARKER: &str = "ResourceNotFoundException";

/// Stderr is cut to this many characters in error details.
const MAX_ERROR_DETAIL_CHARS: usize = 240;

// ──────────────────── wire types ────────────────────

#[derive(Debug, Deserialize)]
struct ListFunctionsResponse {
    #[serde(rename = "Functions", default)]
    functions: Vec<FunctionConfiguration>,
}

/// Subset of the Lambda function configuration shown in the metadata panel.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FunctionConfiguration {
    pub function_name: String,
    pub description: Option<String>,
    pub last_modified: Option<String>,
    pub memory_size: Option<i64>,
    pub role: Option<String>,
    pub runtime: Option<String>,
    pub timeout: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DescribeLogStreamsResponse {
    #[serde(rename = "logStreams", default)]
    log_streams: Vec<LogStreamDescriptor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogStreamDescriptor {
    log_stream_name: String,
    last_event_timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GetLogEventsResponse {
    #[serde(default)]
    events: Vec<OutputLogEvent>,
}

#[derive(Debug, Deserialize)]
struct OutputLogEvent {
    /// Epoch milliseconds.
    timestamp: i64,
    #[serde(default)]
    message: String,
}

// ──────────────────── parsing ────────────────────

fn malformed(operation: &'static str, error: &serde_json::Error) -> LlvError {
    LlvError::MalformedResponse {
        operation,
        details: error.to_string(),
    }
}

/// Function names from a `lambda list-functions` reply.
pub fn parse_function_names(json: &[u8]) -> Result<Vec<String>> {
    let reply: ListFunctionsResponse =
        serde_json::from_slice(json).map_err(|e| malformed("list_entities", &e))?;
    Ok(reply
        .functions
        .into_iter()
        .map(|f| f.function_name)
        .filter(|name| !name.is_empty())
        .collect())
}

/// Parse a `lambda get-function-configuration` reply.
pub fn parse_function_configuration(json: &[u8]) -> Result<FunctionConfiguration> {
    serde_json::from_slice(json).map_err(|e| malformed("get_metadata", &e))
}

/// Display fields for the metadata panel. Missing values render empty.
#[must_use]
pub fn metadata_from_configuration(config: &FunctionConfiguration) -> Metadata {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let number = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_default();

    let mut fields = Metadata::new();
    fields.insert("Description".to_string(), text(&config.description));
    fields.insert("Last modified".to_string(), text(&config.last_modified));
    fields.insert("memory size".to_string(), number(config.memory_size));
    fields.insert("role".to_string(), text(&config.role));
    fields.insert("runtime".to_string(), text(&config.runtime));
    fields.insert("timeout".to_string(), number(config.timeout));
    fields
}

/// Streams from a `logs describe-log-streams` reply, keeping backend order.
pub fn parse_streams(json: &[u8], group: &str) -> Result<Vec<LogStreamRef>> {
    let reply: DescribeLogStreamsResponse =
        serde_json::from_slice(json).map_err(|e| malformed("list_streams", &e))?;
    Ok(reply
        .log_streams
        .into_iter()
        .take(MAX_CURRENT_STREAMS)
        .map(|s| LogStreamRef {
            group: group.to_string(),
            name: s.log_stream_name,
            last_event_at: s.last_event_timestamp.map(millis_to_secs),
        })
        .collect())
}

/// Events from a `logs get-log-events` reply, normalized to epoch seconds.
pub fn parse_events(json: &[u8]) -> Result<Vec<RawEvent>> {
    let reply: GetLogEventsResponse =
        serde_json::from_slice(json).map_err(|e| malformed("fetch_events", &e))?;
    Ok(reply
        .events
        .into_iter()
        .map(|e| RawEvent {
            timestamp: millis_to_secs(e.timestamp),
            message: e.message.trim_end_matches(['\n', '\r']).to_string(),
        })
        .collect())
}

const fn millis_to_secs(ms: i64) -> i64 {
    ms.div_euclid(1000)
}

// ──────────────────── process execution ────────────────────

/// Captured result of a child process that exited on its own.
#[derive(Debug)]
pub struct ChildOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

fn read_all<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}

/// Run `command` to completion, killing it once `timeout` elapses.
///
/// Returns `Ok(None)` when the child was killed. Output pipes are drained on
/// helper threads so a chatty child cannot block on a full pipe.
pub fn run_with_timeout(
    mut command: Command,
    timeout: Duration,
) -> std::io::Result<Option<ChildOutput>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let out_reader = thread::spawn(move || read_all(stdout));
    let err_reader = thread::spawn(move || read_all(stderr));

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            break None;
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = out_reader.join().unwrap_or_default();
    let stderr = err_reader.join().unwrap_or_default();
    Ok(status.map(|status| ChildOutput {
        status,
        stdout,
        stderr,
    }))
}

fn summarize_stderr(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let summary: String = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if summary.chars().count() > MAX_ERROR_DETAIL_CHARS {
        let cut: String = summary.chars().take(MAX_ERROR_DETAIL_CHARS).collect();
        format!("{cut}…")
    } else {
        summary
    }
}

/// Outcome of one successful CLI invocation.
#[derive(Debug)]
enum Reply {
    Json(Vec<u8>),
    NotFound,
}

// ──────────────────── backend ────────────────────

/// [`EntityDirectory`] and [`LogSource`] backed by the `aws` CLI.
#[derive(Debug, Clone)]
pub struct AwsCliBackend {
    binary: String,
    profile: Option<String>,
    region: Option<String>,
    timeout: Duration,
    log_group_prefix: String,
}

impl AwsCliBackend {
    #[must_use]
    pub fn new(config: &AwsConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            profile: config.profile.clone(),
            region: config.region.clone(),
            timeout: config.call_timeout(),
            log_group_prefix: config.log_group_prefix.clone(),
        }
    }

    /// Log group holding a function's logs.
    #[must_use]
    pub fn log_group_for(&self, entity: &str) -> String {
        format!("{}{entity}", self.log_group_prefix)
    }

    /// Full argument vector for one invocation (without the binary).
    #[must_use]
    pub fn command_args(&self, args: &[&str]) -> Vec<String> {
        let mut full: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
        full.push("--output".to_string());
        full.push("json".to_string());
        if let Some(profile) = &self.profile {
            full.push("--profile".to_string());
            full.push(profile.clone());
        }
        if let Some(region) = &self.region {
            full.push("--region".to_string());
            full.push(region.clone());
        }
        full
    }

    fn call(&self, operation: &'static str, args: &[&str]) -> Result<Reply> {
        let mut command = Command::new(&self.binary);
        command.args(self.command_args(args)).env("AWS_PAGER", "");

        let output = run_with_timeout(command, self.timeout).map_err(|e| {
            LlvError::source_unavailable(
                operation,
                format!("failed to launch {}: {e}", self.binary),
            )
        })?;
        let Some(output) = output else {
            return Err(LlvError::source_unavailable(
                operation,
                format!("timed out after {} ms", self.timeout.as_millis()),
            ));
        };

        if output.status.success() {
            return Ok(Reply::Json(output.stdout));
        }
        let details = summarize_stderr(&output.stderr);
        if details.contains(NOT_FOUND_MARKER) {
            return Ok(Reply::NotFound);
        }
        Err(LlvError::source_unavailable(
            operation,
            if details.is_empty() {
                format!("{} exited with {}", self.binary, output.status)
            } else {
                details
            },
        ))
    }

    fn call_json(&self, operation: &'static str, args: &[&str]) -> Result<Vec<u8>> {
        match self.call(operation, args)? {
            Reply::Json(body) => Ok(body),
            Reply::NotFound => Err(LlvError::source_unavailable(
                operation,
                "resource not found",
            )),
        }
    }
}

impl EntityDirectory for AwsCliBackend {
    fn list_entities(&self) -> Result<Vec<String>> {
        let body = self.call_json("list_entities", &["lambda", "list-functions"])?;
        parse_function_names(&body)
    }

    fn get_metadata(&self, entity: &str) -> Result<Metadata> {
        let body = self.call_json(
            "get_metadata",
            &[
                "lambda",
                "get-function-configuration",
                "--function-name",
                entity,
            ],
        )?;
        let config = parse_function_configuration(&body)?;
        Ok(metadata_from_configuration(&config))
    }
}

impl LogSource for AwsCliBackend {
    fn list_streams(&self, entity: &str) -> Result<Vec<LogStreamRef>> {
        let group = self.log_group_for(entity);
        let limit = MAX_CURRENT_STREAMS.to_string();
        let reply = self.call(
            "list_streams",
            &[
                "logs",
                "describe-log-streams",
                "--log-group-name",
                &group,
                "--order-by",
                "LastEventTime",
                "--descending",
                "--max-items",
                &limit,
            ],
        )?;
        match reply {
            Reply::Json(body) => parse_streams(&body, &group),
            // The group is created on first invocation; no group means no logs.
            Reply::NotFound => Ok(Vec::new()),
        }
    }

    fn fetch_events(&self, stream: &LogStreamRef) -> Result<Vec<RawEvent>> {
        let body = self.call_json(
            "fetch_events",
            &[
                "logs",
                "get-log-events",
                "--log-group-name",
                &stream.group,
                "--log-stream-name",
                &stream.name,
            ],
        )?;
        parse_events(&body)
    }

    fn check_connectivity(&self) -> Result<()> {
        self.call_json(
            "check_connectivity",
            &[
                "logs",
                "describe-log-groups",
                "--log-group-name-prefix",
                &self.log_group_prefix,
                "--max-items",
                "1",
            ],
        )
        .map(|_| ())
    }
}
