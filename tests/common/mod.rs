#![allow(dead_code)]

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

use lambda_log_viewer::source::RawEvent;
use lambda_log_viewer::source::memory::MemoryBackend;

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_llv") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "llv.exe" } else { "llv" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve llv binary path for integration test"),
    }
}

/// Run the binary with a scrubbed `LLV_*` environment plus `envs`, stdin closed.
/// Output is also written to a per-case log under the temp dir.
pub fn run_cli_case(case_name: &str, args: &[&str], envs: &[(&str, &OsStr)]) -> CmdResult {
    let root = std::env::temp_dir().join("llv-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .stdin(Stdio::null())
        .env("RUST_BACKTRACE", "1")
        .env("NO_COLOR", "1");
    for (key, _) in std::env::vars() {
        if key.starts_with("LLV_") {
            command.env_remove(key);
        }
    }
    for (key, value) in envs {
        command.env(key, value);
    }
    let output = command.output().expect("execute llv command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Parsed lines of a JSONL activity log.
pub fn read_activity(path: &Path) -> Vec<serde_json::Value> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|line| serde_json::from_str(line).expect("activity line is JSON"))
        .collect()
}

/// Backend with the function from the two-stream merge scenario.
pub fn order_service_backend() -> MemoryBackend {
    MemoryBackend::new()
        .with_entity(
            "orderSvc",
            &[
                ("Description", "Order intake"),
                ("Last modified", "2024-05-01T10:00:00.000+0000"),
                ("memory size", "256"),
                ("role", "arn:aws:iam::123456789012:role/order"),
                ("runtime", "nodejs20.x"),
                ("timeout", "30"),
            ],
        )
        .with_stream(
            "orderSvc",
            "2024/05/01/[$LATEST]aaaa",
            100,
            vec![RawEvent::new(100, "START RequestId: 1")],
        )
        .with_stream(
            "orderSvc",
            "2024/05/01/[$LATEST]bbbb",
            105,
            vec![RawEvent::new(105, "hello")],
        )
}
