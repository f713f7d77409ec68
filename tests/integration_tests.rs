//! Binary smoke tests: argument handling, startup failures, exit codes, and the
//! activity log. None of these reach the terminal.

mod common;

use std::ffi::OsStr;
use std::fs;

use serde_json::Value;

fn events(entries: &[Value]) -> Vec<&str> {
    entries
        .iter()
        .filter_map(|e| e.get("event").and_then(Value::as_str))
        .collect()
}

#[test]
fn help_command_prints_usage() {
    let result = common::run_cli_case("help_command_prints_usage", &["--help"], &[]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("Usage: llv"),
        "missing help banner; log: {}",
        result.log_path.display()
    );
}

#[test]
fn version_command_prints_version() {
    let result = common::run_cli_case("version_command_prints_version", &["--version"], &[]);
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(
        result.stdout.contains(env!("CARGO_PKG_VERSION")),
        "log: {}",
        result.log_path.display()
    );
}

#[test]
fn extra_arguments_are_usage_errors() {
    let result = common::run_cli_case("extra_arguments_are_usage_errors", &["a", "b"], &[]);
    assert_eq!(result.status.code(), Some(2), "log: {}", result.log_path.display());
    assert!(result.stderr.contains("Usage"), "log: {}", result.log_path.display());
}

#[test]
fn unreachable_backend_exits_with_runtime_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let activity = tmp.path().join("activity.jsonl");
    let result = common::run_cli_case(
        "unreachable_backend_exits_with_runtime_error",
        &[],
        &[
            ("XDG_CONFIG_HOME", tmp.path().as_os_str()),
            ("LLV_AWS_BINARY", OsStr::new("/nonexistent/aws")),
            ("LLV_ACTIVITY_LOG", activity.as_os_str()),
        ],
    );

    assert_eq!(result.status.code(), Some(2), "log: {}", result.log_path.display());
    assert!(result.stderr.contains("llv:"), "log: {}", result.log_path.display());
    assert!(
        result.stderr.contains("LLV-2001"),
        "log: {}",
        result.log_path.display()
    );
    assert!(
        result.stderr.contains("check_connectivity"),
        "connectivity is probed first; log: {}",
        result.log_path.display()
    );

    let entries = common::read_activity(&activity);
    assert_eq!(events(&entries), vec!["session_start", "setup_failed"]);
    let failure = &entries[1];
    assert_eq!(failure["severity"], "error");
    assert_eq!(failure["error_code"], "LLV-2001");
}

#[test]
fn missing_explicit_config_is_a_user_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let missing = tmp.path().join("absent.toml");
    let result = common::run_cli_case(
        "missing_explicit_config_is_a_user_error",
        &[],
        &[("LLV_CONFIG", missing.as_os_str())],
    );

    assert_eq!(result.status.code(), Some(1), "log: {}", result.log_path.display());
    assert!(
        result.stderr.contains("LLV-1002"),
        "log: {}",
        result.log_path.display()
    );
}

#[test]
fn invalid_config_is_a_user_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("config.toml");
    fs::write(&config, "[dashboard]\npage_step = 0\n").expect("write config");
    let result = common::run_cli_case(
        "invalid_config_is_a_user_error",
        &[],
        &[("LLV_CONFIG", config.as_os_str())],
    );

    assert_eq!(result.status.code(), Some(1), "log: {}", result.log_path.display());
    assert!(
        result.stderr.contains("LLV-1001"),
        "log: {}",
        result.log_path.display()
    );
}

#[test]
fn malformed_config_is_a_user_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("config.toml");
    fs::write(&config, "[dashboard\n").expect("write config");
    let result = common::run_cli_case(
        "malformed_config_is_a_user_error",
        &[],
        &[("LLV_CONFIG", config.as_os_str())],
    );

    assert_eq!(result.status.code(), Some(1), "log: {}", result.log_path.display());
    assert!(
        result.stderr.contains("LLV-1003"),
        "log: {}",
        result.log_path.display()
    );
}

#[cfg(unix)]
#[test]
fn backend_stderr_is_surfaced() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempfile::tempdir().expect("tempdir");
    let script = tmp.path().join("aws");
    fs::write(
        &script,
        "#!/bin/sh\necho 'An error occurred (AccessDeniedException) when calling the DescribeLogGroups operation' >&2\nexit 254\n",
    )
    .expect("write fake aws");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");
    let activity = tmp.path().join("activity.jsonl");

    let result = common::run_cli_case(
        "backend_stderr_is_surfaced",
        &["order"],
        &[
            ("XDG_CONFIG_HOME", tmp.path().as_os_str()),
            ("LLV_AWS_BINARY", script.as_os_str()),
            ("LLV_ACTIVITY_LOG", activity.as_os_str()),
        ],
    );

    assert_eq!(result.status.code(), Some(2), "log: {}", result.log_path.display());
    assert!(
        result.stderr.contains("AccessDeniedException"),
        "log: {}",
        result.log_path.display()
    );
    assert!(events(&common::read_activity(&activity)).contains(&"setup_failed"));
}

#[test]
fn disabled_activity_log_writes_nothing() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let activity = tmp.path().join("activity.jsonl");
    let result = common::run_cli_case(
        "disabled_activity_log_writes_nothing",
        &[],
        &[
            ("XDG_CONFIG_HOME", tmp.path().as_os_str()),
            ("LLV_AWS_BINARY", OsStr::new("/nonexistent/aws")),
            ("LLV_ACTIVITY_LOG", activity.as_os_str()),
            ("LLV_LOGGING_ENABLED", OsStr::new("false")),
        ],
    );

    assert_eq!(result.status.code(), Some(2), "log: {}", result.log_path.display());
    assert!(!activity.exists());
}
