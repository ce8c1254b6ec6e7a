//! Process-level checks against the compiled binary. None of these reach the
//! generation service: they exercise the paths that finish before configuration.

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn run_agent(stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_resume-agent"))
        .current_dir(std::env::temp_dir())
        .env_remove("RUST_LOG")
        .env_remove("OPENAI_API_KEY")
        .env_remove("ANTHROPIC_API_KEY")
        .env("LLM_PROVIDER", "openai")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn resume-agent");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("failed to write stdin");

    child.wait_with_output().expect("failed to wait for resume-agent")
}

#[test]
fn test_empty_stdin_exits_zero_silently() {
    let output = run_agent("");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_whitespace_only_stdin_is_parse_error() {
    let output = run_agent("\n");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error parsing input: "));
}

#[test]
fn test_missing_jd_exits_non_zero_with_diagnostic() {
    let output = run_agent(r#"{"resume": "Engineer at X, 2019-2022"}"#);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.starts_with("Error parsing input: "),
        "unexpected stderr: {stderr}"
    );
    assert!(stderr.contains("jd"));
}

#[test]
fn test_malformed_json_exits_non_zero() {
    let output = run_agent("{resume: nope");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error parsing input: "));
}

#[test]
fn test_missing_credentials_is_agent_error() {
    let output = run_agent(r#"{"resume": "Engineer at X", "jd": "Python backend"}"#);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Agent Error: "), "unexpected stderr: {stderr}");
    assert!(stderr.contains("OPENAI_API_KEY"));
}
