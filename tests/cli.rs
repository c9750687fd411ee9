//! Integration tests spawning the built watchcheck binary

use std::process::Command;

fn watchcheck() -> Command {
    Command::new(env!("CARGO_BIN_EXE_watchcheck"))
}

#[test]
fn list_prints_the_builtin_table() {
    let output = watchcheck().arg("list").output().expect("run watchcheck list");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("watch sample --rev 1"));
    assert!(stdout.contains("--prefix"));
    assert!(stdout.contains("sample=value"));
    assert!(stdout.contains("env key: sample"));
}

#[test]
fn list_json_is_machine_readable() {
    let output = watchcheck().args(["list", "--json"]).output().expect("run list --json");
    assert!(output.status.success());

    let table: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("list --json emits valid JSON");
    assert_eq!(table.as_array().map(|a| a.len()), Some(14));
    assert_eq!(table[0]["puts"][0]["key"], "sample");
}

#[test]
fn run_aborts_when_the_client_binary_is_missing() {
    let output = watchcheck()
        .args([
            "run",
            "--client",
            "/nonexistent/kvctl",
            "--expect-timeout",
            "1",
        ])
        .output()
        .expect("run watchcheck run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error"), "stderr: {stderr}");
    // the first scenario's first put already fails
    assert!(stderr.contains("scenario #0"), "stderr: {stderr}");
}

#[test]
fn unknown_bare_client_name_is_rejected_up_front() {
    let output = watchcheck()
        .args(["run", "--client", "watchcheck-no-such-binary"])
        .output()
        .expect("run watchcheck run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
}
