//! Scenario data model and the built-in verification table
//!
//! Scenarios are plain data: everything that varies between runs lives in
//! `ScenarioConfig` fields, never in runner code paths. The built-in table
//! is constructed once, in index order.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

/// One mutation applied while the watch runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutEvent {
    pub key: String,
    pub value: String,
}

/// One unit of expected watch output: the key, the value, and optionally
/// the text the piped side-effect command must emit for the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedEvent {
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_output: Option<String>,
}

/// A single watch verification scenario.
///
/// When `env_key`/`env_range_end` are set, the corresponding positional
/// argument is omitted from `args`; the child reads it from the environment
/// instead. The two forms are mutually substitutable, never both present
/// for the same logical parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub puts: Vec<PutEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_range_end: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub expected: Vec<ExpectedEvent>,
}

fn kv(key: &str, value: &str) -> PutEvent {
    PutEvent {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn ev(key: &str, value: &str) -> ExpectedEvent {
    ExpectedEvent {
        key: key.to_string(),
        value: value.to_string(),
        exec_output: None,
    }
}

fn ev_exec(key: &str, value: &str, output: &str) -> ExpectedEvent {
    ExpectedEvent {
        key: key.to_string(),
        value: value.to_string(),
        exec_output: Some(output.to_string()),
    }
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// The built-in verification table. Order matters: scenarios execute
/// sequentially and the report refers to them by index.
pub fn builtin_scenarios() -> Vec<ScenarioConfig> {
    vec![
        // watch 1 key
        ScenarioConfig {
            puts: vec![kv("sample", "value")],
            env_key: None,
            env_range_end: None,
            args: args(&["sample", "--rev", "1"]),
            expected: vec![ev("sample", "value")],
        },
        // watch 1 key, key from environment
        ScenarioConfig {
            puts: vec![kv("sample", "value")],
            env_key: Some("sample".to_string()),
            env_range_end: None,
            args: args(&["--rev", "1"]),
            expected: vec![ev("sample", "value")],
        },
        // watch 1 key with side-effect command
        ScenarioConfig {
            puts: vec![kv("sample", "value")],
            env_key: None,
            env_range_end: None,
            args: args(&["sample", "--rev", "1", "--", "echo", "watch event received"]),
            expected: vec![ev_exec("sample", "value", "watch event received")],
        },
        // side-effect command, key from environment
        ScenarioConfig {
            puts: vec![kv("sample", "value")],
            env_key: Some("sample".to_string()),
            env_range_end: None,
            args: args(&["--rev", "1", "--", "echo", "watch event received"]),
            expected: vec![ev_exec("sample", "value", "watch event received")],
        },
        // side-effect command, key positioned after the flag
        ScenarioConfig {
            puts: vec![kv("sample", "value")],
            env_key: None,
            env_range_end: None,
            args: args(&["--rev", "1", "sample", "--", "echo", "watch event received"]),
            expected: vec![ev_exec("sample", "value", "watch event received")],
        },
        // side-effect command with quoted output
        ScenarioConfig {
            puts: vec![kv("sample", "value")],
            env_key: None,
            env_range_end: None,
            args: args(&["--rev", "1", "sample", "--", "echo", "\"Hello World!\""]),
            expected: vec![ev_exec("sample", "value", "Hello World!")],
        },
        // explicit range end ahead of the flags
        ScenarioConfig {
            puts: vec![kv("sample", "value")],
            env_key: None,
            env_range_end: None,
            args: args(&["sample", "samplx", "--rev", "1", "--", "echo", "watch event received"]),
            expected: vec![ev_exec("sample", "value", "watch event received")],
        },
        // key and range end both from environment
        ScenarioConfig {
            puts: vec![kv("sample", "value")],
            env_key: Some("sample".to_string()),
            env_range_end: Some("samplx".to_string()),
            args: args(&["--rev", "1", "--", "echo", "watch event received"]),
            expected: vec![ev_exec("sample", "value", "watch event received")],
        },
        // range end trailing the flags
        ScenarioConfig {
            puts: vec![kv("sample", "value")],
            env_key: None,
            env_range_end: None,
            args: args(&["sample", "--rev", "1", "samplx", "--", "echo", "watch event received"]),
            expected: vec![ev_exec("sample", "value", "watch event received")],
        },
        // watch 3 keys by prefix
        ScenarioConfig {
            puts: vec![kv("key1", "val1"), kv("key2", "val2"), kv("key3", "val3")],
            env_key: None,
            env_range_end: None,
            args: args(&["key", "--rev", "1", "--prefix"]),
            expected: vec![ev("key1", "val1"), ev("key2", "val2"), ev("key3", "val3")],
        },
        // watch 3 keys by prefix, key from environment
        ScenarioConfig {
            puts: vec![kv("key1", "val1"), kv("key2", "val2"), kv("key3", "val3")],
            env_key: Some("key".to_string()),
            env_range_end: None,
            args: args(&["--rev", "1", "--prefix"]),
            expected: vec![ev("key1", "val1"), ev("key2", "val2"), ev("key3", "val3")],
        },
        // watch from a later revision: the revision-1 write predates the
        // watch start and must not be delivered
        ScenarioConfig {
            puts: vec![
                kv("etcd", "revision_1"),
                kv("etcd", "revision_2"),
                kv("etcd", "revision_3"),
            ],
            env_key: None,
            env_range_end: None,
            args: args(&["etcd", "--rev", "2"]),
            expected: vec![ev("etcd", "revision_2"), ev("etcd", "revision_3")],
        },
        // watch by range: key3 is the exclusive range end; delivery follows
        // write order even though key2 was written after key3
        ScenarioConfig {
            puts: vec![kv("key1", "val1"), kv("key3", "val3"), kv("key2", "val2")],
            env_key: None,
            env_range_end: None,
            args: args(&["key", "key3", "--rev", "1"]),
            expected: vec![ev("key1", "val1"), ev("key2", "val2")],
        },
        // watch by range, key and range end from environment
        ScenarioConfig {
            puts: vec![kv("key1", "val1"), kv("key3", "val3"), kv("key2", "val2")],
            env_key: Some("key".to_string()),
            env_range_end: Some("key3".to_string()),
            args: args(&["--rev", "1"]),
            expected: vec![ev("key1", "val1"), ev("key2", "val2")],
        },
    ]
}

/// Load a scenario table from a YAML file.
pub fn load_scenarios(path: &Path) -> Result<Vec<ScenarioConfig>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "failed to read scenario file '{}': {}",
            path.display(),
            e
        ))
    })?;
    let scenarios: Vec<ScenarioConfig> = serde_yaml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse scenario file: {}", e)))?;
    if scenarios.is_empty() {
        return Err(Error::Config(
            "scenario file contains no scenarios".to_string(),
        ));
    }
    Ok(scenarios)
}
