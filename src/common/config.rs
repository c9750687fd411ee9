//! Configuration file handling and the resolved run context

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Error, Result};

/// Main configuration structure, loaded from a TOML file
#[derive(Debug, Deserialize, Default)]
pub struct HarnessConfig {
    /// Client binary settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Client binary settings
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    /// Binary name (resolved on PATH) or path
    #[serde(default = "default_client_bin")]
    pub bin: String,

    /// Store endpoints the client connects to
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// Extra global flags passed ahead of every subcommand
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bin: default_client_bin(),
            endpoints: default_endpoints(),
            args: Vec::new(),
        }
    }
}

fn default_client_bin() -> String {
    "kvctl".to_string()
}

fn default_endpoints() -> Vec<String> {
    vec!["127.0.0.1:2379".to_string()]
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize)]
pub struct Timeouts {
    /// Client dial timeout; 0 intentionally exercises the deadline path
    #[serde(default = "default_dial")]
    pub dial_secs: u64,

    /// Bound for each wait on session output
    #[serde(default = "default_expect")]
    pub expect_secs: u64,

    /// Bound for each put invocation
    #[serde(default = "default_put")]
    pub put_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            dial_secs: default_dial(),
            expect_secs: default_expect(),
            put_secs: default_put(),
        }
    }
}

fn default_dial() -> u64 {
    7
}
fn default_expect() -> u64 {
    10
}
fn default_put() -> u64 {
    30
}

impl HarnessConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns default configuration if no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("failed to read '{}': {}", path.display(), e))
                })?;
                toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }
}

/// Process-wide run configuration, resolved once per invocation and
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Resolved path to the client binary
    pub client_bin: PathBuf,
    /// Store endpoints
    pub endpoints: Vec<String>,
    /// Extra global flags passed through ahead of every subcommand
    pub extra_args: Vec<String>,
    /// Client dial timeout
    pub dial_timeout: Duration,
    /// Bound for each wait on session output
    pub expect_timeout: Duration,
    /// Bound for each put invocation
    pub put_timeout: Duration,
    /// Drive the watch through an interactive session instead of argv
    pub interactive: bool,
}

impl RunContext {
    /// Resolve a run context from loaded configuration.
    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        Ok(Self {
            client_bin: resolve_client(&config.client.bin)?,
            endpoints: config.client.endpoints.clone(),
            extra_args: config.client.args.clone(),
            dial_timeout: Duration::from_secs(config.timeouts.dial_secs),
            expect_timeout: Duration::from_secs(config.timeouts.expect_secs),
            put_timeout: Duration::from_secs(config.timeouts.put_secs),
            interactive: false,
        })
    }

    /// Command prefix shared by every client invocation: binary path,
    /// endpoint list, dial timeout, then any extra global flags.
    pub fn prefix_args(&self) -> Vec<String> {
        let mut args = vec![
            self.client_bin.to_string_lossy().into_owned(),
            "--endpoints".to_string(),
            self.endpoints.join(","),
            "--dial-timeout".to_string(),
            format!("{}s", self.dial_timeout.as_secs()),
        ];
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// A zero dial timeout marks the run that intentionally exercises the
    /// deadline path; its deadline-classified expect failures are expected
    /// behavior, not test failures.
    pub fn degenerate_dial_timeout(&self) -> bool {
        self.dial_timeout.is_zero()
    }
}

/// Resolve the client binary: explicit paths are taken as-is, bare names
/// are searched on PATH.
fn resolve_client(bin: &str) -> Result<PathBuf> {
    let path = Path::new(bin);
    if path.components().count() > 1 {
        return Ok(path.to_path_buf());
    }
    which::which(bin).map_err(|_| Error::ClientNotFound(bin.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn test_context() -> RunContext {
        RunContext {
            client_bin: PathBuf::from("/usr/local/bin/kvctl"),
            endpoints: vec!["127.0.0.1:2379".to_string(), "127.0.0.1:22379".to_string()],
            extra_args: vec!["--insecure-transport".to_string()],
            dial_timeout: Duration::from_secs(7),
            expect_timeout: Duration::from_secs(10),
            put_timeout: Duration::from_secs(30),
            interactive: false,
        }
    }

    #[test]
    fn defaults_when_no_config_file() {
        let config = HarnessConfig::load(None).unwrap();
        assert_eq!(config.client.bin, "kvctl");
        assert_eq!(config.timeouts.dial_secs, 7);
        assert_eq!(config.timeouts.expect_secs, 10);
    }

    #[test]
    fn loads_partial_config_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[client]\nbin = \"/opt/kv/bin/kvctl\"\nendpoints = [\"10.0.0.1:2379\"]\n\n[timeouts]\ndial_secs = 0\n"
        )
        .unwrap();

        let config = HarnessConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.client.bin, "/opt/kv/bin/kvctl");
        assert_eq!(config.client.endpoints, vec!["10.0.0.1:2379"]);
        assert_eq!(config.timeouts.dial_secs, 0);
        // unspecified values fall back
        assert_eq!(config.timeouts.put_secs, 30);
    }

    #[test]
    fn rejects_malformed_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "client = \"not a table\"").unwrap();
        assert!(matches!(
            HarnessConfig::load(Some(file.path())),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn prefix_args_carries_endpoints_timeout_and_extras() {
        let ctx = test_context();
        let args = ctx.prefix_args();
        assert_eq!(args[0], "/usr/local/bin/kvctl");
        assert_eq!(args[1], "--endpoints");
        assert_eq!(args[2], "127.0.0.1:2379,127.0.0.1:22379");
        assert_eq!(args[3], "--dial-timeout");
        assert_eq!(args[4], "7s");
        assert_eq!(args[5], "--insecure-transport");
    }

    #[test]
    fn degenerate_dial_timeout_only_at_zero() {
        let mut ctx = test_context();
        assert!(!ctx.degenerate_dial_timeout());
        ctx.dial_timeout = Duration::ZERO;
        assert!(ctx.degenerate_dial_timeout());
    }

    #[test]
    fn explicit_client_path_is_not_searched() {
        let path = resolve_client("/nonexistent/dir/kvctl").unwrap();
        assert_eq!(path, PathBuf::from("/nonexistent/dir/kvctl"));
    }

    #[test]
    fn unknown_bare_client_name_is_an_error() {
        assert!(matches!(
            resolve_client("watchcheck-no-such-binary"),
            Err(Error::ClientNotFound(_))
        ));
    }
}
