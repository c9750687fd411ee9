//! CLI command handling
//!
//! Resolves configuration, runs the requested harness operation, and
//! formats the report.

use std::sync::Arc;

use colored::Colorize;

use crate::commands::{ClientArgs, Commands};
use crate::common::config::{HarnessConfig, RunContext};
use crate::common::{Error, Result};
use crate::harness::matrix::{self, MatrixReport};
use crate::harness::scenario::{self, ScenarioConfig};
use crate::harness::store::{CliStoreWriter, StoreWriter};
use crate::harness::driver;
use crate::session::PipeSpawner;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            client,
            interactive,
            scenarios,
            json,
        } => {
            let ctx = build_context(&client, interactive)?;
            let table = load_table(scenarios.as_deref())?;

            let spawner = PipeSpawner::new(ctx.expect_timeout);
            let writer: Arc<dyn StoreWriter> = Arc::new(CliStoreWriter::new(&ctx));

            let report = matrix::run_matrix(&ctx, &spawner, writer, &table).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }

            if report.all_passed() {
                Ok(())
            } else {
                Err(Error::MatrixFailed {
                    failed: report.failed(),
                    total: report.outcomes.len(),
                })
            }
        }

        Commands::List { scenarios, json } => {
            let table = load_table(scenarios.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                print_table(&table);
            }
            Ok(())
        }

        Commands::Denied {
            client,
            interactive,
            args,
        } => {
            let ctx = build_context(&client, interactive)?;
            let spawner = PipeSpawner::new(ctx.expect_timeout);

            driver::run_watch_denied(&ctx, &spawner, &args).await?;
            println!(
                "{} watch canceled by the server as expected",
                "✓".green()
            );
            Ok(())
        }
    }
}

/// Build the run context from config file and CLI overrides.
fn build_context(args: &ClientArgs, interactive: bool) -> Result<RunContext> {
    let mut config = HarnessConfig::load(args.config.as_deref())?;

    if let Some(client) = &args.client {
        config.client.bin = client.clone();
    }
    if !args.endpoints.is_empty() {
        config.client.endpoints = args.endpoints.clone();
    }
    if let Some(dial) = args.dial_timeout {
        config.timeouts.dial_secs = dial;
    }
    if let Some(expect) = args.expect_timeout {
        config.timeouts.expect_secs = expect;
    }

    let mut ctx = RunContext::from_config(&config)?;
    ctx.interactive = interactive;
    Ok(ctx)
}

fn load_table(path: Option<&std::path::Path>) -> Result<Vec<ScenarioConfig>> {
    match path {
        Some(path) => scenario::load_scenarios(path),
        None => Ok(scenario::builtin_scenarios()),
    }
}

fn print_table(table: &[ScenarioConfig]) {
    for (index, scenario) in table.iter().enumerate() {
        println!("#{:<2} watch {}", index, scenario.args.join(" "));
        if let Some(key) = &scenario.env_key {
            println!("    env key: {key}");
        }
        if let Some(range_end) = &scenario.env_range_end {
            println!("    env range end: {range_end}");
        }
        let puts: Vec<String> = scenario
            .puts
            .iter()
            .map(|p| format!("{}={}", p.key, p.value))
            .collect();
        println!("    puts: {}", puts.join(", "));
        println!("    expect: {} event(s)", scenario.expected.len());
    }
}

fn print_report(report: &MatrixReport) {
    for outcome in &report.outcomes {
        if outcome.passed {
            match &outcome.detail {
                Some(detail) => println!(
                    "  {} scenario #{} ({})",
                    "✓".green(),
                    outcome.index,
                    detail.dimmed()
                ),
                None => println!("  {} scenario #{}", "✓".green(), outcome.index),
            }
        } else {
            println!(
                "  {} scenario #{}: {}",
                "✗".red(),
                outcome.index,
                outcome.detail.as_deref().unwrap_or("unknown error")
            );
        }
    }

    let summary = format!(
        "{}/{} scenarios passed",
        report.passed(),
        report.outcomes.len()
    );
    if report.all_passed() {
        println!("\n{} {}", "✓".green().bold(), summary.green().bold());
    } else {
        println!("\n{} {}", "✗".red().bold(), summary.red().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_args() -> ClientArgs {
        ClientArgs {
            config: None,
            client: Some("/opt/kv/bin/kvctl".to_string()),
            endpoints: vec!["10.0.0.1:2379".to_string()],
            dial_timeout: Some(0),
            expect_timeout: Some(3),
        }
    }

    #[test]
    fn cli_flags_override_config_defaults() {
        let ctx = build_context(&client_args(), true).unwrap();
        assert_eq!(ctx.client_bin.to_str(), Some("/opt/kv/bin/kvctl"));
        assert_eq!(ctx.endpoints, vec!["10.0.0.1:2379"]);
        assert!(ctx.degenerate_dial_timeout());
        assert_eq!(ctx.expect_timeout.as_secs(), 3);
        assert!(ctx.interactive);
    }

    #[test]
    fn defaults_survive_when_flags_are_absent() {
        let args = ClientArgs {
            config: None,
            client: Some("/opt/kv/bin/kvctl".to_string()),
            endpoints: Vec::new(),
            dial_timeout: None,
            expect_timeout: None,
        };
        let ctx = build_context(&args, false).unwrap();
        assert_eq!(ctx.endpoints, vec!["127.0.0.1:2379"]);
        assert_eq!(ctx.dial_timeout.as_secs(), 7);
        assert!(!ctx.interactive);
    }
}
