//! Sequential scenario execution and outcome reporting
//!
//! Scenarios are logically independent but execute strictly in index
//! order: the implicit-argument environment variables and the store are
//! process-wide, so the next scenario must not start until the current
//! watch session and mutator have both finished.

use std::sync::Arc;

use serde::Serialize;

use crate::common::config::RunContext;
use crate::common::Result;
use crate::session::Spawner;

use super::driver;
use super::env::EnvOverride;
use super::mutator;
use super::scenario::ScenarioConfig;
use super::store::StoreWriter;

/// Outcome of one scenario.
#[derive(Debug, Serialize)]
pub struct ScenarioOutcome {
    pub index: usize,
    pub passed: bool,
    /// Why a scenario failed, or how a passing scenario deviated from the
    /// plain path (expected deadline).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Report over a whole matrix run.
#[derive(Debug, Serialize)]
pub struct MatrixReport {
    pub outcomes: Vec<ScenarioOutcome>,
}

impl MatrixReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Run every scenario in index order.
///
/// Per scenario: start the background mutator, apply the environment
/// override, run the watch driver, record the outcome, clear the
/// environment, then join the mutator. Driver failures are recorded and the
/// run continues; a failed put aborts the whole run, since a missing write
/// makes the expected sequence unsatisfiable and would only resurface as a
/// confusing downstream timeout.
pub async fn run_matrix(
    ctx: &RunContext,
    spawner: &dyn Spawner,
    writer: Arc<dyn StoreWriter>,
    scenarios: &[ScenarioConfig],
) -> Result<MatrixReport> {
    let mut outcomes = Vec::with_capacity(scenarios.len());

    for (index, scenario) in scenarios.iter().enumerate() {
        tracing::info!(
            index,
            puts = scenario.puts.len(),
            events = scenario.expected.len(),
            "running scenario"
        );

        let puts = mutator::spawn_puts(writer.clone(), scenario.puts.clone());
        let mut env = EnvOverride::apply(
            scenario.env_key.as_deref(),
            scenario.env_range_end.as_deref(),
        );

        let result = driver::run_watch(ctx, spawner, &scenario.args, &scenario.expected).await;
        env.clear();

        let outcome = match result {
            Ok(()) => ScenarioOutcome {
                index,
                passed: true,
                detail: None,
            },
            Err(err) if ctx.degenerate_dial_timeout() && err.is_deadline_exceeded() => {
                tracing::info!(index, "deadline exceeded as expected");
                ScenarioOutcome {
                    index,
                    passed: true,
                    detail: Some(format!("expected deadline: {err}")),
                }
            }
            Err(err) => {
                tracing::warn!(index, error = %err, "scenario failed");
                ScenarioOutcome {
                    index,
                    passed: false,
                    detail: Some(err.to_string()),
                }
            }
        };
        outcomes.push(outcome);

        puts.wait().await.map_err(|err| err.in_scenario(index))?;
    }

    Ok(MatrixReport { outcomes })
}
