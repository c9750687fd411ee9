//! Watch drivers
//!
//! A driver runs one watch session to completion: spawn the child, type the
//! interactive command line when that mode is active, then hold the session
//! to an ordered sequence of expectations.

use crate::common::config::RunContext;
use crate::common::Result;
use crate::session::{ProcessSession, Spawner};

use super::args::{interactive_line, watch_args};
use super::scenario::ExpectedEvent;

/// Message printed when the server cancels a watch the client is not
/// permitted to establish.
pub const WATCH_CANCELED_MESSAGE: &str = "watch is canceled by the server";

/// Spawn a watch session, match every expected event in order, then stop
/// the session gracefully.
///
/// For each event the key, the value, and (when present) the side-effect
/// output must appear in that order; one event's matches must precede the
/// next event's. On any error after spawn the session is force-closed so it
/// cannot outlive the scenario.
pub async fn run_watch(
    ctx: &RunContext,
    spawner: &dyn Spawner,
    args: &[String],
    expected: &[ExpectedEvent],
) -> Result<()> {
    let argv = watch_args(ctx, args);
    tracing::debug!(?argv, "spawning watch session");
    let mut session = spawner.spawn(&argv).await?;

    if let Err(err) = drive(ctx, session.as_mut(), args, expected).await {
        let _ = session.close().await;
        return Err(err);
    }
    session.stop().await
}

async fn drive(
    ctx: &RunContext,
    session: &mut dyn ProcessSession,
    args: &[String],
    expected: &[ExpectedEvent],
) -> Result<()> {
    if ctx.interactive {
        session.send(&interactive_line(args)).await?;
    }
    for event in expected {
        session.expect(&event.key).await?;
        session.expect(&event.value).await?;
        if let Some(output) = event.exec_output.as_deref() {
            if !output.is_empty() {
                session.expect(output).await?;
            }
        }
    }
    Ok(())
}

/// Variant for watches the server is expected to cancel: wait for the
/// cancellation message, then force-close the session. The server-side
/// cancellation can leave the child unable to complete a graceful shutdown,
/// so no graceful stop is attempted.
pub async fn run_watch_denied(
    ctx: &RunContext,
    spawner: &dyn Spawner,
    args: &[String],
) -> Result<()> {
    let argv = watch_args(ctx, args);
    tracing::debug!(?argv, "spawning watch session, expecting cancellation");
    let mut session = spawner.spawn(&argv).await?;

    let result = async {
        if ctx.interactive {
            session.send(&interactive_line(args)).await?;
        }
        session.expect(WATCH_CANCELED_MESSAGE).await.map(|_| ())
    }
    .await;

    match result {
        Ok(()) => session.close().await,
        Err(err) => {
            let _ = session.close().await;
            Err(err)
        }
    }
}
