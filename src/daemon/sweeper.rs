use crate::media::ScratchDir;
use anyhow::Result;
use tokio::time::Duration;

/// Periodically delete scratch files older than `max_age`.
///
/// A failed sweep is logged and retried on the next tick.
pub(super) async fn run_scratch_sweeper(
    scratch: ScratchDir,
    max_age: Duration,
    every: Duration,
) -> Result<()> {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        match scratch.sweep(max_age).await {
            Ok(0) => tracing::debug!(dir = %scratch.path().display(), "scratch sweep: nothing to remove"),
            Ok(removed) => {
                tracing::info!(dir = %scratch.path().display(), removed, "scratch sweep");
            }
            Err(e) => tracing::warn!(error = %format!("{e:#}"), "scratch sweep failed"),
        }
    }
}
