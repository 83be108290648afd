use crate::error::is_unrecoverable;
use anyhow::Result;
use std::future::Future;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Keep a long-running component alive, restarting it with exponential
/// backoff. The task ends only when the component fails with an error that
/// restarting cannot fix (rejected credentials, bad config).
pub(super) fn spawn_component_supervisor<F, Fut>(
    name: &'static str,
    initial_backoff_secs: u64,
    max_backoff_secs: u64,
    mut run_component: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        let initial_backoff = initial_backoff_secs.max(1);
        let max_backoff = max_backoff_secs.max(initial_backoff);
        let mut backoff = initial_backoff;

        loop {
            tracing::info!(component = name, "starting");
            match run_component().await {
                Ok(()) => {
                    tracing::warn!(component = name, "exited unexpectedly");
                    backoff = initial_backoff;
                }
                Err(e) if is_unrecoverable(&e) => {
                    tracing::error!(component = name, error = %format!("{e:#}"), "stopped, not restarting");
                    break;
                }
                Err(e) => {
                    tracing::error!(
                        component = name,
                        error = %format!("{e:#}"),
                        retry_in_secs = backoff,
                        "failed"
                    );
                }
            }

            tokio::time::sleep(Duration::from_secs(backoff)).await;
            backoff = backoff.saturating_mul(2).min(max_backoff);
        }
    })
}
