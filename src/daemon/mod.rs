use crate::config::Config;
use crate::relay::LinkRelay;
use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

mod supervisor;
mod sweeper;

use supervisor::spawn_component_supervisor;
use sweeper::run_scratch_sweeper;

const INITIAL_BACKOFF_SECS: u64 = 1;
const MAX_BACKOFF_SECS: u64 = 60;

/// Run the gateway and the scratch sweeper until Ctrl-C.
///
/// Returns an error if the gateway stops for good, e.g. because the
/// `WhatsApp` credentials were rejected.
pub async fn run(config: Arc<Config>) -> Result<()> {
    let relay = Arc::new(LinkRelay::from_config(&config).await?);

    let gateway_cfg = Arc::clone(&config);
    let gateway_relay = Arc::clone(&relay);
    let mut gateway = spawn_component_supervisor(
        "gateway",
        INITIAL_BACKOFF_SECS,
        MAX_BACKOFF_SECS,
        move || {
            let cfg = Arc::clone(&gateway_cfg);
            let relay = Arc::clone(&gateway_relay);
            async move { crate::gateway::run_gateway(cfg, relay).await }
        },
    );

    let scratch = relay.scratch().clone();
    let max_age = Duration::from_secs(config.scratch.max_age_secs);
    let every = Duration::from_secs(config.scratch.sweep_interval_secs);
    let sweeper: JoinHandle<()> = spawn_component_supervisor(
        "scratch-sweeper",
        INITIAL_BACKOFF_SECS,
        MAX_BACKOFF_SECS,
        move || run_scratch_sweeper(scratch.clone(), max_age, every),
    );

    tracing::info!(
        host = %config.gateway.host,
        port = config.gateway.port,
        scratch = %relay.scratch().path().display(),
        "linkrelay started; press Ctrl-C to stop"
    );

    let result = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested");
            gateway.abort();
            let _ = gateway.await;
            signal.map_err(anyhow::Error::from)
        }
        _ = &mut gateway => Err(anyhow::anyhow!("gateway stopped after an unrecoverable error")),
    };

    sweeper.abort();
    let _ = sweeper.await;

    result
}
