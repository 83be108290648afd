use super::handlers::{handle_health, handle_whatsapp_message, handle_whatsapp_verify};
use super::{AppState, MAX_BODY_SIZE, REQUEST_TIMEOUT_SECS};
use crate::channels::{ChatSender, WhatsAppChannel};
use crate::config::Config;
use crate::error::ConfigError;
use crate::listener::Listener;
use crate::relay::LinkRelay;
use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Returns true when the bind address is not a loopback address.
fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Bind the configured address and serve webhooks until the server fails.
pub async fn run_gateway(config: Arc<Config>, relay: Arc<LinkRelay>) -> Result<()> {
    let host = config.gateway.host.as_str();
    if is_public_bind(host) && !config.gateway.allow_public_bind {
        return Err(ConfigError::Validation(format!(
            "refusing to bind the gateway to {host}: it would be exposed to the internet. \
             Put a reverse proxy in front of 127.0.0.1 or set \
             [gateway] allow_public_bind = true in config.toml."
        ))
        .into());
    }

    let addr = resolve_bind_addr(host, config.gateway.port).await?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(listener, config, relay).await
}

/// Resolve `host` (IP literal, bracketed or bare IPv6, or hostname such as
/// `localhost`) to the first matching socket address.
async fn resolve_bind_addr(host: &str, port: u16) -> Result<SocketAddr> {
    let authority = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    };

    tokio::net::lookup_host(authority.as_str())
        .await
        .with_context(|| format!("resolve gateway bind address {authority}"))?
        .next()
        .with_context(|| format!("gateway bind address {authority} resolved to nothing"))
}

/// Serve webhooks from a pre-bound listener.
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    config: Arc<Config>,
    relay: Arc<LinkRelay>,
) -> Result<()> {
    let local_addr = listener
        .local_addr()
        .context("get gateway listener local address")?;

    let whatsapp = config
        .whatsapp
        .as_ref()
        .map(|wa| Arc::new(WhatsAppChannel::from_config(wa)));

    if let Some(wa) = &whatsapp {
        wa.health_check().await.context("check WhatsApp credentials")?;
    } else {
        tracing::warn!("no [whatsapp] section configured; inbound webhooks will be rejected");
    }

    let state = AppState {
        whatsapp_app_secret: resolve_whatsapp_app_secret(&config),
        listener: whatsapp.clone().map(|wa| {
            let sender: Arc<dyn ChatSender> = wa;
            Listener::new(relay, sender)
        }),
        whatsapp,
    };

    tracing::info!(
        addr = %local_addr,
        whatsapp = state.whatsapp.is_some(),
        signed = state.whatsapp_app_secret.is_some(),
        "gateway listening"
    );

    axum::serve(listener, build_app(state))
        .await
        .context("serve HTTP gateway")?;

    Ok(())
}

fn resolve_whatsapp_app_secret(config: &Config) -> Option<Arc<str>> {
    config
        .whatsapp
        .as_ref()
        .and_then(|wa| wa.app_secret.as_deref())
        .map(str::trim)
        .filter(|secret| !secret.is_empty())
        .map(Arc::from)
}

pub(super) fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/whatsapp",
            get(handle_whatsapp_verify).post(handle_whatsapp_message),
        )
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
}
