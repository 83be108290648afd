//! Axum webhook gateway for the `WhatsApp` Cloud API.
//!
//! - `GET /health` liveness probe
//! - `GET /whatsapp` Meta verification handshake
//! - `POST /whatsapp` inbound messages, each handled in its own task
//!
//! Bodies are capped at 64KB and requests time out after 30s.

mod handlers;
mod server;
mod signature;

pub use server::{run_gateway, run_gateway_with_listener};
pub use signature::verify_whatsapp_signature;

use crate::channels::WhatsAppChannel;
use crate::listener::Listener;
use std::sync::Arc;

/// Maximum request body size (64KB)
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (30s)
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub whatsapp: Option<Arc<WhatsAppChannel>>,
    /// `WhatsApp` app secret for webhook signature verification (`X-Hub-Signature-256`)
    pub whatsapp_app_secret: Option<Arc<str>>,
    /// Consumes parsed inbound messages
    pub listener: Option<Listener>,
}

/// `WhatsApp` verification query params
#[derive(serde::Deserialize)]
pub struct WhatsAppVerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}
