use crate::relay::format::HumanSize;
use thiserror::Error;

// ─── Fetch errors ────────────────────────────────────────────────────────────

/// Failure of a single fetch strategy, or of the whole fallback chain.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{strategy}: request failed: {message}")]
    Request { strategy: String, message: String },

    #[error("{strategy}: HTTP {status}")]
    Status { strategy: String, status: u16 },

    #[error("{strategy}: timed out after {secs}s")]
    Timeout { strategy: String, secs: u64 },

    #[error("{strategy}: failed to build client: {message}")]
    Client { strategy: String, message: String },

    /// Every strategy failed; carries the last strategy's error text.
    #[error("{last}")]
    Exhausted { last: String },

    #[error("no fetch strategies configured")]
    NoStrategies,
}

// ─── Relay errors ────────────────────────────────────────────────────────────

/// Everything that can go wrong between a detected link and the reply.
///
/// None of these escape the pipeline: each one becomes a single error
/// message in the originating chat.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Failed to fetch URL: {0}")]
    Fetch(#[from] FetchError),

    #[error("File too large: {size} (limit {limit})")]
    SizeLimit { size: HumanSize, limit: HumanSize },

    /// Body overran the cap while streaming; its real size is unknown.
    #[error("File too large: over {limit}")]
    OverLimit { limit: HumanSize },

    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Scratch file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error: {0}")]
    Unexpected(String),
}

// ─── Transport errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("channel {channel} connection failed: {message}")]
    Connection { channel: String, message: String },

    #[error("channel {channel} send failed: {message}")]
    Send { channel: String, message: String },

    /// Credentials were rejected. The supervisor stops restarting on this.
    #[error("channel {channel} credentials rejected (HTTP {status})")]
    Unauthorized { channel: String, status: u16 },

    #[error("gateway: {0}")]
    Gateway(String),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// True when an error chain carries a fault no restart can fix.
pub fn is_unrecoverable(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<TransportError>(),
            Some(TransportError::Unauthorized { .. })
        ) || cause.downcast_ref::<ConfigError>().is_some()
    })
}
