use crate::config::FetchConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Limits applied to every attempt.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub max_content_length: u64,
}

impl FetchPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_content_length: config.max_content_length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchBody {
    Bytes(Vec<u8>),
    Text(String),
    /// Not downloaded because it exceeds the size cap.
    Withheld,
}

impl FetchBody {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Bytes(bytes) => bytes,
            Self::Text(text) => text.as_bytes(),
            Self::Withheld => &[],
        }
    }

    pub fn is_withheld(&self) -> bool {
        matches!(self, Self::Withheld)
    }
}

/// Response produced by whichever strategy succeeded.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: Url,
    pub strategy: String,
    /// Declared `content-type`, verbatim.
    pub content_type: Option<String>,
    /// Declared `content-length`, if any. A withheld body without one was
    /// cut off while streaming.
    pub content_length: Option<u64>,
    pub body: FetchBody,
}

/// One way of retrieving a URL.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn attempt(&self, url: &Url, policy: &FetchPolicy) -> Result<FetchResult, FetchError>;
}
