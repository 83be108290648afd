use super::types::{FetchBody, FetchPolicy, FetchResult, FetchStrategy};
use crate::config::FetchConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue, REFERER,
};
use reqwest::redirect::Policy;
use std::time::Duration;
use url::Url;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyDecode {
    Bytes,
    Text,
}

/// Default reqwest client reading raw bytes.
pub struct StandardStrategy {
    client: reqwest::Client,
}

impl StandardStrategy {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::limited(10))
            .build()
            .map_err(|e| client_error("standard", &e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FetchStrategy for StandardStrategy {
    fn name(&self) -> &str {
        "standard"
    }

    async fn attempt(&self, url: &Url, policy: &FetchPolicy) -> Result<FetchResult, FetchError> {
        let request = self.client.get(url.as_str());
        send_and_read(self.name(), url, request, policy, BodyDecode::Bytes).await
    }
}

/// Browser-looking client: desktop user agent, HTML accept headers, HTTP/1.1
/// only with title-case header names. Some hosts refuse anything else.
pub struct BrowserStrategy {
    client: reqwest::Client,
}

impl BrowserStrategy {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .http1_only()
            .http1_title_case_headers()
            .redirect(Policy::limited(10))
            .build()
            .map_err(|e| client_error("browser", &e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FetchStrategy for BrowserStrategy {
    fn name(&self) -> &str {
        "browser"
    }

    async fn attempt(&self, url: &Url, policy: &FetchPolicy) -> Result<FetchResult, FetchError> {
        let request = self.client.get(url.as_str());
        send_and_read(self.name(), url, request, policy, BodyDecode::Bytes).await
    }
}

/// Minimal client that decodes the body as text.
pub struct PlainTextStrategy {
    client: reqwest::Client,
}

impl PlainTextStrategy {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(Policy::limited(5))
            .build()
            .map_err(|e| client_error("plain-text", &e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FetchStrategy for PlainTextStrategy {
    fn name(&self) -> &str {
        "plain-text"
    }

    async fn attempt(&self, url: &Url, policy: &FetchPolicy) -> Result<FetchResult, FetchError> {
        let request = self.client.get(url.as_str()).header(ACCEPT, "*/*");
        send_and_read(self.name(), url, request, policy, BodyDecode::Text).await
    }
}

fn client_error(strategy: &str, e: &reqwest::Error) -> FetchError {
    FetchError::Client {
        strategy: strategy.to_string(),
        message: e.to_string(),
    }
}

fn request_error(strategy: &str, e: &reqwest::Error, policy: &FetchPolicy) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            strategy: strategy.to_string(),
            secs: policy.timeout.as_secs(),
        }
    } else {
        FetchError::Request {
            strategy: strategy.to_string(),
            message: e.to_string(),
        }
    }
}

/// `scheme://host[:port]` of the link, sent as `Referer`.
pub(crate) fn referer_for(url: &Url) -> String {
    url.origin().ascii_serialization()
}

async fn send_and_read(
    strategy: &str,
    url: &Url,
    request: reqwest::RequestBuilder,
    policy: &FetchPolicy,
    decode: BodyDecode,
) -> Result<FetchResult, FetchError> {
    let mut response = request
        .header(REFERER, referer_for(url))
        .send()
        .await
        .map_err(|e| request_error(strategy, &e, policy))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            strategy: strategy.to_string(),
            status: status.as_u16(),
        });
    }

    let headers = response.headers();
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let declared_length = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    let withheld = |content_length: Option<u64>| FetchResult {
        url: url.clone(),
        strategy: strategy.to_string(),
        content_type: content_type.clone(),
        content_length,
        body: FetchBody::Withheld,
    };

    if let Some(length) = declared_length
        && length > policy.max_content_length
    {
        tracing::debug!(%url, strategy, length, "declared body exceeds cap, not downloading");
        return Ok(withheld(Some(length)));
    }

    let mut buf: Vec<u8> = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| request_error(strategy, &e, policy))?
    {
        let observed = (buf.len() + chunk.len()) as u64;
        if observed > policy.max_content_length {
            // The real size is unknown; only the declared length is reported.
            tracing::debug!(%url, strategy, observed, "streamed body exceeds cap, aborting");
            return Ok(withheld(declared_length));
        }
        buf.extend_from_slice(&chunk);
    }

    let body = match decode {
        BodyDecode::Bytes => FetchBody::Bytes(buf),
        BodyDecode::Text => FetchBody::Text(String::from_utf8_lossy(&buf).into_owned()),
    };

    Ok(FetchResult {
        url: url.clone(),
        strategy: strategy.to_string(),
        content_type,
        content_length: declared_length,
        body,
    })
}
