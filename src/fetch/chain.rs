use super::clients::{BrowserStrategy, PlainTextStrategy, StandardStrategy};
use super::types::{FetchPolicy, FetchResult, FetchStrategy};
use crate::config::FetchConfig;
use crate::error::FetchError;
use url::Url;

/// Ordered fallback over fetch strategies.
pub struct Fetcher {
    strategies: Vec<Box<dyn FetchStrategy>>,
    policy: FetchPolicy,
}

impl Fetcher {
    pub fn new(strategies: Vec<Box<dyn FetchStrategy>>, policy: FetchPolicy) -> Self {
        Self { strategies, policy }
    }

    /// `standard`, then `browser`, then `plain-text`.
    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        let strategies: Vec<Box<dyn FetchStrategy>> = vec![
            Box::new(StandardStrategy::new(config)?),
            Box::new(BrowserStrategy::new(config)?),
            Box::new(PlainTextStrategy::new(config)?),
        ];
        Ok(Self::new(strategies, FetchPolicy::from_config(config)))
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Try each strategy in turn and return the first response.
    ///
    /// Every attempt is bounded by the policy timeout. When all of them fail
    /// the error carries the last strategy's message.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchError> {
        let mut last_error = None;

        for strategy in &self.strategies {
            let name = strategy.name();
            let outcome =
                tokio::time::timeout(self.policy.timeout, strategy.attempt(url, &self.policy))
                    .await
                    .unwrap_or_else(|_| {
                        Err(FetchError::Timeout {
                            strategy: name.to_string(),
                            secs: self.policy.timeout.as_secs(),
                        })
                    });

            match outcome {
                Ok(result) => {
                    tracing::debug!(%url, strategy = name, "fetch succeeded");
                    return Ok(result);
                }
                Err(e) => {
                    tracing::warn!(%url, strategy = name, error = %e, "fetch strategy failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.map_or(FetchError::NoStrategies, |e| FetchError::Exhausted {
            last: e.to_string(),
        }))
    }
}
