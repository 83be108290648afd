use super::classify::{ContentKind, classify, derive_filename};
use super::format::{HumanSize, render_text, truncate_text};
use super::outcome::RelayOutcome;
use crate::channels::ChatSender;
use crate::config::Config;
use crate::error::RelayError;
use crate::fetch::{FetchBody, FetchResult, Fetcher};
use crate::links::normalize_link;
use crate::media::detection::{essence, sniff_content_type};
use crate::media::{MediaType, ScratchDir};
use anyhow::Context;
use url::Url;

/// Fetch a link and post what came back into a chat.
pub struct LinkRelay {
    fetcher: Fetcher,
    scratch: ScratchDir,
    max_text_chars: usize,
}

impl LinkRelay {
    pub fn new(fetcher: Fetcher, scratch: ScratchDir, max_text_chars: usize) -> Self {
        Self {
            fetcher,
            scratch,
            max_text_chars,
        }
    }

    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let fetcher = Fetcher::from_config(&config.fetch).context("build fetch strategies")?;
        let scratch = ScratchDir::open(config.scratch_dir()).await?;
        Ok(Self::new(fetcher, scratch, config.relay.max_text_chars))
    }

    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    /// Resolve `link` and send the result to `chat_id`.
    ///
    /// Exactly one outcome is produced. If delivering it fails, a single error
    /// text is attempted in its place.
    pub async fn relay(&self, sender: &dyn ChatSender, chat_id: &str, link: &str) -> RelayOutcome {
        let outcome = self.resolve(link).await;
        tracing::info!(chat = chat_id, link, kind = outcome.kind(), "relaying link");

        if let Err(e) = sender.send(chat_id, &outcome.to_outbound()).await {
            tracing::error!(chat = chat_id, link, error = %e, "failed to deliver relay outcome");
            if !outcome.is_error() {
                let fallback = RelayOutcome::Error(RelayError::Unexpected(e.to_string()).to_string());
                if let Err(e) = sender.send(chat_id, &fallback.to_outbound()).await {
                    tracing::error!(chat = chat_id, error = %e, "failed to deliver error reply");
                }
                return fallback;
            }
        }
        outcome
    }

    /// Fetch and classify without sending. Never fails: every error becomes
    /// [`RelayOutcome::Error`].
    pub async fn resolve(&self, link: &str) -> RelayOutcome {
        match self.try_resolve(link).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(link, error = %e, "relay failed");
                RelayOutcome::Error(e.to_string())
            }
        }
    }

    async fn try_resolve(&self, link: &str) -> Result<RelayOutcome, RelayError> {
        let normalized = normalize_link(link);
        let url = Url::parse(&normalized).map_err(|e| RelayError::InvalidUrl {
            url: normalized.clone(),
            message: e.to_string(),
        })?;

        let result = self.fetcher.fetch(&url).await?;
        self.prepare(&url, &normalized, result).await
    }

    /// `link` is the normalized link as it appeared in the chat; media
    /// captions echo it verbatim.
    async fn prepare(
        &self,
        url: &Url,
        link: &str,
        result: FetchResult,
    ) -> Result<RelayOutcome, RelayError> {
        let limit = self.fetcher.policy().max_content_length;
        if let Some(size) = result.content_length
            && size > limit
        {
            return Err(RelayError::SizeLimit {
                size: HumanSize(size),
                limit: HumanSize(limit),
            });
        }
        if result.body.is_withheld() {
            return Err(RelayError::OverLimit {
                limit: HumanSize(limit),
            });
        }

        let filename = derive_filename(url);
        let content_type = result
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .map_or_else(
                || sniff_content_type(result.body.as_bytes(), Some(&filename)),
                String::from,
            );

        match classify(&content_type) {
            ContentKind::Media(media_type) => {
                let path = self
                    .scratch
                    .write(&filename, result.body.as_bytes())
                    .await?;
                let mimetype = essence(&content_type);
                let caption = link.to_string();
                Ok(match media_type {
                    MediaType::Image => RelayOutcome::Image {
                        path,
                        mimetype,
                        caption,
                    },
                    MediaType::Video => RelayOutcome::Video {
                        path,
                        mimetype,
                        caption,
                    },
                    MediaType::Audio => RelayOutcome::Audio { path, mimetype },
                    MediaType::Document => RelayOutcome::Document {
                        path,
                        filename,
                        mimetype,
                    },
                })
            }
            ContentKind::Text => {
                let body = match result.body {
                    FetchBody::Text(text) => text,
                    FetchBody::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                    FetchBody::Withheld => String::new(),
                };
                let rendered = render_text(&body, &content_type);
                Ok(RelayOutcome::Text(truncate_text(&rendered, self.max_text_chars)))
            }
        }
    }
}
