use async_trait::async_trait;
use std::path::PathBuf;

/// Payload shapes the bot can post into a chat.
///
/// Media variants point at a file in the scratch directory; the sender reads
/// it for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Text {
        text: String,
    },
    Image {
        path: PathBuf,
        mimetype: String,
        caption: String,
    },
    Video {
        path: PathBuf,
        mimetype: String,
        caption: String,
    },
    Audio {
        path: PathBuf,
        mimetype: String,
    },
    Document {
        path: PathBuf,
        filename: String,
        mimetype: String,
    },
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::Audio { .. } => "audio",
            Self::Document { .. } => "document",
        }
    }
}

/// Outbound side of a messaging platform.
#[async_trait]
pub trait ChatSender: Send + Sync {
    /// Human-readable channel name
    fn name(&self) -> &str;

    /// Post one message into `chat_id`
    async fn send(&self, chat_id: &str, message: &OutboundMessage) -> anyhow::Result<()>;

    /// Acknowledge an inbound message as read
    async fn mark_read(&self, _chat_id: &str, _message_id: &str) -> anyhow::Result<()> {
        Ok(())
    }

    /// Verify the channel's credentials are accepted
    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
