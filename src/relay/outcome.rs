use crate::channels::OutboundMessage;
use std::path::PathBuf;

/// What the relay decided to post for one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Text(String),
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
    Error(String),
}

impl RelayOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::Audio { .. } => "audio",
            Self::Document { .. } => "document",
            Self::Error(_) => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Errors travel as plain text.
    pub fn to_outbound(&self) -> OutboundMessage {
        match self {
            Self::Text(text) | Self::Error(text) => OutboundMessage::text(text.clone()),
            Self::Image {
                path,
                mimetype,
                caption,
            } => OutboundMessage::Image {
                path: path.clone(),
                mimetype: mimetype.clone(),
                caption: caption.clone(),
            },
            Self::Video {
                path,
                mimetype,
                caption,
            } => OutboundMessage::Video {
                path: path.clone(),
                mimetype: mimetype.clone(),
                caption: caption.clone(),
            },
            Self::Audio { path, mimetype } => OutboundMessage::Audio {
                path: path.clone(),
                mimetype: mimetype.clone(),
            },
            Self::Document {
                path,
                filename,
                mimetype,
            } => OutboundMessage::Document {
                path: path.clone(),
                filename: filename.clone(),
                mimetype: mimetype.clone(),
            },
        }
    }
}
