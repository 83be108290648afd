/// Text-bearing shapes an inbound chat message can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Conversation(Option<String>),
    /// Text with extras such as a quoted reply.
    ExtendedText(Option<String>),
    ImageCaption(Option<String>),
    VideoCaption(Option<String>),
}

impl MessageContent {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Conversation(text)
            | Self::ExtendedText(text)
            | Self::ImageCaption(text)
            | Self::VideoCaption(text) => text.as_deref().filter(|t| !t.trim().is_empty()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Conversation(_) => 0,
            Self::ExtendedText(_) => 1,
            Self::ImageCaption(_) => 2,
            Self::VideoCaption(_) => 3,
        }
    }
}

/// One chat event as delivered by the messaging client.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: String,
    /// Conversation to reply into
    pub chat_id: String,
    /// Sent by the bot's own account
    pub from_me: bool,
    pub timestamp: u64,
    pub content: Vec<MessageContent>,
}

impl InboundMessage {
    /// Text of the highest-priority shape that carries any.
    ///
    /// Priority: conversation, extended text, image caption, video caption.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .filter(|c| c.text().is_some())
            .min_by_key(|c| c.rank())
            .and_then(MessageContent::text)
    }
}
