use crate::channels::{ChatSender, InboundMessage};
use crate::links::first_link;
use crate::relay::{LinkRelay, RelayOutcome};
use std::sync::Arc;

/// Watches inbound chat traffic and relays the first link in each message.
#[derive(Clone)]
pub struct Listener {
    relay: Arc<LinkRelay>,
    sender: Arc<dyn ChatSender>,
}

impl Listener {
    pub fn new(relay: Arc<LinkRelay>, sender: Arc<dyn ChatSender>) -> Self {
        Self { relay, sender }
    }

    /// Process one inbound message.
    ///
    /// Returns the relayed outcome, or `None` when the message carried no
    /// text or no link.
    pub async fn handle(&self, message: &InboundMessage) -> Option<RelayOutcome> {
        if !message.from_me
            && let Err(e) = self.sender.mark_read(&message.chat_id, &message.id).await
        {
            tracing::warn!(
                chat = %message.chat_id,
                message_id = %message.id,
                error = %e,
                "failed to mark message read"
            );
        }

        let text = message.text()?;
        let link = first_link(text)?;
        tracing::info!(chat = %message.chat_id, link, from_me = message.from_me, "link detected");

        Some(
            self.relay
                .relay(self.sender.as_ref(), &message.chat_id, link)
                .await,
        )
    }
}
