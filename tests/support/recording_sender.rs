use async_trait::async_trait;
use linkrelay::channels::{ChatSender, OutboundMessage};
use std::sync::Mutex;

/// Chat sender that keeps everything it is asked to post.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, OutboundMessage)>>,
    read: Mutex<Vec<String>>,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<(String, OutboundMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn read(&self) -> Vec<String> {
        self.read.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatSender for RecordingSender {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, chat_id: &str, message: &OutboundMessage) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), message.clone()));
        Ok(())
    }

    async fn mark_read(&self, _chat_id: &str, message_id: &str) -> anyhow::Result<()> {
        self.read.lock().unwrap().push(message_id.to_string());
        Ok(())
    }
}
