use super::chunker::chunk_message;
use super::message::{InboundMessage, MessageContent};
use super::traits::{ChatSender, OutboundMessage};
use crate::config::WhatsAppConfig;
use crate::error::TransportError;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use std::path::Path;

/// Cloud API limit on a text message body.
const MAX_TEXT_BODY: usize = 4096;

/// `WhatsApp` channel using the `WhatsApp` Business Cloud API
///
/// Inbound messages arrive through the gateway's `/whatsapp` webhook and are
/// turned into [`InboundMessage`]s by [`WhatsAppChannel::parse_webhook_payload`].
/// Outbound media is uploaded to `/media` first and then referenced by id.
pub struct WhatsAppChannel {
    access_token: String,
    phone_number_id: String,
    verify_token: String,
    allowed_numbers: Vec<String>,
    api_base: String,
    client: reqwest::Client,
}

impl WhatsAppChannel {
    pub fn new(
        access_token: String,
        phone_number_id: String,
        verify_token: String,
        allowed_numbers: Vec<String>,
    ) -> Self {
        Self {
            access_token,
            phone_number_id,
            verify_token,
            allowed_numbers,
            api_base: "https://graph.facebook.com/v18.0".into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &WhatsAppConfig) -> Self {
        Self::new(
            config.access_token.clone(),
            config.phone_number_id.clone(),
            config.verify_token.clone(),
            config.allowed_numbers.clone(),
        )
        .with_api_base(&config.api_base)
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    /// Check if a phone number is allowed (E.164 format: +1234567890)
    fn is_number_allowed(&self, phone: &str) -> bool {
        self.allowed_numbers.iter().any(|n| n == "*" || n == phone)
    }

    /// Get the verify token for webhook verification
    pub fn verify_token(&self) -> &str {
        &self.verify_token
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{path}", self.api_base, self.phone_number_id)
    }

    /// Parse an incoming webhook payload from Meta and extract messages
    pub fn parse_webhook_payload(&self, payload: &Value) -> Vec<InboundMessage> {
        let mut messages = Vec::new();

        // { "object": "whatsapp_business_account", "entry": [{ "changes": [{ "value": ... }] }] }
        let Some(entries) = payload.get("entry").and_then(Value::as_array) else {
            return messages;
        };

        for value in entries
            .iter()
            .filter_map(|entry| entry.get("changes").and_then(Value::as_array))
            .flatten()
            .filter_map(|change| change.get("value"))
        {
            let own_number = value
                .pointer("/metadata/display_phone_number")
                .and_then(Value::as_str)
                .map(normalize_number);

            let Some(msgs) = value.get("messages").and_then(Value::as_array) else {
                continue;
            };

            for msg in msgs {
                if let Some(parsed) = self.parse_message(msg, own_number.as_deref()) {
                    messages.push(parsed);
                }
            }
        }

        messages
    }

    fn parse_message(&self, msg: &Value, own_number: Option<&str>) -> Option<InboundMessage> {
        let from = msg.get("from").and_then(Value::as_str)?;
        let sender = normalize_number(from);
        let from_me = own_number == Some(sender.as_str());

        if !from_me && !self.is_number_allowed(&sender) {
            tracing::warn!(
                "WhatsApp: ignoring message from unauthorized number: {sender}. \
                 Add it to whatsapp.allowed_numbers in config.toml."
            );
            return None;
        }

        let content = message_content(msg);
        if content.is_empty() {
            tracing::debug!("WhatsApp: skipping message without text from {sender}");
            return None;
        }

        let timestamp = msg
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(|t| t.parse::<u64>().ok())
            .unwrap_or_else(|| {
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs()
            });

        Some(InboundMessage {
            id: msg
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            chat_id: sender,
            from_me,
            timestamp,
            content,
        })
    }

    async fn post_message(&self, body: &Value) -> anyhow::Result<()> {
        let resp = self
            .client
            .post(self.endpoint("messages"))
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| send_error(&e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_body = resp.text().await.unwrap_or_default();
            tracing::error!("WhatsApp send failed: {status}: {error_body}");
            return Err(send_error(&format!("WhatsApp API error: {status}")).into());
        }
        Ok(())
    }

    /// Upload a scratch file and return the media id.
    async fn upload(&self, path: &Path, mimetype: &str) -> anyhow::Result<String> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("read {}", path.display()))?;
        let filename = path
            .file_name()
            .map_or_else(|| "file".to_string(), |n| n.to_string_lossy().into_owned());

        let part = Part::bytes(data)
            .file_name(filename)
            .mime_str(mimetype)
            .context("invalid media mimetype")?;
        let form = Form::new()
            .text("messaging_product", "whatsapp")
            .text("type", mimetype.to_string())
            .part("file", part);

        let resp = self
            .client
            .post(self.endpoint("media"))
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| send_error(&e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_body = resp.text().await.unwrap_or_default();
            tracing::error!("WhatsApp media upload failed: {status}: {error_body}");
            return Err(send_error(&format!("WhatsApp media upload error: {status}")).into());
        }

        let uploaded: Value = resp.json().await.context("parse media upload response")?;
        uploaded
            .get("id")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| send_error("media upload response has no id").into())
    }
}

#[async_trait]
impl ChatSender for WhatsAppChannel {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn send(&self, chat_id: &str, message: &OutboundMessage) -> anyhow::Result<()> {
        // Cloud API wants the number without a leading +
        let to = chat_id.strip_prefix('+').unwrap_or(chat_id);

        match message {
            OutboundMessage::Text { text } => {
                for chunk in chunk_message(text, MAX_TEXT_BODY) {
                    self.post_message(&text_body(to, &chunk)).await?;
                }
                Ok(())
            }
            OutboundMessage::Image {
                path,
                mimetype,
                caption,
            } => {
                let id = self.upload(path, mimetype).await?;
                let body = media_body(to, "image", json!({ "id": id, "caption": caption }));
                self.post_message(&body).await
            }
            OutboundMessage::Video {
                path,
                mimetype,
                caption,
            } => {
                let id = self.upload(path, mimetype).await?;
                let body = media_body(to, "video", json!({ "id": id, "caption": caption }));
                self.post_message(&body).await
            }
            OutboundMessage::Audio { path, mimetype } => {
                let id = self.upload(path, mimetype).await?;
                self.post_message(&media_body(to, "audio", json!({ "id": id })))
                    .await
            }
            OutboundMessage::Document {
                path,
                filename,
                mimetype,
            } => {
                let id = self.upload(path, mimetype).await?;
                let body = media_body(to, "document", json!({ "id": id, "filename": filename }));
                self.post_message(&body).await
            }
        }
    }

    async fn mark_read(&self, _chat_id: &str, message_id: &str) -> anyhow::Result<()> {
        if message_id.is_empty() {
            return Ok(());
        }
        self.post_message(&json!({
            "messaging_product": "whatsapp",
            "status": "read",
            "message_id": message_id,
        }))
        .await
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        let url = format!("{}/{}", self.api_base, self.phone_number_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| TransportError::Connection {
                channel: "whatsapp".into(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TransportError::Unauthorized {
                channel: "whatsapp".into(),
                status: status.as_u16(),
            }
            .into());
        }
        if !status.is_success() {
            return Err(TransportError::Connection {
                channel: "whatsapp".into(),
                message: format!("health check returned {status}"),
            }
            .into());
        }
        Ok(())
    }
}

fn normalize_number(raw: &str) -> String {
    if raw.starts_with('+') {
        raw.to_string()
    } else {
        format!("+{raw}")
    }
}

fn send_error(message: &str) -> TransportError {
    TransportError::Send {
        channel: "whatsapp".into(),
        message: message.to_string(),
    }
}

/// Map a Cloud API message object onto the text-bearing shapes.
fn message_content(msg: &Value) -> Vec<MessageContent> {
    let text_at = |pointer: &str| msg.pointer(pointer).and_then(Value::as_str).map(String::from);
    let mut content = Vec::new();

    match msg.get("type").and_then(Value::as_str) {
        Some("text") => {
            let body = text_at("/text/body");
            if msg.get("context").is_some() {
                content.push(MessageContent::ExtendedText(body));
            } else {
                content.push(MessageContent::Conversation(body));
            }
        }
        Some("image") => content.push(MessageContent::ImageCaption(text_at("/image/caption"))),
        Some("video") => content.push(MessageContent::VideoCaption(text_at("/video/caption"))),
        _ => {}
    }

    content.retain(|c| c.text().is_some());
    content
}

fn text_body(to: &str, text: &str) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": to,
        "type": "text",
        "text": {
            "preview_url": false,
            "body": text
        }
    })
}

fn media_body(to: &str, kind: &str, media: Value) -> Value {
    let mut body = json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": to,
        "type": kind,
    });
    body[kind] = media;
    body
}

#[cfg(test)]
mod tests;
