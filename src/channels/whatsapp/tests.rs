use super::*;
use crate::error::TransportError;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn make_channel() -> WhatsAppChannel {
    WhatsAppChannel::new(
        "test-token".into(),
        "123456789".into(),
        "verify-me".into(),
        vec!["+1234567890".into()],
    )
}

fn open_channel(api_base: &str) -> WhatsAppChannel {
    WhatsAppChannel::new("tok".into(), "123".into(), "ver".into(), vec!["*".into()])
        .with_api_base(api_base)
}

fn payload_with(message: &serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "123",
            "changes": [{
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": {
                        "display_phone_number": "15551234567",
                        "phone_number_id": "123456789"
                    },
                    "messages": [message]
                },
                "field": "messages"
            }]
        }]
    })
}

#[test]
fn whatsapp_channel_name() {
    assert_eq!(make_channel().name(), "whatsapp");
}

#[test]
fn whatsapp_verify_token() {
    assert_eq!(make_channel().verify_token(), "verify-me");
}

#[test]
fn whatsapp_number_allowed_exact_and_wildcard() {
    let ch = make_channel();
    assert!(ch.is_number_allowed("+1234567890"));
    assert!(!ch.is_number_allowed("+9876543210"));

    let open = open_channel("http://unused");
    assert!(open.is_number_allowed("+9999999999"));
}

#[test]
fn whatsapp_parse_empty_payload() {
    let ch = make_channel();
    assert!(ch.parse_webhook_payload(&serde_json::json!({})).is_empty());
}

#[test]
fn whatsapp_parse_plain_text_as_conversation() {
    let ch = make_channel();
    let payload = payload_with(&serde_json::json!({
        "from": "1234567890",
        "id": "wamid.xxx",
        "timestamp": "1699999999",
        "type": "text",
        "text": { "body": "check https://example.com" }
    }));

    let msgs = ch.parse_webhook_payload(&payload);
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].id, "wamid.xxx");
    assert_eq!(msgs[0].chat_id, "+1234567890");
    assert!(!msgs[0].from_me);
    assert_eq!(msgs[0].timestamp, 1_699_999_999);
    assert_eq!(
        msgs[0].content,
        vec![MessageContent::Conversation(Some(
            "check https://example.com".into()
        ))]
    );
}

#[test]
fn whatsapp_parse_reply_as_extended_text() {
    let ch = make_channel();
    let payload = payload_with(&serde_json::json!({
        "from": "1234567890",
        "id": "wamid.reply",
        "type": "text",
        "context": { "from": "15551234567", "id": "wamid.orig" },
        "text": { "body": "www.example.org" }
    }));

    let msgs = ch.parse_webhook_payload(&payload);
    assert_eq!(
        msgs[0].content,
        vec![MessageContent::ExtendedText(Some("www.example.org".into()))]
    );
}

#[test]
fn whatsapp_parse_captions() {
    let ch = make_channel();
    let image = payload_with(&serde_json::json!({
        "from": "1234567890",
        "id": "wamid.img",
        "type": "image",
        "image": { "id": "media-1", "caption": "look https://a.io/x.png" }
    }));
    let video = payload_with(&serde_json::json!({
        "from": "1234567890",
        "id": "wamid.vid",
        "type": "video",
        "video": { "id": "media-2", "caption": "clip" }
    }));

    assert_eq!(
        ch.parse_webhook_payload(&image)[0].text(),
        Some("look https://a.io/x.png")
    );
    assert_eq!(
        ch.parse_webhook_payload(&video)[0].content,
        vec![MessageContent::VideoCaption(Some("clip".into()))]
    );
}

#[test]
fn whatsapp_parse_uncaptioned_media_skipped() {
    let ch = make_channel();
    let payload = payload_with(&serde_json::json!({
        "from": "1234567890",
        "type": "image",
        "image": { "id": "media-1" }
    }));
    assert!(ch.parse_webhook_payload(&payload).is_empty());
}

#[test]
fn whatsapp_parse_unauthorized_number() {
    let ch = make_channel();
    let payload = payload_with(&serde_json::json!({
        "from": "9999999999",
        "type": "text",
        "text": { "body": "Spam" }
    }));
    assert!(
        ch.parse_webhook_payload(&payload).is_empty(),
        "Unauthorized numbers should be filtered"
    );
}

#[test]
fn whatsapp_parse_own_number_sets_from_me() {
    let ch = make_channel();
    let payload = payload_with(&serde_json::json!({
        "from": "15551234567",
        "id": "wamid.self",
        "type": "text",
        "text": { "body": "https://example.com" }
    }));

    let msgs = ch.parse_webhook_payload(&payload);
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].from_me);
}

#[test]
fn whatsapp_media_body_nests_payload_under_kind() {
    let body = media_body("1555", "document", serde_json::json!({ "id": "m", "filename": "a.pdf" }));
    assert_eq!(body["type"], "document");
    assert_eq!(body["document"]["filename"], "a.pdf");
    assert_eq!(body["to"], "1555");
}

#[tokio::test]
async fn whatsapp_send_text_strips_plus_and_posts_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/123/messages"))
        .and(header("authorization", "Bearer tok"))
        .and(body_partial_json(serde_json::json!({
            "to": "15550001",
            "type": "text",
            "text": { "body": "hello" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let ch = open_channel(&server.uri());
    ch.send("+15550001", &OutboundMessage::text("hello"))
        .await
        .unwrap();
}

#[tokio::test]
async fn whatsapp_send_long_text_is_split() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/123/messages"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&server)
        .await;

    let ch = open_channel(&server.uri());
    let text = "x".repeat(MAX_TEXT_BODY * 2 + 1);
    ch.send("15550001", &OutboundMessage::text(text)).await.unwrap();
}

#[tokio::test]
async fn whatsapp_send_image_uploads_then_references_media_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/123/media"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "media-42" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/123/messages"))
        .and(body_partial_json(serde_json::json!({
            "type": "image",
            "image": { "id": "media-42", "caption": "https://example.com/cat.png" }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("1_cat.png");
    std::fs::write(&file, [0x89, b'P', b'N', b'G']).unwrap();

    let ch = open_channel(&server.uri());
    ch.send(
        "15550001",
        &OutboundMessage::Image {
            path: file,
            mimetype: "image/png".into(),
            caption: "https://example.com/cat.png".into(),
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn whatsapp_send_reports_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;

    let ch = open_channel(&server.uri());
    let err = ch
        .send("15550001", &OutboundMessage::text("hi"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("400"), "{err}");
}

#[tokio::test]
async fn whatsapp_mark_read_posts_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/123/messages"))
        .and(body_partial_json(serde_json::json!({
            "status": "read",
            "message_id": "wamid.1"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let ch = open_channel(&server.uri());
    ch.mark_read("15550001", "wamid.1").await.unwrap();
}

#[tokio::test]
async fn whatsapp_health_check_maps_401_to_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/123"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let ch = open_channel(&server.uri());
    let err = ch.health_check().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TransportError>(),
        Some(TransportError::Unauthorized { status: 401, .. })
    ));
}

#[tokio::test]
async fn whatsapp_health_check_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "123" })))
        .mount(&server)
        .await;

    assert!(open_channel(&server.uri()).health_check().await.is_ok());
}
