use super::recording_sender::RecordingSender;
use linkrelay::channels::{InboundMessage, MessageContent, OutboundMessage};
use linkrelay::config::FetchConfig;
use linkrelay::fetch::Fetcher;
use linkrelay::media::ScratchDir;
use linkrelay::{LinkRelay, Listener, RelayOutcome};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn listener(tmp: &TempDir) -> (Listener, Arc<RecordingSender>) {
    let fetcher = Fetcher::from_config(&FetchConfig::default()).unwrap();
    let scratch = ScratchDir::open(tmp.path()).await.unwrap();
    let relay = Arc::new(LinkRelay::new(fetcher, scratch, 65_536));
    let sender = Arc::new(RecordingSender::default());
    (Listener::new(relay, sender.clone()), sender)
}

fn inbound(from_me: bool, content: Vec<MessageContent>) -> InboundMessage {
    InboundMessage {
        id: "wamid.42".into(),
        chat_id: "+15550002".into(),
        from_me,
        timestamp: 1_700_000_000,
        content,
    }
}

#[tokio::test]
async fn chat_message_with_json_link_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .and(header("referer", server.uri().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"a":1}"#, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let (listener, sender) = listener(&tmp).await;
    let text = format!("check {}/data.json out", server.uri());

    let outcome = listener
        .handle(&inbound(
            false,
            vec![MessageContent::ExtendedText(Some(text))],
        ))
        .await;

    assert_eq!(outcome, Some(RelayOutcome::Text("{\n  \"a\": 1\n}".into())));
    assert_eq!(
        sender.sent(),
        vec![(
            "+15550002".to_string(),
            OutboundMessage::text("{\n  \"a\": 1\n}")
        )]
    );
    assert_eq!(sender.read(), vec!["wamid.42".to_string()]);
}

#[tokio::test]
async fn own_message_is_fetched_but_not_marked_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/note.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("note", "text/plain"))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let (listener, sender) = listener(&tmp).await;

    let outcome = listener
        .handle(&inbound(
            true,
            vec![MessageContent::Conversation(Some(format!(
                "{}/note.txt",
                server.uri()
            )))],
        ))
        .await;

    assert_eq!(outcome, Some(RelayOutcome::Text("note".into())));
    assert!(sender.read().is_empty());
}
