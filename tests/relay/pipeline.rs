use super::recording_sender::RecordingSender;
use async_trait::async_trait;
use linkrelay::channels::OutboundMessage;
use linkrelay::config::FetchConfig;
use linkrelay::error::FetchError;
use linkrelay::fetch::{FetchBody, FetchPolicy, FetchResult, FetchStrategy, Fetcher};
use linkrelay::media::ScratchDir;
use linkrelay::relay::format::TRUNCATION_SUFFIX;
use linkrelay::{LinkRelay, RelayOutcome};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MAX_CONTENT_LENGTH: u64 = 104_857_600;
const MAX_TEXT_CHARS: usize = 65_536;

fn fetch_config() -> FetchConfig {
    FetchConfig {
        timeout_secs: 5,
        ..FetchConfig::default()
    }
}

async fn http_relay(tmp: &TempDir, config: &FetchConfig) -> LinkRelay {
    let fetcher = Fetcher::from_config(config).unwrap();
    let scratch = ScratchDir::open(tmp.path()).await.unwrap();
    LinkRelay::new(fetcher, scratch, MAX_TEXT_CHARS)
}

fn scratch_files(tmp: &TempDir) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

#[tokio::test]
async fn json_link_is_relayed_as_pretty_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"a":1}"#, "application/json"))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let relay = http_relay(&tmp, &fetch_config()).await;
    let sender = RecordingSender::default();

    let outcome = relay
        .relay(&sender, "+15550001", &format!("{}/data.json", server.uri()))
        .await;

    assert_eq!(outcome, RelayOutcome::Text("{\n  \"a\": 1\n}".into()));
    assert_eq!(
        sender.sent(),
        vec![(
            "+15550001".to_string(),
            OutboundMessage::text("{\n  \"a\": 1\n}")
        )]
    );
    assert!(scratch_files(&tmp).is_empty());
}

#[tokio::test]
async fn png_link_is_relayed_as_captioned_image() {
    let server = MockServer::start().await;
    let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    Mock::given(method("GET"))
        .and(path("/pics/cat.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(png.clone(), "image/png"))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let relay = http_relay(&tmp, &fetch_config()).await;
    let sender = RecordingSender::default();
    let link = format!("{}/pics/cat.png", server.uri());

    relay.relay(&sender, "+15550001", &link).await;

    let files = scratch_files(&tmp);
    assert_eq!(files.len(), 1);
    assert_eq!(std::fs::read(&files[0]).unwrap(), png);

    let sent = sender.sent();
    assert_eq!(sent.len(), 1);
    match &sent[0].1 {
        OutboundMessage::Image {
            path,
            mimetype,
            caption,
        } => {
            assert_eq!(path, &files[0]);
            assert_eq!(mimetype, "image/png");
            assert_eq!(caption, &link);
        }
        other => panic!("expected image, got {other:?}"),
    }
}

#[tokio::test]
async fn mp4_link_is_relayed_as_captioned_video() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clips/intro.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![1_u8; 32], "video/mp4"))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let relay = http_relay(&tmp, &fetch_config()).await;
    let sender = RecordingSender::default();
    let link = format!("{}/clips/intro.mp4", server.uri());

    let outcome = relay.relay(&sender, "+15550001", &link).await;

    let files = scratch_files(&tmp);
    assert_eq!(files.len(), 1);
    assert_eq!(
        outcome,
        RelayOutcome::Video {
            path: files[0].clone(),
            mimetype: "video/mp4".into(),
            caption: link,
        }
    );
    assert_eq!(sender.sent().len(), 1);
    assert_eq!(sender.sent()[0].1.kind(), "video");
}

#[tokio::test]
async fn streamed_body_over_cap_is_refused_without_scratch_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big.bin"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![7_u8; 4096], "application/octet-stream"),
        )
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config = FetchConfig {
        max_content_length: 1024,
        ..fetch_config()
    };
    let relay = http_relay(&tmp, &config).await;
    let sender = RecordingSender::default();

    let outcome = relay
        .relay(&sender, "+15550001", &format!("{}/big.bin", server.uri()))
        .await;

    assert_eq!(
        outcome,
        RelayOutcome::Error("File too large: 4.00 KB (limit 1.00 KB)".into())
    );
    assert_eq!(sender.sent().len(), 1);
    assert!(scratch_files(&tmp).is_empty());
}

/// Declares a body larger than the default cap without ever sending it.
struct Oversized;

#[async_trait]
impl FetchStrategy for Oversized {
    fn name(&self) -> &str {
        "oversized"
    }

    async fn attempt(&self, url: &Url, _policy: &FetchPolicy) -> Result<FetchResult, FetchError> {
        Ok(FetchResult {
            url: url.clone(),
            strategy: "oversized".into(),
            content_type: Some("video/mp4".into()),
            content_length: Some(2 * MAX_CONTENT_LENGTH),
            body: FetchBody::Withheld,
        })
    }
}

#[tokio::test]
async fn declared_length_over_default_cap_is_one_error() {
    let tmp = TempDir::new().unwrap();
    let fetcher = Fetcher::new(
        vec![Box::new(Oversized)],
        FetchPolicy {
            timeout: Duration::from_secs(10),
            max_content_length: MAX_CONTENT_LENGTH,
        },
    );
    let scratch = ScratchDir::open(tmp.path()).await.unwrap();
    let relay = LinkRelay::new(fetcher, scratch, MAX_TEXT_CHARS);
    let sender = RecordingSender::default();

    let outcome = relay
        .relay(&sender, "+15550001", "https://videos.example/huge.mp4")
        .await;

    assert_eq!(
        outcome,
        RelayOutcome::Error("File too large: 200.00 MB (limit 100.00 MB)".into())
    );
    assert_eq!(sender.sent().len(), 1);
    assert!(scratch_files(&tmp).is_empty());
}

#[tokio::test]
async fn long_text_is_truncated_to_limit_plus_suffix() {
    let server = MockServer::start().await;
    let body = "x".repeat(MAX_TEXT_CHARS + 500);
    Mock::given(method("GET"))
        .and(path("/long.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/plain"))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let relay = http_relay(&tmp, &fetch_config()).await;
    let sender = RecordingSender::default();

    let outcome = relay
        .relay(&sender, "+15550001", &format!("{}/long.txt", server.uri()))
        .await;

    let RelayOutcome::Text(text) = outcome else {
        panic!("expected text outcome");
    };
    assert!(text.ends_with(TRUNCATION_SUFFIX));
    assert_eq!(
        text.chars().count(),
        MAX_TEXT_CHARS + TRUNCATION_SUFFIX.chars().count()
    );
}

#[tokio::test]
async fn all_strategies_failing_reports_last_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let relay = http_relay(&tmp, &fetch_config()).await;
    let sender = RecordingSender::default();

    let outcome = relay
        .relay(&sender, "+15550001", &format!("{}/down", server.uri()))
        .await;

    let expected = "Failed to fetch URL: plain-text: HTTP 503";
    assert_eq!(outcome, RelayOutcome::Error(expected.into()));
    assert_eq!(
        sender.sent(),
        vec![("+15550001".to_string(), OutboundMessage::text(expected))]
    );
    assert!(scratch_files(&tmp).is_empty());
}

#[tokio::test]
async fn second_strategy_rescues_a_refused_first_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/picky"))
        .respond_with(ResponseTemplate::new(403))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/picky"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("hello", "text/plain"))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let relay = http_relay(&tmp, &fetch_config()).await;

    let outcome = relay.resolve(&format!("{}/picky", server.uri())).await;
    assert_eq!(outcome, RelayOutcome::Text("hello".into()));
}
