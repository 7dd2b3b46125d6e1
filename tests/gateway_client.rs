//! Wire-level tests for the gateway-backed client.

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tgvault::client::{ChannelInfo, GatewayClient, TelegramClient};
use tgvault::{MediaPayload, Message};

fn sample_channel() -> ChannelInfo {
    ChannelInfo {
        id: 7,
        title: "Rust News".into(),
        unread_count: 2,
    }
}

fn sample_message(id: i64) -> Message {
    serde_json::from_value(json!({
        "id": id,
        "date": "2026-08-26T10:00:00Z",
        "media": { "type": "photo" }
    }))
    .unwrap()
}

#[tokio::test]
async fn connect_posts_session_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/connect"))
        .and(body_json(json!({ "session": "work" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = GatewayClient::new(server.uri()).with_session_name("work");
    client.connect().await.unwrap();
}

#[tokio::test]
async fn connect_surfaces_gateway_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/connect"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = GatewayClient::new(server.uri());
    let err = client.connect().await.unwrap_err();
    assert!(err.to_string().contains("gateway connect failed"));
}

#[tokio::test]
async fn list_channels_parses_dialog_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "title": "Alpha", "unread_count": 3 },
            { "id": 2, "title": "Beta", "unread_count": 0 }
        ])))
        .mount(&server)
        .await;

    let client = GatewayClient::new(server.uri());
    let channels = client.list_channels().await.unwrap();
    assert_eq!(channels.len(), 2);
    assert_eq!(channels[0].title, "Alpha");
    assert_eq!(channels[1].unread_count, 0);
}

#[tokio::test]
async fn unread_messages_parses_media_variants() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels/7/unread"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 10,
                "date": "2026-08-26T10:00:00Z",
                "text": "a photo",
                "media": { "type": "photo" }
            },
            {
                "id": 11,
                "date": "2026-08-26T10:05:00Z",
                "media": {
                    "type": "document",
                    "mime_type": "video/mp4",
                    "file_name": "clip.mp4",
                    "size": 2048
                }
            },
            { "id": 12, "date": "2026-08-26T10:06:00Z", "text": "plain" }
        ])))
        .mount(&server)
        .await;

    let client = GatewayClient::new(server.uri());
    let messages = client.unread_messages(&sample_channel()).await.unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].media, Some(MediaPayload::Photo));
    assert_eq!(messages[1].mime_type(), Some("video/mp4"));
    assert!(messages[2].media.is_none());
}

#[tokio::test]
async fn download_writes_bytes_to_destination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages/10/content"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("photo.jpg");

    let client = GatewayClient::new(server.uri());
    let written = client
        .download(&sample_message(10), &destination)
        .await
        .unwrap();

    assert_eq!(written, Some(10));
    assert_eq!(std::fs::read(&destination).unwrap(), b"jpeg-bytes");
}

#[tokio::test]
async fn download_reports_no_content_as_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages/11/content"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("missing.bin");

    let client = GatewayClient::new(server.uri());
    let written = client
        .download(&sample_message(11), &destination)
        .await
        .unwrap();

    assert_eq!(written, None);
    assert!(!destination.exists());
}

#[tokio::test]
async fn download_error_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages/12/content"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = GatewayClient::new(server.uri());
    let err = client
        .download(&sample_message(12), &dir.path().join("x.bin"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn acknowledge_read_posts_latest_message_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/7/read"))
        .and(body_json(json!({ "up_to": 42 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = GatewayClient::new(server.uri());
    client
        .acknowledge_read(&sample_channel(), 42)
        .await
        .unwrap();
}
