#![allow(clippy::expect_used, clippy::unwrap_used)]

use chatrelay_core::RelayErr;
use chatrelay_core::config::CONFIG_TOML_FILE;
use chatrelay_core::config::Config;
use chatrelay_core::config::ConfigOverrides;
use chatrelay_core::send_message;
use chatrelay_stream::ConversationState;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_partial_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn load_sse_fixture_with_ids(conversation_id: &str, message_id: &str) -> String {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/turn.sse");
    std::fs::read_to_string(path)
        .expect("read fixture template")
        .replace("__CONV__", conversation_id)
        .replace("__MSG__", message_id)
}

fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_raw(body, "text/event-stream")
}

fn write_config(home: &TempDir, server: &MockServer, extra: &str) -> Config {
    let path = home.path().join(CONFIG_TOML_FILE);
    let contents = format!(
        "base_url = \"{}\"\nuser_token = \"tok\"\ncookie = \"session=abc\"\n{extra}",
        server.uri()
    );
    std::fs::write(&path, contents).expect("write config");
    Config::load_with_overrides(ConfigOverrides {
        config_path: Some(path),
        ..Default::default()
    })
    .expect("load config")
}

#[tokio::test]
async fn first_turn_decodes_reply_and_persists_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/backend-api/conversation"))
        .and(header("authorization", "Bearer tok"))
        .and(header("accept", "text/event-stream"))
        .and(header("cookie", "session=abc"))
        .respond_with(sse_response(load_sse_fixture_with_ids("conv-1", "msg-1")))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let config = write_config(&home, &server, "");
    let turn = send_message(&config, "hello").await.expect("turn");

    assert_eq!(turn.reply, "Sure, here you go.");
    assert_eq!(
        turn.conversation,
        ConversationState {
            conversation_id: Some("conv-1".to_string()),
            assistant_message_id: Some("msg-1".to_string()),
        }
    );
    assert!(turn.persisted);

    let requests = server.received_requests().await.expect("recorded requests");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    assert_eq!(body["action"], "next");
    assert_eq!(body["model"], "auto");
    assert_eq!(body["messages"][0]["content"]["parts"][0], "hello");
    assert!(body.get("conversation_id").is_none());
    assert!(body.get("parent_message_id").is_none());

    let reloaded = Config::load_with_overrides(ConfigOverrides {
        config_path: Some(config.config_path.clone()),
        ..Default::default()
    })
    .expect("reload");
    assert_eq!(reloaded.conversation, turn.conversation);
    assert_eq!(reloaded.user_token.as_deref(), Some("tok"));
}

#[tokio::test]
async fn follow_up_turn_sends_stored_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/backend-api/conversation"))
        .and(body_partial_json(serde_json::json!({
            "conversation_id": "conv-1",
            "parent_message_id": "msg-1",
        })))
        .respond_with(sse_response(load_sse_fixture_with_ids("conv-1", "msg-2")))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let config = write_config(
        &home,
        &server,
        "conversation_id = \"conv-1\"\nparent_message_id = \"msg-1\"\n",
    );
    let turn = send_message(&config, "and then?").await.expect("turn");
    assert_eq!(turn.conversation.assistant_message_id.as_deref(), Some("msg-2"));

    let contents = std::fs::read_to_string(&config.config_path).expect("read config");
    assert!(contents.contains("parent_message_id = \"msg-2\""), "{contents}");
}

#[tokio::test]
async fn non_ok_status_is_an_error_and_keeps_config() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/backend-api/conversation"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let config = write_config(&home, &server, "");
    let before = std::fs::read_to_string(&config.config_path).unwrap();

    let err = send_message(&config, "hello").await.expect_err("should fail");
    match err {
        RelayErr::UnexpectedStatus { status, body } => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(body, "forbidden");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(std::fs::read_to_string(&config.config_path).unwrap(), before);
}

#[tokio::test]
async fn response_without_ids_is_not_persisted() {
    let server = MockServer::start().await;
    let body = "event: delta\n\
                data: {\"p\": \"/message/content/parts/0\", \"o\": \"append\", \"v\": \"just text\"}\n\
                data: [DONE]\n";
    Mock::given(method("POST"))
        .and(path("/backend-api/conversation"))
        .respond_with(sse_response(body.to_string()))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let config = write_config(&home, &server, "conversation_id = \"keep\"\n");
    let turn = send_message(&config, "hello").await.expect("turn");

    assert_eq!(turn.reply, "just text");
    assert_eq!(turn.conversation, ConversationState::default());
    assert!(!turn.persisted);
    let contents = std::fs::read_to_string(&config.config_path).unwrap();
    assert!(contents.contains("conversation_id = \"keep\""));
}
