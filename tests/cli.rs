use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::{json, Value};
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestEnv {
    api: String,
    dir: tempfile::TempDir,
}

impl TestEnv {
    fn new(server: &MockServer) -> Self {
        TestEnv {
            api: format!("{}/api/webhooks", server.uri()),
            dir: tempfile::TempDir::new().unwrap(),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_stoat-wh"));
        cmd.args(args)
            .env("STOAT_API", &self.api)
            .env("STOAT_WH_CONFIG", self.dir.path().join("config.toml"))
            .env_remove("STOAT_WH_LOG");
        cmd
    }

    async fn run(&self, args: &[&str]) -> Output {
        let mut cmd = self.command(args);
        tokio::task::spawn_blocking(move || cmd.output().unwrap())
            .await
            .unwrap()
    }

    async fn run_with_stdin(&self, args: &[&str], input: &'static str) -> Output {
        let mut cmd = self.command(args);
        tokio::task::spawn_blocking(move || {
            let mut child = cmd
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .unwrap();
            // the child may exit without reading stdin at all
            let _ = child.stdin.take().unwrap().write_all(input.as_bytes());
            child.wait_with_output().unwrap()
        })
        .await
        .unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

async fn sent_json(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    requests[0].body_json().unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn get_json_prints_body_verbatim() {
    let server = MockServer::start().await;
    let webhook = json!({
        "id": "01ABC",
        "name": "Deploy bot",
        "creator_id": "01USR",
        "channel_id": "01CHN",
        "permissions": 8,
        "avatar": null,
    });
    Mock::given(method("GET"))
        .and(path("/api/webhooks/01ABC/TOKEN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&webhook))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new(&server);
    let output = env.run(&["get", "01ABC", "TOKEN", "--json"]).await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        format!("{}\n", serde_json::to_string_pretty(&webhook).unwrap())
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn url_and_pair_hit_the_same_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/webhooks/01ABC/TOKEN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "01ABC", "name": "hook"})))
        .expect(2)
        .mount(&server)
        .await;

    let env = TestEnv::new(&server);
    let by_pair = env.run(&["get", "01ABC", "TOKEN"]).await;
    let by_url = env
        .run(&["get", "https://stoat.chat/api/webhooks/01ABC/TOKEN"])
        .await;
    assert!(by_pair.status.success());
    assert_eq!(stdout(&by_pair), stdout(&by_url));
    assert!(stdout(&by_pair).starts_with("Webhook ID : 01ABC\nName       : hook\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn not_found_is_one_line_without_debug() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Webhook not found"})))
        .mount(&server)
        .await;

    let env = TestEnv::new(&server);
    let output = env.run(&["get", "01ABC", "TOKEN"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert_eq!(stderr(&output), "Error: HTTP 404: Webhook not found\n");

    let output = env.run(&["--debug", "get", "01ABC", "TOKEN"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        "Error: HTTP 404: Webhook not found\n{\n  \"message\": \"Webhook not found\"\n}\n"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn edit_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/webhooks/01ABC/TOKEN"))
        .and(body_json(json!({"name": "Renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "01ABC", "name": "Renamed"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/webhooks/01ABC/TOKEN"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new(&server);
    let output = env.run(&["edit", "01ABC", "TOKEN", "--name", "Renamed"]).await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "Webhook updated.\n");

    let output = env.run(&["delete", "01ABC", "TOKEN"]).await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "Webhook deleted.\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn send_content_beats_piped_stdin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/webhooks/01ABC/TOKEN"))
        .and(header_exists("Idempotency-Key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "01MSG"})))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new(&server);
    let output = env
        .run_with_stdin(&["send", "01ABC", "TOKEN", "--content", "hi"], "ignored\n")
        .await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "Message sent.\nMessage ID: 01MSG\n");
    assert_eq!(sent_json(&server).await, json!({"content": "hi"}));
}

#[tokio::test(flavor = "multi_thread")]
async fn send_reads_piped_stdin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "01MSG"})))
        .mount(&server)
        .await;

    let env = TestEnv::new(&server);
    let output = env
        .run_with_stdin(
            &["send", "01ABC", "TOKEN", "--username", "CI", "--reply", "01PREV"],
            "build passed\n",
        )
        .await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        sent_json(&server).await,
        json!({
            "content": "build passed",
            "replies": [{"id": "01PREV", "mention": false}],
            "masquerade": {"name": "CI"},
        })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn send_embed_from_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "01MSG"})))
        .mount(&server)
        .await;

    let env = TestEnv::new(&server);
    let embed_path = env.dir.path().join("embed.json");
    std::fs::write(&embed_path, r#"{"type":"Text","title":"Hello"}"#).unwrap();

    let output = env
        .run(&["send", "01ABC", "TOKEN", "--embed", embed_path.to_str().unwrap()])
        .await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        sent_json(&server).await,
        json!({"embeds": [{"type": "Text", "title": "Hello"}]})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_send_never_reaches_the_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let env = TestEnv::new(&server);
    let output = env.run(&["send", "01ABC", "TOKEN"]).await;
    assert_eq!(output.status.code(), Some(6));
    assert!(stderr(&output).starts_with("Error: need content"));
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_url_never_reaches_the_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let env = TestEnv::new(&server);
    for url in [
        "https://stoat.chat/api/hooks/01ABC/TOKEN",
        "https://stoat.chat/api/webhooks/01ABC",
    ] {
        let output = env.run(&["get", url]).await;
        assert_eq!(output.status.code(), Some(4), "{url}");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_option_exit_code() {
    let server = MockServer::start().await;
    let env = TestEnv::new(&server);
    let output = env.run(&["get", "01ABC", "TOKEN", "--nope"]).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(server.received_requests().await.unwrap().is_empty());
}
