use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use session_tetris::adapter::server::{run_server, ServerConfig};
use session_tetris::adapter::SessionStore;

struct Client {
    lines: tokio::io::Lines<BufReader<OwnedReadHalf>>,
    write_half: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect failed");
        let (read_half, write_half) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            write_half,
        }
    }

    async fn request(&mut self, line: &str) -> serde_json::Value {
        self.write_half.write_all(line.as_bytes()).await.unwrap();
        self.write_half.write_all(b"\n").await.unwrap();
        self.write_half.flush().await.unwrap();

        let reply = tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("response timed out")
            .unwrap()
            .expect("connection closed");
        serde_json::from_str(&reply).unwrap()
    }
}

async fn start_server(store: SessionStore, log_path: Option<String>) -> std::net::SocketAddr {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        log_path,
    };
    let (ready_tx, ready_rx) = oneshot::channel();

    tokio::spawn(async move {
        let _ = run_server(config, store, Some(ready_tx)).await;
    });

    tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped")
}

#[tokio::test]
async fn session_start_move_update_and_state() {
    let addr = start_server(SessionStore::new(), None).await;
    let mut client = Client::connect(addr).await;

    let v = client.request(r#"{"type":"get_state","seq":1}"#).await;
    assert_eq!(v["type"], "error");
    assert_eq!(v["code"], "no_game");

    let v = client.request(r#"{"type":"start_game","seq":2,"level":2}"#).await;
    assert_eq!(v["type"], "ack");
    assert_eq!(v["seq"], 2);
    assert_eq!(v["status"], "success");

    let v = client.request(r#"{"type":"move","seq":3,"direction":"left"}"#).await;
    assert_eq!(v["type"], "move_result");
    assert_eq!(v["success"], true);
    assert_eq!(v["state"]["piece"]["x"], 2);

    let v = client.request(r#"{"type":"update","seq":4}"#).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["state"]["piece"]["y"], 1);

    let v = client.request(r#"{"type":"move","seq":5,"direction":"sideways"}"#).await;
    assert_eq!(v["code"], "unknown_command");

    let v = client.request(r#"{"type":"get_state","seq":6}"#).await;
    assert_eq!(v["type"], "state");
    assert_eq!(v["state"]["piece"]["x"], 2);
    assert_eq!(v["state"]["piece"]["y"], 1);
    assert_eq!(v["state"]["level_chosen"], 2);
    assert_eq!(v["state"]["level_speed"], 600);
}

#[tokio::test]
async fn named_session_survives_reconnect() {
    let store = SessionStore::new();
    let addr = start_server(store.clone(), None).await;

    {
        let mut first = Client::connect(addr).await;
        first
            .request(r#"{"type":"start_game","session":"alice","level":1}"#)
            .await;
        let v = first
            .request(r#"{"type":"move","session":"alice","direction":"right"}"#)
            .await;
        assert_eq!(v["state"]["piece"]["x"], 4);
    }

    let mut second = Client::connect(addr).await;
    let v = second
        .request(r#"{"type":"get_state","session":"alice"}"#)
        .await;
    assert_eq!(v["state"]["piece"]["x"], 4);

    // The new connection has no game of its own
    let v = second.request(r#"{"type":"get_state"}"#).await;
    assert_eq!(v["code"], "no_game");

    assert!(store.get("alice").await.is_some());
}

#[tokio::test]
async fn malformed_line_keeps_connection_open() {
    let addr = start_server(SessionStore::new(), None).await;
    let mut client = Client::connect(addr).await;

    let v = client.request("{not json").await;
    assert_eq!(v["code"], "invalid_request");

    let v = client.request(r#"{"type":"start_game"}"#).await;
    assert_eq!(v["type"], "ack");
}

#[tokio::test]
async fn wire_log_records_both_directions() {
    let path = std::env::temp_dir().join(format!("session-tetris-wire-{}.log", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let addr = start_server(
        SessionStore::new(),
        Some(path.to_string_lossy().into_owned()),
    )
    .await;
    let mut client = Client::connect(addr).await;
    client.request(r#"{"type":"start_game","seq":1}"#).await;

    // The log is written by a background task
    let mut contents = String::new();
    for _ in 0..50 {
        contents = std::fs::read_to_string(&path).unwrap_or_default();
        if contents.lines().count() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("start_game"));
    assert!(lines[1].contains("\"ack\""));

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn connection_session_is_dropped_on_disconnect() {
    let store = SessionStore::new();
    let addr = start_server(store.clone(), None).await;

    for i in 0..5 {
        let mut client = Client::connect(addr).await;
        let v = client.request(r#"{"type":"start_game"}"#).await;
        assert_eq!(v["type"], "ack");
        if i == 0 {
            client
                .request(r#"{"type":"start_game","session":"kept"}"#)
                .await;
        }
    }

    // Disconnects are noticed by the per-client tasks
    let mut remaining = usize::MAX;
    for _ in 0..100 {
        remaining = store.len().await;
        if remaining == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(remaining, 1);
    assert!(store.get("kept").await.is_some());
}
