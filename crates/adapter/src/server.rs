//! TCP server for the session protocol
//!
//! Accepts connections and answers one response line per request line.
//! Game state lives in the shared [`SessionStore`], never in the connection,
//! so a client may reconnect and continue a named session.
//! Uses tokio for async networking.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::core::get_snapshot;
use crate::protocol::*;
use crate::store::SessionStore;
use crate::types::Action;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Append every inbound and outbound line to this file
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let host = env::var("TETRIS_SESSION_HOST").unwrap_or(defaults.host);
        let port = env::var("TETRIS_SESSION_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        let log_path = env::var("TETRIS_SESSION_WIRE_LOG")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });

        Self {
            host,
            port,
            log_path,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Start the TCP server
///
/// Sends the bound address on `ready_tx` once listening, then accepts
/// clients until the task is dropped or accepting fails.
pub async fn run_server(
    config: ServerConfig,
    store: SessionStore,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log_tx = config.log_path.clone().map(spawn_wire_log);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "session server listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let mut client_id_counter = 0usize;

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!(client_id, %addr, "client connected");

        let store = store.clone();
        let wire_log_tx = wire_log_tx.clone();

        tokio::spawn(async move {
            // Requests without a session key share this one
            let default_session = connection_session(client_id);
            if let Err(e) = handle_client(socket, &default_session, &store, wire_log_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            // Nobody can name the connection key again; named sessions stay
            if store.remove(&default_session).await.is_some() {
                debug!(client_id, "connection session dropped");
            }
            info!(client_id, "client disconnected");
        });
    }
}

/// Store key for requests that name no session
fn connection_session(client_id: usize) -> String {
    format!("conn-{}", client_id)
}

/// Background writer for the wire log; returns its line channel
fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<Vec<u8>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
        {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %path, error = %e, "wire log disabled");
                return;
            }
        };

        while let Some(mut line) = rx.recv().await {
            line.push(b'\n');
            if let Err(e) = async {
                file.write_all(&line).await?;
                file.flush().await
            }
            .await
            {
                warn!(path = %path, error = %e, "wire log write failed");
                break;
            }
        }

        let _ = file.flush().await;
    });
    tx
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    default_session: &str,
    store: &SessionStore,
    wire_log_tx: Option<mpsc::UnboundedSender<Vec<u8>>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let mut line = String::new();
    let mut buf: Vec<u8> = Vec::with_capacity(4096);

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            // Client disconnected
            break;
        }

        let raw_line = line.trim_end_matches(['\n', '\r']);
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(tx) = wire_log_tx.as_ref() {
            let _ = tx.send(raw_line.as_bytes().to_vec());
        }

        let response = handle_line(store, default_session, trimmed).await;

        buf.clear();
        serde_json::to_writer(&mut buf, &response)?;
        if let Some(tx) = wire_log_tx.as_ref() {
            let _ = tx.send(buf.clone());
        }
        buf.push(b'\n');
        writer.write_all(&buf).await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Parse one request line and answer it
pub async fn handle_line(store: &SessionStore, default_session: &str, line: &str) -> Response {
    match parse_request(line) {
        Ok(request) => handle_request(store, default_session, request).await,
        Err(e) => {
            warn!(error = %e, "malformed request");
            Response::Error(create_error(
                extract_seq(line),
                ErrorCode::InvalidRequest,
                &format!("Malformed request: {}", e),
            ))
        }
    }
}

/// Apply one request to the store
///
/// `default_session` is used when the request names no session.
pub async fn handle_request(
    store: &SessionStore,
    default_session: &str,
    request: Request,
) -> Response {
    let seq = request.seq();
    let session = request.session().unwrap_or(default_session).to_string();

    match request {
        Request::StartGame(r) => {
            let snap = store.start(&session, r.level).await;
            debug!(session = %session, level = snap.chosen_level, "game started");
            Response::Ack(create_ack(seq))
        }

        Request::GetState(_) => match store.get(&session).await {
            Some(snap) => Response::State(create_state(seq, &get_snapshot(&snap))),
            None => no_game(seq),
        },

        Request::Move(r) => {
            let Some(action) = Action::from_str(&r.direction) else {
                return Response::Error(create_error(
                    seq,
                    ErrorCode::UnknownCommand,
                    &format!("Unknown command: {}", r.direction),
                ));
            };
            apply(store, &session, seq, action).await
        }

        Request::Update(_) => apply(store, &session, seq, Action::Drop).await,

        Request::Unknown(u) => {
            warn!(msg_type = %u.msg_type, "unknown request type");
            Response::Error(create_error(
                seq,
                ErrorCode::InvalidRequest,
                &format!("Unknown request type: {}", u.msg_type),
            ))
        }
    }
}

async fn apply(store: &SessionStore, session: &str, seq: u64, action: Action) -> Response {
    match store.apply(session, action).await {
        Some(outcome) => {
            debug!(
                session = %session,
                action = action.as_str(),
                success = outcome.success(),
                score = outcome.snapshot.score,
                "action applied"
            );
            Response::MoveResult(create_move_result(seq, outcome.message(), &outcome.snapshot))
        }
        None => no_game(seq),
    }
}

fn no_game(seq: u64) -> Response {
    Response::Error(create_error(seq, ErrorCode::NoGame, "No game started"))
}
