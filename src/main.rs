//! Session server (default binary).
//!
//! Serves games over the line-delimited JSON protocol until the process is
//! stopped. Configure with `TETRIS_SESSION_HOST`, `TETRIS_SESSION_PORT`,
//! `TETRIS_SESSION_WIRE_LOG` and `RUST_LOG`.

use anyhow::Result;
use tracing::info;

use session_tetris::adapter::{run_server, ServerConfig, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "session_tetris=info,session_tetris_adapter=info".to_string()),
        )
        .init();

    let config = ServerConfig::from_env();
    info!(host = %config.host, port = config.port, wire_log = ?config.log_path, "starting");

    run_server(config, SessionStore::new(), None).await
}
