//! Adapter module - session server over TCP with a JSON protocol
//!
//! Hosts any number of games, one per session key, and lets clients drive
//! them one action per request. The engine itself is stateless between
//! requests: every request loads the stored snapshot, applies one action and
//! stores the result.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Session**: Each request may name a `session`; otherwise the connection's own key is used,
//!    and that game is dropped when the connection closes
//! 3. **Request/Response**: Every request line gets exactly one response line
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **start_game**: Start or restart a game at `level` (1 to 3)
//! - **get_state**: Read the stored snapshot
//! - **move**: Apply `direction` (`left`, `right`, `down`, `rotate`)
//! - **update**: Gravity tick, same as `move` `down`
//!
//! ## Server → Client
//!
//! - **ack**: `start_game` succeeded
//! - **state**: Snapshot of the session
//! - **move_result**: `success`, optional `error` text and the stored snapshot
//! - **error**: `no_game`, `unknown_command` or `invalid_request`
//!
//! # Environment Variables
//!
//! - `TETRIS_SESSION_HOST`: Bind address (default: "127.0.0.1")
//! - `TETRIS_SESSION_PORT`: Port number (default: 7878)
//! - `TETRIS_SESSION_WIRE_LOG`: Append every request and response line to this file
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"start_game","seq":1,"level":1}
//! Server -> Client: {"type":"ack","seq":1,"ts":1234567890,"status":"success"}
//! Client -> Server: {"type":"move","seq":2,"direction":"left"}
//! Server -> Client: {"type":"move_result","seq":2,"ts":1234567891,"success":true,"state":{...}}
//! Client -> Server: {"type":"move","seq":3,"direction":"jump"}
//! Server -> Client: {"type":"error","seq":3,"ts":1234567892,"code":"unknown_command","message":"Unknown command: jump"}
//! ```
//!
//! # Testing
//!
//! Connect to the server using netcat for manual testing:
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"start_game","seq":1,"level":2}
//! ```

pub mod protocol;
pub mod server;
pub mod store;

pub use session_tetris_core as core;
pub use session_tetris_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use server::*;
pub use store::SessionStore;
