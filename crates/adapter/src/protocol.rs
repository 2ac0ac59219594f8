//! Protocol module - JSON message types for the session server
//!
//! Line-delimited JSON: one request per line, one response per line.
//! Every message has a `type` tag and a `seq` (echoed back on responses).
//! Responses also carry `ts` (timestamp in ms).
//!
//! Snapshots travel in the session layout: a nested `grid.grid` of one-letter
//! strings, `current_index`, `piece {letter, shape, x, y}` and the scoring and
//! level fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{GameSnapshot, PieceSnapshot, Shape};
use crate::types::{Cell, PieceKind, COLS, MAX_SHAPE_SIDE, ROWS};

// ============== Client -> Server Messages ==============

/// Start (or restart) the game of a session
#[derive(Debug, Clone, Deserialize)]
pub struct StartGameRequest {
    #[serde(default)]
    pub seq: u64,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default = "default_level")]
    pub level: u32,
}

/// Read the stored snapshot of a session
#[derive(Debug, Clone, Deserialize)]
pub struct GetStateRequest {
    #[serde(default)]
    pub seq: u64,
    #[serde(default)]
    pub session: Option<String>,
}

/// Apply one direction to the session's game
///
/// `direction` stays a raw string so an unknown value can be answered with
/// `unknown_command` instead of a parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveRequest {
    #[serde(default)]
    pub seq: u64,
    #[serde(default)]
    pub session: Option<String>,
    pub direction: String,
}

/// Gravity tick, same effect as `move` with direction `down`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub seq: u64,
    #[serde(default)]
    pub session: Option<String>,
}

/// Parsed incoming request
#[derive(Debug, Clone)]
pub enum Request {
    StartGame(StartGameRequest),
    GetState(GetStateRequest),
    Move(MoveRequest),
    Update(UpdateRequest),
    Unknown(UnknownRequest),
}

impl Request {
    pub fn seq(&self) -> u64 {
        match self {
            Request::StartGame(r) => r.seq,
            Request::GetState(r) => r.seq,
            Request::Move(r) => r.seq,
            Request::Update(r) => r.seq,
            Request::Unknown(r) => r.seq,
        }
    }

    /// Explicit session key, if the client sent one
    pub fn session(&self) -> Option<&str> {
        match self {
            Request::StartGame(r) => r.session.as_deref(),
            Request::GetState(r) => r.session.as_deref(),
            Request::Move(r) => r.session.as_deref(),
            Request::Update(r) => r.session.as_deref(),
            Request::Unknown(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRequest {
    pub seq: u64,
    pub msg_type: String,
}

const KNOWN_TYPES: [&str; 4] = ["start_game", "get_state", "move", "update"];

/// Parse a JSON request from a line
pub fn parse_request(json: &str) -> Result<Request, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum Inbound {
        #[serde(rename = "start_game")]
        StartGame(StartGameRequest),
        #[serde(rename = "get_state")]
        GetState(GetStateRequest),
        #[serde(rename = "move")]
        Move(MoveRequest),
        #[serde(rename = "update")]
        Update(UpdateRequest),
    }

    match serde_json::from_str::<Inbound>(json) {
        Ok(Inbound::StartGame(r)) => Ok(Request::StartGame(r)),
        Ok(Inbound::GetState(r)) => Ok(Request::GetState(r)),
        Ok(Inbound::Move(r)) => Ok(Request::Move(r)),
        Ok(Inbound::Update(r)) => Ok(Request::Update(r)),
        Err(e) => {
            // An unrecognised type is answered, not treated as a broken line.
            #[derive(Debug, Deserialize)]
            struct Envelope {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let envelope = serde_json::from_str::<Envelope>(json)?;
            let msg_type = envelope.msg_type.unwrap_or_else(|| "unknown".to_string());
            if KNOWN_TYPES.contains(&msg_type.as_str()) {
                return Err(e);
            }
            Ok(Request::Unknown(UnknownRequest {
                seq: envelope.seq.unwrap_or(0),
                msg_type,
            }))
        }
    }
}

/// Best-effort `seq` of a line that failed to parse
pub fn extract_seq(json: &str) -> u64 {
    #[derive(Deserialize)]
    struct SeqOnly {
        seq: Option<u64>,
    }
    serde_json::from_str::<SeqOnly>(json)
        .ok()
        .and_then(|s| s.seq)
        .unwrap_or(0)
}

// ============== Server -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "success")]
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateType {
    #[serde(rename = "state")]
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveResultType {
    #[serde(rename = "move_result")]
    MoveResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "no_game")]
    NoGame,
    #[serde(rename = "unknown_command")]
    UnknownCommand,
    #[serde(rename = "invalid_request")]
    InvalidRequest,
}

/// Acknowledgment for `start_game`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

/// Current snapshot of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMessage {
    #[serde(rename = "type")]
    pub msg_type: StateType,
    pub seq: u64,
    pub ts: u64,
    pub state: WireSnapshot,
}

/// Outcome of `move` or `update`
///
/// `state` is the persisted snapshot, whether or not the action succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveResultMessage {
    #[serde(rename = "type")]
    pub msg_type: MoveResultType,
    pub seq: u64,
    pub ts: u64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub state: WireSnapshot,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Any server response; each variant carries its own `type` tag
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    Ack(AckMessage),
    State(StateMessage),
    MoveResult(MoveResultMessage),
    Error(ErrorMessage),
}

// ============== Wire Snapshot ==============

/// One grid or shape cell: `"."` when empty, otherwise the piece letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireCell(pub Cell);

impl<'de> Deserialize<'de> for WireCell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = WireCell;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "\".\" or a piece letter")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v == "." {
                    return Ok(WireCell(None));
                }
                PieceKind::from_str(v)
                    .map(|k| WireCell(Some(k)))
                    .ok_or_else(|| E::custom(format!("unknown cell {:?}", v)))
            }
        }

        deserializer.deserialize_str(V)
    }
}

impl Serialize for WireCell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.0 {
            Some(kind) => serializer.serialize_str(kind.as_str()),
            None => serializer.serialize_str("."),
        }
    }
}

/// Piece letter, one uppercase character on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Letter(pub PieceKind);

impl<'de> Deserialize<'de> for Letter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PieceKind::from_str(&s)
            .map(Letter)
            .ok_or_else(|| serde::de::Error::custom("unknown piece letter"))
    }
}

impl Serialize for Letter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireGrid {
    pub grid: Vec<Vec<WireCell>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePiece {
    pub letter: Letter,
    pub shape: Vec<Vec<WireCell>>,
    pub x: i8,
    pub y: i8,
}

fn default_level() -> u32 {
    1
}

fn default_level_speed() -> u32 {
    1000
}

/// Snapshot in the session layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSnapshot {
    pub grid: WireGrid,
    pub current_index: u32,
    pub piece: WirePiece,
    pub score: u32,
    #[serde(default)]
    pub lines_cleared: u32,
    #[serde(default = "default_level")]
    pub current_level: u32,
    #[serde(default = "default_level_speed")]
    pub level_speed: u32,
    pub game_over: bool,
    #[serde(default = "default_level")]
    pub level_chosen: u32,
}

impl From<&GameSnapshot> for WireSnapshot {
    fn from(snap: &GameSnapshot) -> Self {
        let grid = snap
            .grid
            .iter()
            .map(|row| row.iter().map(|&c| WireCell(c)).collect())
            .collect();

        let letter = snap.piece.kind;
        let shape = snap
            .piece
            .shape
            .rows()
            .map(|row| {
                row.iter()
                    .map(|&filled| WireCell(filled.then_some(letter)))
                    .collect()
            })
            .collect();

        Self {
            grid: WireGrid { grid },
            current_index: snap.cursor as u32,
            piece: WirePiece {
                letter: Letter(letter),
                shape,
                x: snap.piece.x,
                y: snap.piece.y,
            },
            score: snap.score,
            lines_cleared: snap.lines_cleared,
            current_level: snap.current_level,
            level_speed: snap.fall_interval_ms,
            game_over: snap.game_over,
            level_chosen: snap.chosen_level,
        }
    }
}

/// Why a wire snapshot could not be turned into a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    GridHeight(usize),
    GridWidth { row: usize, len: usize },
    Shape,
    Cursor(u32),
    Origin { x: i8, y: i8 },
}

/// Origins a decoded piece may have: up to one shape side outside the grid
fn origin_in_range(x: i8, y: i8) -> bool {
    let margin = MAX_SHAPE_SIDE as i8;
    (-margin..=COLS as i8).contains(&x) && (-margin..=ROWS as i8).contains(&y)
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::GridHeight(h) => write!(f, "grid has {} rows, expected {}", h, ROWS),
            DecodeError::GridWidth { row, len } => {
                write!(f, "grid row {} has {} cells, expected {}", row, len, COLS)
            }
            DecodeError::Shape => write!(
                f,
                "piece shape must be a non-empty rectangle of at most {}x{}",
                MAX_SHAPE_SIDE, MAX_SHAPE_SIDE
            ),
            DecodeError::Cursor(i) => write!(
                f,
                "current_index {} out of range 0..{}",
                i,
                PieceKind::ALPHABET.len()
            ),
            DecodeError::Origin { x, y } => {
                write!(f, "piece origin ({}, {}) is too far outside the grid", x, y)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl TryFrom<&WireSnapshot> for GameSnapshot {
    type Error = DecodeError;

    fn try_from(wire: &WireSnapshot) -> Result<Self, Self::Error> {
        if wire.grid.grid.len() != ROWS {
            return Err(DecodeError::GridHeight(wire.grid.grid.len()));
        }
        let mut grid = [[None; COLS]; ROWS];
        for (y, (dst, src)) in grid.iter_mut().zip(&wire.grid.grid).enumerate() {
            if src.len() != COLS {
                return Err(DecodeError::GridWidth {
                    row: y,
                    len: src.len(),
                });
            }
            for (d, s) in dst.iter_mut().zip(src) {
                *d = s.0;
            }
        }

        let rows: Vec<Vec<bool>> = wire
            .piece
            .shape
            .iter()
            .map(|row| row.iter().map(|c| c.0.is_some()).collect())
            .collect();
        let shape = Shape::from_rows(&rows).ok_or(DecodeError::Shape)?;

        if !origin_in_range(wire.piece.x, wire.piece.y) {
            return Err(DecodeError::Origin {
                x: wire.piece.x,
                y: wire.piece.y,
            });
        }

        if wire.current_index as usize >= PieceKind::ALPHABET.len() {
            return Err(DecodeError::Cursor(wire.current_index));
        }

        Ok(GameSnapshot {
            grid,
            piece: PieceSnapshot {
                kind: wire.piece.letter.0,
                shape,
                x: wire.piece.x,
                y: wire.piece.y,
            },
            cursor: wire.current_index as u8,
            score: wire.score,
            lines_cleared: wire.lines_cleared,
            chosen_level: wire.level_chosen,
            current_level: wire.current_level,
            fall_interval_ms: wire.level_speed,
            game_over: wire.game_over,
        })
    }
}

// ============== Utility Functions ==============

/// Create a `start_game` acknowledgment
pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Success,
    }
}

/// Create a state message
pub fn create_state(seq: u64, snapshot: &GameSnapshot) -> StateMessage {
    StateMessage {
        msg_type: StateType::State,
        seq,
        ts: current_timestamp_ms(),
        state: WireSnapshot::from(snapshot),
    }
}

/// Create a move result
pub fn create_move_result(
    seq: u64,
    error: Option<String>,
    snapshot: &GameSnapshot,
) -> MoveResultMessage {
    MoveResultMessage {
        msg_type: MoveResultType::MoveResult,
        seq,
        ts: current_timestamp_ms(),
        success: error.is_none(),
        error,
        state: WireSnapshot::from(snapshot),
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{apply_action, new_game};
    use crate::types::Action;

    #[test]
    fn test_parse_start_game() {
        let json = r#"{"type":"start_game","seq":1,"level":2}"#;
        match parse_request(json).unwrap() {
            Request::StartGame(r) => {
                assert_eq!(r.seq, 1);
                assert_eq!(r.level, 2);
                assert_eq!(r.session, None);
            }
            other => panic!("Expected StartGame, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_start_game_defaults_level() {
        let json = r#"{"type":"start_game"}"#;
        match parse_request(json).unwrap() {
            Request::StartGame(r) => assert_eq!(r.level, 1),
            other => panic!("Expected StartGame, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_move_with_session() {
        let json = r#"{"type":"move","seq":4,"session":"alice","direction":"rotate"}"#;
        let req = parse_request(json).unwrap();
        assert_eq!(req.seq(), 4);
        assert_eq!(req.session(), Some("alice"));
        match req {
            Request::Move(r) => assert_eq!(r.direction, "rotate"),
            other => panic!("Expected Move, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_unknown_type() {
        let json = r#"{"type":"hold","seq":9}"#;
        match parse_request(json).unwrap() {
            Request::Unknown(u) => {
                assert_eq!(u.seq, 9);
                assert_eq!(u.msg_type, "hold");
            }
            other => panic!("Expected Unknown, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_known_type_missing_field_is_error() {
        assert!(parse_request(r#"{"type":"move","seq":2}"#).is_err());
        assert!(parse_request("not json").is_err());
        assert_eq!(extract_seq(r#"{"type":"move","seq":2}"#), 2);
        assert_eq!(extract_seq("not json"), 0);
    }

    #[test]
    fn test_wire_snapshot_layout() {
        let snap = new_game(1);
        let value = serde_json::to_value(WireSnapshot::from(&snap)).unwrap();

        assert_eq!(value["grid"]["grid"].as_array().unwrap().len(), ROWS);
        assert_eq!(value["grid"]["grid"][0].as_array().unwrap().len(), COLS);
        assert_eq!(value["grid"]["grid"][0][0], ".");
        assert_eq!(value["current_index"], 0);
        assert_eq!(value["piece"]["letter"], "I");
        assert_eq!(value["piece"]["shape"][0][0], "I");
        assert_eq!(value["piece"]["shape"][0][1], ".");
        assert_eq!(value["piece"]["x"], 3);
        assert_eq!(value["piece"]["y"], 0);
        assert_eq!(value["score"], 0);
        assert_eq!(value["lines_cleared"], 0);
        assert_eq!(value["current_level"], 1);
        assert_eq!(value["level_speed"], 1000);
        assert_eq!(value["game_over"], false);
        assert_eq!(value["level_chosen"], 1);
    }

    #[test]
    fn test_wire_snapshot_decodes_back() {
        let mut snap = new_game(2);
        for action in [Action::Right, Action::Rotate, Action::Drop, Action::Drop] {
            snap = apply_action(&snap, action).snapshot;
        }
        snap.grid[19][0] = Some(PieceKind::Z);

        let json = serde_json::to_string(&WireSnapshot::from(&snap)).unwrap();
        let wire: WireSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(GameSnapshot::try_from(&wire).unwrap(), snap);
    }

    #[test]
    fn test_wire_snapshot_defaults() {
        let mut value = serde_json::to_value(WireSnapshot::from(&new_game(3))).unwrap();
        let obj = value.as_object_mut().unwrap();
        for key in ["lines_cleared", "current_level", "level_speed", "level_chosen"] {
            obj.remove(key);
        }

        let wire: WireSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(wire.lines_cleared, 0);
        assert_eq!(wire.current_level, 1);
        assert_eq!(wire.level_speed, 1000);
        assert_eq!(wire.level_chosen, 1);
    }

    #[test]
    fn test_decode_rejects_bad_snapshots() {
        let good = WireSnapshot::from(&new_game(1));

        let mut wire = good.clone();
        wire.grid.grid.pop();
        assert_eq!(
            GameSnapshot::try_from(&wire),
            Err(DecodeError::GridHeight(ROWS - 1))
        );

        let mut wire = good.clone();
        wire.grid.grid[5].push(WireCell(None));
        assert_eq!(
            GameSnapshot::try_from(&wire),
            Err(DecodeError::GridWidth { row: 5, len: COLS + 1 })
        );

        let mut wire = good.clone();
        wire.piece.shape = vec![vec![WireCell(None); 5]; 5];
        assert_eq!(GameSnapshot::try_from(&wire), Err(DecodeError::Shape));

        let mut wire = good.clone();
        wire.piece.x = i8::MAX;
        assert_eq!(
            GameSnapshot::try_from(&wire),
            Err(DecodeError::Origin { x: i8::MAX, y: 0 })
        );

        let mut wire = good.clone();
        wire.piece.y = -5;
        assert!(matches!(
            GameSnapshot::try_from(&wire),
            Err(DecodeError::Origin { .. })
        ));

        // Edges of the accepted window still decode
        let mut wire = good.clone();
        wire.piece.x = COLS as i8;
        wire.piece.y = -4;
        assert!(GameSnapshot::try_from(&wire).is_ok());

        let mut wire = good;
        wire.current_index = 7;
        assert_eq!(GameSnapshot::try_from(&wire), Err(DecodeError::Cursor(7)));
    }

    #[test]
    fn test_wire_cell_rejects_unknown_letter() {
        assert!(serde_json::from_str::<WireCell>(r#""X""#).is_err());
        assert_eq!(
            serde_json::from_str::<WireCell>(r#""t""#).unwrap(),
            WireCell(Some(PieceKind::T))
        );
    }

    #[test]
    fn test_move_result_omits_error_on_success() {
        let snap = new_game(1);
        let ok = serde_json::to_value(create_move_result(3, None, &snap)).unwrap();
        assert_eq!(ok["type"], "move_result");
        assert_eq!(ok["success"], true);
        assert!(ok.get("error").is_none());

        let failed = create_move_result(4, Some("invalid move: left".to_string()), &snap);
        let failed = serde_json::to_value(failed).unwrap();
        assert_eq!(failed["success"], false);
        assert_eq!(failed["error"], "invalid move: left");
    }

    #[test]
    fn test_untagged_response_keeps_type() {
        let resp = Response::Error(create_error(5, ErrorCode::NoGame, "No game started"));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["code"], "no_game");
        assert_eq!(value["seq"], 5);

        let ack = serde_json::to_value(Response::Ack(create_ack(1))).unwrap();
        assert_eq!(ack["type"], "ack");
        assert_eq!(ack["status"], "success");
    }
}
