//! Protocol module - JSON message types for the session adapter
//!
//! Line-delimited JSON. Every message carries `type` and `seq`; server
//! messages also carry `ts` (milliseconds since the Unix epoch).

use serde::{Deserialize, Serialize};

use crate::core::{GameSnapshot, Tile};
use crate::types::{Command, MoveOutcome, PowerUpKind, Side};

/// Protocol version spoken by this server; clients must share the major version
pub const PROTOCOL_VERSION: &str = "1.0.0";

// ============== Client -> Server Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelloType {
    #[serde(rename = "hello")]
    Hello,
}

impl Default for HelloType {
    fn default() -> Self {
        Self::Hello
    }
}

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// Game command message
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub command: CommandBody,
}

/// Command payload, e.g. `{"action":"drawMain","index":4}`
///
/// Arguments are optional at the wire level and validated by [`map_command`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommandBody {
    pub action: String,
    pub index: Option<usize>,
    pub side: Option<String>,
    pub from: Option<usize>,
    pub to: Option<usize>,
}

/// Discard the session's game and deal a new one
#[derive(Debug, Clone, Deserialize)]
pub struct NewGameMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub seed: Option<u64>,
}

/// Request a fresh observation
#[derive(Debug, Clone, Deserialize)]
pub struct QueryMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
}

// ============== Server -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "invalid_argument")]
    InvalidArgument,
    #[serde(rename = "backpressure")]
    Backpressure,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    /// Server-assigned session id, one per connection
    pub session: u64,
    pub game: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub actions: Vec<String>,
    pub power_ups: Vec<String>,
    pub stack_limit: usize,
}

/// Result of a command, new game or query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    /// `applied`, `ignored` or `game_over`
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub matches: u32,
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

/// Full session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub game_id: u32,
    pub seed: u64,
    pub playable: bool,
    pub game_over: bool,
    pub game_won: bool,
    pub score: u32,
    pub matches_found: u32,
    pub progress_percent: u32,
    pub stack_limit: usize,
    pub stack_status: String,
    pub shuffling: bool,
    pub history_len: usize,
    pub power_ups: PowerUpCounts,
    pub piles: PilesSnapshot,
    /// Stack indices whose kind occurs at least twice
    pub pair_hints: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpCounts {
    pub undo: u8,
    pub resurrect: u8,
    pub shuffle: u8,
    pub remove: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PilesSnapshot {
    pub main: Vec<TileView>,
    pub left: Vec<TileView>,
    pub right: Vec<TileView>,
    pub revealed: Vec<TileView>,
    pub stack: Vec<TileView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileView {
    pub id: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<u8>,
    pub covered: bool,
}

impl From<&Tile> for TileView {
    fn from(tile: &Tile) -> Self {
        Self {
            id: tile.id.to_string(),
            kind: tile.kind().as_str().to_string(),
            x: tile.pos.map(|p| p.x),
            y: tile.pos.map(|p| p.y),
            z: tile.pos.map(|p| p.z),
            covered: tile.covered,
        }
    }
}

fn tile_views(tiles: &[Tile]) -> Vec<TileView> {
    tiles.iter().map(TileView::from).collect()
}

// ============== Message Parsing ==============

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    NewGame(NewGameMessage),
    Query(QueryMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
    pub msg_type: String,
}

const KNOWN_TYPES: [&str; 4] = ["hello", "command", "new_game", "query"];

/// Parse a JSON message from a string
///
/// An unrecognized `type` is reported as [`ParsedMessage::Unknown`] rather than
/// a parse error, so the server can answer with the right `seq`.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "new_game")]
        NewGame(NewGameMessage),
        #[serde(rename = "query")]
        Query(QueryMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::NewGame(m)) => Ok(ParsedMessage::NewGame(m)),
        Ok(InboundMessage::Query(m)) => Ok(ParsedMessage::Query(m)),
        Err(e) => {
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
            Ok(ParsedMessage::Unknown(UnknownMessage {
                seq: envelope.seq.unwrap_or(0),
                msg_type,
            }))
        }
    }
}

/// Best-effort `seq` extraction from a line that failed to parse
pub fn extract_seq(line: &str) -> Option<u64> {
    let value: serde_json::Value = serde_json::from_str(line).ok()?;
    value.get("seq")?.as_u64()
}

/// True if `version` shares the major version of [`PROTOCOL_VERSION`]
pub fn is_compatible_version(version: &str) -> bool {
    let major = |v: &str| v.split('.').next().map(str::to_string);
    major(version.trim()) == major(PROTOCOL_VERSION)
}

/// Map a wire command into a core command
pub fn map_command(body: &CommandBody) -> Result<Command, (ErrorCode, String)> {
    let index = || {
        body.index
            .ok_or_else(|| (ErrorCode::InvalidArgument, format!("{} requires index", body.action)))
    };

    let action = body.action.as_str();
    if action.eq_ignore_ascii_case("drawMain") {
        Ok(Command::DrawMain(index()?))
    } else if action.eq_ignore_ascii_case("drawRevealed") {
        Ok(Command::DrawRevealed(index()?))
    } else if action.eq_ignore_ascii_case("drawSide") {
        let side = body
            .side
            .as_deref()
            .and_then(Side::from_str)
            .ok_or_else(|| (ErrorCode::InvalidArgument, "drawSide requires side left or right".to_string()))?;
        Ok(Command::DrawSide(side))
    } else if action.eq_ignore_ascii_case("reorder") {
        match (body.from, body.to) {
            (Some(from), Some(to)) => Ok(Command::Reorder { from, to }),
            _ => Err((ErrorCode::InvalidArgument, "reorder requires from and to".to_string())),
        }
    } else if action.eq_ignore_ascii_case("settleShuffle") {
        Ok(Command::SettleShuffle)
    } else if let Some(kind) = PowerUpKind::from_str(action) {
        Ok(Command::PowerUp(kind))
    } else {
        Err((ErrorCode::InvalidCommand, format!("Unknown action: {}", body.action)))
    }
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
    }
}

/// Create a welcome message
pub fn create_welcome(seq: u64, protocol_version: &str, session: u64) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        session,
        game: "heart-match".to_string(),
        capabilities: ServerCapabilities {
            actions: ["drawMain", "drawSide", "drawRevealed", "reorder", "settleShuffle"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            power_ups: PowerUpKind::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            stack_limit: crate::types::STACK_LIMIT,
        },
    }
}

/// Create an acknowledgment carrying the command outcome
pub fn create_ack(seq: u64, outcome: MoveOutcome) -> AckMessage {
    let (reason, matches) = match outcome {
        MoveOutcome::Applied { matches } => (None, matches),
        MoveOutcome::Ignored(reason) => (Some(reason.as_str().to_string()), 0),
        MoveOutcome::GameOver => (None, 0),
    };
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        outcome: outcome.as_str().to_string(),
        reason,
        matches,
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

/// Build an observation from a session snapshot
pub fn build_observation(snapshot: &GameSnapshot, seq: u64) -> ObservationMessage {
    let board = &snapshot.board;
    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        game_id: snapshot.game_id,
        seed: snapshot.seed,
        playable: snapshot.playable(),
        game_over: snapshot.game_over,
        game_won: snapshot.game_won,
        score: board.score,
        matches_found: board.matches_found,
        progress_percent: snapshot.progress_percent,
        stack_limit: board.stack_limit(),
        stack_status: snapshot.stack_status.as_str().to_string(),
        shuffling: board.shuffling,
        history_len: snapshot.history_len,
        power_ups: PowerUpCounts {
            undo: snapshot.power_ups.undo,
            resurrect: snapshot.power_ups.resurrect,
            shuffle: snapshot.power_ups.shuffle,
            remove: snapshot.power_ups.remove,
        },
        piles: PilesSnapshot {
            main: tile_views(&board.main),
            left: tile_views(&board.left),
            right: tile_views(&board.right),
            revealed: tile_views(&board.revealed),
            stack: tile_views(&board.stack),
        },
        pair_hints: snapshot.pair_hints.clone(),
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
