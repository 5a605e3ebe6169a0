//! Adapter - remote play over a TCP socket with a JSON line protocol
//!
//! This crate lets a presentation client (web UI, bot, test harness) drive
//! game sessions without linking the core. Each connection gets its own
//! session; the core stays synchronous and single-threaded behind a channel.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to the TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome` and a first `observation`
//! 3. **Commanding**: Client sends `command`, server answers with `ack` and an updated `observation`
//! 4. **Lifecycle**: `new_game` deals a fresh game, `query` re-sends the current observation
//!
//! Every message carries a `seq`, which must strictly increase per client.
//! Replies echo the `seq` of the request they answer.
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Handshake with client info and protocol version (major version must be `1`)
//! - **command**: One game command, e.g. `{"action":"drawSide","side":"left"}`
//! - **new_game**: Discard the session's game, optionally with an explicit `seed`
//! - **query**: Request the current observation
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with the session id and capabilities
//! - **observation**: Full session snapshot (piles, stack, score, power-ups, hints)
//! - **ack**: Command outcome (`applied`, `ignored` with a reason, or `game_over`)
//! - **error**: Error response with code and message
//!
//! # Command Actions
//!
//! - `drawMain` (`index`), `drawRevealed` (`index`), `drawSide` (`side`)
//! - `reorder` (`from`, `to`)
//! - `undo`, `resurrect`, `shuffle`, `remove`
//! - `settleShuffle`
//!
//! # Environment Variables
//!
//! - `HEART_MATCH_HOST`: Bind address (default: "127.0.0.1")
//! - `HEART_MATCH_PORT`: Port number (default: 7878)
//! - `HEART_MATCH_MAX_PENDING`: Inbound queue depth before `backpressure` errors (default: 32)
//! - `HEART_MATCH_SEED`: Base seed for new sessions (default: derived from the clock)
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"client":{"name":"web-ui","version":"0.3.0"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1700000000000,"protocol_version":"1.0.0","session":1,...}
//! Server -> Client: {"type":"observation","seq":1,"ts":1700000000001,"game_id":0,"piles":{...},...}
//! Client -> Server: {"type":"command","seq":2,"command":{"action":"drawSide","side":"left"}}
//! Server -> Client: {"type":"ack","seq":2,"ts":1700000000002,"outcome":"applied","matches":0}
//! Server -> Client: {"type":"observation","seq":2,...}
//! ```
//!
//! # Testing
//!
//! Connect to the adapter using netcat for manual testing:
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0"}
//! ```

pub mod host;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use heart_match_core as core;
pub use heart_match_types as types;

// Re-export protocol types for convenience
pub use host::SessionHost;
pub use protocol::*;
pub use runtime::{Adapter, InboundCommand, InboundPayload, OutboundMessage};
pub use server::*;
