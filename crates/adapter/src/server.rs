//! TCP server for the session adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking; game state lives in the session loop on
//! the other side of the inbound channel.

use std::net::SocketAddr;
use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::protocol::*;
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    /// Base seed for new sessions; `None` derives one from the clock
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 32,
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Create from `HEART_MATCH_*` environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let host = env::var("HEART_MATCH_HOST").unwrap_or(defaults.host);
        let port = env::var("HEART_MATCH_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        let max_pending_commands = env::var("HEART_MATCH_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        let seed = env::var("HEART_MATCH_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok());

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
            seed,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shared server state
struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
}

/// Handle to a connected client
struct ClientHandle {
    id: usize,
    tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

/// Per-connection protocol state
#[derive(Debug, Default)]
struct ClientSession {
    handshaken: bool,
    last_seq: Option<u64>,
}

impl ClientSession {
    /// Accept `seq` only if it is strictly greater than the last accepted one
    fn accept_seq(&mut self, seq: u64) -> bool {
        match self.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                self.last_seq = Some(seq);
                true
            }
        }
    }

    /// Handshake and sequencing checks shared by every post-hello message
    fn admit(&mut self, seq: u64, what: &str, tx: &mpsc::UnboundedSender<ClientOutbound>) -> bool {
        if !self.handshaken {
            let error = create_error(seq, ErrorCode::HandshakeRequired, &format!("Send hello before {}", what));
            let _ = tx.send(ClientOutbound::Error(error));
            return false;
        }
        if !self.accept_seq(seq) {
            let error = create_error(seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
            let _ = tx.send(ClientOutbound::Error(error));
            return false;
        }
        true
    }
}

/// Start the TCP server
///
/// `ready_tx` receives the bound address once the listener is up (useful with port 0).
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_addr()).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, protocol = %config.protocol_version, "session server listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState {
        config,
        clients: RwLock::new(Vec::new()),
    });
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let client_id = msg.client_id();
                let out = match msg {
                    OutboundMessage::ToClientAck { ack, .. } => ClientOutbound::Ack(ack),
                    OutboundMessage::ToClientError { err, .. } => ClientOutbound::Error(err),
                    OutboundMessage::ToClientObservation { obs, .. } => ClientOutbound::Observation(obs),
                };
                let clients = state.clients.read().await;
                if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                    let _ = c.tx.send(out);
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, Arc::clone(&state), command_tx.clone()).await {
                warn!(client_id, error = %e, "client error");
            }

            state.clients.write().await.retain(|c| c.id != client_id);
            let _ = command_tx
                .send(InboundCommand {
                    client_id,
                    seq: 0,
                    payload: InboundPayload::Closed,
                })
                .await;
            info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    // Channel to send messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();
    state.clients.write().await.push(ClientHandle {
        id: client_id,
        tx: tx.clone(),
    });

    // Spawn task to write messages to client
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            let written = match msg {
                ClientOutbound::Welcome(m) => write_json(&mut writer, &mut buf, &m).await,
                ClientOutbound::Ack(m) => write_json(&mut writer, &mut buf, &m).await,
                ClientOutbound::Error(m) => write_json(&mut writer, &mut buf, &m).await,
                ClientOutbound::Observation(m) => write_json(&mut writer, &mut buf, &m).await,
            };
            if written.is_err() {
                break;
            }
        }
    });

    let mut session = ClientSession::default();
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (seq, payload) = match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if session.handshaken && !session.accept_seq(hello.seq) {
                    let error = create_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                if !is_compatible_version(&hello.protocol_version) {
                    warn!(client_id, version = %hello.protocol_version, "protocol mismatch");
                    let error = create_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    break;
                }

                // The welcome only goes out once the session open is queued.
                let permit = match command_tx.try_reserve() {
                    Ok(permit) => permit,
                    Err(TrySendError::Full(())) => {
                        let error = create_error(hello.seq, ErrorCode::Backpressure, "Command queue is full");
                        let _ = tx.send(ClientOutbound::Error(error));
                        continue;
                    }
                    Err(TrySendError::Closed(())) => anyhow::bail!("session loop stopped"),
                };

                session.handshaken = true;
                session.last_seq = Some(hello.seq);
                debug!(client_id, client = %hello.client.name, "handshake complete");

                let welcome = create_welcome(hello.seq, &state.config.protocol_version, client_id as u64);
                let _ = tx.send(ClientOutbound::Welcome(welcome));
                permit.send(InboundCommand {
                    client_id,
                    seq: hello.seq,
                    payload: InboundPayload::Open,
                });
                continue;
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !session.admit(cmd.seq, "command", &tx) {
                    continue;
                }
                match map_command(&cmd.command) {
                    Ok(command) => (cmd.seq, InboundPayload::Command(command)),
                    Err((code, message)) => {
                        let _ = tx.send(ClientOutbound::Error(create_error(cmd.seq, code, &message)));
                        continue;
                    }
                }
            }

            Ok(ParsedMessage::NewGame(msg)) => {
                if !session.admit(msg.seq, "new_game", &tx) {
                    continue;
                }
                (msg.seq, InboundPayload::NewGame { seed: msg.seed })
            }

            Ok(ParsedMessage::Query(msg)) => {
                if !session.admit(msg.seq, "query", &tx) {
                    continue;
                }
                (msg.seq, InboundPayload::Query)
            }

            Ok(ParsedMessage::Unknown(msg)) => {
                if session.handshaken && !session.accept_seq(msg.seq) {
                    let error = create_error(msg.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }
                let error = create_error(
                    msg.seq,
                    ErrorCode::InvalidCommand,
                    &format!("Unknown message type: {}", msg.msg_type),
                );
                let _ = tx.send(ClientOutbound::Error(error));
                continue;
            }

            Err(e) => {
                let seq = extract_seq(trimmed).unwrap_or(0);
                warn!(client_id, seq, error = %e, "malformed message");
                let error = create_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {}", e));
                let _ = tx.send(ClientOutbound::Error(error));
                continue;
            }
        };

        // Backpressure: bounded queue to the session loop.
        match command_tx.try_send(InboundCommand {
            client_id,
            seq,
            payload,
        }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                let error = create_error(seq, ErrorCode::Backpressure, "Command queue is full");
                let _ = tx.send(ClientOutbound::Error(error));
            }
            Err(TrySendError::Closed(_)) => {
                anyhow::bail!("session loop stopped");
            }
        }
    }

    // Deregister before waiting on the writer so the dispatcher drops its sender too.
    state.clients.write().await.retain(|c| c.id != client_id);
    drop(tx);
    let _ = write_task.await;

    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &[u8]) -> std::io::Result<()> {
    writer.write_all(line).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

async fn write_json<W: AsyncWrite + Unpin, T: Serialize>(
    writer: &mut W,
    buf: &mut Vec<u8>,
    msg: &T,
) -> std::io::Result<()> {
    buf.clear();
    serde_json::to_writer(&mut *buf, msg)?;
    write_line(writer, buf.as_slice()).await
}
