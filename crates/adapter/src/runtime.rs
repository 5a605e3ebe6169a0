//! Adapter runtime integration.
//!
//! Bridges the synchronous session loop with the async TCP server.

use std::net::SocketAddr;

use anyhow::anyhow;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};

use crate::protocol::{AckMessage, ErrorMessage, ObservationMessage};
use crate::server::{run_server, ServerConfig};
use crate::types::Command;

/// Message delivered to the session loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

/// Inbound payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundPayload {
    /// Handshake completed; open the client's session and report it.
    Open,
    Command(Command),
    NewGame { seed: Option<u64> },
    Query,
    /// Connection closed; drop the client's session.
    Closed,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientError { client_id: usize, err: ErrorMessage },
    ToClientObservation { client_id: usize, obs: ObservationMessage },
}

impl OutboundMessage {
    pub fn client_id(&self) -> usize {
        match self {
            OutboundMessage::ToClientAck { client_id, .. }
            | OutboundMessage::ToClientError { client_id, .. }
            | OutboundMessage::ToClientObservation { client_id, .. } => *client_id,
        }
    }
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    local_addr: SocketAddr,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl Adapter {
    /// Start the server on its own runtime and wait until it is listening.
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let rt = Runtime::new()?;
        let server = rt.spawn(async move { run_server(config, cmd_tx, out_rx, Some(ready_tx)).await });

        let local_addr = match rt.block_on(ready_rx) {
            Ok(addr) => addr,
            // The server dropped the ready sender without binding; surface why.
            Err(_) => {
                return match rt.block_on(server) {
                    Ok(Err(e)) => Err(e),
                    Ok(Ok(())) => Err(anyhow!("server stopped before listening")),
                    Err(e) => Err(e.into()),
                };
            }
        };

        Ok(Self {
            _rt: rt,
            local_addr,
            cmd_rx,
            out_tx,
        })
    }

    /// Start the adapter from environment variables.
    pub fn start_from_env() -> anyhow::Result<Self> {
        Self::start(ServerConfig::from_env())
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    /// Block until the next inbound message; `None` once the server has stopped.
    pub fn recv_blocking(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.blocking_recv()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }
}
