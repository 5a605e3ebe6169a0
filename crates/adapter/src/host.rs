//! Session host - one game per connected client
//!
//! The host is synchronous: the binary feeds it inbound messages in arrival
//! order and forwards whatever it returns. Each client's game is isolated, so
//! commands from one connection never touch another's board.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::core::Game;
use crate::protocol::{build_observation, create_ack, create_error, ErrorCode};
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage};
use crate::types::MoveOutcome;

pub struct SessionHost {
    sessions: HashMap<usize, Game>,
    base_seed: u64,
}

impl SessionHost {
    pub fn new(base_seed: u64) -> Self {
        Self {
            sessions: HashMap::new(),
            base_seed,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session(&self, client_id: usize) -> Option<&Game> {
        self.sessions.get(&client_id)
    }

    /// Seed for a client's first game; distinct per connection, reproducible per base seed
    pub fn seed_for(&self, client_id: usize) -> u64 {
        self.base_seed.wrapping_add(client_id as u64)
    }

    fn open(&mut self, client_id: usize) -> &mut Game {
        let seed = self.seed_for(client_id);
        self.sessions.entry(client_id).or_insert_with(|| {
            info!(client_id, seed, "session opened");
            Game::new(seed)
        })
    }

    /// Apply one inbound message; returns the replies for the client, in order
    pub fn handle(&mut self, inbound: InboundCommand) -> Vec<OutboundMessage> {
        let InboundCommand {
            client_id,
            seq,
            payload,
        } = inbound;

        match payload {
            InboundPayload::Open | InboundPayload::Query => {
                let game = self.open(client_id);
                vec![observe(client_id, seq, game)]
            }

            InboundPayload::Command(command) => {
                let game = self.open(client_id);
                match game.apply(command) {
                    Ok(outcome) => vec![
                        OutboundMessage::ToClientAck {
                            client_id,
                            ack: create_ack(seq, outcome),
                        },
                        observe(client_id, seq, game),
                    ],
                    Err(e) => {
                        warn!(client_id, seq, command = command.name(), error = %e, "command rejected");
                        vec![OutboundMessage::ToClientError {
                            client_id,
                            err: create_error(seq, ErrorCode::InvalidArgument, &e.to_string()),
                        }]
                    }
                }
            }

            InboundPayload::NewGame { seed } => {
                match seed {
                    Some(seed) => {
                        self.sessions.insert(client_id, Game::new(seed));
                    }
                    None => self.open(client_id).new_game(),
                }
                let game = self.open(client_id);
                vec![
                    OutboundMessage::ToClientAck {
                        client_id,
                        ack: create_ack(seq, MoveOutcome::Applied { matches: 0 }),
                    },
                    observe(client_id, seq, game),
                ]
            }

            InboundPayload::Closed => {
                if let Some(game) = self.sessions.remove(&client_id) {
                    info!(
                        client_id,
                        score = game.board().score,
                        won = game.game_won(),
                        "session closed"
                    );
                }
                Vec::new()
            }
        }
    }
}

fn observe(client_id: usize, seq: u64, game: &Game) -> OutboundMessage {
    OutboundMessage::ToClientObservation {
        client_id,
        obs: build_observation(&game.snapshot(), seq),
    }
}
