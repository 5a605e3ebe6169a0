use crate::board::{BoardState, StackStatus};
use crate::powerups::PowerUps;

/// Read-only copy of a session, handed to presentation clients
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub board: BoardState,
    pub game_over: bool,
    pub game_won: bool,
    pub power_ups: PowerUps,
    pub history_len: usize,
    pub game_id: u32,
    pub seed: u64,
    pub stack_status: StackStatus,
    pub pair_hints: Vec<usize>,
    pub progress_percent: u32,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        !self.game_over && !self.game_won
    }

    pub fn can_undo(&self) -> bool {
        self.power_ups.undo > 0 && self.history_len >= 2
    }

    pub fn can_resurrect(&self) -> bool {
        self.power_ups.resurrect > 0 && self.game_over
    }

    pub fn can_shuffle(&self) -> bool {
        self.power_ups.shuffle > 0
    }

    pub fn can_remove(&self) -> bool {
        self.power_ups.remove > 0 && !self.board.stack.is_empty()
    }
}
