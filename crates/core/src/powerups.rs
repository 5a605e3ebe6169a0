//! Power-up module - one-shot abilities and their board transformations
//!
//! Charges start at [`POWER_UP_CHARGES`] and only go down. The transformations
//! here operate on a board copy owned by the caller; the session decides when a
//! power-up applies and commits the result.

use crate::board::BoardState;
use crate::rng::GameRng;
use crate::types::{PowerUpKind, MATCH_SIZE, POWER_UP_CHARGES};

/// Remaining charges per power-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PowerUps {
    pub undo: u8,
    pub resurrect: u8,
    pub shuffle: u8,
    pub remove: u8,
}

impl PowerUps {
    pub fn new() -> Self {
        Self {
            undo: POWER_UP_CHARGES,
            resurrect: POWER_UP_CHARGES,
            shuffle: POWER_UP_CHARGES,
            remove: POWER_UP_CHARGES,
        }
    }

    pub fn remaining(&self, kind: PowerUpKind) -> u8 {
        match kind {
            PowerUpKind::Undo => self.undo,
            PowerUpKind::Resurrect => self.resurrect,
            PowerUpKind::Shuffle => self.shuffle,
            PowerUpKind::Remove => self.remove,
        }
    }

    pub fn is_available(&self, kind: PowerUpKind) -> bool {
        self.remaining(kind) > 0
    }

    /// Spend one charge; returns false if none were left
    pub fn consume(&mut self, kind: PowerUpKind) -> bool {
        let slot = match kind {
            PowerUpKind::Undo => &mut self.undo,
            PowerUpKind::Resurrect => &mut self.resurrect,
            PowerUpKind::Shuffle => &mut self.shuffle,
            PowerUpKind::Remove => &mut self.remove,
        };
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }
}

impl Default for PowerUps {
    fn default() -> Self {
        Self::new()
    }
}

/// Move three random stack tiles (or all, if fewer) to the revealed pool
///
/// The remaining stack is regrouped.
pub fn resurrect(board: &mut BoardState, rng: &mut GameRng) {
    if board.stack.len() >= MATCH_SIZE {
        let shuffled = rng.shuffled(&board.stack);
        let (freed, kept) = shuffled.split_at(MATCH_SIZE);
        board.revealed.extend_from_slice(freed);
        board.stack = kept.iter().copied().collect();
    } else {
        board.revealed.extend(board.stack.drain(..));
    }
    board.settle_stack();
    board.refresh_covered();
}

/// Redistribute main and side pile tiles while keeping every pile's size
///
/// Tiles keep the positions they already carry; occlusion is recomputed from
/// those positions.
pub fn shuffle_piles(board: &mut BoardState, rng: &mut GameRng) {
    let main_len = board.main.len();
    let left_len = board.left.len();

    let mut pool = Vec::with_capacity(board.main.len() + board.left.len() + board.right.len());
    pool.append(&mut board.main);
    pool.append(&mut board.left);
    pool.append(&mut board.right);
    rng.shuffle(&mut pool);

    board.right = pool.split_off(main_len + left_len);
    board.left = pool.split_off(main_len);
    board.main = pool;
    board.shuffling = true;
    board.refresh_covered();
}

/// Move up to three tiles from the end of the stack to the revealed pool
///
/// Returns false if the stack was empty.
pub fn remove_tail(board: &mut BoardState) -> bool {
    if board.stack.is_empty() {
        return false;
    }
    let start = board.stack.len().saturating_sub(MATCH_SIZE);
    board.revealed.extend(board.stack.drain(start..));
    board.settle_stack();
    board.refresh_covered();
    true
}
