//! History module - board snapshots for undo
//!
//! The top entry always mirrors the committed board. Player moves push the new
//! board, so the entry beneath the top is the board as it was right before the
//! latest move. Power-ups that change the board amend the top in place.

use crate::board::BoardState;

#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: Vec<BoardState>,
}

impl History {
    /// Start a history holding only the initial board
    pub fn new(initial: BoardState) -> Self {
        Self {
            entries: vec![initial],
        }
    }

    /// Number of boards held, counting the committed one
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Undo needs the current entry plus at least one before it
    pub fn can_undo(&self) -> bool {
        self.entries.len() >= 2
    }

    /// Record the board committed by a player move
    pub fn push(&mut self, board: BoardState) {
        self.entries.push(board);
    }

    /// Replace the top entry with the board committed by a power-up
    pub fn amend(&mut self, board: BoardState) {
        match self.entries.last_mut() {
            Some(top) => *top = board,
            None => self.entries.push(board),
        }
    }

    /// Drop the current entry and return the one beneath it
    ///
    /// Returns `None` (and changes nothing) when there is no earlier entry.
    pub fn undo(&mut self) -> Option<&BoardState> {
        if !self.can_undo() {
            return None;
        }
        self.entries.pop();
        self.entries.last()
    }

    pub fn current(&self) -> Option<&BoardState> {
        self.entries.last()
    }
}
