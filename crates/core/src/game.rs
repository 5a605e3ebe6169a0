//! Game module - one play session
//!
//! [`Game`] owns the board, undo history, power-up charges and the RNG. Every
//! command is evaluated against a copy of the board and only committed when it
//! is accepted, so a rejected or malformed command never leaves partial changes.
//!
//! Accepted draws and reorders run the same pipeline:
//! group the stack by kind, clear triplets to a fixpoint, recompute occlusion,
//! check the win condition, record history.

use tracing::{debug, info};

use crate::board::{BoardState, PileKind};
use crate::deck::{build_deck, Tile};
use crate::error::MoveError;
use crate::history::History;
use crate::powerups::{self, PowerUps};
use crate::rng::GameRng;
use crate::snapshot::GameSnapshot;
use crate::types::{Command, IgnoreReason, MoveOutcome, PowerUpKind, Side};

/// Complete session state
#[derive(Debug, Clone)]
pub struct Game {
    board: BoardState,
    history: History,
    power_ups: PowerUps,
    rng: GameRng,
    /// Monotonic game counter (increments on every new deal).
    game_id: u32,
    game_over: bool,
    game_won: bool,
}

impl Game {
    /// Create a session and deal the first game from `seed`
    pub fn new(seed: u64) -> Self {
        let mut game = Self::with_board(BoardState::default(), seed);
        game.deal();
        game
    }

    /// Create a session around a prepared board
    ///
    /// Occlusion is recomputed; history starts with this board as its only entry.
    pub fn with_board(mut board: BoardState, seed: u64) -> Self {
        board.refresh_covered();
        let game_won = board.is_cleared();
        Self {
            history: History::new(board.clone()),
            board,
            power_ups: PowerUps::new(),
            rng: GameRng::new(seed),
            game_id: 0,
            game_over: false,
            game_won,
        }
    }

    /// Discard the current game and deal a fresh one
    pub fn new_game(&mut self) {
        self.game_id = self.game_id.wrapping_add(1);
        self.deal();
    }

    fn deal(&mut self) {
        let deck = self.rng.shuffled(&build_deck());
        self.board = BoardState::deal(&deck);
        self.history = History::new(self.board.clone());
        self.power_ups = PowerUps::new();
        self.game_over = false;
        self.game_won = false;

        info!(
            game_id = self.game_id,
            seed = self.rng.seed(),
            main = self.board.main.len(),
            left = self.board.left.len(),
            right = self.board.right.len(),
            "dealt new game"
        );
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn game_won(&self) -> bool {
        self.game_won
    }

    pub fn power_ups(&self) -> PowerUps {
        self.power_ups
    }

    pub fn history_len(&self) -> usize {
        self.history.depth()
    }

    pub fn game_id(&self) -> u32 {
        self.game_id
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn is_drawable_main(&self, index: usize) -> bool {
        !self.game_over && self.board.is_drawable_main(index)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.clone(),
            game_over: self.game_over,
            game_won: self.game_won,
            power_ups: self.power_ups,
            history_len: self.history.depth(),
            game_id: self.game_id,
            seed: self.rng.seed(),
            stack_status: self.board.stack_status(),
            pair_hints: self.board.pair_hints(),
            progress_percent: self.board.progress_percent(),
        }
    }

    /// Apply a command
    ///
    /// Expected edge conditions come back as [`MoveOutcome::Ignored`] or
    /// [`MoveOutcome::GameOver`]; only out-of-range indices are errors.
    pub fn apply(&mut self, command: Command) -> Result<MoveOutcome, MoveError> {
        let outcome = match command {
            Command::DrawMain(index) => self.draw_main(index)?,
            Command::DrawSide(side) => self.draw_side(side),
            Command::DrawRevealed(index) => self.draw_revealed(index)?,
            Command::Reorder { from, to } => self.reorder(from, to)?,
            Command::PowerUp(kind) => self.use_power_up(kind),
            Command::SettleShuffle => self.settle_shuffle(),
        };

        debug!(
            game_id = self.game_id,
            command = command.name(),
            outcome = outcome.as_str(),
            stack = self.board.stack.len(),
            score = self.board.score,
            "applied command"
        );
        Ok(outcome)
    }

    fn draw_main(&mut self, index: usize) -> Result<MoveOutcome, MoveError> {
        if self.game_over {
            return Ok(MoveOutcome::Ignored(IgnoreReason::GameOver));
        }
        if self.board.main.is_empty() {
            return Ok(MoveOutcome::Ignored(IgnoreReason::EmptyPile));
        }
        MoveError::check_index(PileKind::Main, index, self.board.main.len())?;
        if self.board.stack_is_full() {
            return Ok(self.declare_loss());
        }
        if self.board.main[index].covered {
            return Ok(MoveOutcome::Ignored(IgnoreReason::Covered));
        }

        let mut next = self.board.clone();
        let tile = next.main.remove(index);
        Ok(self.commit_draw(next, tile))
    }

    fn draw_side(&mut self, side: Side) -> MoveOutcome {
        if self.game_over {
            return MoveOutcome::Ignored(IgnoreReason::GameOver);
        }
        if self.board.side(side).is_empty() {
            return MoveOutcome::Ignored(IgnoreReason::EmptyPile);
        }
        if self.board.stack_is_full() {
            return self.declare_loss();
        }

        let mut next = self.board.clone();
        let Some(tile) = next.side_mut(side).pop() else {
            return MoveOutcome::Ignored(IgnoreReason::EmptyPile);
        };
        self.commit_draw(next, tile)
    }

    fn draw_revealed(&mut self, index: usize) -> Result<MoveOutcome, MoveError> {
        if self.game_over {
            return Ok(MoveOutcome::Ignored(IgnoreReason::GameOver));
        }
        if self.board.revealed.is_empty() {
            return Ok(MoveOutcome::Ignored(IgnoreReason::EmptyPile));
        }
        MoveError::check_index(PileKind::Revealed, index, self.board.revealed.len())?;
        if self.board.stack_is_full() {
            return Ok(self.declare_loss());
        }

        let mut next = self.board.clone();
        let tile = next.revealed.remove(index);
        Ok(self.commit_draw(next, tile))
    }

    fn reorder(&mut self, from: usize, to: usize) -> Result<MoveOutcome, MoveError> {
        if self.game_over {
            return Ok(MoveOutcome::Ignored(IgnoreReason::GameOver));
        }
        let len = self.board.stack.len();
        MoveError::check_index(PileKind::Stack, from, len)?;
        MoveError::check_index(PileKind::Stack, to, len)?;
        if from == to {
            return Ok(MoveOutcome::Ignored(IgnoreReason::SamePosition));
        }

        let mut next = self.board.clone();
        let tile = next.stack.remove(from);
        next.stack.insert(to, tile);
        Ok(self.commit_move(next))
    }

    fn commit_draw(&mut self, mut next: BoardState, tile: Tile) -> MoveOutcome {
        if next.stack.try_push(tile).is_err() {
            return self.declare_loss();
        }
        self.commit_move(next)
    }

    /// Stack overflow: the draw is dropped and the session enters the lost state
    fn declare_loss(&mut self) -> MoveOutcome {
        self.game_over = true;
        info!(
            game_id = self.game_id,
            score = self.board.score,
            matches = self.board.matches_found,
            "player stack full, game over"
        );
        MoveOutcome::GameOver
    }

    fn commit_move(&mut self, mut next: BoardState) -> MoveOutcome {
        next.shuffling = false;
        let matches = next.settle_stack();
        next.refresh_covered();

        self.board = next;
        self.history.push(self.board.clone());
        self.refresh_won();

        if matches > 0 {
            debug!(game_id = self.game_id, matches, score = self.board.score, "cleared triplets");
        }
        MoveOutcome::Applied { matches }
    }

    fn commit_power_up(&mut self, next: BoardState) -> MoveOutcome {
        let matches = next.matches_found - self.board.matches_found;
        self.board = next;
        self.history.amend(self.board.clone());
        self.refresh_won();
        MoveOutcome::Applied { matches }
    }

    fn refresh_won(&mut self) {
        let won = self.board.is_cleared();
        if won && !self.game_won {
            info!(
                game_id = self.game_id,
                score = self.board.score,
                matches = self.board.matches_found,
                "board cleared, game won"
            );
        }
        self.game_won = won;
    }

    fn use_power_up(&mut self, kind: PowerUpKind) -> MoveOutcome {
        if !self.power_ups.is_available(kind) {
            return MoveOutcome::Ignored(IgnoreReason::Exhausted);
        }

        let outcome = match kind {
            PowerUpKind::Undo => self.undo(),
            PowerUpKind::Resurrect => self.resurrect(),
            PowerUpKind::Shuffle => self.shuffle(),
            PowerUpKind::Remove => self.remove(),
        };

        if outcome.is_applied() {
            self.power_ups.consume(kind);
            info!(game_id = self.game_id, power_up = kind.as_str(), "power-up used");
        }
        outcome
    }

    fn undo(&mut self) -> MoveOutcome {
        let Some(previous) = self.history.undo() else {
            return MoveOutcome::Ignored(IgnoreReason::NotApplicable);
        };
        self.board = previous.clone();
        self.game_over = false;
        self.refresh_won();
        MoveOutcome::Applied { matches: 0 }
    }

    fn resurrect(&mut self) -> MoveOutcome {
        if !self.game_over {
            return MoveOutcome::Ignored(IgnoreReason::NotApplicable);
        }
        let mut next = self.board.clone();
        powerups::resurrect(&mut next, &mut self.rng);
        self.game_over = false;
        self.commit_power_up(next)
    }

    // Tiles keep their old coordinates when they change piles.
    fn shuffle(&mut self) -> MoveOutcome {
        if self.board.main.is_empty() && self.board.left.is_empty() && self.board.right.is_empty() {
            return MoveOutcome::Ignored(IgnoreReason::EmptyPile);
        }
        let mut next = self.board.clone();
        powerups::shuffle_piles(&mut next, &mut self.rng);
        self.commit_power_up(next)
    }

    fn remove(&mut self) -> MoveOutcome {
        let mut next = self.board.clone();
        if !powerups::remove_tail(&mut next) {
            return MoveOutcome::Ignored(IgnoreReason::EmptyPile);
        }
        self.commit_power_up(next)
    }

    fn settle_shuffle(&mut self) -> MoveOutcome {
        if !self.board.shuffling {
            return MoveOutcome::Ignored(IgnoreReason::NotApplicable);
        }
        self.board.shuffling = false;
        self.history.amend(self.board.clone());
        MoveOutcome::Applied { matches: 0 }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(1)
    }
}
