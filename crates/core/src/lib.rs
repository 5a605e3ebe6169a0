//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the puzzle rules and session state. It has **no
//! dependencies** on rendering, networking or I/O:
//!
//! - **Deterministic**: the same seed deals the same game and the same power-up results
//! - **Atomic**: every command is evaluated on a copy and committed whole, or not at all
//! - **Portable**: runs headless, behind the TCP adapter, or under any presentation layer
//!
//! # Module Structure
//!
//! - [`deck`]: tile identities and the 300-tile catalog
//! - [`layout`]: heart pyramid layer patterns and occlusion
//! - [`board`]: piles, player stack, grouping and triplet clearing
//! - [`history`]: undo snapshots
//! - [`powerups`]: charges and the undo/resurrect/shuffle/remove transformations
//! - [`game`]: the session that applies commands
//! - [`rng`]: seeded random source
//! - [`snapshot`]: read-only view for clients
//!
//! # Rules
//!
//! - The shuffled deck fills the pyramid layer by layer, then two side piles of 15
//! - A main pile tile is drawable once no tile on a higher layer sits within one cell of it
//! - Side piles are LIFO; only the last tile can be drawn
//! - Drawn tiles go to the player stack, which is regrouped by kind after every move
//! - Three adjacent identical tiles clear for 10 points, repeated until none remain
//! - Drawing into a full stack (8 tiles) ends the game; emptying every draw pile wins it
//!
//! # Example
//!
//! ```
//! use heart_match_core::Game;
//! use heart_match_types::{Command, Side};
//!
//! let mut game = Game::new(12345);
//! let outcome = game.apply(Command::DrawSide(Side::Left)).unwrap();
//!
//! assert!(outcome.is_applied());
//! assert_eq!(game.board().stack.len(), 1);
//! assert_eq!(game.board().left.len(), 14);
//! ```

pub mod board;
pub mod deck;
pub mod error;
pub mod game;
pub mod history;
pub mod layout;
pub mod powerups;
pub mod rng;
pub mod snapshot;

pub use heart_match_types as types;

// Re-export commonly used types for convenience
pub use board::{auto_group, resolve_matches, BoardState, PileKind, PlayerStack, StackStatus};
pub use deck::{build_deck, Tile, TileId};
pub use error::MoveError;
pub use game::Game;
pub use history::History;
pub use layout::{build_heart_stack, is_covered_by, pyramid_capacity};
pub use powerups::PowerUps;
pub use rng::GameRng;
pub use snapshot::GameSnapshot;
