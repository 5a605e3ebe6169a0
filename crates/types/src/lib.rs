//! Shared types - tile kinds, commands, outcomes and rule constants
//!
//! This crate defines the vocabulary used throughout the workspace.
//! All types are pure data with no external dependencies, so they can be used
//! by the core rules, the adapter protocol and any presentation client alike.
//!
//! # Deck
//!
//! A full deck holds ten tile kinds with thirty tiles each:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TILES_PER_KIND` | 30 | Copies of each kind in a deck |
//! | `DECK_SIZE` | 300 | Total tiles in a deck |
//! | `SIDE_PILE_SIZE` | 15 | Tiles dealt to each side pile |
//! | `STACK_LIMIT` | 8 | Player stack capacity |
//! | `MATCH_SIZE` | 3 | Identical tiles cleared together |
//! | `MATCH_SCORE` | 10 | Points per cleared triplet |
//! | `LAYER_COUNT` | 9 | Nominal pyramid layers |
//!
//! # Examples
//!
//! ```
//! use heart_match_types::{Command, Side, TileKind, DECK_SIZE};
//!
//! let kind = TileKind::from_str("Puppy").unwrap();
//! assert_eq!(kind, TileKind::Puppy);
//! assert_eq!(kind.as_str(), "puppy");
//!
//! let cmd = Command::DrawSide(Side::Left);
//! assert_eq!(cmd.name(), "drawSide");
//!
//! assert_eq!(DECK_SIZE, 300);
//! ```

/// Number of tiles of each kind in a full deck
pub const TILES_PER_KIND: usize = 30;

/// Number of distinct tile kinds
pub const KIND_COUNT: usize = 10;

/// Total number of tiles in a full deck (10 kinds x 30)
pub const DECK_SIZE: usize = TILES_PER_KIND * KIND_COUNT;

/// Tiles dealt to each side pile after the pyramid is laid out
pub const SIDE_PILE_SIZE: usize = 15;

/// Maximum number of tiles the player stack may hold
pub const STACK_LIMIT: usize = 8;

/// Number of identical consecutive tiles that clear
pub const MATCH_SIZE: usize = 3;

/// Points awarded per cleared triplet
pub const MATCH_SCORE: u32 = 10;

/// Nominal number of pyramid layers (only the first seven carry an occupancy grid)
pub const LAYER_COUNT: u8 = 9;

/// Total number of triplets in a full deck
pub const TOTAL_TRIPLETS: u32 = (DECK_SIZE / MATCH_SIZE) as u32;

/// Starting charge of every power-up
pub const POWER_UP_CHARGES: u8 = 1;

/// The ten tile kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileKind {
    Puppy,
    Ball,
    Bone,
    Flamingo,
    Elephant,
    Snail,
    Rhino,
    Panda,
    Monkey,
    Toucan,
}

impl TileKind {
    /// Every kind, in deck order
    pub const ALL: [TileKind; KIND_COUNT] = [
        TileKind::Puppy,
        TileKind::Ball,
        TileKind::Bone,
        TileKind::Flamingo,
        TileKind::Elephant,
        TileKind::Snail,
        TileKind::Rhino,
        TileKind::Panda,
        TileKind::Monkey,
        TileKind::Toucan,
    ];

    /// Parse tile kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use heart_match_types::TileKind;
    ///
    /// assert_eq!(TileKind::from_str("toucan"), Some(TileKind::Toucan));
    /// assert_eq!(TileKind::from_str("RHINO"), Some(TileKind::Rhino));
    /// assert_eq!(TileKind::from_str("kitten"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "puppy" => Some(TileKind::Puppy),
            "ball" => Some(TileKind::Ball),
            "bone" => Some(TileKind::Bone),
            "flamingo" => Some(TileKind::Flamingo),
            "elephant" => Some(TileKind::Elephant),
            "snail" => Some(TileKind::Snail),
            "rhino" => Some(TileKind::Rhino),
            "panda" => Some(TileKind::Panda),
            "monkey" => Some(TileKind::Monkey),
            "toucan" => Some(TileKind::Toucan),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TileKind::Puppy => "puppy",
            TileKind::Ball => "ball",
            TileKind::Bone => "bone",
            TileKind::Flamingo => "flamingo",
            TileKind::Elephant => "elephant",
            TileKind::Snail => "snail",
            TileKind::Rhino => "rhino",
            TileKind::Panda => "panda",
            TileKind::Monkey => "monkey",
            TileKind::Toucan => "toucan",
        }
    }
}

/// One of the two LIFO side piles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Parse side from string: "left" | "l", "right" | "r"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" | "l" => Some(Side::Left),
            "right" | "r" => Some(Side::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Discrete position of a tile inside the heart pyramid
///
/// `x` is the grid column, `y` the grid row and `z` the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl GridPos {
    pub fn new(x: u8, y: u8, z: u8) -> Self {
        Self { x, y, z }
    }

    /// True if `other` sits on a strictly higher layer within one cell in both axes
    pub fn is_overlapped_by(&self, other: &GridPos) -> bool {
        other.z > self.z && self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }
}

/// Single-use abilities, each available once per game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    Undo,
    Resurrect,
    Shuffle,
    Remove,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Undo,
        PowerUpKind::Resurrect,
        PowerUpKind::Shuffle,
        PowerUpKind::Remove,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "undo" => Some(PowerUpKind::Undo),
            "resurrect" => Some(PowerUpKind::Resurrect),
            "shuffle" => Some(PowerUpKind::Shuffle),
            "remove" => Some(PowerUpKind::Remove),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Undo => "undo",
            PowerUpKind::Resurrect => "resurrect",
            PowerUpKind::Shuffle => "shuffle",
            PowerUpKind::Remove => "remove",
        }
    }
}

/// Commands that can be applied to a game session
///
/// These are issued by the presentation client (directly or through the adapter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Take the tile at this index of the main pile
    DrawMain(usize),
    /// Take the top tile of a side pile
    DrawSide(Side),
    /// Take the tile at this index of the revealed pool
    DrawRevealed(usize),
    /// Move a player stack tile from one index to another
    Reorder { from: usize, to: usize },
    /// Use a power-up
    PowerUp(PowerUpKind),
    /// Clear the cosmetic shuffling flag once the client finished animating
    SettleShuffle,
}

impl Command {
    pub const UNDO: Command = Command::PowerUp(PowerUpKind::Undo);
    pub const RESURRECT: Command = Command::PowerUp(PowerUpKind::Resurrect);
    pub const SHUFFLE: Command = Command::PowerUp(PowerUpKind::Shuffle);
    pub const REMOVE: Command = Command::PowerUp(PowerUpKind::Remove);

    /// camelCase name used by the adapter protocol
    pub fn name(&self) -> &'static str {
        match self {
            Command::DrawMain(_) => "drawMain",
            Command::DrawSide(_) => "drawSide",
            Command::DrawRevealed(_) => "drawRevealed",
            Command::Reorder { .. } => "reorder",
            Command::PowerUp(kind) => kind.as_str(),
            Command::SettleShuffle => "settleShuffle",
        }
    }

    /// True for player moves that are recorded in undo history
    pub fn is_player_move(&self) -> bool {
        matches!(
            self,
            Command::DrawMain(_)
                | Command::DrawSide(_)
                | Command::DrawRevealed(_)
                | Command::Reorder { .. }
        )
    }
}

/// Why a command left the game untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// The game is already lost
    GameOver,
    /// The source pile has no tiles
    EmptyPile,
    /// The main pile tile is covered by a higher layer
    Covered,
    /// Reorder with identical source and target
    SamePosition,
    /// The power-up has no charges left
    Exhausted,
    /// The power-up's precondition does not hold
    NotApplicable,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::GameOver => "game_over",
            IgnoreReason::EmptyPile => "empty_pile",
            IgnoreReason::Covered => "covered",
            IgnoreReason::SamePosition => "same_position",
            IgnoreReason::Exhausted => "exhausted",
            IgnoreReason::NotApplicable => "not_applicable",
        }
    }
}

/// Result of applying a well-formed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The command changed the board; `matches` triplets were cleared by it
    Applied { matches: u32 },
    /// The command was a no-op
    Ignored(IgnoreReason),
    /// A draw was refused because the stack was full; the game is now lost
    GameOver,
}

impl MoveOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MoveOutcome::Applied { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoveOutcome::Applied { .. } => "applied",
            MoveOutcome::Ignored(_) => "ignored",
            MoveOutcome::GameOver => "game_over",
        }
    }
}
