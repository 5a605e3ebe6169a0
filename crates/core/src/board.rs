//! Board module - piles, player stack and match resolution
//!
//! [`BoardState`] is a plain value: cloning it yields a fully independent copy,
//! which is what the game session and undo history rely on.
//!
//! Piles:
//! - `main`: the heart pyramid, drawable by index once uncovered
//! - `left` / `right`: LIFO side piles, only the last tile is drawable
//! - `revealed`: tiles displaced by power-ups, drawable by index
//! - `stack`: the player stack, bounded by [`STACK_LIMIT`]

use std::fmt;

use arrayvec::ArrayVec;

use crate::deck::Tile;
use crate::layout::{build_heart_stack, refresh_covered};
use crate::types::{Side, TileKind, MATCH_SCORE, MATCH_SIZE, SIDE_PILE_SIZE, STACK_LIMIT, TOTAL_TRIPLETS};

/// Player stack storage; capacity is the stack limit
pub type PlayerStack = ArrayVec<Tile, STACK_LIMIT>;

/// Identifies a pile for error reporting and queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PileKind {
    Main,
    Left,
    Right,
    Revealed,
    Stack,
}

impl PileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PileKind::Main => "main",
            PileKind::Left => "left",
            PileKind::Right => "right",
            PileKind::Revealed => "revealed",
            PileKind::Stack => "stack",
        }
    }
}

impl From<Side> for PileKind {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => PileKind::Left,
            Side::Right => PileKind::Right,
        }
    }
}

impl fmt::Display for PileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fill level of the player stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackStatus {
    Normal,
    /// Two or fewer free slots
    AlmostFull,
    Full,
}

impl StackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StackStatus::Normal => "normal",
            StackStatus::AlmostFull => "almost_full",
            StackStatus::Full => "full",
        }
    }
}

/// Complete board: every pile plus score counters
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardState {
    pub main: Vec<Tile>,
    pub left: Vec<Tile>,
    pub right: Vec<Tile>,
    pub revealed: Vec<Tile>,
    pub stack: PlayerStack,
    pub score: u32,
    pub matches_found: u32,
    /// Cosmetic flag raised by the shuffle power-up
    pub shuffling: bool,
}

impl BoardState {
    /// Deal a (shuffled) deck: pyramid first, then the left and right side piles
    ///
    /// Tiles left over after both side piles are not dealt.
    pub fn deal(deck: &[Tile]) -> Self {
        let main = build_heart_stack(deck);
        let rest = &deck[main.len()..];
        let left_end = SIDE_PILE_SIZE.min(rest.len());
        let right_end = (2 * SIDE_PILE_SIZE).min(rest.len());

        Self {
            main,
            left: rest[..left_end].to_vec(),
            right: rest[left_end..right_end].to_vec(),
            ..Self::default()
        }
    }

    pub fn stack_limit(&self) -> usize {
        STACK_LIMIT
    }

    pub fn side(&self, side: Side) -> &Vec<Tile> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut Vec<Tile> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Tiles still in play across every pile
    pub fn tile_count(&self) -> usize {
        self.main.len() + self.left.len() + self.right.len() + self.revealed.len() + self.stack.len()
    }

    /// Win condition: nothing left to draw
    pub fn is_cleared(&self) -> bool {
        self.main.is_empty() && self.left.is_empty() && self.right.is_empty() && self.revealed.is_empty()
    }

    pub fn stack_is_full(&self) -> bool {
        self.stack.is_full()
    }

    /// True if the main pile tile at `index` exists and is not covered
    pub fn is_drawable_main(&self, index: usize) -> bool {
        self.main.get(index).is_some_and(|t| !t.covered)
    }

    pub fn stack_status(&self) -> StackStatus {
        let len = self.stack.len();
        if len >= STACK_LIMIT {
            StackStatus::Full
        } else if len + 2 >= STACK_LIMIT {
            StackStatus::AlmostFull
        } else {
            StackStatus::Normal
        }
    }

    /// Stack indices whose kind occurs at least twice (one draw away from a match)
    pub fn pair_hints(&self) -> Vec<usize> {
        self.stack
            .iter()
            .enumerate()
            .filter(|(_, tile)| self.stack.iter().filter(|t| t.kind() == tile.kind()).count() >= 2)
            .map(|(i, _)| i)
            .collect()
    }

    /// Cleared triplets as a rounded percentage of every triplet in a full deck
    pub fn progress_percent(&self) -> u32 {
        (self.matches_found * 100 + TOTAL_TRIPLETS / 2) / TOTAL_TRIPLETS
    }

    /// Recompute `covered` for the main pile and clear it everywhere else
    pub fn refresh_covered(&mut self) {
        refresh_covered(&mut self.main);
        let outside_main = self
            .left
            .iter_mut()
            .chain(self.right.iter_mut())
            .chain(self.revealed.iter_mut())
            .chain(self.stack.iter_mut());
        for tile in outside_main {
            tile.covered = false;
        }
    }

    /// Group the stack by kind, then clear triplets until none remain
    ///
    /// Returns the number of triplets cleared. Score and match counters are updated.
    pub fn settle_stack(&mut self) -> u32 {
        self.stack = auto_group(&self.stack).into_iter().collect();
        let cleared = resolve_matches(&mut self.stack);
        self.matches_found += cleared;
        self.score += cleared * MATCH_SCORE;
        cleared
    }
}

/// Stable clustering by kind
///
/// Groups are ordered by descending size; ties keep the order in which each kind
/// first appears. Tiles inside a group keep their relative order.
pub fn auto_group(tiles: &[Tile]) -> Vec<Tile> {
    let mut groups: Vec<(TileKind, usize)> = Vec::new();
    for tile in tiles {
        match groups.iter_mut().find(|(kind, _)| *kind == tile.kind()) {
            Some((_, count)) => *count += 1,
            None => groups.push((tile.kind(), 1)),
        }
    }
    groups.sort_by(|a, b| b.1.cmp(&a.1));

    groups
        .iter()
        .flat_map(|&(kind, _)| tiles.iter().copied().filter(move |t| t.kind() == kind))
        .collect()
}

/// Start index of the last run of three same-kind tiles, scanning from the end
fn find_triplet_from_end(tiles: &[Tile]) -> Option<usize> {
    (MATCH_SIZE - 1..tiles.len())
        .rev()
        .map(|end| end + 1 - MATCH_SIZE)
        .find(|&start| {
            let kind = tiles[start].kind();
            tiles[start..start + MATCH_SIZE].iter().all(|t| t.kind() == kind)
        })
}

/// Remove triplets one at a time, rescanning after each, until a pass finds none
///
/// Returns the number of triplets removed.
pub fn resolve_matches(stack: &mut PlayerStack) -> u32 {
    let mut cleared = 0;
    while let Some(start) = find_triplet_from_end(stack) {
        stack.drain(start..start + MATCH_SIZE);
        cleared += 1;
    }
    cleared
}

/// True if any three consecutive tiles share a kind
pub fn has_triplet(tiles: &[Tile]) -> bool {
    find_triplet_from_end(tiles).is_some()
}
