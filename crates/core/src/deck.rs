//! Deck module - tile identities and the full 300-tile catalog

use std::fmt;

use crate::types::{GridPos, TileKind, TILES_PER_KIND};

/// Stable tile identity, rendered as `kind-serial` (e.g. `puppy-7`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    pub kind: TileKind,
    pub serial: u8,
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.as_str(), self.serial)
    }
}

/// A single tile
///
/// `pos` is assigned by the pyramid layout and travels with the tile when it
/// changes piles. `covered` is only meaningful while the tile sits in the main pile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub id: TileId,
    pub pos: Option<GridPos>,
    pub covered: bool,
}

impl Tile {
    pub fn new(kind: TileKind, serial: u8) -> Self {
        Self {
            id: TileId { kind, serial },
            pos: None,
            covered: false,
        }
    }

    pub fn kind(&self) -> TileKind {
        self.id.kind
    }

    /// Copy of this tile placed at `pos`, uncovered
    pub fn placed(self, pos: GridPos) -> Self {
        Self {
            pos: Some(pos),
            covered: false,
            ..self
        }
    }
}

/// Build the full, unshuffled deck: 30 tiles of each of the ten kinds
pub fn build_deck() -> Vec<Tile> {
    TileKind::ALL
        .iter()
        .flat_map(|&kind| (0..TILES_PER_KIND as u8).map(move |serial| Tile::new(kind, serial)))
        .collect()
}
