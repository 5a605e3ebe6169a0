//! Layout module - heart-shaped pyramid placement and occlusion
//!
//! The main pile is laid out over nominal layers `z = 0..LAYER_COUNT`. The first
//! seven layers each carry a fixed occupancy grid; every `1` cell, scanned in
//! row-major order, takes the next tile of the input and receives
//! `(x, y, z) = (column, row, layer)`. Layers without a grid place nothing.
//!
//! A tile is covered when another positioned main-pile tile sits on a strictly
//! higher layer within one cell in both axes (see [`GridPos::is_overlapped_by`]).

use crate::deck::Tile;
use crate::types::{GridPos, LAYER_COUNT};

type Pattern = &'static [&'static [u8]];

/// Occupancy grids, one per layer
const LAYER_PATTERNS: [Pattern; 7] = [
    &[
        &[0, 0, 1, 1, 1, 0, 0],
        &[0, 1, 1, 1, 1, 1, 0],
        &[0, 0, 1, 1, 1, 0, 0],
    ],
    &[
        &[0, 1, 1, 1, 1, 1, 0],
        &[1, 1, 1, 1, 1, 1, 1],
        &[0, 1, 1, 1, 1, 1, 0],
        &[0, 0, 1, 1, 1, 0, 0],
    ],
    &[
        &[1, 1, 1, 1, 1, 1, 1],
        &[1, 1, 1, 1, 1, 1, 1],
        &[0, 1, 1, 1, 1, 1, 0],
        &[0, 0, 1, 1, 1, 0, 0],
        &[0, 0, 0, 1, 1, 0, 0],
    ],
    &[
        &[1, 1, 1, 1, 1, 1, 1, 1, 1],
        &[1, 1, 1, 1, 1, 1, 1, 1, 1],
        &[0, 1, 1, 1, 1, 1, 1, 1, 0],
        &[0, 0, 1, 1, 1, 1, 1, 0, 0],
        &[0, 0, 0, 1, 1, 1, 0, 0, 0],
    ],
    &[
        &[0, 1, 1, 1, 1, 1, 1, 0],
        &[1, 1, 1, 1, 1, 1, 1, 1],
        &[1, 1, 1, 1, 1, 1, 1, 1],
        &[0, 1, 1, 1, 1, 1, 1, 0],
        &[0, 0, 1, 1, 1, 1, 0, 0],
    ],
    &[
        &[0, 0, 1, 1, 1, 1, 0, 0],
        &[0, 1, 1, 1, 1, 1, 1, 0],
        &[1, 1, 1, 1, 1, 1, 1, 1],
        &[1, 1, 1, 1, 1, 1, 1, 1],
        &[0, 1, 1, 1, 1, 1, 1, 0],
    ],
    &[
        &[0, 0, 0, 1, 1, 0, 0, 0],
        &[0, 0, 1, 1, 1, 1, 0, 0],
        &[0, 1, 1, 1, 1, 1, 1, 0],
        &[1, 1, 1, 1, 1, 1, 1, 1],
        &[0, 1, 1, 1, 1, 1, 1, 0],
    ],
];

/// Render offsets (in grid units) per layer
const LAYER_OFFSETS: [(f32, f32); 7] = [
    (0.0, 0.0),
    (0.5, 0.5),
    (1.0, 1.0),
    (1.5, 1.5),
    (2.0, 2.0),
    (2.5, 2.5),
    (3.0, 3.0),
];

/// Occupancy grid of layer `z`, if it has one
pub fn layer_pattern(z: u8) -> Option<&'static [&'static [u8]]> {
    LAYER_PATTERNS.get(z as usize).copied()
}

/// Render offset of layer `z`; layers past the table fall back to `(0, 0)`
pub fn layer_offset(z: u8) -> (f32, f32) {
    LAYER_OFFSETS.get(z as usize).copied().unwrap_or((0.0, 0.0))
}

/// Number of cells the pyramid can hold
pub fn pyramid_capacity() -> usize {
    LAYER_PATTERNS
        .iter()
        .flat_map(|rows| rows.iter())
        .map(|row| row.iter().filter(|&&cell| cell != 0).count())
        .sum()
}

/// Lay out `tiles` over the heart pyramid
///
/// Returns the placed tiles in placement order, with `covered` already computed.
/// The number of returned tiles is the number consumed from the front of `tiles`:
/// placement stops when either the input or the grids run out.
pub fn build_heart_stack(tiles: &[Tile]) -> Vec<Tile> {
    let mut placed = Vec::with_capacity(pyramid_capacity().min(tiles.len()));
    let mut next = tiles.iter();

    'layers: for z in 0..LAYER_COUNT {
        let Some(rows) = layer_pattern(z) else {
            continue;
        };
        for (y, row) in rows.iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                if cell == 0 {
                    continue;
                }
                let Some(&tile) = next.next() else {
                    break 'layers;
                };
                placed.push(tile.placed(GridPos::new(x as u8, y as u8, z)));
            }
        }
    }

    refresh_covered(&mut placed);
    placed
}

/// True if the tile at `pos` is overlapped by any positioned tile in `pile`
pub fn is_covered_by(pos: &GridPos, pile: &[Tile]) -> bool {
    pile.iter()
        .filter_map(|t| t.pos)
        .any(|other| pos.is_overlapped_by(&other))
}

/// Recompute `covered` for every tile of a main pile
///
/// Tiles without a position are never covered and never cover anything.
pub fn refresh_covered(pile: &mut [Tile]) {
    let flags: Vec<bool> = pile
        .iter()
        .map(|t| t.pos.map_or(false, |pos| is_covered_by(&pos, pile)))
        .collect();
    for (tile, covered) in pile.iter_mut().zip(flags) {
        tile.covered = covered;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::build_deck;

    #[test]
    fn test_pyramid_capacity() {
        assert_eq!(pyramid_capacity(), 178);
    }

    #[test]
    fn test_layout_follows_occupancy_grids() {
        let deck = build_deck();
        let stack = build_heart_stack(&deck);
        assert_eq!(stack.len(), 178);

        for tile in &stack {
            let pos = tile.pos.expect("placed tile has a position");
            let rows = layer_pattern(pos.z).expect("placed on a patterned layer");
            assert_eq!(rows[pos.y as usize][pos.x as usize], 1);
        }
    }

    #[test]
    fn test_layout_consumes_input_in_order() {
        let deck = build_deck();
        let stack = build_heart_stack(&deck);
        for (placed, source) in stack.iter().zip(deck.iter()) {
            assert_eq!(placed.id, source.id);
        }
        // First tile lands on the first open cell of layer 0.
        assert_eq!(stack[0].pos, Some(GridPos::new(2, 0, 0)));
    }

    #[test]
    fn test_short_input_does_not_panic() {
        let deck = build_deck();
        let stack = build_heart_stack(&deck[..5]);
        assert_eq!(stack.len(), 5);
        assert!(build_heart_stack(&[]).is_empty());
    }

    #[test]
    fn test_layer_offsets() {
        assert_eq!(layer_offset(0), (0.0, 0.0));
        assert_eq!(layer_offset(3), (1.5, 1.5));
        assert_eq!(layer_offset(6), (3.0, 3.0));
        assert_eq!(layer_offset(7), (0.0, 0.0));
        assert_eq!(layer_offset(200), (0.0, 0.0));
        assert!(layer_pattern(7).is_none());
    }

    #[test]
    fn test_top_layer_is_uncovered() {
        let stack = build_heart_stack(&build_deck());
        let top = stack.iter().map(|t| t.pos.unwrap().z).max().unwrap();
        assert!(stack
            .iter()
            .filter(|t| t.pos.unwrap().z == top)
            .all(|t| !t.covered));
        assert!(stack.iter().any(|t| t.covered));
    }

    #[test]
    fn test_unpositioned_tiles_neither_cover_nor_are_covered() {
        let deck = build_deck();
        let mut pile = vec![
            deck[0].placed(GridPos::new(1, 1, 0)),
            deck[1],
            deck[2].placed(GridPos::new(9, 9, 3)),
        ];
        refresh_covered(&mut pile);
        assert!(pile.iter().all(|t| !t.covered));

        pile.push(deck[3].placed(GridPos::new(2, 2, 1)));
        refresh_covered(&mut pile);
        assert!(pile[0].covered);
        assert!(!pile[1].covered);
    }
}
