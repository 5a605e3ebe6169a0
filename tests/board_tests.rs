//! Board tests - deck, pyramid layout, grouping and match resolution

use std::collections::HashSet;

use heart_match::core::board::has_triplet;
use heart_match::core::layout::{layer_offset, layer_pattern};
use heart_match::core::{
    auto_group, build_deck, build_heart_stack, is_covered_by, pyramid_capacity, resolve_matches, BoardState, GameRng,
    PlayerStack, Tile,
};
use heart_match::types::{GridPos, TileKind, DECK_SIZE, SIDE_PILE_SIZE, TILES_PER_KIND};

fn kinds(tiles: &[Tile]) -> Vec<TileKind> {
    tiles.iter().map(|t| t.kind()).collect()
}

fn stack_of(kinds: &[TileKind]) -> PlayerStack {
    kinds.iter().enumerate().map(|(i, &k)| Tile::new(k, i as u8)).collect()
}

#[test]
fn test_deck_has_thirty_of_each_kind() {
    let deck = build_deck();
    assert_eq!(deck.len(), DECK_SIZE);

    for kind in TileKind::ALL {
        assert_eq!(deck.iter().filter(|t| t.kind() == kind).count(), TILES_PER_KIND);
    }

    let ids: HashSet<String> = deck.iter().map(|t| t.id.to_string()).collect();
    assert_eq!(ids.len(), DECK_SIZE);
    assert!(ids.contains("puppy-0"));
    assert!(ids.contains("toucan-29"));
}

#[test]
fn test_shuffle_is_a_permutation() {
    let deck = build_deck();
    let mut rng = GameRng::new(2024);
    let shuffled = rng.shuffled(&deck);

    assert_eq!(deck, build_deck(), "input must not be modified");
    assert_ne!(shuffled, deck);

    let mut a: Vec<_> = deck.iter().map(|t| t.id).collect();
    let mut b: Vec<_> = shuffled.iter().map(|t| t.id).collect();
    a.sort();
    b.sort();
    assert_eq!(a, b);
}

#[test]
fn test_layout_positions_follow_grids() {
    let placed = build_heart_stack(&build_deck());
    assert_eq!(placed.len(), pyramid_capacity());
    assert_eq!(placed.len(), 178);

    for tile in &placed {
        let pos = tile.pos.expect("placed tiles carry a position");
        let rows = layer_pattern(pos.z).expect("only gridded layers receive tiles");
        assert_eq!(rows[pos.y as usize][pos.x as usize], 1, "tile at {:?}", pos);
    }

    let unique: HashSet<GridPos> = placed.iter().filter_map(|t| t.pos).collect();
    assert_eq!(unique.len(), placed.len());

    // Placement is layer by layer, row-major.
    assert_eq!(placed[0].pos, Some(GridPos::new(2, 0, 0)));
    assert!(placed.windows(2).all(|w| w[0].pos.map(|p| p.z) <= w[1].pos.map(|p| p.z)));
}

#[test]
fn test_layout_short_input() {
    let deck = build_deck();
    assert!(build_heart_stack(&[]).is_empty());

    let placed = build_heart_stack(&deck[..20]);
    assert_eq!(placed.len(), 20);
    // The first layer holds 11 cells, so placement continued onto z = 1.
    assert_eq!(placed[10].pos.map(|p| p.z), Some(0));
    assert_eq!(placed[11].pos.map(|p| p.z), Some(1));
}

#[test]
fn test_layout_offsets() {
    assert_eq!(layer_offset(0), (0.0, 0.0));
    assert_eq!(layer_offset(3), (1.5, 1.5));
    assert_eq!(layer_offset(6), (3.0, 3.0));
    assert_eq!(layer_offset(8), (0.0, 0.0));
    assert!(layer_pattern(7).is_none());
}

#[test]
fn test_covered_matches_rule() {
    let placed = build_heart_stack(&build_deck());
    for tile in &placed {
        let pos = tile.pos.unwrap();
        let expected = placed.iter().filter_map(|o| o.pos).any(|o| {
            o.z > pos.z && (o.x as i16 - pos.x as i16).abs() <= 1 && (o.y as i16 - pos.y as i16).abs() <= 1
        });
        assert_eq!(tile.covered, expected, "tile at {:?}", pos);
        assert_eq!(is_covered_by(&pos, &placed), expected);
    }

    // Every tile on the top layer is drawable.
    assert!(placed.iter().filter(|t| t.pos.map(|p| p.z) == Some(6)).all(|t| !t.covered));
}

#[test]
fn test_deal_splits_piles() {
    let deck = GameRng::new(5).shuffled(&build_deck());
    let board = BoardState::deal(&deck);

    assert_eq!(board.main.len(), 178);
    assert_eq!(board.left.len(), SIDE_PILE_SIZE);
    assert_eq!(board.right.len(), SIDE_PILE_SIZE);
    assert!(board.revealed.is_empty());
    assert!(board.stack.is_empty());
    assert_eq!(board.tile_count(), 208);

    assert_eq!(board.left[0].id, deck[178].id);
    assert_eq!(board.right[0].id, deck[193].id);
    assert!(board.left.iter().all(|t| t.pos.is_none()));
}

#[test]
fn test_auto_group_orders_by_count_then_first_seen() {
    use TileKind::*;
    let tiles: Vec<Tile> = [Ball, Puppy, Bone, Puppy, Bone, Puppy]
        .iter()
        .enumerate()
        .map(|(i, &k)| Tile::new(k, i as u8))
        .collect();

    let grouped = auto_group(&tiles);
    assert_eq!(kinds(&grouped), vec![Puppy, Puppy, Puppy, Bone, Bone, Ball]);

    // Stable inside a group.
    let serials: Vec<u8> = grouped.iter().take(3).map(|t| t.id.serial).collect();
    assert_eq!(serials, vec![1, 3, 5]);
}

#[test]
fn test_resolve_matches_cascades() {
    use TileKind::*;
    let mut stack = stack_of(&[Ball, Bone, Bone, Bone, Ball, Ball]);

    // Removing the bone triplet brings the three balls together.
    let cleared = resolve_matches(&mut stack);
    assert_eq!(cleared, 2);
    assert!(stack.is_empty());
}

#[test]
fn test_resolve_matches_scans_from_end() {
    use TileKind::*;
    let mut stack = stack_of(&[Puppy, Puppy, Puppy, Panda, Panda, Panda, Snail]);
    assert_eq!(resolve_matches(&mut stack), 2);
    assert_eq!(kinds(&stack), vec![Snail]);

    let mut pairs = stack_of(&[Puppy, Puppy, Panda, Panda]);
    assert_eq!(resolve_matches(&mut pairs), 0);
    assert_eq!(pairs.len(), 4);
}

#[test]
fn test_settle_stack_scores() {
    use TileKind::*;
    let mut board = BoardState {
        stack: stack_of(&[Rhino, Monkey, Rhino, Monkey, Rhino, Monkey]),
        ..BoardState::default()
    };

    assert_eq!(board.settle_stack(), 2);
    assert!(board.stack.is_empty());
    assert_eq!(board.score, 20);
    assert_eq!(board.matches_found, 2);
    assert!(!has_triplet(&board.stack));
}

#[test]
fn test_stack_status_and_hints() {
    use heart_match::core::StackStatus;
    use TileKind::*;

    let mut board = BoardState {
        stack: stack_of(&[Ball, Ball, Bone, Snail]),
        ..BoardState::default()
    };
    assert_eq!(board.stack_status(), StackStatus::Normal);
    assert_eq!(board.pair_hints(), vec![0, 1]);

    board.stack = stack_of(&[Ball, Ball, Bone, Bone, Snail, Rhino]);
    assert_eq!(board.stack_status(), StackStatus::AlmostFull);

    board.stack = stack_of(&[Ball, Ball, Bone, Bone, Snail, Snail, Rhino, Rhino]);
    assert_eq!(board.stack_status(), StackStatus::Full);
    assert!(board.stack_is_full());
}

#[test]
fn test_progress_percent() {
    let mut board = BoardState::default();
    assert_eq!(board.progress_percent(), 0);
    board.matches_found = 37;
    assert_eq!(board.progress_percent(), 37);
    board.matches_found = 100;
    assert_eq!(board.progress_percent(), 100);
}
