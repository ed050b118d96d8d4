use aichess::game::Game;
use std::time::Instant;

/// Expected node counts from the standard setup. En passant and castling are
/// unreachable within four plies, so the classical reference numbers apply.
const EXPECTED: [u64; 4] = [20, 400, 8_902, 197_281];

#[test]
fn perft_matches_reference_counts() {
    let mut game = Game::new();
    for depth in 1..=3u32 {
        let start = Instant::now();
        let nodes = game.perft(depth);
        println!(
            "perft({depth}) = {nodes:>8} nodes in {:?}",
            start.elapsed()
        );
        assert_eq!(nodes, EXPECTED[depth as usize - 1], "perft({depth})");
    }
}

#[test]
#[ignore = "slow; run with --ignored for full validation"]
fn perft_depth_four() {
    let mut game = Game::new();
    let start = Instant::now();
    let nodes = game.perft(4);
    println!("perft(4) = {nodes} nodes in {:?}", start.elapsed());
    assert_eq!(nodes, EXPECTED[3]);
}

#[test]
fn perft_is_side_symmetric_at_the_start() {
    // The initial setup is mirror-symmetric, so TOP moving first sees the
    // same tree sizes.
    let game = Game::new();
    let mut top_first = Game::from_position(game.board_copy(), aichess::board::Player::Top);
    assert_eq!(top_first.perft(1), 20);
    assert_eq!(top_first.perft(2), 400);
}

#[test]
fn perft_is_stable_across_make_and_undo() {
    let mut game = Game::new();
    let before = game.perft(2);
    game.make_move(1, 3, 3, 3).unwrap();
    game.undo_last_move().unwrap();
    assert_eq!(game.perft(2), before);
}
