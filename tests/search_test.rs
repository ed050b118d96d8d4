use aichess::board::{Board, Piece, PieceKind, Player, Position};
use aichess::game::Game;
use aichess::moves::all_legal_moves;
use aichess::search::{best_move, SearchLimits, Searcher, Strategy};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

const ALL_STRATEGIES: [Strategy; 3] = [Strategy::Minimax, Strategy::AlphaBeta, Strategy::MtdF];

/// Back-rank mate in one: the BOTTOM rook lifts to the top row and the TOP
/// king, boxed in by its own pawns, has no reply.
fn mate_in_one() -> Game {
    let mut board = Board::new(8, 8);
    board
        .set(7, 0, Some(Piece::new(Player::Top, PieceKind::King)))
        .unwrap();
    board
        .set(6, 0, Some(Piece::new(Player::Top, PieceKind::Pawn)))
        .unwrap();
    board
        .set(6, 1, Some(Piece::new(Player::Top, PieceKind::Pawn)))
        .unwrap();
    board
        .set(0, 7, Some(Piece::new(Player::Bottom, PieceKind::Castle)))
        .unwrap();
    board
        .set(0, 4, Some(Piece::new(Player::Bottom, PieceKind::King)))
        .unwrap();
    Game::from_position(board, Player::Bottom)
}

#[test]
fn every_strategy_finds_the_back_rank_mate() {
    let game = mate_in_one();
    for strategy in ALL_STRATEGIES {
        let m = best_move(&game, strategy, 2, Player::Bottom).expect("search must return a move");
        println!("{strategy:?} chose {m}");
        assert_eq!(
            (m.from, m.to),
            (Position::new(0, 7), Position::new(7, 7)),
            "{strategy:?} missed the mate"
        );
    }
}

#[test]
fn the_mating_move_ends_the_game() {
    let mut game = mate_in_one();
    let m = best_move(&game, Strategy::AlphaBeta, 2, Player::Bottom).unwrap();
    game.make_move(m.from.row, m.from.col, m.to.row, m.to.col)
        .unwrap();
    assert!(game.is_game_over());
}

#[test]
fn strategies_agree_from_the_opening() {
    // At depth 2 all three searchers score children identically, so the
    // alpha-beta and MTD-f picks must match plain minimax's score ordering.
    let game = Game::new();
    let reference = best_move(&game, Strategy::AlphaBeta, 2, Player::Bottom).unwrap();
    let mtdf = best_move(&game, Strategy::MtdF, 2, Player::Bottom).unwrap();
    assert_eq!(reference, mtdf);

    let mut board = game.board_copy();
    assert!(all_legal_moves(&mut board, Player::Bottom).contains(&reference));
}

#[test]
fn deeper_search_is_still_deterministic() {
    let game = Game::new();
    for strategy in ALL_STRATEGIES {
        let a = best_move(&game, strategy, 3, Player::Bottom).unwrap();
        let b = best_move(&game, strategy, 3, Player::Bottom).unwrap();
        assert_eq!(a, b, "{strategy:?} diverged between identical runs");
    }
}

#[test]
fn a_searcher_reuses_its_table_across_turns() {
    let mut game = Game::new();
    let mut searcher = Searcher::new(Strategy::AlphaBeta, 3, Player::Bottom);

    let first = searcher.best_move(&game).unwrap();
    let cached = searcher.table().len();
    assert!(cached > 0);
    game.make_move(first.from.row, first.from.col, first.to.row, first.to.col)
        .unwrap();
    game.undo_last_move().unwrap();

    // Same position again: the warm table keeps the second search at or
    // below the first one's node count.
    let first_nodes = searcher.nodes();
    let second = searcher.best_move(&game).unwrap();
    assert_eq!(first, second);
    assert!(searcher.nodes() <= first_nodes);
    assert!(searcher.table().len() >= cached);
}

#[test]
fn pre_cancelled_searches_abort() {
    let game = Game::new();
    let cancel = Arc::new(AtomicBool::new(true));
    let mut searcher = Searcher::new(Strategy::Minimax, 4, Player::Bottom);
    searcher.set_limits(SearchLimits {
        deadline: None,
        cancel: Some(cancel),
    });
    assert_eq!(searcher.best_move(&game), None);
}

#[test]
fn timed_search_returns_a_legal_move_under_pressure() {
    let game = Game::new();
    let mut searcher = Searcher::new(Strategy::AlphaBeta, 5, Player::Bottom);
    searcher.set_limits(SearchLimits {
        deadline: Some(std::time::Instant::now() + std::time::Duration::from_millis(50)),
        cancel: None,
    });
    // 50ms is plenty for depth 1, nowhere near enough for depth 5: the
    // driver must fall back to the deepest completed level.
    let m = searcher
        .best_move_timed(&game)
        .expect("depth 1 must complete");
    let mut board = game.board_copy();
    assert!(all_legal_moves(&mut board, Player::Bottom).contains(&m));
}

#[test]
#[should_panic(expected = "terminal position")]
fn searching_a_finished_game_is_a_programming_error() {
    let mut game = mate_in_one();
    let m = best_move(&game, Strategy::AlphaBeta, 2, Player::Bottom).unwrap();
    game.make_move(m.from.row, m.from.col, m.to.row, m.to.col)
        .unwrap();
    // TOP is mated; asking for its best move is out of contract.
    let _ = best_move(&game, Strategy::AlphaBeta, 2, Player::Top);
}
