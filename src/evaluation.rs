use crate::board::{Board, PieceKind, Player};
use crate::moves::Move;

/// Score ceiling; strictly dominates every heuristic evaluation.
pub const MAX_SCORE: i32 = 1_000_000;
/// Score floor; the side to move has lost when a node collapses to it.
pub const MIN_SCORE: i32 = -1_000_000;

/// Material weight of a piece kind.
#[inline]
pub fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 10,
        PieceKind::Knight => 30,
        PieceKind::Bishop => 30,
        PieceKind::Castle => 50,
        PieceKind::Queen => 90,
        PieceKind::King => 900,
    }
}

/// Static evaluation of `board` from `root`'s point of view; higher is
/// better for `root`. Total: any well-formed board and legal-move slices
/// produce a finite score well inside (MIN_SCORE, MAX_SCORE).
///
/// Terms:
/// - material, own adding and opponent subtracting;
/// - per own pawn: advancement from its starting row, +5 when the square
///   ahead is occupied, +5 more when the blocker is a friendly pawn;
/// - mobility: +1 per own legal move, -1 per opponent legal move.
pub fn evaluate(board: &Board, root: Player, own_moves: &[Move], opp_moves: &[Move]) -> i32 {
    let height = board.height();
    let start_row = root.pawn_row(height);
    let forward = root.forward();
    let mut score = 0;

    for (pos, piece) in board.iter() {
        let value = piece_value(piece.kind);
        if piece.owner == root {
            score += value;
        } else {
            score -= value;
            continue;
        }

        if piece.kind == PieceKind::Pawn {
            score += (pos.row - start_row).abs();

            let ahead = pos.row + forward;
            if board.in_bounds(ahead, pos.col) {
                if let Some(blocker) = board.get(ahead, pos.col).ok().flatten() {
                    score += 5;
                    if blocker.owner == root && blocker.kind == PieceKind::Pawn {
                        score += 5;
                    }
                }
            }
        }
    }

    score + own_moves.len() as i32 - opp_moves.len() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Piece, Position};
    use crate::moves::{all_legal_moves, MoveKind};

    fn set(board: &mut Board, row: i32, col: i32, owner: Player, kind: PieceKind) {
        board.set(row, col, Some(Piece::new(owner, kind))).unwrap();
    }

    #[test]
    fn material_is_signed_by_ownership() {
        let mut board = Board::new(8, 8);
        set(&mut board, 0, 0, Player::Bottom, PieceKind::Queen);
        set(&mut board, 7, 7, Player::Top, PieceKind::Castle);
        assert_eq!(evaluate(&board, Player::Bottom, &[], &[]), 90 - 50);
        assert_eq!(evaluate(&board, Player::Top, &[], &[]), 50 - 90);
    }

    #[test]
    fn pawn_terms_reward_advancement_and_count_blockers() {
        let mut board = Board::new(8, 8);
        set(&mut board, 4, 2, Player::Bottom, PieceKind::Pawn);
        // Three rows past the starting row.
        assert_eq!(evaluate(&board, Player::Bottom, &[], &[]), 10 + 3);

        // An enemy blocker directly ahead adds 5.
        set(&mut board, 5, 2, Player::Top, PieceKind::Knight);
        assert_eq!(evaluate(&board, Player::Bottom, &[], &[]), 10 + 3 + 5 - 30);

        // A friendly pawn blocker adds 5 more (doubled pawns); the blocker
        // itself scores as an unblocked pawn four rows out.
        set(&mut board, 5, 2, Player::Bottom, PieceKind::Pawn);
        let doubled = evaluate(&board, Player::Bottom, &[], &[]);
        assert_eq!(doubled, (10 + 3 + 5 + 5) + (10 + 4));
    }

    #[test]
    fn mobility_counts_both_sides() {
        let board = Board::new(8, 8);
        let own = vec![
            Move::new(MoveKind::Regular, Position::new(0, 0), Position::new(1, 0)),
            Move::new(MoveKind::Regular, Position::new(0, 0), Position::new(2, 0)),
        ];
        let opp = vec![Move::new(
            MoveKind::Regular,
            Position::new(7, 7),
            Position::new(6, 7),
        )];
        assert_eq!(evaluate(&board, Player::Bottom, &own, &opp), 2 - 1);
    }

    #[test]
    fn heuristic_scores_stay_inside_the_terminal_band() {
        // A full starting position evaluated with full mobility stays far
        // from the mate constants.
        let mut game = crate::game::Game::new();
        let mut board = game.board_copy();
        let own = all_legal_moves(&mut board, Player::Bottom);
        let opp = all_legal_moves(&mut board, Player::Top);
        let score = evaluate(&board, Player::Bottom, &own, &opp);
        assert!(score > MIN_SCORE / 2 && score < MAX_SCORE / 2);
        assert!(!game.is_game_over());
    }
}
