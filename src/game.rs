use crate::board::{Board, Piece, PieceKind, Player, Position};
use crate::error::{ChessError, ChessResult};
use crate::moves::{all_legal_moves, Move, Undo};
use serde::{Deserialize, Serialize};

/// Back-rank layout shared by both sides: queen on column 3, king on
/// column 4.
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Castle,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Castle,
];

// ============================================================================
// Game
// ============================================================================

/// The full game state: board, side to move, and the move history that
/// produced the board from the initial setup.
///
/// Every mutation goes through `make_move`/`undo_last_move`, which keep the
/// three fields consistent; the recorded undo state of each history entry is
/// what lets `undo_last_move` rewind exactly.
#[derive(Debug, Serialize, Deserialize)]
pub struct Game {
    board: Board,
    side_to_move: Player,
    #[serde(skip)]
    history: Vec<(Move, Undo)>,
}

impl Game {
    /// A fresh 8×8 game with the standard setup. BOTTOM moves first.
    pub fn new() -> Self {
        let mut board = Board::new(8, 8);
        for (col, &kind) in BACK_RANK.iter().enumerate() {
            let col = col as i32;
            board.set(0, col, Some(Piece::new(Player::Bottom, kind))).unwrap();
            board.set(7, col, Some(Piece::new(Player::Top, kind))).unwrap();
            board
                .set(1, col, Some(Piece::new(Player::Bottom, PieceKind::Pawn)))
                .unwrap();
            board
                .set(6, col, Some(Piece::new(Player::Top, PieceKind::Pawn)))
                .unwrap();
        }
        Game {
            board,
            side_to_move: Player::Bottom,
            history: Vec::new(),
        }
    }

    /// A game starting from an arbitrary position, for analysis and tests.
    pub fn from_position(board: Board, side_to_move: Player) -> Self {
        Game {
            board,
            side_to_move,
            history: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    #[inline]
    pub fn dimensions(&self) -> (i32, i32) {
        self.board.dimensions()
    }

    #[inline]
    pub fn current_player(&self) -> Player {
        self.side_to_move
    }

    /// Piece at (row, col); `OutOfBounds` on an invalid index.
    pub fn piece_at(&self, row: i32, col: i32) -> ChessResult<Option<Piece>> {
        self.board.get(row, col)
    }

    /// Moves made so far, earliest first.
    pub fn history(&self) -> Vec<Move> {
        self.history.iter().map(|(m, _)| *m).collect()
    }

    /// Independent snapshot for search engines and renderers.
    pub fn board_copy(&self) -> Board {
        self.board.clone()
    }

    /// Distinct destination squares of the side to move's legal moves from
    /// (row, col). Empty when the square is empty, holds an opponent piece,
    /// or its piece has no legal move.
    pub fn legal_targets_from(&mut self, row: i32, col: i32) -> ChessResult<Vec<Position>> {
        let src = self.board.get(row, col)?;
        match src {
            Some(p) if p.owner == self.side_to_move => {}
            _ => return Ok(Vec::new()),
        }
        let from = Position::new(row, col);
        let mut targets = Vec::new();
        for m in all_legal_moves(&mut self.board, self.side_to_move) {
            if m.from == from && !targets.contains(&m.to) {
                targets.push(m.to);
            }
        }
        Ok(targets)
    }

    /// The game is over exactly when the side to move has no legal move.
    pub fn is_game_over(&mut self) -> bool {
        all_legal_moves(&mut self.board, self.side_to_move).is_empty()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Validate and play the side to move's legal move from (sr, sc) to
    /// (dr, dc), then flip the side. `InvalidMove` when the source square is
    /// out of bounds, empty, or the opponent's, or when no legal move matches.
    pub fn make_move(&mut self, sr: i32, sc: i32, dr: i32, dc: i32) -> ChessResult<()> {
        let rejected = ChessError::InvalidMove {
            from_row: sr,
            from_col: sc,
            to_row: dr,
            to_col: dc,
        };
        let src = self.board.get(sr, sc).map_err(|_| rejected)?;
        match src {
            Some(p) if p.owner == self.side_to_move => {}
            _ => return Err(rejected),
        }

        let from = Position::new(sr, sc);
        let to = Position::new(dr, dc);
        let m = all_legal_moves(&mut self.board, self.side_to_move)
            .into_iter()
            .find(|m| m.from == from && m.to == to)
            .ok_or(rejected)?;

        let undo = m.apply(&mut self.board);
        self.history.push((m, undo));
        self.side_to_move = self.side_to_move.opponent();
        Ok(())
    }

    /// Rewind the most recent move and give the turn back.
    /// `InvalidUndo` when the history is empty.
    pub fn undo_last_move(&mut self) -> ChessResult<()> {
        let (m, undo) = self.history.pop().ok_or(ChessError::InvalidUndo)?;
        m.undo(&mut self.board, undo);
        self.side_to_move = self.side_to_move.opponent();
        Ok(())
    }

    /// Reset to the initial setup, discarding the history.
    pub fn restart(&mut self) {
        *self = Game::new();
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Count legal move paths of the given depth from the current position.
    /// A move-generator checksum, not a gameplay operation.
    pub fn perft(&mut self, depth: u32) -> u64 {
        fn walk(board: &mut Board, side: Player, depth: u32) -> u64 {
            if depth == 0 {
                return 1;
            }
            let mut nodes = 0;
            for m in all_legal_moves(board, side) {
                let undo = m.apply(board);
                nodes += walk(board, side.opponent(), depth - 1);
                m.undo(board, undo);
            }
            nodes
        }
        walk(&mut self.board, self.side_to_move, depth)
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}
