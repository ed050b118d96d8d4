use crate::attacks::{DIAG_DIRS, KING_OFFSETS, KNIGHT_OFFSETS, ORTHO_DIRS};
use crate::board::{Board, Piece, PieceKind, Player, Position};
use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Move list with inline capacity for a typical position; spills to the heap
/// on crowded boards.
pub type MoveList = SmallVec<[Move; 64]>;

// ============================================================================
// Move
// ============================================================================

/// Discriminates the three move shapes the rules produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    Regular,
    Castling,
    Promotion,
}

/// A move template: shape plus source and target squares.
///
/// Equality and hashing depend only on (kind, from, to). The state needed to
/// reverse a move is captured at apply time in a separate [`Undo`] value, so
/// an applied move compares equal to a freshly generated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub kind: MoveKind,
    pub from: Position,
    pub to: Position,
}

impl Move {
    #[inline]
    pub fn new(kind: MoveKind, from: Position, to: Position) -> Self {
        Move { kind, from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {} to {}", self.kind, self.from, self.to)
    }
}

// ============================================================================
// Undo journal
// ============================================================================

/// Reversal state recorded by [`Move::apply`].
///
/// Each entry is a square's contents immediately before the apply wrote it;
/// restoring them in reverse order rewinds the board exactly, `has_moved`
/// flags included, even when a castling rook lands on the king's origin.
#[derive(Debug, Clone)]
pub struct Undo {
    journal: ArrayVec<(Position, Option<Piece>), 4>,
}

impl Undo {
    fn new() -> Self {
        Undo {
            journal: ArrayVec::new(),
        }
    }

    #[inline]
    fn write(&mut self, board: &mut Board, pos: Position, piece: Option<Piece>) {
        self.journal.push((pos, board.at(pos.row, pos.col)));
        board.put(pos, piece);
    }
}

impl Move {
    /// Apply this move to `board`, returning the state needed to undo it.
    ///
    /// Assumes the move was generated for this board state; violations are
    /// programming errors and are debug-asserted.
    pub fn apply(&self, board: &mut Board) -> Undo {
        let mut undo = Undo::new();
        match self.kind {
            MoveKind::Regular => {
                let piece = board
                    .at(self.from.row, self.from.col)
                    .expect("move applied from an empty square");
                undo.write(board, self.from, None);
                undo.write(board, self.to, Some(piece.with_moved(true)));
            }
            MoveKind::Promotion => {
                let pawn = board
                    .at(self.from.row, self.from.col)
                    .expect("promotion applied from an empty square");
                debug_assert!(
                    pawn.kind == PieceKind::Pawn,
                    "no pawn to promote at {}",
                    self.from
                );
                let queen = Piece {
                    owner: pawn.owner,
                    kind: PieceKind::Queen,
                    has_moved: true,
                };
                undo.write(board, self.from, None);
                undo.write(board, self.to, Some(queen));
            }
            MoveKind::Castling => {
                let king = board
                    .at(self.from.row, self.from.col)
                    .expect("castling applied from an empty square");
                debug_assert!(
                    king.kind == PieceKind::King,
                    "no king to castle at {}",
                    self.from
                );
                let dir = (self.to.col - self.from.col).signum();
                let rook_sq = castling_rook_square(board, self.from, self.to)
                    .expect("castling move without a rook beyond the king's destination");
                let rook = board
                    .at(rook_sq.row, rook_sq.col)
                    .expect("castling rook square is empty");
                debug_assert!(
                    rook.kind == PieceKind::Castle && rook.owner == king.owner,
                    "no friendly rook at {rook_sq}"
                );
                let rook_dst = Position::new(self.to.row, self.to.col - dir);

                undo.write(board, self.from, None);
                undo.write(board, rook_sq, None);
                undo.write(board, self.to, Some(king.with_moved(true)));
                undo.write(board, rook_dst, Some(rook.with_moved(true)));
            }
        }
        undo
    }

    /// Reverse the matching [`Move::apply`]. Valid only against the board
    /// state that apply produced.
    pub fn undo(&self, board: &mut Board, undo: Undo) {
        for (pos, prior) in undo.journal.into_iter().rev() {
            board.put(pos, prior);
        }
    }
}

/// The rook a castling move involves: the first occupied square past the
/// king's destination, scanning away from the king's source.
fn castling_rook_square(board: &Board, from: Position, to: Position) -> Option<Position> {
    let dir = (to.col - from.col).signum();
    let mut col = to.col + dir;
    while board.in_bounds(to.row, col) {
        if board.at(to.row, col).is_some() {
            return Some(Position::new(to.row, col));
        }
        col += dir;
    }
    None
}

// ============================================================================
// Pseudo-legal move generation
// ============================================================================

/// All pseudo-legal moves for `piece` standing on `from`: geometry and
/// blocking only, no king-safety filtering. Castling candidates are emitted
/// for the king unless `include_castling` is false (the attack probe passes
/// false to cut the castling/attack recursion).
pub fn pseudo_legal_moves_for_piece(
    board: &Board,
    piece: &Piece,
    from: Position,
    include_castling: bool,
) -> MoveList {
    let mut moves = MoveList::new();
    match piece.kind {
        PieceKind::King => {
            leaper_moves(board, from, piece.owner, &KING_OFFSETS, &mut moves);
            if include_castling {
                castling_moves(board, piece, from, &mut moves);
            }
        }
        PieceKind::Queen => {
            slider_moves(board, from, piece.owner, &ORTHO_DIRS, &mut moves);
            slider_moves(board, from, piece.owner, &DIAG_DIRS, &mut moves);
        }
        PieceKind::Castle => {
            slider_moves(board, from, piece.owner, &ORTHO_DIRS, &mut moves);
        }
        PieceKind::Bishop => {
            slider_moves(board, from, piece.owner, &DIAG_DIRS, &mut moves);
        }
        PieceKind::Knight => {
            leaper_moves(board, from, piece.owner, &KNIGHT_OFFSETS, &mut moves);
        }
        PieceKind::Pawn => {
            pawn_moves(board, piece, from, &mut moves);
        }
    }
    moves
}

/// Ray walker for sliders: empty squares extend the ray, an enemy piece is a
/// capture that ends it, a friendly piece ends it without a move.
fn slider_moves(
    board: &Board,
    from: Position,
    owner: Player,
    dirs: &[(i32, i32)],
    out: &mut MoveList,
) {
    for &(dr, dc) in dirs {
        let mut row = from.row + dr;
        let mut col = from.col + dc;
        while board.in_bounds(row, col) {
            match board.at(row, col) {
                None => out.push(Move::new(MoveKind::Regular, from, Position::new(row, col))),
                Some(p) => {
                    if p.owner != owner {
                        out.push(Move::new(MoveKind::Regular, from, Position::new(row, col)));
                    }
                    break;
                }
            }
            row += dr;
            col += dc;
        }
    }
}

/// Single-step hops for kings and knights. Off-board hops are skipped.
fn leaper_moves(
    board: &Board,
    from: Position,
    owner: Player,
    offsets: &[(i32, i32)],
    out: &mut MoveList,
) {
    for &(dr, dc) in offsets {
        let row = from.row + dr;
        let col = from.col + dc;
        if !board.in_bounds(row, col) {
            continue;
        }
        match board.at(row, col) {
            Some(p) if p.owner == owner => {}
            _ => out.push(Move::new(MoveKind::Regular, from, Position::new(row, col))),
        }
    }
}

fn pawn_moves(board: &Board, piece: &Piece, from: Position, out: &mut MoveList) {
    let owner = piece.owner;
    let dir = owner.forward();
    let promotion_row = owner.promotion_row(board.height());
    let kind_for = |row: i32| {
        if row == promotion_row {
            MoveKind::Promotion
        } else {
            MoveKind::Regular
        }
    };

    let ahead = from.row + dir;
    if board.in_bounds(ahead, from.col) && board.at(ahead, from.col).is_none() {
        out.push(Move::new(
            kind_for(ahead),
            from,
            Position::new(ahead, from.col),
        ));

        // Double step: only for an unmoved pawn with both squares clear.
        let two_ahead = ahead + dir;
        if !piece.has_moved
            && board.in_bounds(two_ahead, from.col)
            && board.at(two_ahead, from.col).is_none()
        {
            out.push(Move::new(
                kind_for(two_ahead),
                from,
                Position::new(two_ahead, from.col),
            ));
        }
    }

    // Diagonal steps capture only.
    for dc in [-1, 1] {
        let col = from.col + dc;
        if !board.in_bounds(ahead, col) {
            continue;
        }
        if matches!(board.at(ahead, col), Some(p) if p.owner != owner) {
            out.push(Move::new(kind_for(ahead), from, Position::new(ahead, col)));
        }
    }
}

// ============================================================================
// Castling emission
// ============================================================================

/// Castling candidates for an unmoved king: one per unmoved same-row friendly
/// rook with only empty squares between, provided the king's current square
/// and its whole path are not covered by the opponent.
///
/// The king travels two squares toward the rook, or the single between-square
/// when only one exists; the rook ends adjacent to the king on the far side.
fn castling_moves(board: &Board, king: &Piece, from: Position, out: &mut MoveList) {
    if king.has_moved {
        return;
    }
    let opponent = king.owner.opponent();
    for dir in [-1, 1] {
        let mut col = from.col + dir;
        let mut gap = 0;
        let rook_col = loop {
            if !board.in_bounds(from.row, col) {
                break None;
            }
            match board.at(from.row, col) {
                None => gap += 1,
                Some(p) => {
                    if p.owner == king.owner && p.kind == PieceKind::Castle && !p.has_moved {
                        break Some(col);
                    }
                    break None;
                }
            }
            col += dir;
        };
        let Some(_rook_col) = rook_col else { continue };
        if gap < 1 {
            continue;
        }

        let steps = gap.min(2);
        let dst = Position::new(from.row, from.col + dir * steps);

        // The current square and every square the king touches must be safe.
        let path_safe = (0..=steps).all(|step| {
            let sq = Position::new(from.row, from.col + dir * step);
            !is_square_attacked(board, sq, opponent)
        });
        if path_safe {
            out.push(Move::new(MoveKind::Castling, from, dst));
        }
    }
}

// ============================================================================
// Attack probe and legality filter
// ============================================================================

/// Whether any non-castling pseudo-legal move of `by` reaches `target`.
/// Castling is excluded so castling emission never recurses into itself.
pub fn is_square_attacked(board: &Board, target: Position, by: Player) -> bool {
    for (pos, piece) in board.iter() {
        if piece.owner != by {
            continue;
        }
        let moves = pseudo_legal_moves_for_piece(board, &piece, pos, false);
        if moves.iter().any(|m| m.to == target) {
            return true;
        }
    }
    false
}

/// All fully legal moves for `side`.
///
/// A pseudo-legal move survives if it captures the opponent's king outright,
/// or if the mover's king square is unreachable by the opponent once the move
/// is applied (probed against the post-apply board, then undone). A side with
/// no king has already lost and gets the empty set.
pub fn all_legal_moves(board: &mut Board, side: Player) -> MoveList {
    let mut legal = MoveList::new();
    let Some(king_home) = board.find_king(side) else {
        return legal;
    };
    let opponent = side.opponent();

    let own_pieces: Vec<(Position, Piece)> =
        board.iter().filter(|(_, p)| p.owner == side).collect();
    for (pos, piece) in own_pieces {
        for m in pseudo_legal_moves_for_piece(board, &piece, pos, true) {
            if matches!(
                board.at(m.to.row, m.to.col),
                Some(p) if p.owner == opponent && p.kind == PieceKind::King
            ) {
                legal.push(m);
                continue;
            }
            let king_sq = if m.from == king_home { m.to } else { king_home };
            let undo = m.apply(board);
            if !is_square_attacked(board, king_sq, opponent) {
                legal.push(m);
            }
            m.undo(board, undo);
        }
    }
    legal
}
