use crate::error::{ChessError, ChessResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Position
// ============================================================================

/// A (row, col) square address. Row 0 is BOTTOM's back rank, column 0 is the
/// left edge; a TOP pawn's "forward" is decreasing row.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    #[inline]
    pub fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ============================================================================
// Player
// ============================================================================

/// The two players, named for the board edge their back rank occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Top,
    Bottom,
}

impl Player {
    #[inline]
    pub fn opponent(&self) -> Self {
        match self {
            Player::Top => Player::Bottom,
            Player::Bottom => Player::Top,
        }
    }

    /// Row delta of a forward pawn step.
    #[inline]
    pub fn forward(&self) -> i32 {
        match self {
            Player::Top => -1,
            Player::Bottom => 1,
        }
    }

    /// Row on which this side's pawns promote.
    #[inline]
    pub fn promotion_row(&self, height: i32) -> i32 {
        match self {
            Player::Top => 0,
            Player::Bottom => height - 1,
        }
    }

    /// Row on which this side's pawns start.
    #[inline]
    pub fn pawn_row(&self, height: i32) -> i32 {
        match self {
            Player::Top => height - 2,
            Player::Bottom => 1,
        }
    }

    /// Index usable for per-side tables.
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Player::Top => 0,
            Player::Bottom => 1,
        }
    }
}

// ============================================================================
// PieceKind
// ============================================================================

/// Piece kinds. `Castle` is the rook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    King,
    Queen,
    Castle,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    fn letter(&self) -> char {
        match self {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Castle => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        }
    }
}

// ============================================================================
// Piece
// ============================================================================

/// An immutable piece value: owner, kind, and whether it has moved.
/// "Marking moved" produces a new value via [`Piece::with_moved`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub owner: Player,
    pub kind: PieceKind,
    pub has_moved: bool,
}

impl Piece {
    #[inline]
    pub fn new(owner: Player, kind: PieceKind) -> Self {
        Piece {
            owner,
            kind,
            has_moved: false,
        }
    }

    /// Copy of this piece with `has_moved` replaced.
    #[inline]
    pub fn with_moved(&self, has_moved: bool) -> Self {
        Piece { has_moved, ..*self }
    }
}

// ============================================================================
// Board
// ============================================================================

/// A height×width grid of optional pieces with structural equality and hash.
///
/// `Clone` is the deep copy: pieces are plain values, so a cloned board
/// shares no mutable state with the original.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    height: i32,
    width: i32,
    squares: Vec<Option<Piece>>,
}

impl Board {
    /// An empty board. Dimensions are fixed for the board's lifetime.
    pub fn new(height: i32, width: i32) -> Self {
        assert!(
            height >= 0 && width >= 0,
            "board dimensions must be non-negative"
        );
        Board {
            height,
            width,
            squares: vec![None; (height * width) as usize],
        }
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn dimensions(&self) -> (i32, i32) {
        (self.height, self.width)
    }

    #[inline]
    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && row < self.height && col >= 0 && col < self.width
    }

    /// Piece at (row, col), or `ChessError::OutOfBounds` for an invalid index.
    pub fn get(&self, row: i32, col: i32) -> ChessResult<Option<Piece>> {
        if !self.in_bounds(row, col) {
            return Err(ChessError::OutOfBounds { row, col });
        }
        Ok(self.squares[(row * self.width + col) as usize])
    }

    /// Overwrite (row, col) with `piece`; same bounds contract as [`Board::get`].
    pub fn set(&mut self, row: i32, col: i32, piece: Option<Piece>) -> ChessResult<()> {
        if !self.in_bounds(row, col) {
            return Err(ChessError::OutOfBounds { row, col });
        }
        self.squares[(row * self.width + col) as usize] = piece;
        Ok(())
    }

    /// Unchecked accessor for move generation. Callers verify bounds first.
    #[inline]
    pub(crate) fn at(&self, row: i32, col: i32) -> Option<Piece> {
        debug_assert!(self.in_bounds(row, col));
        self.squares[(row * self.width + col) as usize]
    }

    #[inline]
    pub(crate) fn put(&mut self, pos: Position, piece: Option<Piece>) {
        debug_assert!(self.in_bounds(pos.row, pos.col));
        self.squares[(pos.row * self.width + pos.col) as usize] = piece;
    }

    /// Iterate over occupied squares as `(Position, Piece)`, row-major from
    /// the bottom-left corner.
    pub fn iter(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.squares.iter().enumerate().filter_map(move |(i, sq)| {
            sq.map(|piece| {
                let i = i as i32;
                (Position::new(i / self.width, i % self.width), piece)
            })
        })
    }

    /// Square of `side`'s king, if one is on the board.
    pub fn find_king(&self, side: Player) -> Option<Position> {
        self.iter()
            .find(|(_, p)| p.owner == side && p.kind == PieceKind::King)
            .map(|(pos, _)| pos)
    }
}

impl fmt::Display for Board {
    /// Textual grid for diagnostics: TOP pieces uppercase, BOTTOM lowercase,
    /// highest row printed first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.height).rev() {
            write!(f, "{row:2} ")?;
            for col in 0..self.width {
                let cell = match self.at(row, col) {
                    Some(p) if p.owner == Player::Top => p.kind.letter().to_ascii_uppercase(),
                    Some(p) => p.kind.letter(),
                    None => '.',
                };
                write!(f, " {cell}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   ")?;
        for col in 0..self.width {
            write!(f, " {}", col % 10)?;
        }
        Ok(())
    }
}
