use crate::board::{Board, Player};
use rustc_hash::FxHashMap;

// ============================================================================
// Entry
// ============================================================================

/// How a cached score relates to the true value of its position: exact, a
/// lower bound (the search failed high), or an upper bound (it failed low).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

/// A cached search result: score from the searching root's perspective,
/// the remaining depth it was computed at, and its bound type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub score: i32,
    pub depth: u32,
    pub bound: Bound,
}

// ============================================================================
// Transposition table
// ============================================================================

/// Cache from (board value, side to move) to a scored, depth-tagged,
/// bound-typed entry, shared by the searchers to reuse work across branches
/// that transpose into the same position.
///
/// Keys are deep copies taken at insertion, so callers may keep mutating
/// their scratch board. Not thread-safe; a searcher owns its table.
#[derive(Debug, Default)]
pub struct TranspositionTable {
    tables: [FxHashMap<Board, Entry>; 2],
}

impl TranspositionTable {
    pub fn new() -> Self {
        TranspositionTable::default()
    }

    /// Insert or replace the entry for (board, side). A shallower result
    /// never overwrites a deeper one at the same key.
    pub fn put(&mut self, board: &Board, side: Player, score: i32, depth: u32, bound: Bound) {
        let table = &mut self.tables[side.index()];
        match table.get_mut(board) {
            Some(existing) => {
                if depth >= existing.depth {
                    *existing = Entry { score, depth, bound };
                }
            }
            None => {
                table.insert(board.clone(), Entry { score, depth, bound });
            }
        }
    }

    pub fn get(&self, board: &Board, side: Player) -> Option<Entry> {
        self.tables[side.index()].get(board).copied()
    }

    pub fn clear(&mut self) {
        self.tables[0].clear();
        self.tables[1].clear();
    }

    pub fn len(&self) -> usize {
        self.tables[0].len() + self.tables[1].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Piece, PieceKind};

    fn sample_board() -> Board {
        let mut board = Board::new(4, 4);
        board
            .set(0, 0, Some(Piece::new(Player::Bottom, PieceKind::King)))
            .unwrap();
        board
            .set(3, 3, Some(Piece::new(Player::Top, PieceKind::King)))
            .unwrap();
        board
    }

    #[test]
    fn put_then_get_round_trips() {
        let mut tt = TranspositionTable::new();
        let board = sample_board();
        assert_eq!(tt.get(&board, Player::Bottom), None);

        tt.put(&board, Player::Bottom, 42, 3, Bound::Exact);
        assert_eq!(
            tt.get(&board, Player::Bottom),
            Some(Entry {
                score: 42,
                depth: 3,
                bound: Bound::Exact
            })
        );
        // The sides are distinct keys.
        assert_eq!(tt.get(&board, Player::Top), None);
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn equal_or_deeper_entries_replace_shallower_ones() {
        let mut tt = TranspositionTable::new();
        let board = sample_board();

        tt.put(&board, Player::Top, 10, 4, Bound::Lower);
        tt.put(&board, Player::Top, 20, 2, Bound::Exact);
        assert_eq!(tt.get(&board, Player::Top).unwrap().score, 10);

        // Equal depth replaces.
        tt.put(&board, Player::Top, 30, 4, Bound::Upper);
        let entry = tt.get(&board, Player::Top).unwrap();
        assert_eq!(entry.score, 30);
        assert_eq!(entry.bound, Bound::Upper);

        tt.put(&board, Player::Top, 40, 7, Bound::Exact);
        assert_eq!(tt.get(&board, Player::Top).unwrap().depth, 7);
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn keys_are_insulated_from_later_mutation() {
        let mut tt = TranspositionTable::new();
        let mut board = sample_board();
        tt.put(&board, Player::Bottom, 5, 1, Bound::Exact);

        let original = board.clone();
        board
            .set(1, 1, Some(Piece::new(Player::Bottom, PieceKind::Queen)))
            .unwrap();
        // The mutated board is a different key; the original still hits.
        assert_eq!(tt.get(&board, Player::Bottom), None);
        assert!(tt.get(&original, Player::Bottom).is_some());
    }

    #[test]
    fn clear_empties_both_sides() {
        let mut tt = TranspositionTable::new();
        let board = sample_board();
        tt.put(&board, Player::Bottom, 1, 0, Bound::Exact);
        tt.put(&board, Player::Top, 2, 0, Bound::Exact);
        assert_eq!(tt.len(), 2);
        tt.clear();
        assert!(tt.is_empty());
    }
}
