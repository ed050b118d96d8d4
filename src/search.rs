use crate::board::{Board, Player};
use crate::evaluation::{evaluate, MAX_SCORE, MIN_SCORE};
use crate::game::Game;
use crate::moves::{all_legal_moves, Move, MoveList};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

mod tt;
pub use tt::{Bound, Entry, TranspositionTable};

/// How many node visits pass between limit polls.
const POLL_MASK: u64 = 63;

// ============================================================================
// Strategy & limits
// ============================================================================

/// The available search algorithms behind the one [`Searcher`] interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Minimax,
    AlphaBeta,
    MtdF,
}

/// Cooperative stop conditions, polled at search nodes. The caller owns the
/// cancel flag; the core never spawns threads or takes locks.
#[derive(Debug, Clone, Default)]
pub struct SearchLimits {
    pub deadline: Option<Instant>,
    pub cancel: Option<Arc<AtomicBool>>,
}

impl SearchLimits {
    pub fn none() -> Self {
        SearchLimits::default()
    }

    fn tripped(&self) -> bool {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }
        if let Some(cancel) = &self.cancel {
            if cancel.load(Ordering::Relaxed) {
                return true;
            }
        }
        false
    }
}

// ============================================================================
// Searcher
// ============================================================================

/// Adversarial searcher for one root side: strategy, depth bound, and the
/// transposition table its searches share. Scores are always from `root`'s
/// perspective, so the table stays valid across this searcher's turns.
pub struct Searcher {
    strategy: Strategy,
    max_depth: u32,
    root: Player,
    tt: TranspositionTable,
    limits: SearchLimits,
    nodes: u64,
    aborted: bool,
}

impl Searcher {
    pub fn new(strategy: Strategy, max_depth: u32, root: Player) -> Self {
        assert!(max_depth >= 1, "search depth must be at least 1");
        Searcher {
            strategy,
            max_depth,
            root,
            tt: TranspositionTable::new(),
            limits: SearchLimits::none(),
            nodes: 0,
            aborted: false,
        }
    }

    pub fn set_limits(&mut self, limits: SearchLimits) {
        self.limits = limits;
    }

    /// Nodes visited by the most recent search.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn table(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Best move for `root` at the configured depth, or `None` when a limit
    /// aborted the search. Must not be invoked on a terminal position.
    pub fn best_move(&mut self, game: &Game) -> Option<Move> {
        self.nodes = 0;
        self.aborted = false;
        let best = self.search_at(game, self.max_depth);
        if self.aborted {
            None
        } else {
            best
        }
    }

    /// Iterative deepening under the configured limits: searches depth 1,
    /// then 2, up to the depth bound, and returns the best move of the last
    /// fully completed depth. `None` only when depth 1 never completes.
    pub fn best_move_timed(&mut self, game: &Game) -> Option<Move> {
        self.nodes = 0;
        let mut best = None;
        for depth in 1..=self.max_depth {
            self.aborted = false;
            let candidate = self.search_at(game, depth);
            if self.aborted {
                break;
            }
            best = candidate;
        }
        best
    }

    fn search_at(&mut self, game: &Game, depth: u32) -> Option<Move> {
        let mut board = game.board_copy();
        let root_moves = all_legal_moves(&mut board, self.root);
        assert!(
            !root_moves.is_empty(),
            "search invoked on a terminal position"
        );
        match self.strategy {
            Strategy::Minimax => self.minimax_root(&mut board, root_moves, depth),
            Strategy::AlphaBeta => self.alphabeta_root(&mut board, root_moves, depth),
            Strategy::MtdF => self.mtdf_root(&mut board, root_moves, depth),
        }
    }

    /// Bump the node counter and poll the limits every `POLL_MASK + 1` visits.
    fn tick(&mut self) {
        self.nodes += 1;
        if !self.aborted && self.nodes & POLL_MASK == 0 && self.limits.tripped() {
            self.aborted = true;
        }
    }

    /// Evaluate a leaf: both sides' legal moves form the combined set the
    /// evaluator scores mobility from. `moves` belongs to `current`.
    fn evaluate_leaf(&mut self, board: &mut Board, current: Player, moves: &MoveList) -> i32 {
        let other_moves = all_legal_moves(board, current.opponent());
        let (own, opp) = if current == self.root {
            (moves, &other_moves)
        } else {
            (&other_moves, moves)
        };
        evaluate(board, self.root, own, opp)
    }

    // ------------------------------------------------------------------
    // Minimax (reference)
    // ------------------------------------------------------------------

    fn minimax_root(&mut self, board: &mut Board, root_moves: MoveList, depth: u32) -> Option<Move> {
        let mut best = None;
        let mut best_score = MIN_SCORE;
        for m in root_moves {
            let undo = m.apply(board);
            let score = self.minimax(board, depth - 1, self.root.opponent());
            m.undo(board, undo);
            if self.aborted {
                break;
            }
            // >= so a move survives even when every line is lost.
            if best.is_none() || score >= best_score {
                best = Some(m);
                best_score = score;
            }
        }
        best
    }

    fn minimax(&mut self, board: &mut Board, remaining: u32, current: Player) -> i32 {
        self.tick();
        if self.aborted {
            return 0;
        }
        if let Some(entry) = self.tt.get(board, current) {
            if entry.depth >= remaining && entry.bound == Bound::Exact {
                return entry.score;
            }
        }

        let maximizer = current == self.root;
        let moves = all_legal_moves(board, current);
        if moves.is_empty() {
            return if maximizer { MIN_SCORE } else { MAX_SCORE };
        }
        if remaining == 0 {
            let score = self.evaluate_leaf(board, current, &moves);
            self.tt.put(board, current, score, 0, Bound::Exact);
            return score;
        }

        let mut score = if maximizer { MIN_SCORE } else { MAX_SCORE };
        for m in moves {
            let undo = m.apply(board);
            let child = self.minimax(board, remaining - 1, current.opponent());
            m.undo(board, undo);
            if self.aborted {
                return score;
            }
            score = if maximizer {
                score.max(child)
            } else {
                score.min(child)
            };
        }
        self.tt.put(board, current, score, remaining, Bound::Exact);
        score
    }

    // ------------------------------------------------------------------
    // Alpha-beta (fail-soft)
    // ------------------------------------------------------------------

    fn alphabeta_root(
        &mut self,
        board: &mut Board,
        root_moves: MoveList,
        depth: u32,
    ) -> Option<Move> {
        let mut best = None;
        // One below MIN_SCORE: the first child always raises the window, and
        // only strictly better scores replace the best move afterwards --
        // bound approximations from the cache must not demote an exact best.
        let mut best_score = MIN_SCORE - 1;
        for m in root_moves {
            let undo = m.apply(board);
            let score =
                self.alphabeta(board, depth - 1, self.root.opponent(), best_score, MAX_SCORE);
            m.undo(board, undo);
            if self.aborted {
                break;
            }
            if score > best_score {
                best = Some(m);
                best_score = score;
            }
        }
        best
    }

    fn alphabeta(
        &mut self,
        board: &mut Board,
        remaining: u32,
        current: Player,
        mut lower: i32,
        mut upper: i32,
    ) -> i32 {
        self.tick();
        if self.aborted {
            return 0;
        }
        let (orig_lower, orig_upper) = (lower, upper);

        if let Some(entry) = self.tt.get(board, current) {
            if entry.depth >= remaining {
                match entry.bound {
                    Bound::Exact => return entry.score,
                    Bound::Lower => lower = lower.max(entry.score),
                    Bound::Upper => upper = upper.min(entry.score),
                }
                if lower >= upper {
                    return entry.score;
                }
            }
        }

        let maximizer = current == self.root;
        let moves = all_legal_moves(board, current);
        if moves.is_empty() {
            return if maximizer { MIN_SCORE } else { MAX_SCORE };
        }
        if remaining == 0 {
            let score = self.evaluate_leaf(board, current, &moves);
            self.tt.put(board, current, score, 0, Bound::Exact);
            return score;
        }

        let mut score = if maximizer { MIN_SCORE } else { MAX_SCORE };
        for m in moves {
            let undo = m.apply(board);
            let child = self.alphabeta(board, remaining - 1, current.opponent(), lower, upper);
            m.undo(board, undo);
            if self.aborted {
                return score;
            }
            if maximizer {
                score = score.max(child);
                lower = lower.max(score);
            } else {
                score = score.min(child);
                upper = upper.min(score);
            }
            if lower >= upper {
                break;
            }
        }

        // Fail-soft: classify against the window this node was asked about,
        // not the cache-tightened one.
        let bound = if score >= orig_upper {
            Bound::Lower
        } else if score <= orig_lower {
            Bound::Upper
        } else {
            Bound::Exact
        };
        self.tt.put(board, current, score, remaining, bound);
        score
    }

    // ------------------------------------------------------------------
    // MTD-f (zero-window driver over alpha-beta)
    // ------------------------------------------------------------------

    fn mtdf_root(&mut self, board: &mut Board, root_moves: MoveList, depth: u32) -> Option<Move> {
        let mut best = None;
        let mut best_score = MIN_SCORE - 1;
        for m in root_moves {
            let undo = m.apply(board);
            let score = self.mtdf_value(board, depth - 1, best_score);
            m.undo(board, undo);
            if self.aborted {
                break;
            }
            if score > best_score {
                best = Some(m);
                best_score = score;
            }
        }
        best
    }

    /// Converge on the subtree's value with null-window probes: each probe
    /// turns its fail-soft result into a tighter bound until the interval
    /// closes.
    fn mtdf_value(&mut self, board: &mut Board, remaining: u32, floor: i32) -> i32 {
        let mut score_lower = floor;
        let mut score_upper = MAX_SCORE;
        loop {
            let window_upper = (score_lower + score_upper).div_euclid(2) + 1;
            let score = self.alphabeta(
                board,
                remaining,
                self.root.opponent(),
                window_upper - 1,
                window_upper,
            );
            if self.aborted {
                return score;
            }
            if score < window_upper {
                score_upper = score;
            } else {
                score_lower = score;
            }
            if score_lower >= score_upper {
                return score;
            }
        }
    }
}

/// One-shot search surface: build a searcher for `side` and run it once.
pub fn best_move(game: &Game, strategy: Strategy, depth: u32, side: Player) -> Option<Move> {
    Searcher::new(strategy, depth, side).best_move(game)
}
