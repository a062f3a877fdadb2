//! Minimax search with alpha-beta pruning for the computer player.

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::eval::{score, Weights, LOSS, WIN};
use crate::{Board, CapturePriority, Move, Side, Square};

/// Limits and tuning of one search.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Search depth in plies. A depth of 0 is treated as 1.
    pub depth: u8,
    /// Wall-clock ceiling for one call to [`choose_move()`].
    pub time_budget: Duration,
    pub weights: Weights,
    /// Whether the simulated replies of the opponent are also forced to
    /// capture when they can. The searching side always is.
    pub replies_must_capture: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            time_budget: Duration::from_millis(4000),
            weights: Weights::default(),
            replies_must_capture: false,
        }
    }
}

/// Result of [`choose_move()`].
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// `None` only if there is no legal move.
    pub best_move: Option<Move>,
    /// Minimax score of `best_move`. `None` when the move was picked at random
    /// after running out of time.
    pub score: Option<i32>,
    /// Number of positions visited.
    pub nodes: u64,
    /// True if the search was abandoned because the time budget ran out.
    pub timed_out: bool,
}

/// Picks a move for `side` on `board`.
///
/// The candidates are the moves of the current turn state: with `chain` set
/// (a capture was made this turn and the piece on `chain` may continue) only
/// its further captures, otherwise all moves of `side`, captures only if any
/// capture exists. The search never returns a move outside this set.
///
/// Ties keep the first candidate in generation order. If the time budget runs
/// out before the search finishes, a candidate is chosen uniformly at random.
pub fn choose_move<R: Rng + ?Sized>(
    board: &Board,
    side: Side,
    chain: Option<Square>,
    config: &SearchConfig,
    rng: &mut R,
) -> SearchOutcome {
    let priority = if config.replies_must_capture {
        CapturePriority::Everybody
    } else {
        CapturePriority::Only(side)
    };
    let candidates = board.turn_moves(side, chain, priority);
    if candidates.is_empty() {
        return SearchOutcome {
            best_move: None,
            score: None,
            nodes: 0,
            timed_out: false,
        };
    }

    let mut searcher = Searcher {
        side,
        weights: config.weights,
        priority,
        deadline: Deadline::new(config.time_budget),
        nodes: 0,
    };

    match searcher.root(board, &candidates, config.depth.max(1)) {
        Some((best_move, best_score)) => {
            debug!(%best_move, score = best_score, nodes = searcher.nodes, "Search finished");
            SearchOutcome {
                best_move: Some(best_move),
                score: Some(best_score),
                nodes: searcher.nodes,
                timed_out: false,
            }
        }
        None => {
            let fallback = candidates.choose(rng).copied();
            warn!(
                budget_ms = config.time_budget.as_millis() as u64,
                nodes = searcher.nodes,
                "Search timed out, playing a random legal move"
            );
            SearchOutcome {
                best_move: fallback,
                score: None,
                nodes: searcher.nodes,
                timed_out: true,
            }
        }
    }
}

/// Cooperative time limit, polled between sibling expansions.
struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    fn new(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    fn expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }
}

struct Searcher {
    side: Side,
    weights: Weights,
    priority: CapturePriority,
    deadline: Deadline,
    nodes: u64,
}

impl Searcher {
    /// Returns `None` if time ran out before every candidate was searched.
    fn root(&mut self, board: &Board, candidates: &[Move], depth: u8) -> Option<(Move, i32)> {
        let mut alpha = LOSS;
        let beta = WIN;
        let mut best = candidates[0];
        let mut best_score = LOSS;
        let mut first = true;

        for &mv in candidates {
            if self.deadline.expired() {
                return None;
            }
            let child = board.with_move(mv);
            let child_score = self.minimax(&child, depth - 1, alpha, beta, false)?;
            if first || child_score > best_score {
                best = mv;
                best_score = child_score;
                first = false;
            }
            alpha = alpha.max(child_score);
            if beta <= alpha {
                break;
            }
        }
        Some((best, best_score))
    }

    fn minimax(
        &mut self,
        board: &Board,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> Option<i32> {
        self.nodes += 1;
        if depth == 0 {
            return Some(self.evaluate(board));
        }
        if self.deadline.expired() {
            return None;
        }

        let player = if maximizing {
            self.side
        } else {
            self.side.opponent()
        };
        let moves = board.legal_moves(player, false, self.priority);
        if moves.is_empty() {
            return Some(self.evaluate(board));
        }

        if maximizing {
            let mut max_eval = LOSS;
            for mv in moves {
                let eval = self.minimax(&board.with_move(mv), depth - 1, alpha, beta, false)?;
                max_eval = max_eval.max(eval);
                alpha = alpha.max(eval);
                if beta <= alpha {
                    break; // Beta cutoff
                }
            }
            Some(max_eval)
        } else {
            let mut min_eval = WIN;
            for mv in moves {
                let eval = self.minimax(&board.with_move(mv), depth - 1, alpha, beta, true)?;
                min_eval = min_eval.min(eval);
                beta = beta.min(eval);
                if beta <= alpha {
                    break; // Alpha cutoff
                }
            }
            Some(min_eval)
        }
    }

    fn evaluate(&self, board: &Board) -> i32 {
        score(board, self.side, &self.weights, self.priority)
    }
}
