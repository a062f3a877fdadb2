//! Static evaluation used by the search.

use crate::{Board, CapturePriority, Side, Square};

/// Score of a position that is won for the evaluating side.
pub const WIN: i32 = i32::MAX;
/// Score of a position that is lost for the evaluating side.
pub const LOSS: i32 = i32::MIN;

/// Control of the well-connected middle of the board is worth more.
const POSITION_TABLE: [[i32; 5]; 5] = [
    [1, 2, 3, 2, 1],
    [2, 4, 6, 4, 2],
    [3, 6, 8, 6, 3],
    [2, 4, 6, 4, 2],
    [1, 2, 3, 2, 1],
];

/// Relative weights of the evaluation terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Weights {
    pub piece: i32,
    pub mobility: i32,
    pub position: i32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            piece: 100,
            mobility: 2,
            position: 1,
        }
    }
}

pub fn position_weight(sq: Square) -> i32 {
    POSITION_TABLE[sq.i() as usize][sq.j() as usize]
}

/// Evaluates `board` from the point of view of `perspective`; larger is better.
///
/// Returns [`WIN`] if the opponent is eliminated and [`LOSS`] if `perspective`
/// is, checked in that order. Otherwise the score is the weighted sum of the
/// differences in piece count, number of legal moves (as counted under
/// `priority`), and the positional weight of the occupied squares.
pub fn score(board: &Board, perspective: Side, weights: &Weights, priority: CapturePriority) -> i32 {
    let opponent = perspective.opponent();
    let mobility = |side: Side| board.legal_moves(side, false, priority).len() as i32;
    let position = |side: Side| board.pieces(side).into_iter().map(position_weight).sum::<i32>();

    let (own_pieces, opp_pieces) = (board.count(perspective) as i32, board.count(opponent) as i32);
    let (own_moves, opp_moves) = (mobility(perspective), mobility(opponent));

    if opp_pieces == 0 || opp_moves == 0 {
        return WIN;
    }
    if own_pieces == 0 || own_moves == 0 {
        return LOSS;
    }

    // Huge weights saturate short of WIN and LOSS.
    weights
        .piece
        .saturating_mul(own_pieces - opp_pieces)
        .saturating_add(weights.mobility.saturating_mul(own_moves - opp_moves))
        .saturating_add(
            weights
                .position
                .saturating_mul(position(perspective) - position(opponent)),
        )
        .clamp(LOSS + 1, WIN - 1)
}
