use serde::{Deserialize, Serialize};

use crate::{Board, Side};

/// Whether the game is decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "winner", rename_all = "lowercase")]
pub enum Outcome {
    Ongoing,
    Won(Side),
}

impl Outcome {
    pub fn is_over(self) -> bool {
        self != Outcome::Ongoing
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            Outcome::Ongoing => None,
            Outcome::Won(side) => Some(side),
        }
    }
}

impl Board {
    /// A side has lost when it has no pieces left, or none of its pieces can move.
    pub fn is_eliminated(&self, side: Side) -> bool {
        self.count(side) == 0 || !self.has_any_move(side)
    }

    /// Checks both sides for elimination, `checked_first` before the other.
    ///
    /// If both sides are eliminated, `checked_first` is the loser. Callers pass
    /// the side that is about to move, so a move that leaves both sides stuck
    /// wins for the player who made it.
    pub fn outcome(&self, checked_first: Side) -> Outcome {
        if self.is_eliminated(checked_first) {
            Outcome::Won(checked_first.opponent())
        } else if self.is_eliminated(checked_first.opponent()) {
            Outcome::Won(checked_first)
        } else {
            Outcome::Ongoing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_board_is_ongoing() {
        assert_eq!(Board::new().outcome(Side::Black), Outcome::Ongoing);
        assert_eq!(Board::new().outcome(Side::White), Outcome::Ongoing);
    }

    #[test]
    fn blocked_side_loses_despite_having_pieces() {
        // Black's only piece sits in the corner, every neighbour is white and
        // every jump lands on another white piece. Long jumps fail because the
        // fourth square of each line is empty rather than a fourth white piece.
        let board: Board = "
            BWW..
            WW...
            W.W..
            .....
            .....
        "
        .parse()
        .unwrap();
        assert_eq!(board.count(Side::Black), 1);
        assert!(!board.has_any_move(Side::Black));
        assert_eq!(board.outcome(Side::Black), Outcome::Won(Side::White));
        assert_eq!(board.outcome(Side::White), Outcome::Won(Side::White));
    }

    #[test]
    fn side_without_pieces_loses() {
        let board: Board = "
            .....
            .....
            ..W..
            .....
            .....
        "
        .parse()
        .unwrap();
        assert_eq!(board.outcome(Side::White), Outcome::Won(Side::White));
        assert_eq!(board.outcome(Side::Black), Outcome::Won(Side::White));
    }

    #[test]
    fn both_stuck_decided_by_check_order() {
        let board = Board::empty();
        assert_eq!(board.outcome(Side::Black), Outcome::Won(Side::White));
        assert_eq!(board.outcome(Side::White), Outcome::Won(Side::Black));
    }

    #[test]
    fn outcome_serialization() {
        let json = serde_json::to_string(&Outcome::Won(Side::Black)).unwrap();
        assert_eq!(json, r#"{"status":"won","winner":"black"}"#);
    }
}
