use tracing::{debug, info};

use crate::{Board, CapturePriority, IllegalMove, Move, Outcome, Side, Square, SquareSet};

/// Summarizes the effects of playing a move, for the renderer and the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveReport {
    pub side: Side,
    pub mv: Move,
    /// The opponent pieces that now belong to `side`.
    pub converted: SquareSet,
    pub outcome: Outcome,
    /// Set if the turn is not over: the piece on this square may capture again.
    pub chain: Option<Square>,
}

impl MoveReport {
    pub fn captured(&self) -> bool {
        !self.converted.is_empty()
    }
}

/// A live game: the board, whose turn it is, and the capture chain.
///
/// This is the only place where the live board is mutated. Every requested
/// move is validated against the generated legal moves first.
#[derive(Clone, Debug)]
pub struct Match {
    board: Board,
    to_move: Side,
    chain: Option<Square>,
    outcome: Outcome,
    priority: CapturePriority,
    turns: u32,
}

impl Match {
    /// A new game from the starting position, black to move.
    pub fn new() -> Self {
        Self::from_position(Board::new(), Side::Black)
    }

    pub fn from_position(board: Board, to_move: Side) -> Self {
        Self {
            board,
            to_move,
            chain: None,
            outcome: board.outcome(to_move),
            priority: CapturePriority::Nobody,
            turns: 0,
        }
    }

    /// Enforce capturing whenever possible for the given sides.
    pub fn with_capture_priority(mut self, priority: CapturePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Side {
        self.to_move
    }

    /// The square of the piece that captured this turn and may capture again.
    pub fn chain(&self) -> Option<Square> {
        self.chain
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn capture_priority(&self) -> CapturePriority {
        self.priority
    }

    /// Number of completed turns.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// All moves the side to move may play right now.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.outcome.is_over() {
            return Vec::new();
        }
        self.board.turn_moves(self.to_move, self.chain, self.priority)
    }

    /// The legal moves of the piece on `from`, e.g. to highlight destinations.
    pub fn moves_from(&self, from: Square) -> Vec<Move> {
        let mut moves = self.legal_moves();
        moves.retain(|mv| mv.from == from);
        moves
    }

    /// Plays the move from `from` to `to` for the side to move.
    ///
    /// If the move captured and the same piece can capture again, the turn
    /// stays open ([`MoveReport::chain`]); the player may continue or call
    /// [`Self::end_turn()`]. Otherwise the turn passes to the opponent.
    pub fn play(&mut self, from: Square, to: Square) -> Result<MoveReport, IllegalMove> {
        if self.outcome.is_over() {
            return Err(IllegalMove::GameOver);
        }
        let side = self.to_move;
        if self.board.get(from) != Some(side) {
            return Err(IllegalMove::NoPieceOfSide { square: from, side });
        }
        if let Some(chain) = self.chain.filter(|&sq| sq != from) {
            return Err(IllegalMove::MustContinueChain { from: chain });
        }
        let mv = self
            .moves_from(from)
            .into_iter()
            .find(|mv| mv.to == to)
            .ok_or(IllegalMove::NotALegalMove { from, to })?;

        let converted = self.board.apply(mv);
        debug!(%side, %mv, converted = converted.len(), "Move played");

        self.outcome = self.board.outcome(side.opponent());
        if let Outcome::Won(winner) = self.outcome {
            info!(%winner, turns = self.turns, "Game over");
            self.chain = None;
        } else if !converted.is_empty() && !self.board.moves_from(mv.to, true).is_empty() {
            self.chain = Some(mv.to);
        } else {
            self.pass_turn();
        }

        Ok(MoveReport {
            side,
            mv,
            converted,
            outcome: self.outcome,
            chain: self.chain,
        })
    }

    /// Plays a move given on the wire as coordinate pairs.
    pub fn play_coords(&mut self, from: [i8; 2], to: [i8; 2]) -> Result<MoveReport, IllegalMove> {
        self.play(Square::try_from(from)?, Square::try_from(to)?)
    }

    /// Stops a capture chain and hands the turn to the opponent.
    pub fn end_turn(&mut self) -> Result<(), IllegalMove> {
        if self.outcome.is_over() {
            return Err(IllegalMove::GameOver);
        }
        if self.chain.is_none() {
            return Err(IllegalMove::NoChainToEnd);
        }
        self.pass_turn();
        Ok(())
    }

    fn pass_turn(&mut self) {
        self.chain = None;
        self.to_move = self.to_move.opponent();
        self.turns += 1;
    }
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(i: i8, j: i8) -> Square {
        Square::at(i, j)
    }

    fn position(s: &str, to_move: Side) -> Match {
        Match::from_position(s.parse().unwrap(), to_move)
    }

    #[test]
    fn quiet_move_passes_the_turn() {
        let mut game = Match::new();
        let report = game.play(sq(3, 2), sq(2, 2)).unwrap();
        assert!(!report.captured());
        assert_eq!(report.chain, None);
        assert_eq!(game.to_move(), Side::White);
        assert_eq!(game.turns(), 1);
    }

    #[test]
    fn illegal_requests_leave_the_board_untouched() {
        let mut game = Match::new();
        let before = *game.board();
        assert_eq!(
            game.play(sq(1, 2), sq(2, 2)),
            Err(IllegalMove::NoPieceOfSide {
                square: sq(1, 2),
                side: Side::Black
            })
        );
        assert_eq!(
            game.play(sq(3, 2), sq(1, 2)),
            Err(IllegalMove::NotALegalMove {
                from: sq(3, 2),
                to: sq(1, 2)
            })
        );
        // (3,2) -> (2,1) is diagonal but not along a line.
        assert!(game.play(sq(3, 2), sq(2, 1)).is_err());
        assert_eq!(game.end_turn(), Err(IllegalMove::NoChainToEnd));
        assert_eq!(
            game.play_coords([3, 2], [5, 2]),
            Err(IllegalMove::OutOfBounds { i: 5, j: 2 })
        );
        assert_eq!(*game.board(), before);
        assert_eq!(game.to_move(), Side::Black);
    }

    #[test]
    fn long_capture_can_end_the_game() {
        let mut game = position(
            "
            .....
            .W...
            ..W..
            ...W.
            ....B
        ",
            Side::Black,
        );
        let report = game.play(sq(4, 4), sq(0, 0)).unwrap();
        assert_eq!(report.converted.len(), 3);
        assert_eq!(report.outcome, Outcome::Won(Side::Black));
        assert_eq!(report.chain, None);
        assert_eq!(game.play(sq(0, 0), sq(0, 1)), Err(IllegalMove::GameOver));
        assert_eq!(game.end_turn(), Err(IllegalMove::GameOver));
    }

    #[test]
    fn turn_passes_when_no_further_capture() {
        let mut game = position(
            "
            .....
            .W.W.
            ..B..
            .....
            W...B
        ",
            Side::Black,
        );
        let report = game.play(sq(2, 2), sq(0, 0)).unwrap();
        assert!(report.captured());
        assert_eq!(report.chain, None, "no second capture from (0,0)");
        assert_eq!(report.outcome, Outcome::Ongoing);
        assert_eq!(game.to_move(), Side::White);
        assert_eq!(game.turns(), 1);
    }

    #[test]
    fn chain_is_mandatory_to_continue_or_end() {
        // Black on (4,2) jumps (3,1) via the short diagonal to (2,0), and from
        // there can jump (1,0) up the column to (0,0).
        let mut game = position(
            "
            .....
            W....
            .....
            .W...
            ..B.B
        ",
            Side::Black,
        );
        let report = game.play(sq(4, 2), sq(2, 0)).unwrap();
        assert_eq!(report.chain, Some(sq(2, 0)));
        assert_eq!(game.to_move(), Side::Black);
        assert_eq!(game.legal_moves(), vec![Move::capture(sq(2, 0), sq(0, 0))]);
        assert_eq!(
            game.play(sq(4, 4), sq(3, 4)),
            Err(IllegalMove::MustContinueChain { from: sq(2, 0) })
        );
        assert_eq!(
            game.play(sq(2, 0), sq(2, 1)),
            Err(IllegalMove::NotALegalMove {
                from: sq(2, 0),
                to: sq(2, 1)
            })
        );

        let mut stopped = game.clone();
        stopped.end_turn().unwrap();
        assert_eq!(stopped.to_move(), Side::White);
        assert_eq!(stopped.chain(), None);

        let report = game.play(sq(2, 0), sq(0, 0)).unwrap();
        assert_eq!(report.outcome, Outcome::Won(Side::Black));
    }

    #[test]
    fn blocked_opponent_loses() {
        let mut game = position(
            "
            BW.W.
            WW...
            W.W..
            .....
            .....
        ",
            Side::White,
        );
        assert_eq!(game.outcome(), Outcome::Ongoing);
        let report = game.play(sq(0, 3), sq(0, 2)).unwrap();
        assert_eq!(game.board().count(Side::Black), 1);
        assert_eq!(report.outcome, Outcome::Won(Side::White));
        assert_eq!(game.outcome(), Outcome::Won(Side::White));
        assert!(game.legal_moves().is_empty());
    }

    #[test]
    fn capture_priority_is_enforced_when_configured() {
        let board = "
            .....
            .W...
            ..B..
            .....
            ....B
        ";
        let mut free = position(board, Side::Black);
        assert!(free.play(sq(4, 4), sq(3, 4)).is_ok());

        let mut forced = position(board, Side::Black)
            .with_capture_priority(CapturePriority::Only(Side::Black));
        assert!(forced.play(sq(4, 4), sq(3, 4)).is_err());
        assert!(forced.play(sq(2, 2), sq(0, 0)).is_ok());
    }
}
