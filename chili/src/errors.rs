use crate::{Side, Square};

/// The error type for one move, see [`Match::play()`](crate::Match::play).
///
/// A rejected move never changes the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IllegalMove {
    GameOver,
    OutOfBounds { i: i8, j: i8 },
    NoPieceOfSide { square: Square, side: Side },
    MustContinueChain { from: Square },
    NotALegalMove { from: Square, to: Square },
    NoChainToEnd,
}

impl std::error::Error for IllegalMove {}

impl std::fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IllegalMove::GameOver => write!(f, "The game is already over"),
            IllegalMove::OutOfBounds { i, j } => {
                write!(f, "The square ({}, {}) is not on the board", i, j)
            }
            IllegalMove::NoPieceOfSide { square, side } => {
                write!(f, "There is no {} piece on {}", side, square)
            }
            IllegalMove::MustContinueChain { from } => write!(
                f,
                "A capture was made this turn, only the piece on {} may continue",
                from
            ),
            IllegalMove::NotALegalMove { from, to } => {
                write!(f, "Moving from {} to {} is not a legal move", from, to)
            }
            IllegalMove::NoChainToEnd => write!(
                f,
                "The turn can only be ended early after a capture, otherwise a move must be played"
            ),
        }
    }
}
