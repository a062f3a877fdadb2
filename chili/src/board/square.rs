use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{IllegalMove, BOARD_SIZE, NUM_SQUARES};

/// A point of the 5 x 5 grid, in the canonical frame.
///
/// `i` is the row (0 at the top), `j` the column. Both are always in `0..5`,
/// which is checked on construction. On the wire a square is the pair `[i, j]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "[i8; 2]", into = "[i8; 2]")]
pub struct Square {
    i: i8,
    j: i8,
}

impl Square {
    /// Returns `None` for coordinates outside of the board.
    pub const fn new(i: i8, j: i8) -> Option<Self> {
        if in_bounds(i, j) {
            Some(Self { i, j })
        } else {
            None
        }
    }

    /// Like [`Self::new()`], for coordinates that are known to be valid.
    ///
    /// Panics if the coordinates are out of bounds.
    pub const fn at(i: i8, j: i8) -> Self {
        assert!(in_bounds(i, j), "square out of bounds");
        Self { i, j }
    }

    pub const fn i(self) -> i8 {
        self.i
    }

    pub const fn j(self) -> i8 {
        self.j
    }

    /// Row-major index in `0..25`.
    pub const fn index(self) -> usize {
        (self.i * BOARD_SIZE + self.j) as usize
    }

    pub const fn from_index(idx: usize) -> Self {
        assert!(idx < NUM_SQUARES);
        Self {
            i: (idx / BOARD_SIZE as usize) as i8,
            j: (idx % BOARD_SIZE as usize) as i8,
        }
    }

    /// The square `steps` unit steps away in direction `(di, dj)`, if it is on the board.
    pub const fn offset(self, dir: (i8, i8), steps: i8) -> Option<Self> {
        Self::new(self.i + dir.0 * steps, self.j + dir.1 * steps)
    }

    /// Number of king steps between the two squares, i.e. `max(|Δi|, |Δj|)`.
    pub const fn distance(self, other: Square) -> i8 {
        let di = (other.i - self.i).abs();
        let dj = (other.j - self.j).abs();
        if di > dj {
            di
        } else {
            dj
        }
    }

    /// All 25 squares in row-major order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..NUM_SQUARES).map(Square::from_index)
    }
}

const fn in_bounds(i: i8, j: i8) -> bool {
    i >= 0 && i < BOARD_SIZE && j >= 0 && j < BOARD_SIZE
}

impl TryFrom<[i8; 2]> for Square {
    type Error = IllegalMove;

    fn try_from([i, j]: [i8; 2]) -> Result<Self, Self::Error> {
        Square::new(i, j).ok_or(IllegalMove::OutOfBounds { i, j })
    }
}

impl From<Square> for [i8; 2] {
    fn from(sq: Square) -> Self {
        [sq.i, sq.j]
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.i, self.j)
    }
}

/// The error type for the [`FromStr`] instance of [`Square`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SquareFromStrErr {
    MissingComma,
    InvalidNumber,
    OutOfBounds,
}

impl fmt::Display for SquareFromStrErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareFromStrErr::MissingComma => write!(f, "expected a square like \"2,3\""),
            SquareFromStrErr::InvalidNumber => write!(f, "row and column must be numbers"),
            SquareFromStrErr::OutOfBounds => write!(f, "row and column must be between 0 and 4"),
        }
    }
}

impl std::error::Error for SquareFromStrErr {}

impl FromStr for Square {
    type Err = SquareFromStrErr;

    /// Parses `"i,j"`, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (i, j) = s.trim().split_once(',').ok_or(SquareFromStrErr::MissingComma)?;
        let i: i8 = i.trim().parse().map_err(|_| SquareFromStrErr::InvalidNumber)?;
        let j: i8 = j.trim().parse().map_err(|_| SquareFromStrErr::InvalidNumber)?;
        Square::new(i, j).ok_or(SquareFromStrErr::OutOfBounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrips_for_every_square() {
        for (idx, sq) in Square::all().enumerate() {
            assert_eq!(sq.index(), idx);
            assert_eq!(Square::from_index(idx), sq);
        }
    }

    #[test]
    fn offset_leaves_the_board() {
        let corner = Square::at(0, 0);
        assert_eq!(corner.offset((-1, 0), 1), None);
        assert_eq!(corner.offset((1, 1), 4), Some(Square::at(4, 4)));
        assert_eq!(corner.offset((1, 1), 5), None);
    }

    #[test]
    fn parse_and_wire_format() {
        assert_eq!("2, 3".parse::<Square>(), Ok(Square::at(2, 3)));
        assert_eq!("5,0".parse::<Square>(), Err(SquareFromStrErr::OutOfBounds));
        assert_eq!("23".parse::<Square>(), Err(SquareFromStrErr::MissingComma));

        let json = serde_json::to_string(&Square::at(1, 4)).unwrap();
        assert_eq!(json, "[1,4]");
        assert!(serde_json::from_str::<Square>("[1,5]").is_err());
    }
}
