mod lines;
mod square;
mod square_set;

use std::fmt;
use std::str::FromStr;

pub use lines::*;
pub use square::*;
pub use square_set::*;

use serde::{Deserialize, Serialize};

use crate::Move;

pub const BOARD_SIZE: i8 = 5;
pub const NUM_SQUARES: usize = 25;

/// One of the two players. Black always moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Black,
    White,
}

impl Side {
    pub const fn opponent(self) -> Side {
        match self {
            Side::Black => Side::White,
            Side::White => Side::Black,
        }
    }

    /// The stone used by the text renderer.
    pub const fn symbol(self) -> char {
        match self {
            Side::Black => '●',
            Side::White => '○',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Black => write!(f, "black"),
            Side::White => write!(f, "white"),
        }
    }
}

/// The occupancy of all 25 squares.
///
/// Pieces have no identity: a square is either empty or holds a piece of a
/// side. The board is `Copy`, so search can branch on private copies while the
/// live board is owned by a [`Match`](crate::Match).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    /// Indexed by `Side as usize`. The two sets never overlap.
    pieces: [SquareSet; 2],
}

impl Board {
    /// The starting position: white on rows 0 and 1, black on rows 3 and 4,
    /// row 2 empty.
    pub fn new() -> Self {
        let mut board = Self::empty();
        for sq in Square::all() {
            match sq.i() {
                0 | 1 => board.set(sq, Some(Side::White)),
                3 | 4 => board.set(sq, Some(Side::Black)),
                _ => {}
            }
        }
        board
    }

    pub const fn empty() -> Self {
        Self {
            pieces: [SquareSet::new(), SquareSet::new()],
        }
    }

    pub fn get(&self, sq: Square) -> Option<Side> {
        if self.pieces[Side::Black as usize].contains(sq) {
            Some(Side::Black)
        } else if self.pieces[Side::White as usize].contains(sq) {
            Some(Side::White)
        } else {
            None
        }
    }

    pub fn set(&mut self, sq: Square, occupant: Option<Side>) {
        for set in self.pieces.iter_mut() {
            *set = set.remove(sq);
        }
        if let Some(side) = occupant {
            let set = &mut self.pieces[side as usize];
            *set = set.insert(sq);
        }
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        !self.occupied().contains(sq)
    }

    /// The squares holding pieces of `side`.
    pub fn pieces(&self, side: Side) -> SquareSet {
        self.pieces[side as usize]
    }

    pub fn occupied(&self) -> SquareSet {
        self.pieces[0] | self.pieces[1]
    }

    pub fn count(&self, side: Side) -> u32 {
        self.pieces[side as usize].len()
    }

    /// Plays a move in place and returns the squares that were converted.
    ///
    /// For a capture, every opponent piece strictly between `from` and `to`
    /// changes sides; it is not removed. The moving piece then lands on `to`.
    /// The returned set is empty exactly when nothing was captured.
    ///
    /// The move is not validated, see [`Board::moves_from()`] for that. If
    /// `from` is empty or equal to `to`, the board is left unchanged.
    pub fn apply(&mut self, mv: Move) -> SquareSet {
        let Some(side) = self.get(mv.from) else {
            debug_assert!(false, "no piece to move on {}", mv.from);
            return SquareSet::new();
        };
        let mut converted = SquareSet::new();
        if mv.from == mv.to {
            return converted;
        }
        if mv.is_capture {
            let step = mv.from.distance(mv.to);
            let dir = (
                (mv.to.i() - mv.from.i()) / step,
                (mv.to.j() - mv.from.j()) / step,
            );
            for k in 1..step {
                if let Some(mid) = mv.from.offset(dir, k) {
                    if self.get(mid) == Some(side.opponent()) {
                        self.set(mid, Some(side));
                        converted = converted.insert(mid);
                    }
                }
            }
        }
        self.set(mv.from, None);
        self.set(mv.to, Some(side));
        converted
    }

    /// The board after `mv`, leaving `self` untouched.
    #[must_use]
    pub fn with_move(&self, mv: Move) -> Board {
        let mut next = *self;
        next.apply(mv);
        next
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for i in 0..BOARD_SIZE {
            for j in 0..BOARD_SIZE {
                let c = match self.get(Square::at(i, j)) {
                    Some(Side::Black) => 'B',
                    Some(Side::White) => 'W',
                    None => '.',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The error type for the [`FromStr`] instance of [`Board`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardFromStrErr {
    WrongNumberOfRows,
    WrongNumberOfColumns { row: usize },
    InvalidChar(char),
}

impl fmt::Display for BoardFromStrErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardFromStrErr::WrongNumberOfRows => write!(f, "expected 5 rows"),
            BoardFromStrErr::WrongNumberOfColumns { row } => {
                write!(f, "expected 5 squares in row {}", row)
            }
            BoardFromStrErr::InvalidChar(c) => {
                write!(f, "invalid square '{}', expected 'B', 'W' or '.'", c)
            }
        }
    }
}

impl std::error::Error for BoardFromStrErr {}

impl FromStr for Board {
    type Err = BoardFromStrErr;

    /// Parses five rows of `B`, `W` or `.`. Blank lines and spaces are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if rows.len() != BOARD_SIZE as usize {
            return Err(BoardFromStrErr::WrongNumberOfRows);
        }
        let mut board = Board::empty();
        for (i, row) in rows.iter().enumerate() {
            let cells: Vec<char> = row.chars().filter(|c| !c.is_whitespace()).collect();
            if cells.len() != BOARD_SIZE as usize {
                return Err(BoardFromStrErr::WrongNumberOfColumns { row: i });
            }
            for (j, c) in cells.into_iter().enumerate() {
                let occupant = match c {
                    'B' | 'b' => Some(Side::Black),
                    'W' | 'w' => Some(Side::White),
                    '.' => None,
                    other => return Err(BoardFromStrErr::InvalidChar(other)),
                };
                board.set(Square::at(i as i8, j as i8), occupant);
            }
        }
        Ok(board)
    }
}
