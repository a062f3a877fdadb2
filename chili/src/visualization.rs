use std::fmt;

use crate::{Board, Square, SquareSet, BOARD_SIZE};

/// Draws the board as text, with row and column indices.
///
/// Squares in `marked` are drawn as `+` if they are empty, which the
/// terminal front end uses to show the destinations of a piece.
pub fn visualize_board(board: &Board, marked: SquareSet) -> String {
    let mut result = String::from("    ");
    for j in 0..BOARD_SIZE {
        result += &format!(" {}", j);
    }
    // Draw the top of the box
    result += "\n    ╭";
    for _ in 0..BOARD_SIZE {
        result += "──";
    }
    result += "─╮\n";

    for i in 0..BOARD_SIZE {
        result += &format!("{:>3} │", i);
        for j in 0..BOARD_SIZE {
            let sq = Square::at(i, j);
            let c = match board.get(sq) {
                Some(side) => side.symbol(),
                None if marked.contains(sq) => '+',
                None => '·',
            };
            result.push(' ');
            result.push(c);
        }
        result += " │\n";
    }
    // Draw the bottom of the box
    result += "    ╰";
    for _ in 0..BOARD_SIZE {
        result += "──";
    }
    result += "─╯";
    result
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", visualize_board(self, SquareSet::new()))
    }
}
