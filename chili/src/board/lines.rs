use crate::{Square, SquareSet, NUM_SQUARES};

/// One of the painted lines of the board that pieces move along.
///
/// A line starts at `start` and goes `len` squares in the unit direction `dir`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line {
    start: Square,
    dir: (i8, i8),
    len: i8,
}

impl Line {
    const fn new(i: i8, j: i8, dir: (i8, i8), len: i8) -> Self {
        Self {
            start: Square::at(i, j),
            dir,
            len,
        }
    }

    /// Number of squares on the line, 3 or 5.
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Position of `sq` along the line.
    pub const fn index_of(&self, sq: Square) -> Option<i8> {
        let mut k = 0;
        while k < self.len {
            if let Some(on_line) = self.start.offset(self.dir, k) {
                if on_line.i() == sq.i() && on_line.j() == sq.j() {
                    return Some(k);
                }
            }
            k += 1;
        }
        None
    }

    /// The squares of the line, in order.
    pub fn squares(&self) -> impl Iterator<Item = Square> + '_ {
        (0..self.len).filter_map(|k| self.start.offset(self.dir, k))
    }

    pub fn contains(&self, sq: Square) -> bool {
        self.index_of(sq).is_some()
    }
}

/// The fixed set of lines: 5 rows, 5 columns, the two long diagonals and the
/// four short diagonals that cut off the corners of the board.
pub const LINES: [Line; 16] = [
    Line::new(0, 0, (0, 1), 5),
    Line::new(1, 0, (0, 1), 5),
    Line::new(2, 0, (0, 1), 5),
    Line::new(3, 0, (0, 1), 5),
    Line::new(4, 0, (0, 1), 5),
    Line::new(0, 0, (1, 0), 5),
    Line::new(0, 1, (1, 0), 5),
    Line::new(0, 2, (1, 0), 5),
    Line::new(0, 3, (1, 0), 5),
    Line::new(0, 4, (1, 0), 5),
    Line::new(0, 0, (1, 1), 5),
    Line::new(0, 4, (1, -1), 5),
    Line::new(0, 2, (1, -1), 3),
    Line::new(0, 2, (1, 1), 3),
    Line::new(2, 0, (1, 1), 3),
    Line::new(2, 4, (1, -1), 3),
];

/// For every square, the set of squares it can reach in a straight move
/// along a line (bit `b` of entry `a` set iff `are_collinear_at_step(a, b)`).
const REACH: [u32; NUM_SQUARES] = build_reach_table();

const fn build_reach_table() -> [u32; NUM_SQUARES] {
    let mut table = [0u32; NUM_SQUARES];
    let mut a = 0;
    while a < NUM_SQUARES {
        let mut b = 0;
        while b < NUM_SQUARES {
            if a != b && shares_line_at_step(Square::from_index(a), Square::from_index(b)) {
                table[a] |= 1 << b;
            }
            b += 1;
        }
        a += 1;
    }
    table
}

const fn shares_line_at_step(a: Square, b: Square) -> bool {
    let step = a.distance(b);
    let mut l = 0;
    while l < LINES.len() {
        if let (Some(ia), Some(ib)) = (LINES[l].index_of(a), LINES[l].index_of(b)) {
            if (ia - ib).abs() == step {
                return true;
            }
        }
        l += 1;
    }
    false
}

/// Whether a straight move from `a` to `b` follows one of the [`LINES`].
///
/// True iff both squares lie on a common line, and their distance along that
/// line equals `max(|Δi|, |Δj|)`. This rejects diagonal neighbours that are
/// not joined by a painted diagonal, e.g. `(1,2)` and `(2,3)`.
pub fn are_collinear_at_step(a: Square, b: Square) -> bool {
    REACH[a.index()] & (1 << b.index()) != 0
}

/// All lines passing through `sq`.
pub fn lines_containing(sq: Square) -> impl Iterator<Item = &'static Line> {
    LINES.iter().filter(move |line| line.contains(sq))
}

/// The squares reachable from `sq` along some line, at any distance.
pub fn reachable_from(sq: Square) -> SquareSet {
    Square::all()
        .filter(|&other| are_collinear_at_step(sq, other))
        .collect()
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;

    quickcheck! {
        fn collinearity_is_symmetric(a: Square, b: Square) -> bool {
            are_collinear_at_step(a, b) == are_collinear_at_step(b, a)
        }

        fn collinear_squares_share_a_listed_line(a: Square, b: Square) -> bool {
            !are_collinear_at_step(a, b)
                || lines_containing(a).any(|line| line.contains(b))
        }
    }

    #[test]
    fn line_lengths() {
        assert_eq!(LINES.iter().filter(|l| l.len() == 5).count(), 12);
        assert_eq!(LINES.iter().filter(|l| l.len() == 3).count(), 4);
        let short: Vec<Square> = LINES[12].squares().collect();
        assert_eq!(short, vec![Square::at(0, 2), Square::at(1, 1), Square::at(2, 0)]);
    }

    #[test]
    fn center_reaches_along_eight_directions() {
        // Row, column and both long diagonals.
        assert_eq!(reachable_from(Square::at(2, 2)).len(), 16);
        assert_eq!(lines_containing(Square::at(2, 2)).count(), 4);
    }

    #[test]
    fn off_line_diagonals_are_rejected() {
        assert!(!are_collinear_at_step(Square::at(1, 2), Square::at(2, 3)));
        assert!(!are_collinear_at_step(Square::at(0, 1), Square::at(1, 0)));
        assert!(are_collinear_at_step(Square::at(0, 2), Square::at(1, 1)));
        assert!(are_collinear_at_step(Square::at(0, 2), Square::at(2, 0)));
        assert!(are_collinear_at_step(Square::at(1, 1), Square::at(2, 2)));
        // A knight-like jump is never a straight move.
        assert!(!are_collinear_at_step(Square::at(0, 0), Square::at(1, 2)));
        assert!(!are_collinear_at_step(Square::at(3, 3), Square::at(3, 3)));
    }
}
